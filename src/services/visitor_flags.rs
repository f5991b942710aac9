//! "Have I shown this already?" flags and admin login sessions, kept behind
//! a small key-value port so the logic does not care where flags live.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String);
    /// Store `value` only if `key` is unset. True when this call stored it.
    async fn set_if_absent(&self, key: &str, value: String) -> bool;
    async fn remove(&self, key: &str) -> bool;
    /// Drop entries written more than `max_age` ago. Returns how many went.
    async fn purge_older_than(&self, max_age: Duration) -> usize;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).map(|(value, _)| value.clone())
    }

    async fn set(&self, key: &str, value: String) {
        self.inner
            .write()
            .await
            .insert(key.to_string(), (value, Instant::now()));
    }

    async fn set_if_absent(&self, key: &str, value: String) -> bool {
        match self.inner.write().await.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert((value, Instant::now()));
                true
            }
        }
    }

    async fn remove(&self, key: &str) -> bool {
        self.inner.write().await.remove(key).is_some()
    }

    async fn purge_older_than(&self, max_age: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, (_, written)| written.elapsed() < max_age);
        before - guard.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorFlag {
    WelcomeModal,
    ChatNotification,
}

impl VisitorFlag {
    fn key(self, visitor: &str) -> String {
        match self {
            VisitorFlag::WelcomeModal => format!("welcomeModalSeen:{visitor}"),
            VisitorFlag::ChatNotification => format!("chatNotificationSeen:{visitor}"),
        }
    }
}

/// Flags and admin tokens live for `ttl` after they are written.
#[derive(Clone)]
pub struct VisitorFlags {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl VisitorFlags {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// True the first time it is asked for a visitor, false afterwards.
    pub async fn first_time(&self, visitor: &str, flag: VisitorFlag) -> bool {
        self.store
            .set_if_absent(&flag.key(visitor), "true".to_string())
            .await
    }

    pub async fn admin_login(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.store
            .set(&format!("isAdminLoggedIn:{token}"), "true".to_string())
            .await;
        token
    }

    pub async fn is_admin(&self, token: &str) -> bool {
        self.store
            .get(&format!("isAdminLoggedIn:{token}"))
            .await
            .as_deref()
            == Some("true")
    }

    pub async fn admin_logout(&self, token: &str) -> bool {
        self.store.remove(&format!("isAdminLoggedIn:{token}")).await
    }

    /// Forget flags and admin logins older than the ttl.
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_older_than(self.ttl).await
    }
}
