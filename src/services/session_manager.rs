// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::chatbot::{ChatReply, FailureKind};
use super::translator::Language;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
}

#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub id: String,
    pub sender: MessageRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

impl Message {
    pub fn new(sender: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            created_at: Utc::now(),
            suggestions: None,
            error: None,
        }
    }
}

/// One open chat widget. Dropped when the widget closes or goes idle.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub language: Language,
    pub messages: Vec<Message>,
    pub pending: bool,
    pub last_error: Option<FailureKind>,
    pub last_active: Instant,
    in_flight: Option<(u64, CancellationToken)>,
    turns: u64,
}

impl Session {
    pub fn new(id: impl Into<String>, language: Language) -> Self {
        Self {
            id: id.into(),
            language,
            messages: Vec::new(),
            pending: false,
            last_error: None,
            last_active: Instant::now(),
            in_flight: None,
            turns: 0,
        }
    }

    /// Append a user message. Suggestion chips only ever hang off the newest bot message,
    /// so any earlier ones are dropped first.
    pub fn push_user(&mut self, text: impl Into<String>) -> &Message {
        for msg in self.messages.iter_mut() {
            msg.suggestions = None;
        }
        self.push(Message::new(MessageRole::User, text))
    }

    pub fn push_bot(&mut self, text: impl Into<String>, suggestions: Option<Vec<String>>) -> &Message {
        let mut msg = Message::new(MessageRole::Bot, text);
        msg.suggestions = suggestions.filter(|s| !s.is_empty());
        self.push(msg)
    }

    fn push(&mut self, msg: Message) -> &Message {
        self.messages.push(msg);
        self.last_active = Instant::now();
        &self.messages[self.messages.len() - 1]
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            language: self.language,
            pending: self.pending,
            last_error: self.last_error,
            messages: self.messages.clone(),
        }
    }
}

/// What the browser sees of a session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub language: Language,
    pub pending: bool,
    pub last_error: Option<FailureKind>,
    pub messages: Vec<Message>,
}

/// Handle for one user turn that is waiting on a reply.
#[derive(Clone, Debug)]
pub struct Turn {
    pub session_id: String,
    pub seq: u64,
    pub token: CancellationToken,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Open a session seeded with the welcome message and its suggestion chips.
    pub async fn create_session(
        &self,
        language: Language,
        welcome: impl Into<String>,
        suggestions: Vec<String>,
    ) -> SessionView {
        let id = Uuid::new_v4().to_string();
        let mut session = Session::new(id.clone(), language);
        session.push_bot(welcome, Some(suggestions));
        let view = session.view();

        let mut guard = self.inner.write().await;
        guard.insert(id, session);
        view
    }

    pub async fn language(&self, id: &str) -> Option<Language> {
        self.inner.read().await.get(id).map(|s| s.language)
    }

    /// Record the user's message and mark the session as waiting for a reply.
    /// A turn that was still waiting is cancelled; the newest message wins.
    pub async fn begin_turn(&self, id: &str, text: &str) -> Option<Turn> {
        let mut guard = self.inner.write().await;
        let session = guard.get_mut(id)?;

        if let Some((_, previous)) = session.in_flight.take() {
            tracing::debug!(session = id, "superseding pending chat turn");
            previous.cancel();
        }

        session.push_user(text);
        session.turns += 1;
        let token = CancellationToken::new();
        session.in_flight = Some((session.turns, token.clone()));
        session.pending = true;

        Some(Turn {
            session_id: id.to_string(),
            seq: session.turns,
            token,
        })
    }

    /// Store the reply for `turn`. Returns `None` when the turn was superseded
    /// or the session is gone; the reply is then discarded.
    pub async fn complete_turn(&self, turn: &Turn, reply: &ChatReply) -> Option<Message> {
        let mut guard = self.inner.write().await;
        if turn.token.is_cancelled() {
            return None;
        }
        let session = guard.get_mut(&turn.session_id)?;
        session.in_flight = None;
        session.pending = false;
        session.last_error = reply.failure();

        let mut message = Message::new(MessageRole::Bot, reply.text.clone());
        message.error = reply.failure().filter(|kind| kind.is_remote()).map(|_| true);
        Some(session.push(message).clone())
    }

    /// The caller gave up on `turn` without a reply (the request was dropped).
    /// Clears the waiting state unless a newer turn has taken over since.
    pub async fn abandon_turn(&self, turn: &Turn) -> bool {
        let mut guard = self.inner.write().await;
        let Some(session) = guard.get_mut(&turn.session_id) else {
            return false;
        };
        let current = session
            .in_flight
            .as_ref()
            .is_some_and(|(seq, _)| *seq == turn.seq);
        if !current {
            return false;
        }

        if let Some((_, token)) = session.in_flight.take() {
            token.cancel();
        }
        session.pending = false;
        tracing::debug!(session = %turn.session_id, "chat turn abandoned");
        true
    }

    pub async fn get_view(&self, id: &str) -> Option<SessionView> {
        self.inner.read().await.get(id).map(Session::view)
    }

    pub async fn get_history(&self, id: &str) -> Option<Vec<Message>> {
        let guard = self.inner.read().await;
        guard.get(id).map(|s| s.messages.clone())
    }

    /// Close a session, cancelling any turn still waiting on the model.
    pub async fn close_session(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        match guard.remove(id) {
            Some(session) => {
                if let Some((_, token)) = session.in_flight {
                    token.cancel();
                }
                true
            }
            None => false,
        }
    }

    /// Remove sessions idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, s| {
            let keep = now.duration_since(s.last_active) < self.ttl;
            if !keep {
                if let Some((_, token)) = &s.in_flight {
                    token.cancel();
                }
            }
            keep
        });
        before - guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
