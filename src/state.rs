// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::appointments::AppointmentLog;
use crate::services::article_store::ArticleStore;
use crate::services::chatbot::{ChatResponder, RetryPolicy};
use crate::services::contact_relay::ContactRelay;
use crate::services::gemini::{ChatBackend, GeminiClient};
use crate::services::session_manager::SessionManager;
use crate::services::translator::{TranslateError, Translator};
use crate::services::visitor_flags::{MemoryStore, VisitorFlags};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub translator: Arc<Translator>,
    pub responder: ChatResponder,
    pub sessions: SessionManager,
    pub articles: ArticleStore,
    pub flags: VisitorFlags,
    pub contact: ContactRelay,
    pub appointments: AppointmentLog,
}

impl AppState {
    /// Wire everything from config, talking to Gemini when a credential is configured.
    pub async fn new(config: Config) -> Result<Self, TranslateError> {
        let backend = config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )) as Arc<dyn ChatBackend>
        });
        Self::with_backend(config, backend).await
    }

    pub async fn with_backend(
        config: Config,
        backend: Option<Arc<dyn ChatBackend>>,
    ) -> Result<Self, TranslateError> {
        let translator = Arc::new(Translator::load(config.translations_path.as_deref())?);

        match &backend {
            Some(b) => tracing::info!("chat replies via {}", b.name()),
            None => tracing::info!("no chat credential configured, using canned replies"),
        }

        let responder = ChatResponder::new(
            backend,
            translator.clone(),
            RetryPolicy {
                max_retries: config.chat_max_retries,
                backoff: config.chat_backoff,
            },
        );

        Ok(Self {
            translator,
            responder,
            sessions: SessionManager::new(config.session_ttl),
            articles: ArticleStore::open(config.articles_path.clone()).await,
            flags: VisitorFlags::new(Arc::new(MemoryStore::new()), config.visitor_ttl),
            contact: ContactRelay::new(config.contact_relay_url.clone()),
            appointments: AppointmentLog::new(config.appointments_path.clone()),
            config,
        })
    }
}
