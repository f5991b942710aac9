// src/config.rs
use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Google API keys all share this prefix; anything else is treated as unset.
const CREDENTIAL_PREFIX: &str = "AIza";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub public_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub chat_max_retries: u32,
    pub chat_backoff: Duration,
    pub session_ttl: Duration,
    pub visitor_ttl: Duration,
    pub articles_path: PathBuf,
    pub translations_path: Option<PathBuf>,
    pub appointments_path: PathBuf,
    pub contact_relay_url: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            public_dir: PathBuf::from("public"),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            chat_max_retries: 2,
            chat_backoff: Duration::from_millis(1000),
            session_ttl: Duration::from_secs(1800),
            visitor_ttl: Duration::from_secs(24 * 60 * 60),
            articles_path: PathBuf::from("public/articles.json"),
            translations_path: None,
            appointments_path: PathBuf::from("appointments.json"),
            contact_relay_url: None,
            admin_password: None,
        }
    }
}

impl Config {
    /// Build the config from the process environment (after loading `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("VITE_GEMINI_API_KEY"))
            .and_then(valid_credential);

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            public_dir: non_empty("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            gemini_api_key,
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            chat_max_retries: parsed("CHAT_MAX_RETRIES")?.unwrap_or(defaults.chat_max_retries),
            chat_backoff: parsed("CHAT_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.chat_backoff),
            session_ttl: parsed("SESSION_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            visitor_ttl: parsed("VISITOR_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.visitor_ttl),
            articles_path: non_empty("ARTICLES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.articles_path),
            translations_path: non_empty("TRANSLATIONS_PATH").map(PathBuf::from),
            appointments_path: non_empty("APPOINTMENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.appointments_path),
            contact_relay_url: non_empty("CONTACT_RELAY_URL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
        })
    }
}

/// Accepts a key only when it looks like a real Google API key.
pub fn valid_credential(key: String) -> Option<String> {
    let key = key.trim().to_string();
    if key.starts_with(CREDENTIAL_PREFIX) {
        Some(key)
    } else {
        tracing::warn!("ignoring chat credential without the expected prefix");
        None
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))
        })
        .transpose()
}
