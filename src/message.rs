// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::article_editor::{ArticleEntry, ArticleSet};
use crate::services::translator::Language;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub message_id: String,
    pub reply: String,
    /// True when the reply came from the canned table.
    pub fallback: bool,
}

#[derive(Deserialize, Default)]
pub struct NewSessionRequest {
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Deserialize, Default)]
pub struct LanguageQuery {
    pub lang: Option<Language>,
}

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct UpsertArticleRequest {
    /// `None` appends a new article.
    pub index: Option<usize>,
    pub article: ArticleEntry,
    pub version: u64,
}

#[derive(Deserialize)]
pub struct VersionQuery {
    pub version: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ArticlesSnapshot {
    pub version: u64,
    pub articles: ArticleSet,
}

#[derive(Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct FlagResponse {
    pub first_time: bool,
}
