// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<crate::services::article_editor::EditError> for AppError {
    fn from(err: crate::services::article_editor::EditError) -> Self {
        use crate::services::article_editor::EditError;
        match err {
            EditError::IndexOutOfRange { .. } => AppError::NotFound(err.to_string()),
            EditError::StaleVersion { .. } => AppError::Conflict(err.to_string()),
            EditError::Io(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<crate::services::translator::TranslateError> for AppError {
    fn from(err: crate::services::translator::TranslateError) -> Self {
        AppError::Internal(err.into())
    }
}
