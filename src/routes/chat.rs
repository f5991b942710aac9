use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, NewSessionRequest},
    services::{
        chatbot::ChatReply,
        session_manager::{Message, SessionManager, SessionView, Turn},
        translator::Language,
    },
    state::SharedState,
};

/// Holds a turn while its reply is awaited. Dropped before completion (the
/// client went away), it releases the session's waiting state.
struct TurnGuard {
    sessions: SessionManager,
    turn: Turn,
    armed: bool,
}

impl TurnGuard {
    fn new(sessions: SessionManager, turn: Turn) -> Self {
        Self {
            sessions,
            turn,
            armed: true,
        }
    }

    async fn complete(mut self, reply: &ChatReply) -> Option<Message> {
        let message = self.sessions.complete_turn(&self.turn, reply).await;
        self.armed = false;
        message
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let sessions = self.sessions.clone();
        let turn = self.turn.clone();
        runtime.spawn(async move {
            sessions.abandon_turn(&turn).await;
        });
    }
}

async fn open_session(state: &SharedState, lang: Language) -> SessionView {
    let welcome = state.translator.text("chatbot_welcome", lang);
    let suggestions = state.translator.list("chatbot_suggestions", lang);
    state.sessions.create_session(lang, welcome, suggestions).await
}

pub async fn create_session_handler(
    State(state): State<SharedState>,
    Json(payload): Json<NewSessionRequest>,
) -> (StatusCode, Json<SessionView>) {
    let lang = payload
        .language
        .unwrap_or(state.translator.default_language());
    (StatusCode::CREATED, Json(open_session(&state, lang).await))
}

pub async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    state
        .sessions
        .get_view(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("chat session {id}")))
}

/// The widget was closed: drop the conversation and abandon any pending reply.
pub async fn close_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.close_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("chat session {id}")))
    }
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();

    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let session_id = match payload.session_id.filter(|s| !s.trim().is_empty()) {
        Some(id) => id,
        None => {
            let lang = payload
                .language
                .unwrap_or(state.translator.default_language());
            open_session(&state, lang).await.session_id
        }
    };

    let lang = match payload.language {
        Some(lang) => lang,
        None => state
            .sessions
            .language(&session_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("chat session {session_id}")))?,
    };

    let turn = state
        .sessions
        .begin_turn(&session_id, trimmed)
        .await
        .ok_or_else(|| AppError::NotFound(format!("chat session {session_id}")))?;

    let token = turn.token.clone();
    let guard = TurnGuard::new(state.sessions.clone(), turn);

    let reply = tokio::select! {
        reply = state.responder.respond_detailed(trimmed, lang) => reply,
        _ = token.cancelled() => {
            tracing::debug!(session = %session_id, "chat turn cancelled");
            return Err(AppError::Conflict("superseded by a newer message".to_string()));
        }
    };

    let message = guard
        .complete(&reply)
        .await
        .ok_or_else(|| AppError::Conflict("superseded by a newer message".to_string()))?;

    Ok(Json(ChatResponse {
        session_id,
        message_id: message.id,
        reply: message.text,
        fallback: reply.failure().is_some(),
    }))
}
