// The password gate keeps casual visitors out of the editor; it is not a security boundary.
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    message::{AdminLoginRequest, AdminLoginResponse},
    services::appointments::Appointment,
    state::SharedState,
};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn admin_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok())
}

pub async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = admin_token(req.headers()).map(str::to_owned);
    let authorized = match token {
        Some(token) => state.flags.is_admin(&token).await,
        None => false,
    };

    if authorized {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let Some(expected) = state.config.admin_password.as_deref() else {
        tracing::warn!("admin login attempted but ADMIN_PASSWORD is not set");
        return Err(AppError::Unauthorized);
    };

    if payload.password != expected {
        tracing::warn!("admin login rejected");
        return Err(AppError::Unauthorized);
    }

    let token = state.flags.admin_login().await;
    tracing::info!("admin logged in");
    Ok(Json(AdminLoginResponse { token }))
}

pub async fn logout_handler(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = admin_token(&headers) {
        state.flags.admin_logout(token).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn appointments_handler(State(state): State<SharedState>) -> Json<Vec<Appointment>> {
    Json(state.appointments.list().await)
}
