use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    message::{AppointmentResponse, FlagResponse, LanguageQuery},
    services::{
        appointments::{AppointmentRequest, validate},
        contact_relay::{ContactForm, ContactOutcome},
        visitor_flags::VisitorFlag,
    },
    state::SharedState,
};

/// Relay failures are reported in the body, not as an HTTP error.
pub async fn contact_handler(
    State(state): State<SharedState>,
    Query(query): Query<LanguageQuery>,
    Json(form): Json<ContactForm>,
) -> Json<ContactOutcome> {
    let lang = query.lang.unwrap_or(state.translator.default_language());
    Json(state.contact.submit(&form, lang, &state.translator).await)
}

pub async fn appointment_handler(
    State(state): State<SharedState>,
    Query(query): Query<LanguageQuery>,
    Json(request): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let lang = query.lang.unwrap_or(state.translator.default_language());

    let problems = validate(&request);
    if !problems.is_empty() {
        let detail = problems
            .iter()
            .map(|(field, problem)| format!("{field}: {problem}"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::BadRequest(detail));
    }

    let appointment = state
        .appointments
        .record(request)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("failed to record appointment")))?;

    tracing::info!(id = %appointment.id, "appointment requested");
    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse {
            id: appointment.id,
            status: state.translator.text("appointment_success", lang),
        }),
    ))
}

pub async fn visitor_flag_handler(
    State(state): State<SharedState>,
    Path((visitor, flag)): Path<(String, VisitorFlag)>,
) -> Json<FlagResponse> {
    Json(FlagResponse {
        first_time: state.flags.first_time(&visitor, flag).await,
    })
}
