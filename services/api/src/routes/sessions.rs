//! Guest session endpoints

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    models::{CreateSessionRequest, MessageResponse, SessionResponse, SessionTokenRequest},
    state::AppState,
    validation::{validate_event_code, validate_guest_name, validate_session_token},
};

/// Join an event by code
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_event_code(&payload.event_code).map_err(ApiError::BadRequest)?;
    validate_guest_name(&payload.guest_name).map_err(ApiError::BadRequest)?;

    let session = state
        .session_service
        .create_session_for_code(&payload.event_code, &payload.guest_name)
        .await?;
    let event = Some(state.event_service.get_by_id(session.event_id).await?);

    Ok((StatusCode::CREATED, Json(SessionResponse { session, event })))
}

/// Check a session token and return the session with its event
pub async fn validate_session(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    let session = state.session_service.validate_session(&token).await?;
    let event = Some(state.event_service.get_by_id(session.event_id).await?);

    Ok(Json(SessionResponse { session, event }))
}

pub async fn refresh_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SessionTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_session_token(&payload.session_token).map_err(ApiError::BadRequest)?;

    let session = state
        .session_service
        .refresh_session(&payload.session_token)
        .await?;

    Ok(Json(SessionResponse {
        session,
        event: None,
    }))
}

pub async fn revoke_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SessionTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_session_token(&payload.session_token).map_err(ApiError::BadRequest)?;

    state
        .session_service
        .revoke_session(&payload.session_token)
        .await?;

    Ok(Json(MessageResponse::new("session revoked")))
}
