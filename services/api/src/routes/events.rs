//! Public event endpoints

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::models::NewEvent;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    models::{CreateEventRequest, CreatedEventResponse},
    state::AppState,
    validation::{validate_description, validate_email, validate_event_code, validate_event_name},
};

/// Create an event, returning its owner token
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_event_name(&payload.name).map_err(ApiError::BadRequest)?;
    validate_description(payload.description.as_deref()).map_err(ApiError::BadRequest)?;
    validate_email(&payload.owner_email).map_err(ApiError::BadRequest)?;

    let event = state
        .event_service
        .create_event(NewEvent {
            name: payload.name,
            description: payload.description,
            event_date: payload.event_date,
            owner_email: payload.owner_email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedEventResponse::from(event))))
}

/// Look up a joinable event by its code
pub async fn get_event_by_code(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    validate_event_code(&code).map_err(ApiError::BadRequest)?;

    let event = state.event_service.get_by_code(&code).await?;
    Ok(Json(event))
}
