//! Organizer endpoints
//!
//! An owner token manages exactly the event it was issued with.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use common::{models::EventUpdate, services::Requester};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    middleware::OwnerIdentity,
    models::{
        BulkDeleteRequest, EventListResponse, MessageResponse, PhotoListResponse,
        SessionListResponse,
    },
    state::AppState,
    validation::{validate_description, validate_event_name},
};

async fn ensure_owned(state: &AppState, owner: &OwnerIdentity, event_id: Uuid) -> ApiResult<()> {
    state
        .event_service
        .get_owned(event_id, &owner.owner_token)
        .await?;
    Ok(())
}

pub async fn list_events(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
) -> ApiResult<impl IntoResponse> {
    debug!(event_id = %owner.event_id, "Listing organizer events");
    let events = vec![
        state
            .event_service
            .get_owned(owner.event_id, &owner.owner_token)
            .await?,
    ];

    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

pub async fn get_event(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .event_service
        .get_owned(event_id, &owner.owner_token)
        .await?;

    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<EventUpdate>,
) -> ApiResult<impl IntoResponse> {
    if let Some(name) = &update.name {
        validate_event_name(name).map_err(ApiError::BadRequest)?;
    }
    validate_description(update.description.as_deref()).map_err(ApiError::BadRequest)?;

    ensure_owned(&state, &owner, event_id).await?;
    let event = state.event_service.update(event_id, update).await?;

    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    state.event_service.delete(event_id).await?;

    Ok(Json(MessageResponse::new("event deleted")))
}

pub async fn close_event(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    state.event_service.close(event_id).await?;

    Ok(Json(MessageResponse::new("event closed")))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    let sessions = state
        .session_service
        .get_sessions_by_event(event_id)
        .await?;

    Ok(Json(SessionListResponse {
        count: sessions.len(),
        sessions,
    }))
}

pub async fn list_photos(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    let photos = state.photo_service.get_photos_by_event(event_id).await?;

    Ok(Json(PhotoListResponse {
        count: photos.len(),
        photos,
    }))
}

/// Remove several photos of one event, all or nothing
pub async fn delete_photos(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BulkDeleteRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.photo_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one photo id is required".to_string(),
        ));
    }

    ensure_owned(&state, &owner, event_id).await?;
    let deletions = state
        .photo_service
        .delete_bulk_photos(event_id, &payload.photo_ids)
        .await?;

    Ok(Json(deletions))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(photo_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let requester = Requester::Owner {
        event_id: owner.event_id,
    };
    let deletion = state
        .photo_service
        .delete_photo(photo_id, &requester)
        .await?;

    Ok(Json(deletion))
}

/// Queue an archive of the event's photos
pub async fn request_download(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    let archive = state
        .photo_service
        .generate_bulk_download_url(event_id)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(archive)))
}

/// Poll an archive, the response carries a download URL once it is ready
pub async fn get_download(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerIdentity>,
    ApiPath((event_id, archive_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    ensure_owned(&state, &owner, event_id).await?;
    let download = state
        .photo_service
        .get_bulk_download(event_id, archive_id)
        .await?;

    Ok(Json(download))
}
