//! Guest photo endpoints
//!
//! Every handler acts on the event of the caller's session.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use common::services::Requester;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    middleware::GuestIdentity,
    models::{
        BulkUploadUrlRequest, ConfirmBulkUploadRequest, ConfirmUploadRequest, MessageResponse,
        PhotoListResponse, UploadUrlRequest,
    },
    state::AppState,
    validation::{validate_content_type, validate_file_size},
};

pub async fn generate_upload_url(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
    ApiJson(payload): ApiJson<UploadUrlRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_content_type(&payload.content_type).map_err(ApiError::BadRequest)?;
    debug!(session_id = %guest.session_id, content_type = %payload.content_type, "Upload URL requested");

    let ticket = state
        .photo_service
        .generate_upload_url(guest.event_id, &guest.guest_name, &payload.content_type)
        .await?;

    Ok(Json(ticket))
}

pub async fn generate_bulk_upload_urls(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
    ApiJson(payload): ApiJson<BulkUploadUrlRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.files.is_empty() {
        return Err(ApiError::BadRequest("At least one file is required".to_string()));
    }
    for file in &payload.files {
        validate_content_type(&file.content_type).map_err(ApiError::BadRequest)?;
    }

    let batch = state
        .photo_service
        .generate_bulk_upload_urls(guest.event_id, &guest.guest_name, &payload.files)
        .await?;

    Ok(Json(batch))
}

/// Record the size of a finished upload
pub async fn confirm_upload(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
    ApiPath(photo_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ConfirmUploadRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_file_size(payload.file_size).map_err(ApiError::BadRequest)?;

    state
        .photo_service
        .confirm_upload(guest.event_id, photo_id, payload.file_size)
        .await?;

    Ok(Json(MessageResponse::new("upload confirmed")))
}

pub async fn confirm_bulk_upload(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
    ApiJson(payload): ApiJson<ConfirmBulkUploadRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.confirmations.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one confirmation is required".to_string(),
        ));
    }
    for size in payload.confirmations.values() {
        validate_file_size(*size).map_err(ApiError::BadRequest)?;
    }

    state
        .photo_service
        .confirm_bulk_upload(guest.event_id, &payload.confirmations)
        .await?;

    Ok(Json(MessageResponse::new("uploads confirmed")))
}

pub async fn list_photos(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
) -> ApiResult<impl IntoResponse> {
    let photos = state
        .photo_service
        .get_photos_by_event(guest.event_id)
        .await?;

    Ok(Json(PhotoListResponse {
        count: photos.len(),
        photos,
    }))
}

/// Remove a photo the guest uploaded
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(guest): Extension<GuestIdentity>,
    ApiPath(photo_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let requester = Requester::Guest {
        event_id: guest.event_id,
        guest_name: guest.guest_name,
    };

    let deletion = state
        .photo_service
        .delete_photo(photo_id, &requester)
        .await?;

    Ok(Json(deletion))
}
