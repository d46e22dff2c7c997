//! API models for request and response payloads

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::models::{Event, FileSpec, Session};
use common::services::PhotoWithUrl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create an event
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub owner_email: String,
}

/// Newly created event, the only response carrying the owner token
#[derive(Debug, Serialize)]
pub struct CreatedEventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub owner_token: String,
}

impl From<Event> for CreatedEventResponse {
    fn from(event: Event) -> Self {
        Self {
            owner_token: event.owner_token.clone(),
            event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub count: usize,
}

/// Request to join an event as a guest
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub event_code: String,
    pub guest_name: String,
}

/// Body of refresh and revoke requests
#[derive(Debug, Deserialize)]
pub struct SessionTokenRequest {
    pub session_token: String,
}

/// Session details, with the event when it was loaded
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkUploadUrlRequest {
    pub files: Vec<FileSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmUploadRequest {
    pub file_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmBulkUploadRequest {
    pub confirmations: HashMap<Uuid, i64>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub photo_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<PhotoWithUrl>,
    pub count: usize,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::EventStatus;

    #[test]
    fn test_created_event_exposes_owner_token_once() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: "Test Wedding".to_string(),
            code: "WEDD2025".to_string(),
            description: Some("Garden party".to_string()),
            event_date: None,
            status: EventStatus::Active,
            owner_email: "owner@example.com".to_string(),
            owner_token: "f".repeat(64),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(CreatedEventResponse::from(event)).unwrap();
        assert_eq!(json["owner_token"], "f".repeat(64));
        assert_eq!(json["code"], "WEDD2025");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_bulk_upload_accepts_declared_sizes() {
        let body = r#"{"files": [{"content_type": "image/png", "size": 2048}]}"#;
        let request: BulkUploadUrlRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].content_type, "image/png");
    }

    #[test]
    fn test_bulk_confirm_parses_uuid_keys() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"confirmations": {{"{id}": 2048}}}}"#);
        let request: ConfirmBulkUploadRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(request.confirmations.get(&id), Some(&2048));

        let bad = r#"{"confirmations": {"not-a-uuid": 1}}"#;
        assert!(serde_json::from_str::<ConfirmBulkUploadRequest>(bad).is_err());
    }
}
