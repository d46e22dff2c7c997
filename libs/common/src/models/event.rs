//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an event, stored as the `event_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Inactive,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Inactive => "inactive",
            EventStatus::Closed => "closed",
        }
    }
}

/// An organizer's event
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub owner_email: String,
    /// Bearer secret identifying the organizer, only ever returned at creation
    #[serde(skip_serializing)]
    pub owner_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Values supplied when creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub owner_email: String,
}

/// Partial update, `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub status: Option<EventStatus>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.event_date.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&EventStatus::Closed).unwrap(),
            "\"closed\""
        );
        let status: EventStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, EventStatus::Inactive);
        assert!(serde_json::from_str::<EventStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_owner_token_is_never_serialized() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: "Test Wedding".to_string(),
            code: "ABCD1234".to_string(),
            description: None,
            event_date: None,
            status: EventStatus::Active,
            owner_email: "owner@example.com".to_string(),
            owner_token: "secret".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("owner_token").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_empty_update() {
        assert!(EventUpdate::default().is_empty());
        let update = EventUpdate {
            status: Some(EventStatus::Closed),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
