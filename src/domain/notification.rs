use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::due::Urgency;
use crate::domain::entity::EntityKind;

/// A materialized reminder. Created only by the reconciliation engine, never
/// by a client write. Title, message, and urgency are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EntityKind,
    pub related_id: Uuid,
    pub due_date: Date,
    pub urgency: Urgency,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Candidate produced by the classifier, keyed by
/// (user_id, kind, related_id, due_date) for the idempotent upsert.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub user_id: Uuid,
    pub kind: EntityKind,
    pub related_id: Uuid,
    pub due_date: Date,
    pub urgency: Urgency,
    pub title: String,
    pub message: String,
}
