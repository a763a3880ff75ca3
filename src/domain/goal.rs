use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entity::EntityStatus;

/// A savings target with a deadline. Goals never recur; one is settled once
/// the saved amount reaches the target (or the user archives it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub target_cents: i64,
    pub saved_cents: i64,
    pub target_date: Date,
    pub status: EntityStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
