use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entity::{EntityStatus, Recurrence};

/// An owed balance with a minimum payment due each cycle. `amount_cents` is
/// the payment the reminder quotes; `balance_cents` is what remains overall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub amount_cents: i64,
    pub balance_cents: i64,
    pub due_date: Date,
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    pub status: EntityStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
