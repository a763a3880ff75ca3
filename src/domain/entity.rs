use serde::{Deserialize, Serialize};
use time::util::days_in_year_month;
use time::{Date, Duration, Month};
use uuid::Uuid;

/// Which financial entity a notification was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Bill,
    Debt,
    Goal,
}

impl EntityKind {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "bill" => Some(Self::Bill),
            "debt" => Some(Self::Debt),
            "goal" => Some(Self::Goal),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::Debt => "debt",
            Self::Goal => "goal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Outstanding,
    Settled,
}

impl EntityStatus {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "outstanding" => Some(Self::Outstanding),
            "settled" => Some(Self::Settled),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Outstanding => "outstanding",
            Self::Settled => "settled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Next due date after `from` for this cadence. Monthly and yearly
    /// cadences clamp to the last day of the target month (Jan 31 -> Feb 28,
    /// Feb 29 -> Feb 28 on non-leap years).
    pub fn advance(&self, from: Date) -> Date {
        match self {
            Self::Weekly => from.saturating_add(Duration::weeks(1)),
            Self::Monthly => add_months(from, 1),
            Self::Yearly => add_months(from, 12),
        }
    }
}

fn add_months(from: Date, months: i32) -> Date {
    let zero_based = from.month() as i32 - 1 + months;
    let year = from.year() + zero_based.div_euclid(12);
    let month = Month::try_from((zero_based.rem_euclid(12) + 1) as u8)
        .expect("month index in 1..=12");
    let day = from.day().min(days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).expect("clamped day is valid")
}

/// Uniform read-only view the reconciliation engine sees for every entity
/// kind. `amount_cents` is the figure the message quotes: the bill amount,
/// the debt's minimum payment, or the amount still to save for a goal.
#[derive(Debug, Clone)]
pub struct DueEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EntityKind,
    pub label: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub is_recurring: bool,
    pub recurrence: Option<Recurrence>,
    pub status: EntityStatus,
}
