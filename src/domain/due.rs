use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::entity::{DueEntity, EntityKind, EntityStatus};
use crate::domain::notification::NotificationDraft;

/// Urgency bucket derived from the day-delta to a due date. Frozen into the
/// notification at creation time and never re-evaluated on later reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueToday,
    DueSoon,
    Upcoming,
}

impl Urgency {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "overdue" => Some(Self::Overdue),
            "due_today" => Some(Self::DueToday),
            "due_soon" => Some(Self::DueSoon),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueToday => "due_today",
            Self::DueSoon => "due_soon",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Whole calendar days from `today` until `due`. Negative when the date has
/// passed. Both sides are plain dates, so time-of-day can never shift the
/// result: an entity due today is 0 at any hour.
pub fn days_until(due: Date, today: Date) -> i64 {
    i64::from(due.to_julian_day()) - i64::from(today.to_julian_day())
}

/// Bucket a day-delta. `None` means the entity is not yet eligible for a
/// notification (more than a week out).
pub fn due_window(days: i64) -> Option<Urgency> {
    match days {
        d if d < 0 => Some(Urgency::Overdue),
        0 => Some(Urgency::DueToday),
        1..=3 => Some(Urgency::DueSoon),
        4..=7 => Some(Urgency::Upcoming),
        _ => None,
    }
}

/// Classify one entity against a reference day. Settled entities and
/// entities outside the due window produce nothing. The returned draft has
/// urgency, title, and message frozen as of `today`.
pub fn classify(entity: &DueEntity, today: Date) -> Option<NotificationDraft> {
    if entity.status == EntityStatus::Settled {
        return None;
    }

    let days = days_until(entity.due_date, today);
    let urgency = due_window(days)?;

    Some(NotificationDraft {
        user_id: entity.user_id,
        kind: entity.kind,
        related_id: entity.id,
        due_date: entity.due_date,
        urgency,
        title: title_for(entity.kind, urgency).to_string(),
        message: message_for(entity, urgency, days),
    })
}

fn title_for(kind: EntityKind, urgency: Urgency) -> &'static str {
    match (kind, urgency) {
        (EntityKind::Bill, Urgency::Overdue) => "Bill overdue",
        (EntityKind::Bill, Urgency::DueToday) => "Bill due today",
        (EntityKind::Bill, Urgency::DueSoon) => "Bill due soon",
        (EntityKind::Bill, Urgency::Upcoming) => "Upcoming bill",
        (EntityKind::Debt, Urgency::Overdue) => "Debt payment overdue",
        (EntityKind::Debt, Urgency::DueToday) => "Debt payment due today",
        (EntityKind::Debt, Urgency::DueSoon) => "Debt payment due soon",
        (EntityKind::Debt, Urgency::Upcoming) => "Upcoming debt payment",
        (EntityKind::Goal, Urgency::Overdue) => "Goal deadline passed",
        (EntityKind::Goal, Urgency::DueToday) => "Goal deadline today",
        (EntityKind::Goal, Urgency::DueSoon) => "Goal deadline soon",
        (EntityKind::Goal, Urgency::Upcoming) => "Upcoming goal deadline",
    }
}

fn message_for(entity: &DueEntity, urgency: Urgency, days: i64) -> String {
    let amount = format_cents(entity.amount_cents);
    let qualifier = match entity.kind {
        EntityKind::Bill => amount,
        EntityKind::Debt => format!("{} payment", amount),
        EntityKind::Goal => format!("{} to go", amount),
    };
    format!("{} ({}): {}.", entity.label, qualifier, phrase_for(urgency, days))
}

fn phrase_for(urgency: Urgency, days: i64) -> String {
    match urgency {
        Urgency::Overdue => {
            let late = -days;
            if late == 1 {
                "Overdue by 1 day".to_string()
            } else {
                format!("Overdue by {} days", late)
            }
        }
        Urgency::DueToday => "Due today".to_string(),
        Urgency::DueSoon | Urgency::Upcoming => {
            if days == 1 {
                "Due in 1 day".to_string()
            } else {
                format!("Due in {} days", days)
            }
        }
    }
}

fn format_cents(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents.rem_euclid(100))
}
