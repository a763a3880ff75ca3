//! Due-Window Classifier Tests
//!
//! Pure-function coverage: day deltas, urgency buckets, frozen message
//! content, and recurrence advancement. All dates are fixed.

use time::{Date, Month};
use uuid::Uuid;

use tally::domain::due::{classify, days_until, due_window, Urgency};
use tally::domain::entity::{DueEntity, EntityKind, EntityStatus, Recurrence};

fn date(year: i32, month: u8, day: u8) -> Date {
    Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap()
}

fn entity(kind: EntityKind, label: &str, amount_cents: i64, due_date: Date) -> DueEntity {
    DueEntity {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        kind,
        label: label.to_string(),
        amount_cents,
        due_date,
        is_recurring: false,
        recurrence: None,
        status: EntityStatus::Outstanding,
    }
}

// ===========================================================================
// Day deltas
// ===========================================================================

#[test]
fn days_until_counts_calendar_days() {
    let today = date(2026, 3, 15);
    assert_eq!(days_until(date(2026, 3, 15), today), 0);
    assert_eq!(days_until(date(2026, 3, 16), today), 1);
    assert_eq!(days_until(date(2026, 3, 12), today), -3);
}

#[test]
fn days_until_crosses_month_and_year_boundaries() {
    assert_eq!(days_until(date(2026, 9, 1), date(2026, 8, 31)), 1);
    assert_eq!(days_until(date(2027, 1, 1), date(2026, 12, 31)), 1);
    assert_eq!(days_until(date(2026, 3, 1), date(2026, 2, 28)), 1);
    // 2024 is a leap year.
    assert_eq!(days_until(date(2024, 3, 1), date(2024, 2, 28)), 2);
}

// ===========================================================================
// Urgency buckets
// ===========================================================================

#[test]
fn due_window_buckets() {
    assert_eq!(due_window(-100), Some(Urgency::Overdue));
    assert_eq!(due_window(-1), Some(Urgency::Overdue));
    assert_eq!(due_window(0), Some(Urgency::DueToday));
    assert_eq!(due_window(1), Some(Urgency::DueSoon));
    assert_eq!(due_window(3), Some(Urgency::DueSoon));
    assert_eq!(due_window(4), Some(Urgency::Upcoming));
    assert_eq!(due_window(7), Some(Urgency::Upcoming));
    assert_eq!(due_window(8), None);
    assert_eq!(due_window(365), None);
}

// ===========================================================================
// Classification
// ===========================================================================

#[test]
fn settled_entity_classifies_to_nothing() {
    let today = date(2026, 3, 15);
    let mut bill = entity(EntityKind::Bill, "Rent", 150000, today);
    bill.status = EntityStatus::Settled;

    assert!(classify(&bill, today).is_none());
}

#[test]
fn outside_window_classifies_to_nothing() {
    let today = date(2026, 3, 15);
    let bill = entity(EntityKind::Bill, "Rent", 150000, date(2026, 3, 23));

    assert!(classify(&bill, today).is_none());
}

#[test]
fn bill_due_today() {
    let today = date(2026, 3, 15);
    let bill = entity(EntityKind::Bill, "Electricity", 12000, today);

    let draft = classify(&bill, today).unwrap();
    assert_eq!(draft.urgency, Urgency::DueToday);
    assert_eq!(draft.title, "Bill due today");
    assert_eq!(draft.message, "Electricity ($120.00): Due today.");
    assert_eq!(draft.related_id, bill.id);
    assert_eq!(draft.user_id, bill.user_id);
    assert_eq!(draft.due_date, today);
}

#[test]
fn draft_carries_entity_kind() {
    let today = date(2026, 3, 15);
    let debt = entity(EntityKind::Debt, "Card", 5000, today);

    let draft = classify(&debt, today).unwrap();
    assert_eq!(draft.kind, EntityKind::Debt);
}

#[test]
fn overdue_messages_pluralize() {
    let today = date(2026, 3, 15);

    let one_day = entity(EntityKind::Bill, "Water", 4500, date(2026, 3, 14));
    let draft = classify(&one_day, today).unwrap();
    assert_eq!(draft.message, "Water ($45.00): Overdue by 1 day.");
    assert_eq!(draft.title, "Bill overdue");

    let five_days = entity(EntityKind::Bill, "Water", 4500, date(2026, 3, 10));
    let draft = classify(&five_days, today).unwrap();
    assert_eq!(draft.message, "Water ($45.00): Overdue by 5 days.");
}

#[test]
fn due_soon_messages_pluralize() {
    let today = date(2026, 3, 15);

    let tomorrow = entity(EntityKind::Bill, "Phone", 5500, date(2026, 3, 16));
    let draft = classify(&tomorrow, today).unwrap();
    assert_eq!(draft.urgency, Urgency::DueSoon);
    assert_eq!(draft.message, "Phone ($55.00): Due in 1 day.");

    let in_three = entity(EntityKind::Bill, "Phone", 5500, date(2026, 3, 18));
    let draft = classify(&in_three, today).unwrap();
    assert_eq!(draft.message, "Phone ($55.00): Due in 3 days.");

    let in_seven = entity(EntityKind::Bill, "Phone", 5500, date(2026, 3, 22));
    let draft = classify(&in_seven, today).unwrap();
    assert_eq!(draft.urgency, Urgency::Upcoming);
    assert_eq!(draft.title, "Upcoming bill");
    assert_eq!(draft.message, "Phone ($55.00): Due in 7 days.");
}

#[test]
fn debt_messages_quote_the_payment() {
    let today = date(2026, 3, 15);
    let debt = entity(EntityKind::Debt, "Car loan", 25000, date(2026, 3, 13));

    let draft = classify(&debt, today).unwrap();
    assert_eq!(draft.title, "Debt payment overdue");
    assert_eq!(draft.message, "Car loan ($250.00 payment): Overdue by 2 days.");
}

#[test]
fn goal_messages_quote_the_shortfall() {
    let today = date(2026, 3, 15);
    // The source adapter computes amount as target minus saved.
    let goal = entity(EntityKind::Goal, "Vacation", 60000, date(2026, 3, 17));

    let draft = classify(&goal, today).unwrap();
    assert_eq!(draft.title, "Goal deadline soon");
    assert_eq!(draft.message, "Vacation ($600.00 to go): Due in 2 days.");
}

#[test]
fn amounts_format_with_two_decimal_places() {
    let today = date(2026, 3, 15);

    let cents_only = entity(EntityKind::Bill, "Fee", 50, today);
    let draft = classify(&cents_only, today).unwrap();
    assert_eq!(draft.message, "Fee ($0.50): Due today.");

    let round = entity(EntityKind::Bill, "Rent", 150000, today);
    let draft = classify(&round, today).unwrap();
    assert_eq!(draft.message, "Rent ($1500.00): Due today.");

    let uneven = entity(EntityKind::Bill, "Gas", 4307, today);
    let draft = classify(&uneven, today).unwrap();
    assert_eq!(draft.message, "Gas ($43.07): Due today.");
}

// ===========================================================================
// Recurrence advancement
// ===========================================================================

#[test]
fn weekly_advances_seven_days() {
    assert_eq!(
        Recurrence::Weekly.advance(date(2026, 3, 15)),
        date(2026, 3, 22)
    );
    assert_eq!(
        Recurrence::Weekly.advance(date(2026, 12, 28)),
        date(2027, 1, 4)
    );
}

#[test]
fn monthly_advances_one_month() {
    assert_eq!(
        Recurrence::Monthly.advance(date(2026, 1, 15)),
        date(2026, 2, 15)
    );
    assert_eq!(
        Recurrence::Monthly.advance(date(2026, 12, 31)),
        date(2027, 1, 31)
    );
}

#[test]
fn monthly_clamps_to_month_end() {
    // 2026 is not a leap year.
    assert_eq!(
        Recurrence::Monthly.advance(date(2026, 1, 31)),
        date(2026, 2, 28)
    );
    assert_eq!(
        Recurrence::Monthly.advance(date(2024, 1, 31)),
        date(2024, 2, 29)
    );
    assert_eq!(
        Recurrence::Monthly.advance(date(2026, 3, 31)),
        date(2026, 4, 30)
    );
}

#[test]
fn yearly_advances_and_clamps_leap_day() {
    assert_eq!(
        Recurrence::Yearly.advance(date(2026, 6, 1)),
        date(2027, 6, 1)
    );
    assert_eq!(
        Recurrence::Yearly.advance(date(2024, 2, 29)),
        date(2025, 2, 28)
    );
}
