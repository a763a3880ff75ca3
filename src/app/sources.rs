use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::entity::{DueEntity, EntityKind, EntityStatus, Recurrence};
use crate::infra::db::Db;

/// Read-only view over the financial entities that can generate reminders.
/// The reconciliation engine is the only consumer; it never writes through
/// this adapter.
#[derive(Clone)]
pub struct EntitySources {
    db: Db,
}

impl EntitySources {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn outstanding_bills(&self, user_id: Uuid) -> Result<Vec<DueEntity>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, amount_cents, due_date, is_recurring, recurrence \
             FROM bills \
             WHERE user_id = ? AND status = 'outstanding'",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| row_to_due(row, EntityKind::Bill))
            .collect()
    }

    pub async fn outstanding_debts(&self, user_id: Uuid) -> Result<Vec<DueEntity>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, amount_cents, due_date, is_recurring, recurrence \
             FROM debts \
             WHERE user_id = ? AND status = 'outstanding'",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| row_to_due(row, EntityKind::Debt))
            .collect()
    }

    /// Goals still short of their target, viewed through the same due-window
    /// lens as bills and debts: the target date is the due date and the
    /// amount still to save is the quoted figure.
    pub async fn goals_needing_review(&self, user_id: Uuid) -> Result<Vec<DueEntity>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, target_cents, saved_cents, target_date \
             FROM goals \
             WHERE user_id = ? AND status = 'outstanding' AND saved_cents < target_cents",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            let target_cents: i64 = row.get("target_cents");
            let saved_cents: i64 = row.get("saved_cents");
            entities.push(DueEntity {
                id: row.get("id"),
                user_id: row.get("user_id"),
                kind: EntityKind::Goal,
                label: row.get("label"),
                amount_cents: target_cents - saved_cents,
                due_date: row.get("target_date"),
                is_recurring: false,
                recurrence: None,
                status: EntityStatus::Outstanding,
            });
        }

        Ok(entities)
    }
}

fn row_to_due(row: &SqliteRow, kind: EntityKind) -> Result<DueEntity> {
    let recurrence = match row.get::<Option<String>, _>("recurrence") {
        Some(value) => Some(
            Recurrence::from_db(&value).ok_or_else(|| anyhow!("unknown recurrence: {}", value))?,
        ),
        None => None,
    };

    Ok(DueEntity {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind,
        label: row.get("label"),
        amount_cents: row.get("amount_cents"),
        due_date: row.get("due_date"),
        is_recurring: row.get("is_recurring"),
        recurrence,
        status: EntityStatus::Outstanding,
    })
}
