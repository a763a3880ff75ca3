use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entity::EntityStatus;
use crate::domain::goal::Goal;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct GoalService {
    db: Db,
}

impl GoalService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        label: String,
        target_cents: i64,
        target_date: Date,
        now: OffsetDateTime,
    ) -> Result<Goal> {
        let rows = sqlx::query(
            "INSERT INTO goals \
             (id, user_id, label, target_cents, saved_cents, target_date, status, created_at) \
             VALUES (?, ?, ?, ?, 0, ?, 'outstanding', ?) \
             RETURNING id, user_id, label, target_cents, saved_cents, target_date, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(label)
        .bind(target_cents)
        .bind(target_date)
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| anyhow!("goal insert returned no row"))?;
        row_to_goal(row)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, target_cents, saved_cents, target_date, status, created_at \
             FROM goals \
             WHERE user_id = ? \
             ORDER BY target_date ASC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_goal).collect()
    }

    /// Patch label, target, or deadline. Status is recomputed in the same
    /// statement so raising the target can reopen a goal that had reached it.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        label: Option<String>,
        target_cents: Option<i64>,
        target_date: Option<Date>,
    ) -> Result<Option<Goal>> {
        // COALESCE in the status branch reads the pre-update target, so the
        // comparison sees the effective target whether or not one was sent.
        let rows = sqlx::query(
            "UPDATE goals \
             SET label = COALESCE(?, label), \
                 target_cents = COALESCE(?, target_cents), \
                 target_date = COALESCE(?, target_date), \
                 status = CASE WHEN saved_cents >= COALESCE(?, target_cents) \
                      THEN 'settled' ELSE 'outstanding' END \
             WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, label, target_cents, saved_cents, target_date, status, created_at",
        )
        .bind(label)
        .bind(target_cents)
        .bind(target_date)
        .bind(target_cents)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_goal(row)?)),
            None => Ok(None),
        }
    }

    /// Add a contribution; the goal settles once saved reaches target.
    pub async fn contribute(
        &self,
        id: Uuid,
        user_id: Uuid,
        amount_cents: i64,
    ) -> Result<Option<Goal>> {
        let rows = sqlx::query(
            "UPDATE goals \
             SET saved_cents = saved_cents + ?, \
                 status = CASE WHEN saved_cents + ? >= target_cents THEN 'settled' ELSE status END \
             WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, label, target_cents, saved_cents, target_date, status, created_at",
        )
        .bind(amount_cents)
        .bind(amount_cents)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_goal(row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_goal(row: &SqliteRow) -> Result<Goal> {
    let status: String = row.get("status");
    let status =
        EntityStatus::from_db(&status).ok_or_else(|| anyhow!("unknown goal status: {}", status))?;

    Ok(Goal {
        id: row.get("id"),
        user_id: row.get("user_id"),
        label: row.get("label"),
        target_cents: row.get("target_cents"),
        saved_cents: row.get("saved_cents"),
        target_date: row.get("target_date"),
        status,
        created_at: row.get("created_at"),
    })
}
