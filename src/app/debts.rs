use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::debt::Debt;
use crate::domain::entity::{EntityStatus, Recurrence};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct DebtService {
    db: Db,
}

impl DebtService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        label: String,
        amount_cents: i64,
        balance_cents: i64,
        due_date: Date,
        recurrence: Option<Recurrence>,
        now: OffsetDateTime,
    ) -> Result<Debt> {
        let rows = sqlx::query(
            "INSERT INTO debts \
             (id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'outstanding', ?) \
             RETURNING id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(label)
        .bind(amount_cents)
        .bind(balance_cents)
        .bind(due_date)
        .bind(recurrence.is_some())
        .bind(recurrence.map(|r| r.as_db()))
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| anyhow!("debt insert returned no row"))?;
        row_to_debt(row)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Debt>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at \
             FROM debts \
             WHERE user_id = ? \
             ORDER BY due_date ASC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_debt).collect()
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        label: Option<String>,
        amount_cents: Option<i64>,
        due_date: Option<Date>,
    ) -> Result<Option<Debt>> {
        let rows = sqlx::query(
            "UPDATE debts \
             SET label = COALESCE(?, label), \
                 amount_cents = COALESCE(?, amount_cents), \
                 due_date = COALESCE(?, due_date) \
             WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(label)
        .bind(amount_cents)
        .bind(due_date)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_debt(row)?)),
            None => Ok(None),
        }
    }

    /// Record one payment of `amount_cents` (the scheduled payment when the
    /// caller omits it). The balance floors at zero and the debt settles
    /// there; a recurring debt with balance left rolls to the next due date.
    pub async fn pay(
        &self,
        id: Uuid,
        user_id: Uuid,
        amount_cents: Option<i64>,
    ) -> Result<Option<Debt>> {
        let Some(debt) = self.find(id, user_id).await? else {
            return Ok(None);
        };
        if debt.status == EntityStatus::Settled {
            return Ok(Some(debt));
        }

        let payment = amount_cents.unwrap_or(debt.amount_cents);
        let next_due = match debt.recurrence {
            Some(recurrence) => recurrence.advance(debt.due_date),
            None => debt.due_date,
        };

        // The balance arithmetic lives in the statement; balance_cents in the
        // SET expressions reads the pre-update value, so the settled check and
        // the new balance work from the same figure even when two payments
        // overlap.
        let rows = sqlx::query(
            "UPDATE debts \
             SET balance_cents = MAX(balance_cents - ?, 0), \
                 status = CASE WHEN balance_cents - ? <= 0 THEN 'settled' ELSE status END, \
                 due_date = CASE WHEN is_recurring AND balance_cents - ? > 0 THEN ? ELSE due_date END \
             WHERE id = ? AND user_id = ? AND status = 'outstanding' \
             RETURNING id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(payment)
        .bind(payment)
        .bind(payment)
        .bind(next_due)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_debt(row)?)),
            // Guard miss: settled or deleted after the read. Report the row
            // as it stands now.
            None => self.find(id, user_id).await,
        }
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<Debt>> {
        let row = sqlx::query(
            "SELECT id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at \
             FROM debts \
             WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_debt(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM debts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_debt(row: &SqliteRow) -> Result<Debt> {
    let status: String = row.get("status");
    let status =
        EntityStatus::from_db(&status).ok_or_else(|| anyhow!("unknown debt status: {}", status))?;
    let recurrence = match row.get::<Option<String>, _>("recurrence") {
        Some(value) => Some(
            Recurrence::from_db(&value).ok_or_else(|| anyhow!("unknown recurrence: {}", value))?,
        ),
        None => None,
    };

    Ok(Debt {
        id: row.get("id"),
        user_id: row.get("user_id"),
        label: row.get("label"),
        amount_cents: row.get("amount_cents"),
        balance_cents: row.get("balance_cents"),
        due_date: row.get("due_date"),
        is_recurring: row.get("is_recurring"),
        recurrence,
        status,
        created_at: row.get("created_at"),
    })
}
