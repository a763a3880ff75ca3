use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::bill::Bill;
use crate::domain::entity::{EntityStatus, Recurrence};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct BillService {
    db: Db,
}

impl BillService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        label: String,
        amount_cents: i64,
        due_date: Date,
        recurrence: Option<Recurrence>,
        now: OffsetDateTime,
    ) -> Result<Bill> {
        let rows = sqlx::query(
            "INSERT INTO bills \
             (id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 'outstanding', ?) \
             RETURNING id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(label)
        .bind(amount_cents)
        .bind(due_date)
        .bind(recurrence.is_some())
        .bind(recurrence.map(|r| r.as_db()))
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| anyhow!("bill insert returned no row"))?;
        row_to_bill(row)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            "SELECT id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at \
             FROM bills \
             WHERE user_id = ? \
             ORDER BY due_date ASC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_bill).collect()
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        label: Option<String>,
        amount_cents: Option<i64>,
        due_date: Option<Date>,
    ) -> Result<Option<Bill>> {
        let rows = sqlx::query(
            "UPDATE bills \
             SET label = COALESCE(?, label), \
                 amount_cents = COALESCE(?, amount_cents), \
                 due_date = COALESCE(?, due_date) \
             WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(label)
        .bind(amount_cents)
        .bind(due_date)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_bill(row)?)),
            None => Ok(None),
        }
    }

    /// Record a payment. A recurring bill rolls forward to its next due
    /// date and stays outstanding; a one-off settles. Paying an already
    /// settled bill is a no-op.
    pub async fn pay(&self, id: Uuid, user_id: Uuid) -> Result<Option<Bill>> {
        let Some(bill) = self.find(id, user_id).await? else {
            return Ok(None);
        };
        if bill.status == EntityStatus::Settled {
            return Ok(Some(bill));
        }

        let next_due = match bill.recurrence {
            Some(recurrence) => recurrence.advance(bill.due_date),
            None => bill.due_date,
        };

        // One guarded statement: the row's own is_recurring flag picks the
        // branch and the status guard keeps the write off a row another
        // request has already settled or removed.
        let rows = sqlx::query(
            "UPDATE bills \
             SET due_date = CASE WHEN is_recurring THEN ? ELSE due_date END, \
                 status = CASE WHEN is_recurring THEN status ELSE 'settled' END \
             WHERE id = ? AND user_id = ? AND status = 'outstanding' \
             RETURNING id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at",
        )
        .bind(next_due)
        .bind(id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_bill(row)?)),
            // Guard miss: settled or deleted after the read. Report the row
            // as it stands now.
            None => self.find(id, user_id).await,
        }
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<Bill>> {
        let row = sqlx::query(
            "SELECT id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at \
             FROM bills \
             WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_bill(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_bill(row: &SqliteRow) -> Result<Bill> {
    let status: String = row.get("status");
    let status =
        EntityStatus::from_db(&status).ok_or_else(|| anyhow!("unknown bill status: {}", status))?;
    let recurrence = match row.get::<Option<String>, _>("recurrence") {
        Some(value) => Some(
            Recurrence::from_db(&value).ok_or_else(|| anyhow!("unknown recurrence: {}", value))?,
        ),
        None => None,
    };

    Ok(Bill {
        id: row.get("id"),
        user_id: row.get("user_id"),
        label: row.get("label"),
        amount_cents: row.get("amount_cents"),
        due_date: row.get("due_date"),
        is_recurring: row.get("is_recurring"),
        recurrence,
        status,
        created_at: row.get("created_at"),
    })
}
