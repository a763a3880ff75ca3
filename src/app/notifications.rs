use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::due::Urgency;
use crate::domain::entity::EntityKind;
use crate::domain::notification::{Notification, NotificationDraft};
use crate::infra::db::Db;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Unread,
}

/// Outcome of a single-record lifecycle mutation. Handlers map NotFound and
/// Forbidden to 404/403; store I/O errors travel separately as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Applied,
    NotFound,
    Forbidden,
}

#[derive(Clone)]
pub struct NotificationService {
    db: Db,
}

impl NotificationService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a notification for the draft's dedup slot, or leave the
    /// existing record untouched. The unique index on (user_id, kind,
    /// related_id, due_date) makes this safe against concurrent passes for
    /// the same user: one inserts, the other conflicts, both observe one
    /// row. Returns None when the slot was already occupied, including by a
    /// dismissed tombstone.
    pub async fn upsert_if_absent(
        &self,
        draft: &NotificationDraft,
        now: OffsetDateTime,
    ) -> Result<Option<Notification>> {
        // fetch_all drains the cursor so the insert is committed before this
        // returns; SQLite finishes a RETURNING statement only once every row
        // has been stepped, and the next list query runs on another
        // connection.
        let rows = sqlx::query(
            "INSERT INTO notifications \
             (id, user_id, kind, related_id, due_date, urgency, title, message, is_read, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?) \
             ON CONFLICT (user_id, kind, related_id, due_date) DO NOTHING \
             RETURNING id, user_id, kind, related_id, due_date, urgency, title, message, is_read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(draft.user_id)
        .bind(draft.kind.as_db())
        .bind(draft.related_id)
        .bind(draft.due_date)
        .bind(draft.urgency.as_db())
        .bind(&draft.title)
        .bind(&draft.message)
        .bind(now)
        .fetch_all(self.db.pool())
        .await?;

        match rows.first() {
            Some(row) => Ok(Some(row_to_notification(row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, user_id: Uuid, filter: ListFilter) -> Result<Vec<Notification>> {
        let rows = match filter {
            ListFilter::All => {
                sqlx::query(
                    "SELECT id, user_id, kind, related_id, due_date, urgency, title, message, is_read, created_at \
                     FROM notifications \
                     WHERE user_id = ? AND dismissed_at IS NULL \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(self.db.pool())
                .await?
            }
            ListFilter::Unread => {
                sqlx::query(
                    "SELECT id, user_id, kind, related_id, due_date, urgency, title, message, is_read, created_at \
                     FROM notifications \
                     WHERE user_id = ? AND dismissed_at IS NULL AND is_read = 0 \
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            notifications.push(row_to_notification(&row)?);
        }

        Ok(notifications)
    }

    /// false -> true only; marking an already-read record succeeds without
    /// changing anything. Reconciliation never calls this.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<LifecycleOutcome> {
        match self.access(id, user_id).await? {
            LifecycleOutcome::Applied => {}
            other => return Ok(other),
        }

        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 \
             WHERE id = ? AND user_id = ? AND dismissed_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        // The row can be dismissed or cleared between the check and the
        // write; a guard miss means there is nothing left to flip.
        if result.rows_affected() == 0 {
            return Ok(LifecycleOutcome::NotFound);
        }

        Ok(LifecycleOutcome::Applied)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 \
             WHERE user_id = ? AND is_read = 0 AND dismissed_at IS NULL",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    /// Dismiss one notification. The row stays behind as a tombstone so the
    /// dedup slot remains occupied for the rest of the cycle; reconciliation
    /// will not resurrect it.
    pub async fn delete(
        &self,
        id: Uuid,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<LifecycleOutcome> {
        match self.access(id, user_id).await? {
            LifecycleOutcome::Applied => {}
            other => return Ok(other),
        }

        let result = sqlx::query(
            "UPDATE notifications SET dismissed_at = ? \
             WHERE id = ? AND user_id = ? AND dismissed_at IS NULL",
        )
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(LifecycleOutcome::NotFound);
        }

        Ok(LifecycleOutcome::Applied)
    }

    /// Resolve whether `user_id` may mutate record `id`. Applied means the
    /// record exists, is visible, and belongs to the caller. Dismissed
    /// records are invisible to clients and report NotFound; another user's
    /// record reports Forbidden before any dismissal check.
    async fn access(&self, id: Uuid, user_id: Uuid) -> Result<LifecycleOutcome> {
        let row = sqlx::query("SELECT user_id, dismissed_at FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(LifecycleOutcome::NotFound);
        };

        let owner: Uuid = row.get("user_id");
        if owner != user_id {
            return Ok(LifecycleOutcome::Forbidden);
        }

        let dismissed: Option<OffsetDateTime> = row.get("dismissed_at");
        if dismissed.is_some() {
            return Ok(LifecycleOutcome::NotFound);
        }

        Ok(LifecycleOutcome::Applied)
    }

    /// Remove every record for the user, tombstones included. Unlike a
    /// single dismiss this frees the dedup slots: the next reconciliation
    /// pass repopulates whatever is currently eligible.
    pub async fn clear_all(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_notification(row: &SqliteRow) -> Result<Notification> {
    let kind: String = row.get("kind");
    let kind =
        EntityKind::from_db(&kind).ok_or_else(|| anyhow!("unknown notification kind: {}", kind))?;
    let urgency: String = row.get("urgency");
    let urgency =
        Urgency::from_db(&urgency).ok_or_else(|| anyhow!("unknown urgency: {}", urgency))?;

    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind,
        related_id: row.get("related_id"),
        due_date: row.get("due_date"),
        urgency,
        title: row.get("title"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}
