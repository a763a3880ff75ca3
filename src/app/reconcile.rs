use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::notifications::NotificationService;
use crate::app::sources::EntitySources;
use crate::domain::due;
use crate::domain::entity::DueEntity;
use crate::infra::db::Db;

/// Brings the notification store into agreement with the current
/// classification of the user's outstanding entities. Runs synchronously at
/// the start of every list request; there is no background scheduler.
#[derive(Clone)]
pub struct ReconcileService {
    sources: EntitySources,
    notifications: NotificationService,
}

/// What one pass did. Nothing in here is an error: a degraded source or a
/// failed insert is logged and skipped so the read can still serve whatever
/// already exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub existing: usize,
    pub failed_sources: usize,
    pub failed_inserts: usize,
}

impl ReconcileService {
    pub fn new(db: Db) -> Self {
        Self {
            sources: EntitySources::new(db.clone()),
            notifications: NotificationService::new(db),
        }
    }

    /// One idempotent pass for one user. Repeating it within the same
    /// due-cycle never creates duplicates and never touches is_read; a pass
    /// cancelled partway is completed by the next read.
    pub async fn run(&self, user_id: Uuid, now: OffsetDateTime) -> ReconcileSummary {
        let today = now.date();

        // The three source reads are independent; load them concurrently
        // and reconcile whichever succeed.
        let (bills, debts, goals) = tokio::join!(
            self.sources.outstanding_bills(user_id),
            self.sources.outstanding_debts(user_id),
            self.sources.goals_needing_review(user_id),
        );

        let mut summary = ReconcileSummary::default();
        let mut entities: Vec<DueEntity> = Vec::new();
        for (source, result) in [("bills", bills), ("debts", debts), ("goals", goals)] {
            match result {
                Ok(batch) => entities.extend(batch),
                Err(err) => {
                    summary.failed_sources += 1;
                    warn!(
                        error = ?err,
                        user_id = %user_id,
                        source,
                        "entity source unavailable, reconciling the rest"
                    );
                }
            }
        }

        for entity in &entities {
            let Some(draft) = due::classify(entity, today) else {
                continue;
            };

            match self.notifications.upsert_if_absent(&draft, now).await {
                Ok(Some(_)) => summary.inserted += 1,
                Ok(None) => summary.existing += 1,
                Err(err) => {
                    summary.failed_inserts += 1;
                    warn!(
                        error = ?err,
                        user_id = %user_id,
                        related_id = %entity.id,
                        "failed to materialize notification"
                    );
                }
            }
        }

        debug!(
            user_id = %user_id,
            inserted = summary.inserted,
            existing = summary.existing,
            failed_sources = summary.failed_sources,
            failed_inserts = summary.failed_inserts,
            "reconciliation pass complete"
        );

        summary
    }
}
