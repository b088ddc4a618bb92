//! Retention engine: storage-limit enforcement and age-based auto-clear.
//!
//! Both passes are read-then-delete and idempotent. Concurrent saves for the
//! same user may race with them; the next pass converges.

pub mod scheduler;

use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::{AUTO_CLEAR_KEY, RetentionValue, STORAGE_LIMIT_KEY};
use chatkeep_types::user::UserId;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::chat::repository::ChatRepository;
use crate::repository::settings::SettingsRepository;
use crate::service::clock::SharedClock;

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Outcome of one storage-limit pass for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnforcementReport {
    /// The limit applied, or `None` when the user has no usable limit.
    pub limit: Option<i64>,
    pub deleted: u64,
}

/// Outcome of one auto-clear sweep across all users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Users whose chats were checked against their cutoff.
    pub processed: u32,
    /// Users with a disabled or unparseable `autoClear` value.
    pub skipped: u32,
    /// Users whose deletion failed.
    pub failed: u32,
    pub chats_deleted: u64,
}

pub struct RetentionEngine<C: ChatRepository, S: SettingsRepository> {
    chats: C,
    settings: S,
    clock: SharedClock,
    sweep_lock: Mutex<()>,
}

impl<C: ChatRepository, S: SettingsRepository> RetentionEngine<C, S> {
    pub fn new(chats: C, settings: S, clock: SharedClock) -> Self {
        Self {
            chats,
            settings,
            clock,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Keep only the `storageLimit` most recent chats of `owner`.
    ///
    /// An absent, non-numeric, or non-positive limit means unlimited.
    pub async fn enforce_storage_limit(
        &self,
        owner: &UserId,
    ) -> Result<EnforcementReport, RepositoryError> {
        let Some(raw) = self.settings.get(owner, STORAGE_LIMIT_KEY).await? else {
            return Ok(EnforcementReport::default());
        };
        let limit = match RetentionValue::parse(&raw) {
            RetentionValue::Enabled(n) => n,
            RetentionValue::Disabled => return Ok(EnforcementReport::default()),
            RetentionValue::Invalid(value) => {
                tracing::warn!(user_id = %owner, %value, "ignoring non-numeric storageLimit");
                return Ok(EnforcementReport::default());
            }
        };

        let ids = self.chats.list_ids_newest_first(owner).await?;
        let keep = usize::try_from(limit).unwrap_or(usize::MAX);
        if ids.len() <= keep {
            return Ok(EnforcementReport {
                limit: Some(limit),
                deleted: 0,
            });
        }

        let deleted = self.chats.delete_many(owner, &ids[keep..]).await?;
        tracing::info!(user_id = %owner, limit, deleted, "storage limit enforced");
        Ok(EnforcementReport {
            limit: Some(limit),
            deleted,
        })
    }

    /// Delete, for every user with a positive `autoClear`, the chats older
    /// than that many days.
    ///
    /// Only a failure to enumerate the settings fails the sweep; per-user
    /// problems are logged and counted. Overlapping calls are serialized.
    pub async fn sweep_auto_clear(&self) -> Result<SweepReport, RepositoryError> {
        let _guard = self.sweep_lock.lock().await;
        self.sweep_locked().await
    }

    /// Like [`sweep_auto_clear`](Self::sweep_auto_clear), but returns `None`
    /// instead of waiting when a sweep is already running.
    pub async fn try_sweep_auto_clear(&self) -> Option<Result<SweepReport, RepositoryError>> {
        let _guard = self.sweep_lock.try_lock().ok()?;
        Some(self.sweep_locked().await)
    }

    async fn sweep_locked(&self) -> Result<SweepReport, RepositoryError> {
        let entries = self.settings.list_by_key(AUTO_CLEAR_KEY).await?;
        let now = self.clock.now_millis();
        let mut report = SweepReport::default();

        for (user_id, raw) in entries {
            let days = match RetentionValue::parse(&raw) {
                RetentionValue::Enabled(days) => days,
                RetentionValue::Disabled => {
                    report.skipped += 1;
                    continue;
                }
                RetentionValue::Invalid(value) => {
                    tracing::warn!(%user_id, %value, "skipping non-numeric autoClear");
                    report.skipped += 1;
                    continue;
                }
            };

            let cutoff = cutoff_millis(now, days);
            match self.chats.delete_older_than(&user_id, cutoff).await {
                Ok(deleted) => {
                    report.processed += 1;
                    report.chats_deleted += deleted;
                    if deleted > 0 {
                        tracing::debug!(%user_id, days, deleted, "auto-cleared chats");
                    }
                }
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "auto-clear failed for user");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            deleted = report.chats_deleted,
            "auto-clear sweep finished"
        );
        Ok(report)
    }
}

/// `now - days`, in epoch milliseconds, clamped instead of overflowing.
pub fn cutoff_millis(now_ms: i64, days: i64) -> i64 {
    now_ms.saturating_sub(days.saturating_mul(MS_PER_DAY))
}
