//! Recurring auto-clear sweep on top of `tokio-cron-scheduler`.
//!
//! Provides:
//! - Human-readable schedule normalization ("hourly", "every 5 minutes" -> cron)
//! - A single sweep job with start/stop lifecycle
//! - Tick skipping while a previous sweep is still running

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::chat::repository::ChatRepository;
use crate::repository::settings::SettingsRepository;

use super::RetentionEngine;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Failed to create, start, or stop the underlying job scheduler.
    #[error("scheduler error: {0}")]
    JobError(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("sweep is already scheduled")]
    AlreadyRunning,
}

// ---------------------------------------------------------------------------
// Human-readable schedule normalization
// ---------------------------------------------------------------------------

/// Normalize a schedule string to a 6-field cron expression.
///
/// Supported forms (case-insensitive):
/// - 5-field cron            -> seconds field "0" prepended
/// - 6-field cron            -> unchanged
/// - "every N seconds"       -> "*/N * * * * *"
/// - "every N minutes"       -> "0 */N * * * *"
/// - "every N hours"         -> "0 0 */N * * *"
/// - "every minute", "every hour", "every day", "hourly", "daily"
/// - "every day at HH:MM"    -> "0 MM HH * * *"
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let trimmed = input.trim();

    let fields = trimmed.split_whitespace().count();
    if fields == 5 {
        return Ok(format!("0 {trimmed}"));
    }
    if fields == 6 {
        return Ok(trimmed.to_string());
    }

    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "every minute" | "minutely" => return Ok("0 * * * * *".to_string()),
        "every hour" | "hourly" => return Ok("0 0 * * * *".to_string()),
        "every day" | "daily" => return Ok("0 0 0 * * *".to_string()),
        _ => {}
    }

    let invalid = || SchedulerError::InvalidSchedule(input.to_string());

    if let Some(rest) = lower.strip_prefix("every ") {
        if let Some(at) = rest.strip_prefix("day at ") {
            let (hour, minute) = at.split_once(':').ok_or_else(invalid)?;
            let hour: u32 = hour.trim().parse().map_err(|_| invalid())?;
            let minute: u32 = minute.trim().parse().map_err(|_| invalid())?;
            if hour >= 24 || minute >= 60 {
                return Err(invalid());
            }
            return Ok(format!("0 {minute} {hour} * * *"));
        }

        let words: Vec<&str> = rest.split_whitespace().collect();
        if let [count, unit] = words.as_slice() {
            let n: u32 = count.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(SchedulerError::InvalidSchedule(
                    "interval must be > 0".to_string(),
                ));
            }
            return match unit.trim_end_matches('s') {
                "second" => Ok(format!("*/{n} * * * * *")),
                "minute" => Ok(format!("0 */{n} * * * *")),
                "hour" => Ok(format!("0 0 */{n} * * *")),
                _ => Err(invalid()),
            };
        }
    }

    Err(SchedulerError::InvalidSchedule(format!(
        "unrecognized schedule format: '{trimmed}'"
    )))
}

// ---------------------------------------------------------------------------
// SweepScheduler
// ---------------------------------------------------------------------------

/// Work run on every tick.
pub type SweepCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Tick callback running one auto-clear pass, or skipping the tick if the
/// previous pass has not finished.
pub fn sweep_callback<C, S>(engine: Arc<RetentionEngine<C, S>>) -> SweepCallback
where
    C: ChatRepository + 'static,
    S: SettingsRepository + 'static,
{
    Arc::new(move || {
        let engine = engine.clone();
        async move {
            match engine.try_sweep_auto_clear().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::error!(error = %e, "auto-clear sweep failed"),
                None => tracing::warn!("previous auto-clear sweep still running, tick skipped"),
            }
        }
        .boxed()
    })
}

/// Runs a sweep callback on a cron schedule until stopped.
pub struct SweepScheduler {
    inner: RwLock<Option<JobScheduler>>,
}

impl SweepScheduler {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Start the scheduler with a single job firing on `schedule`.
    pub async fn start(&self, schedule: &str, callback: SweepCallback) -> Result<(), SchedulerError> {
        let cron_expr = normalize_schedule(schedule)?;

        let mut inner = self.inner.write().await;
        if inner.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _lock| {
            let cb = callback.clone();
            Box::pin(async move {
                tracing::debug!("auto-clear tick fired");
                cb().await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;
        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        *inner = Some(scheduler);
        tracing::info!(schedule, cron = %cron_expr, "auto-clear scheduler started");
        Ok(())
    }

    /// Stop the scheduler. A no-op if it was never started.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut inner = self.inner.write().await;
        if let Some(mut scheduler) = inner.take() {
            scheduler
                .shutdown()
                .await
                .map_err(|e| SchedulerError::JobError(e.to_string()))?;
            tracing::info!("auto-clear scheduler stopped");
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

impl Default for SweepScheduler {
    fn default() -> Self {
        Self::new()
    }
}
