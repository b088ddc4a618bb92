//! Clock abstraction so services can be tested against a controlled time source.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch, the unit of chat and message timestamps.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Shared handle to a clock, passed to every service that needs time.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
