use std::time::Duration;

use crate::Result;
use crate::error::Error;

/// Interval between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the poll loop does when a job reports `completed` with `expired: true`.
///
/// An expired export can never be downloaded. `KeepPolling` matches the historical
/// behaviour of the API wrappers and runs until the timeout; `Fail` stops at once.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExpiredPolicy {
    #[default]
    KeepPolling,
    Fail,
}

/// Settings for [`JobClient::create_job_and_wait`](crate::job::JobClient::create_job_and_wait).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub on_expired: ExpiredPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            on_expired: ExpiredPolicy::default(),
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub const fn with_on_expired(mut self, on_expired: ExpiredPolicy) -> Self {
        self.on_expired = on_expired;
        self
    }

    pub(crate) fn validate(self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::validation("poll interval must be non-zero"));
        }
        Ok(())
    }
}
