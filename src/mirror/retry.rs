//! Linear retry schedule for the scraping loop.
//!
//! Backoff grows linearly with the attempt index and is uncapped: attempt 0
//! sleeps nothing, attempt `n` sleeps `n` delay units after failing. The
//! delay unit is a parameter so tests drive the full loop without real
//! sleeps.

use std::time::Duration;

/// Default number of plain scrape attempts before the proxy fallback.
pub const DEFAULT_PLAIN_ATTEMPTS: u32 = 10;

/// Default backoff delay unit (1 second).
const DEFAULT_DELAY_UNIT: Duration = Duration::from_secs(1);

/// Attempt budget and backoff pacing for the scrape loop.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    plain_attempts: u32,
    delay_unit: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            plain_attempts: DEFAULT_PLAIN_ATTEMPTS,
            delay_unit: DEFAULT_DELAY_UNIT,
        }
    }
}

impl RetrySchedule {
    /// Creates a schedule with an explicit budget and delay unit.
    ///
    /// `plain_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(plain_attempts: u32, delay_unit: Duration) -> Self {
        Self {
            plain_attempts: plain_attempts.max(1),
            delay_unit,
        }
    }

    /// Creates a schedule with a custom budget and the default delay unit.
    #[must_use]
    pub fn with_plain_attempts(plain_attempts: u32) -> Self {
        Self::new(plain_attempts, DEFAULT_DELAY_UNIT)
    }

    /// The number of plain attempts before the fallback.
    #[must_use]
    pub fn plain_attempts(&self) -> u32 {
        self.plain_attempts
    }

    /// Backoff delay after failed attempt `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_unit * attempt
    }
}
