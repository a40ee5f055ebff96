//! Clock abstraction so services and tests agree on what "now" means.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Reads the operating system clock.
    #[default]
    System,
    /// Always returns the wrapped instant.
    Fixed(SystemTime),
}

impl Clock {
    /// Returns a clock fixed at the given instant.
    pub fn fixed(at: SystemTime) -> Self {
        Self::Fixed(at)
    }

    /// Current time according to the clock.
    pub fn now(&self) -> SystemTime {
        match self {
            Clock::System => SystemTime::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: u64 = 1_700_000_000;

/// Returns a [`Clock`] fixed at [`FIXED_TEST_TIMESTAMP`].
pub fn fixed_clock() -> Clock {
    Clock::fixed(UNIX_EPOCH + Duration::from_secs(FIXED_TEST_TIMESTAMP))
}
