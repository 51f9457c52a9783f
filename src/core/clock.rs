//! Time source used for cache staleness checks.
//!
//! Cache entries are timestamped by file modification time, so expiry is a
//! comparison between that mtime and [`Clock::now`]. Tests swap in a
//! [`FixedClock`] to move "now" forward without touching the filesystem.

use chrono::{DateTime, Local};
use std::time::{Duration, SystemTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Midnight at the start of the local calendar day containing `now()`
    fn start_of_today(&self) -> SystemTime {
        let now: DateTime<Local> = self.now().into();
        now.date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
            .map(SystemTime::from)
            // a DST gap swallowing midnight: fall back to "now", which keeps
            // today's entries visible
            .unwrap_or_else(|| self.now())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl FixedClock {
    /// The real current time shifted by `offset` into the future
    pub fn ahead_by(offset: Duration) -> Self {
        Self(SystemTime::now() + offset)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_today_is_not_after_now() {
        let clock = SystemClock;
        assert!(clock.start_of_today() <= clock.now());
    }

    #[test]
    fn test_start_of_today_within_a_day() {
        let clock = FixedClock::ahead_by(Duration::from_secs(3 * 86_400));
        let elapsed = clock
            .now()
            .duration_since(clock.start_of_today())
            .unwrap_or_default();
        // 25h allows for a DST transition day
        assert!(elapsed <= Duration::from_secs(25 * 3600));
    }
}
