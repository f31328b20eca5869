//! Seconds-of-day arithmetic and the injectable clock

use chrono::Timelike;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of seconds in one day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Wall-clock capability injected into the scheduler
///
/// Interval matching works on local seconds-of-day, so the clock reports
/// only that, not a full timestamp.
pub trait Clock: Send + Sync {
    /// Current local time as seconds since midnight (0..86399)
    fn now_seconds_of_day(&self) -> u32;
}

/// Clock backed by the system's local time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds_of_day(&self) -> u32 {
        chrono::Local::now().num_seconds_from_midnight()
    }
}

/// Fixed clock for tests; can be repositioned between passes
pub struct FixedClock {
    seconds: AtomicU32,
}

impl FixedClock {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds: AtomicU32::new(seconds % SECONDS_PER_DAY),
        }
    }

    pub fn set(&self, seconds: u32) {
        self.seconds
            .store(seconds % SECONDS_PER_DAY, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_seconds_of_day(&self) -> u32 {
        self.seconds.load(Ordering::SeqCst)
    }
}

/// Advance a seconds-of-day value, wrapping past midnight
pub fn wrapping_add_seconds(seconds: u32, delta: u32) -> u32 {
    (seconds + delta) % SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_in_day_range() {
        let seconds = SystemClock.now_seconds_of_day();
        assert!(seconds < SECONDS_PER_DAY);
    }

    #[test]
    fn test_fixed_clock_reports_and_repositions() {
        let clock = FixedClock::new(3600);
        assert_eq!(clock.now_seconds_of_day(), 3600);

        clock.set(86_399);
        assert_eq!(clock.now_seconds_of_day(), 86_399);

        // Out-of-range values wrap into the day
        clock.set(SECONDS_PER_DAY + 5);
        assert_eq!(clock.now_seconds_of_day(), 5);
    }

    #[test]
    fn test_wrapping_add_seconds() {
        assert_eq!(wrapping_add_seconds(0, 100), 100);
        assert_eq!(wrapping_add_seconds(86_300, 200), 100);
        assert_eq!(wrapping_add_seconds(86_399, 1), 0);
    }
}
