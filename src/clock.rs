//! Session clock
//!
//! Every timestamp handled by the recorder is a floating point millisecond
//! offset from the moment the clock was created. The clock also remembers the
//! calendar time at that zero point so attempt start times can be reported in
//! local wall-clock time without a second, unsynchronised time source.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::time::Instant;

/// Monotonic millisecond clock zeroed at creation
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    zero: Instant,
    zero_wall: DateTime<Local>,
}

impl Clock {
    /// Start a clock at the current instant
    pub fn start() -> Self {
        Self {
            zero: Instant::now(),
            zero_wall: Local::now(),
        }
    }

    /// Start a clock whose zero point corresponds to the given wall-clock time.
    ///
    /// Useful for tests that need deterministic attempt start times.
    pub fn anchored_at(zero_wall: DateTime<Local>) -> Self {
        Self {
            zero: Instant::now(),
            zero_wall,
        }
    }

    /// Milliseconds elapsed since the clock was started
    pub fn now_ms(&self) -> f64 {
        self.zero.elapsed().as_secs_f64() * 1000.0
    }

    /// Milliseconds between the clock's zero point and `instant`.
    ///
    /// Instants taken before the zero point map to `0.0`.
    pub fn ms_at(&self, instant: Instant) -> f64 {
        instant
            .checked_duration_since(self.zero)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    /// Wall-clock time corresponding to a clock reading.
    ///
    /// `None` when the reading falls outside the calendar range chrono can
    /// represent.
    pub fn wall_at(&self, ms: f64) -> Option<DateTime<Local>> {
        let micros = (ms.max(0.0) * 1000.0).round() as i64;
        self.zero_wall.checked_add_signed(ChronoDuration::microseconds(micros))
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn now_ms_is_monotonic() {
        let clock = Clock::start();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn ms_at_measures_from_zero() {
        let clock = Clock::start();
        let later = clock.zero + Duration::from_millis(250);
        assert!((clock.ms_at(later) - 250.0).abs() < 1e-6);
    }

    #[test]
    fn wall_at_offsets_from_anchor() {
        let anchor = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let clock = Clock::anchored_at(anchor);
        let wall = clock.wall_at(61_500.0).unwrap();
        assert_eq!(wall.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-01 09:31:01");
    }

    #[test]
    fn wall_at_clamps_negative_offsets() {
        let anchor = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let clock = Clock::anchored_at(anchor);
        assert_eq!(clock.wall_at(-10.0), Some(anchor));
    }

    #[test]
    fn wall_at_out_of_range_is_none() {
        let clock = Clock::start();
        assert_eq!(clock.wall_at(1.0e19), None);
        assert_eq!(clock.wall_at(f64::INFINITY), None);
    }
}
