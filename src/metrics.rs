//! Per-event timing metrics
//!
//! Every derived value is clamped at zero, so irregular timestamps (a release
//! that was never matched, out-of-order input) produce zeros rather than
//! negative durations.

use crate::attempt::{Attempt, KeyEvent};

/// `max(x, 0)`
pub fn clamp_nonneg(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// Timing metrics for one event within its attempt
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventMetrics {
    /// Press time relative to the attempt start
    pub press_rel_ms: f64,
    /// Release time relative to the attempt start
    pub release_rel_ms: f64,
    /// Release minus press
    pub dwell_ms: f64,
    /// Previous release to this press
    pub flight_ud_ms: f64,
    /// Previous press to this press
    pub flight_dd_ms: f64,
}

impl EventMetrics {
    /// Compute metrics for `event`, given the event before it in the attempt
    pub fn derive(event: &KeyEvent, previous: Option<&KeyEvent>, start_time_ms: f64) -> Self {
        let (flight_ud_ms, flight_dd_ms) = match previous {
            Some(prev) => (
                clamp_nonneg(event.press_time_ms - prev.release_time_ms),
                clamp_nonneg(event.press_time_ms - prev.press_time_ms),
            ),
            None => (0.0, 0.0),
        };

        Self {
            press_rel_ms: clamp_nonneg(event.press_time_ms - start_time_ms),
            release_rel_ms: clamp_nonneg(event.release_time_ms - start_time_ms),
            dwell_ms: clamp_nonneg(event.release_time_ms - event.press_time_ms),
            flight_ud_ms,
            flight_dd_ms,
        }
    }
}

/// One output row: an event, its 1-based position and its metrics
#[derive(Debug, Clone, Copy)]
pub struct EventRow<'a> {
    pub event_idx: usize,
    pub event: &'a KeyEvent,
    pub metrics: EventMetrics,
}

/// Rows for an attempt in key-down order.
///
/// Empty slots are skipped but still occupy their position, so `event_idx`
/// always matches the event's place in the attempt.
pub fn derive_rows(attempt: &Attempt) -> Vec<EventRow<'_>> {
    let events = attempt.events();
    events
        .iter()
        .enumerate()
        .filter(|(_, event)| !event.is_empty_slot())
        .map(|(i, event)| {
            let previous = i.checked_sub(1).map(|p| &events[p]);
            EventRow {
                event_idx: i + 1,
                event,
                metrics: EventMetrics::derive(event, previous, attempt.start_time_ms()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyCode;

    fn event(code: u16, press: f64, release: f64) -> KeyEvent {
        let mut e = KeyEvent::pressed(KeyCode(code), None, "K", press);
        e.release_time_ms = release;
        e
    }

    #[test]
    fn clamp_nonneg_floors_at_zero() {
        assert_eq!(clamp_nonneg(-3.5), 0.0);
        assert_eq!(clamp_nonneg(0.0), 0.0);
        assert_eq!(clamp_nonneg(2.25), 2.25);
    }

    #[test]
    fn first_event_has_no_flight() {
        let e = event(30, 100.0, 150.0);
        let m = EventMetrics::derive(&e, None, 100.0);
        assert_eq!(m.press_rel_ms, 0.0);
        assert_eq!(m.release_rel_ms, 50.0);
        assert_eq!(m.dwell_ms, 50.0);
        assert_eq!(m.flight_ud_ms, 0.0);
        assert_eq!(m.flight_dd_ms, 0.0);
    }

    #[test]
    fn flights_measure_from_previous_event() {
        let prev = event(30, 100.0, 150.0);
        let cur = event(31, 160.0, 210.0);
        let m = EventMetrics::derive(&cur, Some(&prev), 100.0);
        assert_eq!(m.press_rel_ms, 60.0);
        assert_eq!(m.flight_ud_ms, 10.0);
        assert_eq!(m.flight_dd_ms, 60.0);
    }

    #[test]
    fn out_of_order_timestamps_clamp_to_zero() {
        let prev = event(30, 500.0, 900.0);
        let cur = event(31, 300.0, 200.0);
        let m = EventMetrics::derive(&cur, Some(&prev), 400.0);
        assert_eq!(m.press_rel_ms, 0.0);
        assert_eq!(m.release_rel_ms, 0.0);
        assert_eq!(m.dwell_ms, 0.0);
        assert_eq!(m.flight_ud_ms, 0.0);
        assert_eq!(m.flight_dd_ms, 0.0);
    }

    #[test]
    fn rows_skip_empty_slots_but_keep_positions() {
        let attempt = Attempt::new(
            vec![event(30, 10.0, 20.0), event(0, 0.0, 0.0), event(31, 30.0, 40.0)],
            10.0,
            None,
        );
        let rows = derive_rows(&attempt);
        let idx: Vec<_> = rows.iter().map(|r| r.event_idx).collect();
        assert_eq!(idx, vec![1, 3]);
        // Flight is still measured against the slot directly before
        assert_eq!(rows[1].metrics.flight_dd_ms, 30.0);
    }
}
