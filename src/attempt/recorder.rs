//! Attempt recorder
//!
//! Turns key-down/key-up signals into a bounded, ordered sequence of
//! [`KeyEvent`]s for the attempt in progress.

use super::{Attempt, KeyEvent};
use crate::clock::Clock;
use crate::keyboard::KeyCode;
use chrono::{DateTime, Local};

/// Result of feeding a key-down to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDown {
    /// Appended at this 0-based position
    Recorded(usize),
    /// Buffer already full, event lost
    Dropped,
}

/// Result of feeding a key-up to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUp {
    /// Closed the open event at this 0-based position
    Released(usize),
    /// No open event for this key, nothing changed
    Unmatched,
}

/// Accumulates timed events for the current attempt
#[derive(Debug, Clone)]
pub struct AttemptRecorder {
    capacity: usize,
    events: Vec<KeyEvent>,
    started: bool,
    start_time_ms: f64,
    start_wall_clock: Option<DateTime<Local>>,
    dropped: usize,
    clock: Clock,
}

impl AttemptRecorder {
    /// Create a recorder holding at most `capacity` events per attempt
    pub fn new(capacity: usize, clock: Clock) -> Self {
        Self {
            capacity,
            events: Vec::with_capacity(capacity),
            started: false,
            start_time_ms: 0.0,
            start_wall_clock: None,
            dropped: 0,
            clock,
        }
    }

    /// Record a key-down. The first key-down after a reset stamps the
    /// attempt's start time.
    pub fn on_key_down(
        &mut self,
        key: KeyCode,
        timestamp_ms: f64,
        character: Option<char>,
        label: impl Into<String>,
    ) -> KeyDown {
        if !self.started {
            self.started = true;
            self.start_time_ms = timestamp_ms;
            self.start_wall_clock = self.clock.wall_at(timestamp_ms);
        }

        if self.events.len() >= self.capacity {
            self.dropped += 1;
            log::warn!(
                "Event buffer full ({} events), dropping key-down for {:?}",
                self.capacity,
                key
            );
            return KeyDown::Dropped;
        }

        self.events
            .push(KeyEvent::pressed(key, character, label, timestamp_ms));
        KeyDown::Recorded(self.events.len() - 1)
    }

    /// Record a key-up against the most recent open event for the same key
    pub fn on_key_up(&mut self, key: KeyCode, timestamp_ms: f64) -> KeyUp {
        let open = self
            .events
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, e)| e.virtual_key == key && e.is_open());

        match open {
            Some((index, event)) => {
                event.release_at(timestamp_ms);
                KeyUp::Released(index)
            }
            None => KeyUp::Unmatched,
        }
    }

    /// Freeze the current events into an uncommitted attempt and reset
    pub fn seal(&mut self) -> Attempt {
        let events = std::mem::replace(&mut self.events, Vec::with_capacity(self.capacity));
        let attempt = Attempt::new(events, self.start_time_ms, self.start_wall_clock)
            .with_dropped_events(self.dropped);
        self.reset();
        attempt
    }

    /// Discard the attempt in progress
    pub fn reset(&mut self) {
        self.events.clear();
        self.started = false;
        self.start_time_ms = 0.0;
        self.start_wall_clock = None;
        self.dropped = 0;
    }

    /// A key-down has been seen since the last reset
    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    /// Key-downs dropped in the current attempt
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn start_time_ms(&self) -> f64 {
        self.start_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: KeyCode = KeyCode(30);
    const B: KeyCode = KeyCode(48);

    fn recorder(capacity: usize) -> AttemptRecorder {
        AttemptRecorder::new(capacity, Clock::start())
    }

    #[test]
    fn first_key_down_stamps_start() {
        let mut rec = recorder(8);
        assert!(!rec.has_started());
        rec.on_key_down(A, 120.0, Some('a'), "A");
        rec.on_key_down(B, 180.0, Some('b'), "B");
        assert!(rec.has_started());
        assert_eq!(rec.start_time_ms(), 120.0);
    }

    #[test]
    fn key_down_opens_event_with_sentinel_release() {
        let mut rec = recorder(8);
        assert_eq!(rec.on_key_down(A, 10.0, Some('a'), "A"), KeyDown::Recorded(0));
        let event = &rec.events()[0];
        assert!(event.is_open());
        assert_eq!(event.release_time_ms, 10.0);
    }

    #[test]
    fn key_up_closes_matching_event() {
        let mut rec = recorder(8);
        rec.on_key_down(A, 10.0, Some('a'), "A");
        rec.on_key_down(B, 20.0, Some('b'), "B");
        assert_eq!(rec.on_key_up(A, 45.0), KeyUp::Released(0));
        assert_eq!(rec.events()[0].release_time_ms, 45.0);
        assert!(rec.events()[1].is_open());
    }

    #[test]
    fn key_up_prefers_most_recent_open_event() {
        let mut rec = recorder(8);
        rec.on_key_down(A, 10.0, Some('a'), "A");
        rec.on_key_down(A, 20.0, Some('a'), "A");
        assert_eq!(rec.on_key_up(A, 30.0), KeyUp::Released(1));
        assert!(rec.events()[0].is_open());
        assert_eq!(rec.on_key_up(A, 40.0), KeyUp::Released(0));
        assert_eq!(rec.events()[0].release_time_ms, 40.0);
        assert_eq!(rec.events()[1].release_time_ms, 30.0);
    }

    #[test]
    fn key_up_skips_closed_events() {
        let mut rec = recorder(8);
        rec.on_key_down(A, 10.0, Some('a'), "A");
        rec.on_key_up(A, 20.0);
        let before = rec.events().to_vec();
        assert_eq!(rec.on_key_up(A, 50.0), KeyUp::Unmatched);
        assert_eq!(rec.events(), before.as_slice());
    }

    #[test]
    fn unmatched_key_up_is_noop() {
        let mut rec = recorder(8);
        rec.on_key_down(A, 10.0, Some('a'), "A");
        let before = rec.events().to_vec();
        assert_eq!(rec.on_key_up(B, 30.0), KeyUp::Unmatched);
        assert_eq!(rec.events(), before.as_slice());
    }

    #[test]
    fn release_before_press_is_clamped() {
        let mut rec = recorder(8);
        rec.on_key_down(A, 100.0, Some('a'), "A");
        rec.on_key_up(A, 90.0);
        let event = &rec.events()[0];
        assert!(event.release_time_ms >= event.press_time_ms);
    }

    #[test]
    fn overflow_drops_and_counts() {
        let mut rec = recorder(2);
        rec.on_key_down(A, 1.0, Some('a'), "A");
        rec.on_key_down(B, 2.0, Some('b'), "B");
        assert!(rec.is_full());
        assert_eq!(rec.on_key_down(A, 3.0, Some('a'), "A"), KeyDown::Dropped);
        assert_eq!(rec.events().len(), 2);
        assert_eq!(rec.dropped(), 1);
    }

    #[test]
    fn seal_moves_events_out_and_resets() {
        let mut rec = recorder(1);
        rec.on_key_down(A, 5.0, Some('a'), "A");
        rec.on_key_down(B, 6.0, Some('b'), "B");
        rec.on_key_up(A, 9.0);

        let attempt = rec.seal();
        assert_eq!(attempt.len(), 1);
        assert_eq!(attempt.start_time_ms(), 5.0);
        assert!(attempt.start_wall_clock().is_some());
        assert_eq!(attempt.dropped_events(), 1);

        assert!(!rec.has_started());
        assert!(rec.events().is_empty());
        assert_eq!(rec.dropped(), 0);
    }

    #[test]
    fn reset_clears_attempt() {
        let mut rec = recorder(4);
        rec.on_key_down(A, 5.0, Some('a'), "A");
        rec.reset();
        assert!(!rec.has_started());
        assert!(rec.events().is_empty());
        rec.on_key_down(B, 50.0, Some('b'), "B");
        assert_eq!(rec.start_time_ms(), 50.0);
    }
}
