//! Timed keystroke attempts
//!
//! An [`Attempt`] is one trial of typing the target phrase. It is built up by
//! the [`AttemptRecorder`], validated by the [`PhraseMatcher`] and, once the
//! phrase is typed exactly, sealed into the [`AttemptStore`].

mod matcher;
mod recorder;
mod store;

pub use matcher::{is_printable, MatchState, MatchStatus, PhraseMatcher};
pub use recorder::{AttemptRecorder, KeyDown, KeyUp};
pub use store::AttemptStore;

use crate::keyboard::KeyCode;
use chrono::{DateTime, Local};

/// One key transition within an attempt
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Key code from the input source
    pub virtual_key: KeyCode,
    /// Printable character, if the key produced one
    pub character: Option<char>,
    /// Human-readable key name, e.g. `SHIFT_L`
    pub label: String,
    /// Press time in session milliseconds
    pub press_time_ms: f64,
    /// Release time in session milliseconds. Equal to `press_time_ms` until
    /// the matching key-up arrives.
    pub release_time_ms: f64,
}

impl KeyEvent {
    /// Create a pressed, not yet released event
    pub fn pressed(
        virtual_key: KeyCode,
        character: Option<char>,
        label: impl Into<String>,
        press_time_ms: f64,
    ) -> Self {
        Self {
            virtual_key,
            character,
            label: label.into(),
            press_time_ms,
            release_time_ms: press_time_ms,
        }
    }

    /// Still waiting for its key-up
    pub fn is_open(&self) -> bool {
        self.release_time_ms == self.press_time_ms
    }

    /// Record the key-up, never letting release precede press
    fn release_at(&mut self, timestamp_ms: f64) {
        self.release_time_ms = timestamp_ms.max(self.press_time_ms);
    }

    /// All-zero slot left behind by an uninitialised buffer
    pub fn is_empty_slot(&self) -> bool {
        self.virtual_key.as_u16() == 0 && self.press_time_ms == 0.0 && self.release_time_ms == 0.0
    }
}

/// One trial run of typing the target phrase
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    number: usize,
    events: Vec<KeyEvent>,
    start_time_ms: f64,
    start_wall_clock: Option<DateTime<Local>>,
    dropped_events: usize,
}

impl Attempt {
    /// Build an uncommitted attempt from already-timed events
    pub fn new(
        events: Vec<KeyEvent>,
        start_time_ms: f64,
        start_wall_clock: Option<DateTime<Local>>,
    ) -> Self {
        Self {
            number: 0,
            events,
            start_time_ms,
            start_wall_clock,
            dropped_events: 0,
        }
    }

    /// 1-based commit number, `0` while uncommitted
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn is_committed(&self) -> bool {
        self.number > 0
    }

    /// Events in key-down order
    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clock reading at the first key-down
    pub fn start_time_ms(&self) -> f64 {
        self.start_time_ms
    }

    /// Local calendar time at the first key-down
    pub fn start_wall_clock(&self) -> Option<DateTime<Local>> {
        self.start_wall_clock
    }

    /// Key-downs lost because the event buffer was full
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    pub(crate) fn with_dropped_events(mut self, dropped: usize) -> Self {
        self.dropped_events = dropped;
        self
    }

    pub(crate) fn assign_number(&mut self, number: usize) {
        self.number = number;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_event_is_open() {
        let event = KeyEvent::pressed(KeyCode(30), Some('a'), "A", 12.5);
        assert!(event.is_open());
        assert_eq!(event.release_time_ms, 12.5);
    }

    #[test]
    fn release_is_clamped_to_press() {
        let mut event = KeyEvent::pressed(KeyCode(30), Some('a'), "A", 100.0);
        event.release_at(40.0);
        assert_eq!(event.release_time_ms, 100.0);
        event.release_at(150.0);
        assert_eq!(event.release_time_ms, 150.0);
    }

    #[test]
    fn empty_slot_detection() {
        assert!(KeyEvent::pressed(KeyCode(0), None, "", 0.0).is_empty_slot());
        assert!(!KeyEvent::pressed(KeyCode(0), None, "", 1.0).is_empty_slot());
        assert!(!KeyEvent::pressed(KeyCode(30), None, "", 0.0).is_empty_slot());
    }

    #[test]
    fn new_attempt_is_uncommitted() {
        let attempt = Attempt::new(Vec::new(), 0.0, None);
        assert_eq!(attempt.number(), 0);
        assert!(!attempt.is_committed());
        assert!(attempt.is_empty());
    }
}
