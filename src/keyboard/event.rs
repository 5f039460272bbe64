//! Raw keyboard event types and listener

use super::KeyCode;
use crate::clock::Clock;
use device_query::{DeviceQuery, DeviceState};
use std::sync::mpsc;
use std::time::Instant;

/// Direction of a key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// A raw key transition stamped with the session clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeyEvent {
    /// The key code
    pub key: KeyCode,
    /// Press or release
    pub direction: KeyDirection,
    /// Milliseconds since the session clock's zero point
    pub timestamp_ms: f64,
}

impl RawKeyEvent {
    pub fn new(key: KeyCode, direction: KeyDirection, timestamp_ms: f64) -> Self {
        Self {
            key,
            direction,
            timestamp_ms,
        }
    }

    pub fn press(key: KeyCode, timestamp_ms: f64) -> Self {
        Self::new(key, KeyDirection::Press, timestamp_ms)
    }

    pub fn release(key: KeyCode, timestamp_ms: f64) -> Self {
        Self::new(key, KeyDirection::Release, timestamp_ms)
    }

    pub fn is_press(&self) -> bool {
        self.direction == KeyDirection::Press
    }
}

/// Keyboard listener that polls for key state changes
pub struct KeyboardListener {
    device_state: DeviceState,
    last_keys: Vec<device_query::Keycode>,
    clock: Clock,
    event_tx: mpsc::Sender<RawKeyEvent>,
}

impl KeyboardListener {
    /// Create a new keyboard listener stamping events with `clock`
    pub fn new(clock: Clock, event_tx: mpsc::Sender<RawKeyEvent>) -> Self {
        Self {
            device_state: DeviceState::new(),
            last_keys: Vec::new(),
            clock,
            event_tx,
        }
    }

    /// Poll for keyboard state changes
    /// Returns the number of events generated
    pub fn poll(&mut self) -> usize {
        let timestamp_ms = self.clock.ms_at(Instant::now());
        let current_keys = self.device_state.get_keys();
        let mut event_count = 0;

        // Releases first so a fast re-press of the same key pairs correctly
        for key in &self.last_keys {
            if !current_keys.contains(key) {
                let event = RawKeyEvent::release(KeyCode::from(*key), timestamp_ms);
                if self.event_tx.send(event).is_ok() {
                    event_count += 1;
                }
            }
        }

        for key in &current_keys {
            if !self.last_keys.contains(key) {
                let event = RawKeyEvent::press(KeyCode::from(*key), timestamp_ms);
                if self.event_tx.send(event).is_ok() {
                    event_count += 1;
                }
            }
        }

        self.last_keys = current_keys;
        event_count
    }
}
