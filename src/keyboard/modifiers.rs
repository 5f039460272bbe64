//! Modifier state tracking

use super::{KeyCode, KeyDirection, RawKeyEvent};

/// Snapshot of the modifiers that affect character classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Either shift key is held
    pub shift: bool,
    /// Caps lock is toggled on
    pub caps_lock: bool,
}

/// Tracks shift and caps lock across the raw event stream
#[derive(Debug, Clone, Default)]
pub struct ModifierState {
    left_shift: bool,
    right_shift: bool,
    caps_lock: bool,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state from a raw event.
    ///
    /// Returns true when the event touched a modifier key.
    pub fn process_event(&mut self, event: &RawKeyEvent) -> bool {
        let pressed = event.direction == KeyDirection::Press;
        match event.key {
            KeyCode::LEFT_SHIFT => self.left_shift = pressed,
            KeyCode::RIGHT_SHIFT => self.right_shift = pressed,
            KeyCode::CAPS_LOCK => {
                if pressed {
                    self.caps_lock = !self.caps_lock;
                }
            }
            _ => return false,
        }
        true
    }

    /// Current modifier snapshot
    pub fn current(&self) -> Modifiers {
        Modifiers {
            shift: self.left_shift || self.right_shift,
            caps_lock: self.caps_lock,
        }
    }
}
