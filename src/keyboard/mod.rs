//! Keyboard event capture, key classification and modifier tracking

mod event;
mod modifiers;
pub mod keymap;

pub use event::{KeyDirection, KeyboardListener, RawKeyEvent};
pub use keymap::{KeyClass, KeyClassifier, KeyCode, KeyInfo, UsLayout, KEYMAP};
pub use modifiers::{ModifierState, Modifiers};
