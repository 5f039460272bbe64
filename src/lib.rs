//! Keystroke Recorder - timed keystroke capture for typing-dynamics studies
//!
//! Raw key press/release events are matched against a fixed target phrase.
//! Every attempt that reproduces the phrase exactly is kept with per-key
//! press and release times and written out as CSV rows carrying dwell and
//! flight metrics.

pub mod attempt;
pub mod clock;
pub mod config;
pub mod export;
pub mod keyboard;
pub mod metrics;
pub mod report;
pub mod session;

pub use clock::Clock;
pub use config::Config;
pub use session::{Outcome, Session};
