//! Recording session state machine
//!
//! A [`Session`] owns everything that changes while the typist works through
//! their attempts: the attempt being recorded, the phrase matcher, modifier
//! state and the store of committed attempts. The host feeds it one
//! [`RawKeyEvent`] at a time and reacts to the returned [`Outcome`].
//!
//! Event precedence follows the control-key rules:
//!
//! 1. quit key-down ends the session, whatever the arm state
//! 2. shift and caps lock are tracked on every event
//! 3. arm key-down arms the next attempt when not armed (and is consumed)
//! 4. nothing else is recorded while not armed
//! 5. reset key-down discards the attempt in progress (and is consumed)
//! 6. any other key-down/key-up is timed; printable characters are matched
//!    against the target phrase
//!
//! Once the typed buffer reaches the phrase length, the next key-up seals the
//! attempt: exact matches are committed, anything else is discarded.

use crate::attempt::{
    AttemptRecorder, AttemptStore, KeyDown, KeyUp, MatchStatus, PhraseMatcher,
};
use crate::clock::Clock;
use crate::config::{Config, ControlsConfig};
use crate::export::{CsvExporter, ExportError};
use crate::keyboard::{KeyClassifier, KeyCode, ModifierState, RawKeyEvent, UsLayout};

/// Keys the session treats as control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlKeys {
    pub arm: KeyCode,
    pub reset: KeyCode,
    pub quit: KeyCode,
}

impl From<&ControlsConfig> for ControlKeys {
    fn from(config: &ControlsConfig) -> Self {
        Self {
            arm: KeyCode(config.arm_key),
            reset: KeyCode(config.reset_key),
            quit: KeyCode(config.quit_key),
        }
    }
}

impl Default for ControlKeys {
    fn default() -> Self {
        Self::from(&ControlsConfig::default())
    }
}

/// What processing one event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Event had no effect (not armed, or session over)
    Ignored,
    /// Next attempt armed
    Armed,
    /// Attempt in progress discarded by the reset signal
    Aborted,
    /// Session ended by the quit signal
    Quit,
    /// Key-down recorded at this 0-based position
    Pressed(usize),
    /// Key-down lost because the attempt's event buffer is full
    Dropped,
    /// Key-up processed
    Released(KeyUp),
    /// Typed character diverged from the phrase; attempt discarded
    Mismatch,
    /// Attempt committed under this number
    Committed {
        attempt_number: usize,
        /// Required number of attempts reached
        finished: bool,
    },
    /// Phrase length reached without an exact match; attempt discarded
    Discarded,
    /// Exact match, but the store was already full
    Rejected,
}

impl Outcome {
    /// The attempt in progress was thrown away and the session awaits re-arm
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Mismatch | Outcome::Discarded | Outcome::Rejected)
    }
}

/// Where the session is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting attempts
    Recording,
    /// Required attempts committed
    Finished,
    /// Quit before finishing
    Quit,
}

/// Counters kept across the whole session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Raw events handed to the session
    pub events_processed: u64,
    /// Attempts lost to a mistyped character
    pub mismatches: u32,
    /// Attempts discarded at phrase length without an exact match
    pub discarded: u32,
    /// Attempts thrown away with the reset key
    pub aborted: u32,
    /// Exact matches refused because the store was full
    pub rejected: u32,
    /// Key-downs lost to full event buffers
    pub dropped_events: u64,
}

/// One typist's recording session
pub struct Session {
    require_arm: bool,
    controls: ControlKeys,
    classifier: Box<dyn KeyClassifier + Send>,
    modifiers: ModifierState,
    recorder: AttemptRecorder,
    matcher: PhraseMatcher,
    store: AttemptStore,
    armed: bool,
    phase: Phase,
    stats: SessionStats,
}

impl Session {
    /// Create a session using the US layout classifier
    pub fn new(config: &Config, clock: Clock) -> Self {
        Self::with_classifier(config, clock, Box::new(UsLayout))
    }

    /// Create a session with a custom key classifier
    pub fn with_classifier(
        config: &Config,
        clock: Clock,
        classifier: Box<dyn KeyClassifier + Send>,
    ) -> Self {
        let session = &config.session;
        Self {
            require_arm: session.require_arm,
            controls: ControlKeys::from(&config.controls),
            classifier,
            modifiers: ModifierState::new(),
            recorder: AttemptRecorder::new(session.event_capacity, clock),
            matcher: PhraseMatcher::new(session.target_phrase.clone()),
            store: AttemptStore::new(session.attempts),
            armed: !session.require_arm,
            phase: Phase::Recording,
            stats: SessionStats::default(),
        }
    }

    /// Process one raw key event
    pub fn process_event(&mut self, event: &RawKeyEvent) -> Outcome {
        if self.phase != Phase::Recording {
            return Outcome::Ignored;
        }
        self.stats.events_processed += 1;
        log::debug!(
            "{:?} {:?} at {:.3} ms",
            event.key,
            event.direction,
            event.timestamp_ms
        );

        if event.is_press() && event.key == self.controls.quit {
            return self.quit();
        }

        self.modifiers.process_event(event);

        if event.is_press() && event.key == self.controls.arm && !self.armed {
            return self.arm();
        }

        if !self.armed {
            return Outcome::Ignored;
        }

        if event.is_press() && event.key == self.controls.reset {
            return self.abort();
        }

        if event.is_press() {
            self.key_down(event)
        } else {
            self.key_up(event)
        }
    }

    /// Arm the next attempt
    pub fn arm(&mut self) -> Outcome {
        if self.phase != Phase::Recording || self.armed {
            return Outcome::Ignored;
        }
        self.armed = true;
        log::info!("Armed attempt {}", self.store.len() + 1);
        Outcome::Armed
    }

    /// Discard the attempt in progress without committing it
    pub fn abort(&mut self) -> Outcome {
        if self.phase != Phase::Recording || !self.armed {
            return Outcome::Ignored;
        }
        self.stats.aborted += 1;
        log::info!("Attempt reset by user");
        self.restart_attempt();
        Outcome::Aborted
    }

    /// End the session; the attempt in progress is discarded
    pub fn quit(&mut self) -> Outcome {
        if self.phase != Phase::Recording {
            return Outcome::Ignored;
        }
        self.recorder.reset();
        self.matcher.reset();
        self.armed = false;
        self.phase = Phase::Quit;
        log::info!(
            "Session quit with {}/{} attempts committed",
            self.store.len(),
            self.store.capacity()
        );
        Outcome::Quit
    }

    fn key_down(&mut self, event: &RawKeyEvent) -> Outcome {
        let class = self.classifier.classify(event.key, self.modifiers.current());

        if let Some(ch) = class.character {
            if self.matcher.feed(ch) == MatchStatus::Mismatch {
                self.stats.mismatches += 1;
                log::warn!("Mistyped {:?}, attempt discarded", ch);
                self.restart_attempt();
                return Outcome::Mismatch;
            }
        }

        match self
            .recorder
            .on_key_down(event.key, event.timestamp_ms, class.character, class.label)
        {
            KeyDown::Recorded(index) => Outcome::Pressed(index),
            KeyDown::Dropped => {
                self.stats.dropped_events += 1;
                Outcome::Dropped
            }
        }
    }

    fn key_up(&mut self, event: &RawKeyEvent) -> Outcome {
        let released = self.recorder.on_key_up(event.key, event.timestamp_ms);

        if self.matcher.at_target_length() {
            return self.complete_attempt();
        }

        Outcome::Released(released)
    }

    fn complete_attempt(&mut self) -> Outcome {
        let outcome = if self.matcher.is_complete() {
            let attempt = self.recorder.seal();
            let dropped = attempt.dropped_events();
            let events = attempt.len();
            match self.store.commit(attempt) {
                Some(attempt_number) => {
                    if dropped > 0 {
                        log::warn!(
                            "Attempt {} committed with {} dropped events",
                            attempt_number,
                            dropped
                        );
                    }
                    log::info!(
                        "Attempt {}/{} committed ({} events)",
                        attempt_number,
                        self.store.capacity(),
                        events
                    );
                    let finished = self.store.is_full();
                    if finished {
                        self.phase = Phase::Finished;
                    }
                    Outcome::Committed {
                        attempt_number,
                        finished,
                    }
                }
                None => {
                    self.stats.rejected += 1;
                    log::warn!("Attempt store full, completed attempt not recorded");
                    Outcome::Rejected
                }
            }
        } else {
            // Eager mismatch detection makes this unreachable in practice
            self.stats.discarded += 1;
            log::warn!("Phrase length reached without a match, attempt discarded");
            Outcome::Discarded
        };

        self.restart_attempt();
        outcome
    }

    fn restart_attempt(&mut self) {
        self.recorder.reset();
        self.matcher.reset();
        if self.require_arm {
            self.armed = false;
        }
    }

    /// Append committed attempts that have not been written yet.
    ///
    /// On failure nothing is marked persisted, so a later flush retries the
    /// same attempts.
    pub fn flush(&mut self, exporter: &mut CsvExporter) -> Result<usize, ExportError> {
        if self.store.pending().is_empty() {
            return Ok(0);
        }
        match exporter.append(self.store.pending()) {
            Ok(rows) => {
                self.store.mark_persisted();
                Ok(rows)
            }
            Err(e) => {
                log::warn!("Failed to write {}: {}", exporter.path().display(), e);
                Err(e)
            }
        }
    }

    pub fn store(&self) -> &AttemptStore {
        &self.store
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Still accepting input
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Recording
    }

    pub fn requires_arm(&self) -> bool {
        self.require_arm
    }

    pub fn target_phrase(&self) -> &str {
        self.matcher.target()
    }

    /// Printable characters typed in the attempt in progress
    pub fn typed(&self) -> &str {
        self.matcher.typed()
    }

    pub fn recorder(&self) -> &AttemptRecorder {
        &self.recorder
    }
}
