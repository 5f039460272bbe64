//! Session summary report and export

use crate::export::{format_attempt_time, ExportError};
use crate::session::{Phase, Session, SessionStats};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Complete session summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Outcome counts
    pub summary: SessionSummary,
    /// One entry per committed attempt
    pub attempts: Vec<AttemptSummary>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Typist the attempts belong to
    pub user: String,
    /// Phrase each attempt reproduced
    pub target_phrase: String,
}

/// Session outcome counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// `Recording`, `Finished` or `Quit`
    pub phase: String,
    pub attempts_required: usize,
    pub attempts_committed: usize,
    pub events_processed: u64,
    pub mismatches: u32,
    pub discarded: u32,
    pub aborted: u32,
    pub rejected: u32,
    pub dropped_events: u64,
}

/// Per-attempt entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempt_id: usize,
    pub attempt_time: String,
    pub events: usize,
    pub dropped_events: usize,
}

/// `<directory>/<user>_summary.json`
pub fn summary_path(directory: &Path, user: &str) -> PathBuf {
    directory.join(format!("{}_summary.json", user))
}

impl SessionReport {
    /// Summarise a session for `user`
    pub fn new(session: &Session, user: &str) -> Self {
        let stats: SessionStats = session.stats();
        let store = session.store();
        let phase = match session.phase() {
            Phase::Recording => "Recording",
            Phase::Finished => "Finished",
            Phase::Quit => "Quit",
        };

        Self {
            metadata: ReportMetadata {
                generated_at: Local::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                user: user.to_string(),
                target_phrase: session.target_phrase().to_string(),
            },
            summary: SessionSummary {
                phase: phase.to_string(),
                attempts_required: store.capacity(),
                attempts_committed: store.len(),
                events_processed: stats.events_processed,
                mismatches: stats.mismatches,
                discarded: stats.discarded,
                aborted: stats.aborted,
                rejected: stats.rejected,
                dropped_events: stats.dropped_events,
            },
            attempts: store
                .attempts()
                .iter()
                .map(|a| AttemptSummary {
                    attempt_id: a.number(),
                    attempt_time: format_attempt_time(a.start_wall_clock()),
                    events: a.len(),
                    dropped_events: a.dropped_events(),
                })
                .collect(),
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::config::Config;
    use crate::keyboard::{KeyCode, RawKeyEvent};

    fn sample_session() -> Session {
        let mut config = Config::default();
        config.session.target_phrase = "a".to_string();
        config.session.attempts = 2;
        config.session.require_arm = false;
        let mut session = Session::new(&config, Clock::start());
        let a = KeyCode(30);
        let x = KeyCode(45);
        session.process_event(&RawKeyEvent::press(x, 0.0));
        session.process_event(&RawKeyEvent::press(a, 5.0));
        session.process_event(&RawKeyEvent::release(a, 15.0));
        session
    }

    #[test]
    fn report_counts_outcomes() {
        let session = sample_session();
        let report = SessionReport::new(&session, "jo");
        assert_eq!(report.metadata.user, "jo");
        assert_eq!(report.metadata.target_phrase, "a");
        assert_eq!(report.summary.phase, "Recording");
        assert_eq!(report.summary.attempts_required, 2);
        assert_eq!(report.summary.attempts_committed, 1);
        assert_eq!(report.summary.mismatches, 1);
        assert_eq!(report.summary.events_processed, 3);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].attempt_id, 1);
        assert_eq!(report.attempts[0].events, 1);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = SessionReport::new(&sample_session(), "jo");
        let json = report.to_json().unwrap();
        assert!(json.contains("\"attempts_committed\": 1"));
        assert!(json.contains("\"target_phrase\": \"a\""));
    }

    #[test]
    fn export_json_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = summary_path(dir.path(), "jo");
        SessionReport::new(&sample_session(), "jo")
            .export_json(&path)
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: SessionReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.summary.attempts_committed, 1);
    }
}
