//! Keystroke CSV export
//!
//! Committed attempts are appended to a per-user CSV file, one row per key
//! event. The header row is written only when the destination has no content
//! yet, so repeated sessions for the same user accumulate in one file.
//!
//! ## Columns
//!
//! ```text
//! user,attempt_id,attempt_time,event_idx,vk,key,ch,press_ms,release_ms,
//! press_rel_ms,release_rel_ms,dwell_ms,flight_ud_ms,flight_dd_ms
//! ```
//!
//! Exactly one of `key`/`ch` is meaningful per row; the other holds `-`.

use crate::attempt::Attempt;
use crate::metrics::{derive_rows, EventRow};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed column header
pub const HEADER: [&str; 14] = [
    "user",
    "attempt_id",
    "attempt_time",
    "event_idx",
    "vk",
    "key",
    "ch",
    "press_ms",
    "release_ms",
    "press_rel_ms",
    "release_rel_ms",
    "dwell_ms",
    "flight_ud_ms",
    "flight_dd_ms",
];

/// Written when an attempt has no wall-clock start time
pub const EPOCH_PLACEHOLDER: &str = "1970-01-01 00:00:00";

const ATTEMPT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FORBIDDEN_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Summary serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Make a user-supplied name safe for use in a file name.
///
/// Path and shell-special characters become `_`; an empty name falls back to
/// `default_user`.
pub fn sanitize_user_name(name: &str, default_user: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return default_user.to_string();
    }
    trimmed
        .chars()
        .map(|c| if FORBIDDEN_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `<directory>/<user>_keystrokes.csv`
pub fn output_path(directory: &Path, user: &str) -> PathBuf {
    directory.join(format!("{}_keystrokes.csv", user))
}

/// Attempt start in local time, or the epoch placeholder
pub fn format_attempt_time(start: Option<DateTime<Local>>) -> String {
    start
        .map(|t| t.format(ATTEMPT_TIME_FORMAT).to_string())
        .unwrap_or_else(|| EPOCH_PLACEHOLDER.to_string())
}

fn ms(value: f64) -> String {
    format!("{:.3}", value)
}

fn row_fields(
    user: &str,
    attempt: &Attempt,
    attempt_time: &str,
    row: &EventRow<'_>,
) -> [String; 14] {
    let event = row.event;
    let (key, ch) = match event.character {
        Some(c) => ("-".to_string(), c.to_string()),
        None => (event.label.clone(), "-".to_string()),
    };
    let m = &row.metrics;
    [
        user.to_string(),
        attempt.number().to_string(),
        attempt_time.to_string(),
        row.event_idx.to_string(),
        event.virtual_key.as_u16().to_string(),
        key,
        ch,
        ms(event.press_time_ms),
        ms(event.release_time_ms),
        ms(m.press_rel_ms),
        ms(m.release_rel_ms),
        ms(m.dwell_ms),
        ms(m.flight_ud_ms),
        ms(m.flight_dd_ms),
    ]
}

/// Write attempts as CSV rows to any writer.
///
/// Returns the number of event rows written (the header is not counted).
pub fn write_attempts<W: Write>(
    writer: W,
    user: &str,
    attempts: &[Attempt],
    include_header: bool,
) -> Result<usize, ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if include_header {
        csv.write_record(HEADER)?;
    }

    let mut rows = 0;
    for attempt in attempts {
        let attempt_time = format_attempt_time(attempt.start_wall_clock());
        for row in derive_rows(attempt) {
            csv.write_record(row_fields(user, attempt, &attempt_time, &row))?;
            rows += 1;
        }
    }

    csv.flush()?;
    Ok(rows)
}

/// Appends attempts to a CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
    user: String,
    needs_header: Option<bool>,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user: user.into(),
            needs_header: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the destination is missing or empty
    fn probe_needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }

    /// Append attempts to the destination file.
    ///
    /// The header decision is made by probing the file on the first call
    /// and reused afterwards.
    pub fn append(&mut self, attempts: &[Attempt]) -> Result<usize, ExportError> {
        let needs_header = match self.needs_header {
            Some(decided) => decided,
            None => {
                let probed = self.probe_needs_header();
                self.needs_header = Some(probed);
                probed
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if needs_header {
            write_attempts(&file, &self.user, &[], true)?;
            self.needs_header = Some(false);
        }

        let rows = write_attempts(&file, &self.user, attempts, false)?;
        log::info!(
            "Appended {} rows from {} attempts to {}",
            rows,
            attempts.len(),
            self.path.display()
        );
        Ok(rows)
    }
}
