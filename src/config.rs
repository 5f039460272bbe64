//! Configuration management for Keystroke Recorder
//!
//! Configuration is read from a platform-specific TOML file. A missing file
//! means defaults; a present but malformed file is an error.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keystroke-recorder/config.toml` |
//! | macOS | `~/Library/Application Support/keystroke-recorder/config.toml` |
//! | Windows | `%APPDATA%\keystroke-recorder\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keystroke_recorder::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.session.target_phrase = "Football123$".to_string();
//! config.session.attempts = 10;
//! config.save().expect("Failed to save config");
//! ```

use crate::attempt::is_printable;
use crate::keyboard::KeyCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("keystroke-recorder");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Attempt and phrase settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Control key bindings
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Phrase each attempt must reproduce exactly
    pub target_phrase: String,
    /// Successful attempts required to finish the session
    pub attempts: usize,
    /// Maximum key-downs recorded per attempt
    pub event_capacity: usize,
    /// Whether each attempt must be armed with the arm key first
    pub require_arm: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_phrase: "vpwjkeurkb".to_string(),
            attempts: 5,
            event_capacity: 512,
            require_arm: true,
        }
    }
}

/// Control key bindings, as evdev scancodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlsConfig {
    /// Arms the next attempt (Enter)
    pub arm_key: u16,
    /// Discards the attempt in progress (Backspace)
    pub reset_key: u16,
    /// Ends the session (Escape)
    pub quit_key: u16,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            arm_key: KeyCode::ENTER.as_u16(),
            reset_key: KeyCode::BACKSPACE.as_u16(),
            quit_key: KeyCode::ESCAPE.as_u16(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Directory the keystroke CSV is written to
    pub directory: PathBuf,
    /// User name used when none is entered
    pub default_user: String,
    /// Also write a JSON session summary next to the CSV
    pub write_summary: bool,
    /// Keyboard poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            default_user: "student".to_string(),
            write_summary: false,
            poll_interval_ms: 1,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check values the session relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.target_phrase.is_empty() {
            return Err(ConfigError::Invalid("target_phrase must not be empty".into()));
        }
        if let Some(bad) = session.target_phrase.chars().find(|c| !is_printable(*c)) {
            return Err(ConfigError::Invalid(format!(
                "target_phrase contains non-printable character {:?}",
                bad
            )));
        }
        if session.attempts == 0 {
            return Err(ConfigError::Invalid("attempts must be at least 1".into()));
        }
        if session.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Keyboard poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.output.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.session.target_phrase, "vpwjkeurkb");
        assert_eq!(config.session.attempts, 5);
        assert_eq!(config.session.event_capacity, 512);
        assert!(config.session.require_arm);
        assert_eq!(config.controls.arm_key, 28);
        assert_eq!(config.controls.reset_key, 14);
        assert_eq!(config.controls.quit_key, 1);
        assert_eq!(config.output.default_user, "student");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.session.target_phrase = "Football123$".to_string();
        config.session.require_arm = false;
        config.save_to(&path).expect("Failed to save config");

        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn config_load_missing_file_fails() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_partial_file_uses_section_defaults() {
        let toml_str = r#"
[session]
target_phrase = "cat"
attempts = 2
event_capacity = 16
require_arm = false
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.session.target_phrase, "cat");
        assert_eq!(config.session.attempts, 2);
        assert_eq!(config.controls, ControlsConfig::default());
        assert_eq!(config.output.poll_interval_ms, 1);
    }

    #[test]
    fn config_serializes_sections() {
        let toml_str = toml::to_string_pretty(&Config::default()).expect("Failed to serialize");
        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[controls]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("target_phrase = \"vpwjkeurkb\""));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.target_phrase.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.session.target_phrase = "caf\u{e9}".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.event_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[session]\ntarget_phrase = \"\"\nattempts = 1\nevent_capacity = 1\nrequire_arm = true\n",
        )
        .unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_error_display() {
        assert_eq!(ConfigError::NoConfigDir.to_string(), "Could not determine config directory");
        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }

    #[test]
    fn poll_interval_never_zero() {
        let mut config = Config::default();
        config.output.poll_interval_ms = 0;
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
