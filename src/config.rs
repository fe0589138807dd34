//! Configuration file support for season-streamer.
//!
//! This module provides functionality for loading and saving settings
//! from a TOML configuration file.

use crate::error::{AppError, Result};
use crate::sequencer::Timing;
use crate::types::QualityConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Streamer configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned as `<Show>/<Season>/<episode>`
    #[serde(default)]
    pub library_dir: Option<String>,

    /// Static TOML library table, used when no directory is given
    #[serde(default)]
    pub library_file: Option<String>,

    /// Where the encoder pushes the stream
    #[serde(default = "default_output_url")]
    pub output_url: String,

    /// Container format for the output
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Encoder executable
    #[serde(default = "default_encoder")]
    pub encoder: String,

    #[serde(default)]
    pub quality: QualityConfig,

    /// Additional arguments passed to the encoder before the input
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,

    /// Delay between one episode ending and the next starting
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Delay between a jump's cancelled episode settling and the target starting
    #[serde(default = "default_jump_settle_ms")]
    pub jump_settle_ms: u64,

    /// Chat webhook for replies; stdout when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Minutes between `$help` reminders, 0 disables
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: u64,

    #[serde(default = "default_greeting_delay_secs")]
    pub greeting_delay_secs: u64,

    /// Start playing the first episode at boot
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_output_url() -> String {
    "rtmp://127.0.0.1/live/stream".to_string()
}

fn default_output_format() -> String {
    "flv".to_string()
}

fn default_encoder() -> String {
    "ffmpeg".to_string()
}

fn default_extra_args() -> Vec<String> {
    [
        "-loglevel",
        "error",
        "-hide_banner",
        "-nostats",
        "-fflags",
        "+discardcorrupt",
        "-analyzeduration",
        "1000000",
        "-probesize",
        "1000000",
        "-flush_packets",
        "1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cooldown_ms() -> u64 {
    1000
}

fn default_jump_settle_ms() -> u64 {
    3000
}

fn default_reminder_minutes() -> u64 {
    20
}

fn default_greeting_delay_secs() -> u64 {
    3
}

fn default_autostart() -> bool {
    true
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            library_dir: None,
            library_file: None,
            output_url: default_output_url(),
            output_format: default_output_format(),
            encoder: default_encoder(),
            quality: QualityConfig::default(),
            extra_args: default_extra_args(),
            cooldown_ms: default_cooldown_ms(),
            jump_settle_ms: default_jump_settle_ms(),
            webhook_url: None,
            reminder_minutes: default_reminder_minutes(),
            greeting_delay_secs: default_greeting_delay_secs(),
            autostart: default_autostart(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/season-streamer/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
            .join("season-streamer");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from `path`.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            Self::new().save_to(path)?;
        }

        Ok(path.to_path_buf())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            cooldown: Duration::from_millis(self.cooldown_ms),
            jump_settle: Duration::from_millis(self.jump_settle_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert!(config.library_dir.is_none());
        assert_eq!(config.output_format, "flv");
        assert_eq!(config.encoder, "ffmpeg");
        assert_eq!(config.cooldown_ms, 1000);
        assert_eq!(config.jump_settle_ms, 3000);
        assert!(config.extra_args.contains(&"+discardcorrupt".to_string()));
        assert!(config.autostart);
    }

    #[test]
    fn test_config_partial_deserialization() {
        let toml_str = r#"
            library_dir = "/srv/media"
            cooldown_ms = 250

            [quality]
            height = 720
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.library_dir.as_deref(), Some("/srv/media"));
        assert_eq!(config.cooldown_ms, 250);
        assert_eq!(config.jump_settle_ms, 3000); // default
        assert_eq!(config.quality.height, 720);
        assert_eq!(config.quality.frame_rate, 30); // default
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::new();
        config.webhook_url = Some("https://chat.example/hook".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.webhook_url, config.webhook_url);
        assert_eq!(loaded.quality, config.quality);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/no/such/config.toml")).unwrap();
        assert_eq!(config.reminder_minutes, 20);
    }

    #[test]
    fn test_timing() {
        let mut config = Config::new();
        config.cooldown_ms = 10;
        let timing = config.timing();
        assert_eq!(timing.cooldown, Duration::from_millis(10));
        assert_eq!(timing.jump_settle, Duration::from_secs(3));
    }
}
