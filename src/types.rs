//! Type definitions shared across season-streamer.
//!
//! This module contains the leaf data structures: episode references,
//! the playback cursor, the playback mode and the encoder quality settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A playable episode: where to read it from and what to call it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodeRef {
    /// Display title, derived from the file stem.
    pub title: String,

    /// Path or URL handed to the encoder.
    pub source: PathBuf,
}

impl EpisodeRef {
    /// Build a reference from a source path, deriving the title from the file stem.
    ///
    /// Both `/` and `\` separators are accepted so static tables written on
    /// Windows resolve to the same titles.
    ///
    /// # Examples
    ///
    /// ```
    /// use season_streamer::types::EpisodeRef;
    ///
    /// let ep = EpisodeRef::from_path("C:\\videos\\A king.mp4");
    /// assert_eq!(ep.title, "A king");
    /// ```
    pub fn from_path<P: AsRef<Path>>(source: P) -> Self {
        let source = source.as_ref();
        let raw = source.to_string_lossy();
        let file_name: &str = raw.rsplit(['/', '\\']).next().unwrap_or(&*raw);
        let title = match file_name.rfind('.') {
            Some(dot) if dot > 0 => &file_name[..dot],
            _ => file_name,
        };

        Self {
            title: title.trim().to_string(),
            source: source.to_path_buf(),
        }
    }
}

/// The playback cursor.
///
/// `show` and `season` hold the display names from the active catalog;
/// `episode` is a zero-based index into that season's episode list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub show: String,
    pub season: String,
    pub episode: usize,
}

impl Position {
    pub fn new(show: impl Into<String>, season: impl Into<String>, episode: usize) -> Self {
        Self {
            show: show.into(),
            season: season.into(),
            episode,
        }
    }

    /// Advance to the next episode of a season with `len` episodes.
    ///
    /// Returns true when the cursor wrapped back to the first episode.
    pub fn advance(&mut self, len: usize) -> bool {
        if len == 0 {
            self.episode = 0;
            return true;
        }
        self.episode = (self.episode + 1) % len;
        self.episode == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} #{}", self.show, self.season, self.episode + 1)
    }
}

/// Whether the sequencer should start a job once the current one ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// No job running and none will be started.
    Stopped,
    /// A job is running, or about to be started, for the current position.
    Playing,
    /// A navigation command invalidated the running job; auto-advance is
    /// suppressed until a fresh job starts at the new position.
    Jumping,
}

/// Encoder settings applied to every job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    #[serde(default = "default_max_bitrate")]
    pub max_bitrate_kbps: u32,

    /// Codec family: H264, H265, VP8, VP9 or AV1
    #[serde(default = "default_codec")]
    pub video_codec: String,

    /// x264/x265 speed preset
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_height() -> u32 {
    1080
}

fn default_frame_rate() -> u32 {
    30
}

fn default_bitrate() -> u32 {
    5000
}

fn default_max_bitrate() -> u32 {
    7500
}

fn default_codec() -> String {
    "H264".to_string()
}

fn default_preset() -> String {
    "veryfast".to_string()
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            frame_rate: default_frame_rate(),
            bitrate_kbps: default_bitrate(),
            max_bitrate_kbps: default_max_bitrate(),
            video_codec: default_codec(),
            preset: default_preset(),
        }
    }
}
