//! Custom error types for season-streamer.
//!
//! Nothing in here is fatal to the control loop: lookup misses and bad
//! arguments are reported to the issuing command, collaborator failures
//! are logged and treated as a settled job.

use std::error::Error;
use std::fmt;
use std::io;

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// Show, season or episode lookup miss
    NotFound(String),
    /// Malformed numeric or token-count input
    InvalidArgument(String),
    /// A catalog refresh produced zero playable entries
    CatalogEmpty,
    /// Encoder/transport failure reported by the playback collaborator
    Collaborator(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
    /// Network/HTTP errors
    Network(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            AppError::CatalogEmpty => write!(f, "Catalog has no playable episodes"),
            AppError::Collaborator(msg) => write!(f, "Playback error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Collaborator("ffmpeg exited with status 1".to_string());
        assert_eq!(err.to_string(), "Playback error: ffmpeg exited with status 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.source().is_some());
    }

    #[test]
    fn test_catalog_empty_display() {
        assert!(AppError::CatalogEmpty.to_string().contains("no playable"));
    }

    #[test]
    fn test_error_from_toml() {
        let err: AppError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, AppError::Config(_)));
    }
}
