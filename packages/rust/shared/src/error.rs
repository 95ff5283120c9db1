//! Error types for StoryVoice.
//!
//! Library crates use [`StoryVoiceError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all StoryVoice operations.
#[derive(Debug, thiserror::Error)]
pub enum StoryVoiceError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to a feed or remote service.
    #[error("network error: {0}")]
    Network(String),

    /// A remote payload could not be understood.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Stage input file does not exist.
    #[error("input file not found: {path:?}")]
    NotFound { path: PathBuf },

    /// Stage input file exists but is not a JSON list of records.
    #[error("malformed input in {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Translation call failed.
    #[error("translation error: {0}")]
    Translation(String),

    /// Transliteration failed or the scheme pair is unsupported.
    #[error("transliteration error: {0}")]
    Transliteration(String),

    /// Speech synthesis failed or produced no audio.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad record, invalid value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StoryVoiceError>;

impl StoryVoiceError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing stage input.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Unparsable stage input.
    pub fn malformed(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// True for the two input errors a stage treats as "nothing to do".
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Malformed { .. })
    }
}
