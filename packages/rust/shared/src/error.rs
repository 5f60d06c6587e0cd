//! Error types for sectioner.
//!
//! Library crates use [`SectionerError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.
//!
//! Structural absences (no marker regions, no trigger host, unknown section
//! id) are deliberately *not* errors — those are silent skips, logged via
//! `tracing`, so one malformed region never takes down the rest.

use std::path::PathBuf;

/// Top-level error type for all sectioner operations.
#[derive(Debug, thiserror::Error)]
pub enum SectionerError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTML or selector parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad section id, invalid option value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SectionerError>;

impl SectionerError {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SectionerError::config("marker id is empty");
        assert_eq!(err.to_string(), "config error: marker id is empty");

        let err = SectionerError::validation("section id 'a b' contains whitespace");
        assert!(err.to_string().contains("'a b'"));
    }
}
