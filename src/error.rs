//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`ProviderError`], [`ConfigError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use album_links::error::{Error, Result};
//!
//! fn read_records(path: &Path) -> Result<Vec<AlbumRecord>> {
//!     let text = std::fs::read_to_string(path)?; // IO errors auto-convert
//!     Ok(serde_json::from_str(&text)?)           // JSON errors auto-convert
//! }
//! ```

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::enrichment::ProviderError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Provider error that stops the run (startup credential check)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Input file does not hold a list of album records
    #[error("Invalid input {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Json(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/path/to/albums.json");
        assert!(err.to_string().contains("/path/to/albums.json"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::from(ProviderError::Auth("invalid_client".into()))
            .context("while checking credentials");
        let msg = err.to_string();
        assert!(msg.contains("while checking credentials"));
        assert!(msg.contains("invalid_client"));
    }

    #[test]
    fn test_invalid_input_error() {
        let err = Error::invalid_input("/data/albums.json", "expected a JSON array");
        let msg = err.to_string();
        assert!(msg.contains("albums.json"));
        assert!(msg.contains("expected a JSON array"));
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), serde_json::Error> =
            serde_json::from_str::<()>("not json");
        let with_ctx = result.with_context("reading albums.json");
        assert!(with_ctx.unwrap_err().to_string().contains("reading albums.json"));
    }
}
