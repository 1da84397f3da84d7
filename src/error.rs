//! Custom error types and result handling for Tsutsumi operations.
//!
//! This module defines the error handling system used throughout Tsutsumi.
//! All operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`.
//!
use std::path::PathBuf;

/// Type alias for Results with Tsutsumi errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Tsutsumi operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Regular expression parsing errors
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    ConfigBuilder(#[from] crate::tsutsumi::TsutsumiConfigBuilderError),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for a rename rule whose pattern or replacement is unusable
    #[error("Malformed rename rule: {0}")]
    MalformedRule(String),
    /// Error listing a directory while enumerating jobs
    #[error("Cannot list '{path:?}' during planning: {source}")]
    Planning {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Error while writing an archive; the failed job's partial output has been removed
    #[error("Failed to build archive '{destination:?}': {detail}")]
    Build { destination: PathBuf, detail: String },
    /// None of the candidate extraction tools could be found on the system
    #[error("No extraction tool available (tried: {0})")]
    ToolNotFound(String),
    /// Non-zero exit from the extraction subprocess
    #[error("Extraction tool '{tool}' failed on '{archive:?}' (exit code {code:?})")]
    ExternalTool {
        tool: String,
        archive: PathBuf,
        code: Option<i32>,
    },
    /// Error for resources that couldn't be found (e.g., source root)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

// Basic From<String> conversion for convenience
impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
