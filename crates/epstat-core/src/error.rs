//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout epstat. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - File-level failures carry the offending path.
//! - Line-level failures carry path and 1-based line number and are
//!   never fatal to a scan; they are collected as [`LineError`].
//! - Canonicalization rejects values that have no JSON representation
//!   instead of coercing them to text.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for epstat.
#[derive(Error, Debug)]
pub enum EpstatError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A file could not be opened or read.
    #[error("io error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed or holds invalid values.
    #[error("configuration error: {0}")]
    Config(String),

    /// A whole-file JSON document (not JSONL) failed to parse.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The file being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// An outcome source argument is not `NETWORK:PATH[:OFFSET]`.
    #[error("invalid outcome source {0:?}: expected NETWORK:PATH[:OFFSET]")]
    InvalidSource(String),

    /// CSV reading or writing failed.
    #[error("csv error: {0}")]
    Csv(String),
}

impl EpstatError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Error during canonical key construction.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value cannot be represented as JSON (e.g. a map with
    /// non-string keys).
    #[error("unsupported value for canonicalization: {0}")]
    UnsupportedType(#[from] serde_json::Error),

    /// JCS rendering of the canonical form failed.
    #[error("canonical rendering failed: {0}")]
    Rendering(String),
}

/// A single line of a JSONL file that could not be turned into a record.
///
/// Line errors are reported and skipped; they never abort the scan of the
/// remaining lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} line {line} in {}: {message}", path.display())]
pub struct LineError {
    /// File the line belongs to.
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Whether the line failed JSON parsing or record decoding.
    pub kind: LineErrorKind,
    /// Human-readable cause.
    pub message: String,
}

/// Stage at which a line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineErrorKind {
    /// The line is not valid JSON.
    Parse,
    /// The line is valid JSON but not a usable episode record.
    Processing,
}

impl std::fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => f.write_str("error parsing"),
            Self::Processing => f.write_str("error processing"),
        }
    }
}
