//! Error types for orbweb.
//!
//! Two layers: [`InspectError`](crate::inspect::InspectError) covers failures
//! while resolving and parsing live objects (expected during a scan, handled
//! at member granularity), while [`OrbwebError`] is the crate-level type that
//! setup and CLI paths report. A scan itself never fails on a bad member,
//! only on configuration problems discovered before traversal starts.

use std::path::PathBuf;

use thiserror::Error;

use crate::inspect::InspectError;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum OrbwebError {
    /// An exclusion pattern failed to compile. Raised while rules are being
    /// installed, before any traversal runs.
    #[error("invalid exclusion pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The scan root could not be resolved to a module or package.
    #[error(transparent)]
    Inspect(#[from] InspectError),

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Generic I/O failure outside the member-level scan paths (e.g. writing
    /// a graph dump).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the graph dump failed.
    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OrbwebError>;
