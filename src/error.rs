//! Error taxonomy. Only `MonitorError` ever reaches a caller of a cycle;
//! per-record and per-feature failures are recovered where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole evaluation cycle.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// No meaningful comparison is possible without a reference sample.
    /// The cycle aborts and is retried on the next tick.
    #[error("baseline unavailable at {path}: {reason}")]
    BaselineUnavailable { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cycle was abandoned before committing (timeout or shutdown).
    #[error("cycle cancelled")]
    Cancelled,

    /// A tick came due while an earlier, abandoned cycle still held the
    /// monitor. The tick is skipped.
    #[error("previous cycle still running")]
    Busy,

    /// The blocking task running the cycle panicked or was aborted.
    #[error("cycle task failed: {0}")]
    Task(String),
}

impl MonitorError {
    pub fn baseline(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BaselineUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single event record was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing feature {0}")]
    MissingFeature(String),

    #[error("feature {0} is not a finite number")]
    NonNumeric(String),

    #[error("invalid {field}: {reason}")]
    InvalidMetadata { field: &'static str, reason: String },
}

/// A feature the KS test could not be run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Inconclusive {
    #[error("fewer than 2 observations")]
    TooFewPoints,

    #[error("sample contains non-finite values")]
    NonFinite,
}
