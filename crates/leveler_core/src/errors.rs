//! Error types for the normalization pipeline.
//!
//! `JobError` covers the five per-file failure kinds; all of them are
//! recoverable at the batch level. `BatchError` is the one fatal case:
//! the root path itself cannot be enumerated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tools::ToolError;

/// Per-file pipeline error. Recorded on the `JobResult` and never aborts
/// a batch run.
#[derive(Error, Debug)]
pub enum JobError {
    /// The analysis pass could not be run or exited non-zero.
    #[error("Analysis pass failed: {message}")]
    Probe { message: String },

    /// The analysis pass succeeded but its loudness report was not parseable.
    #[error("Failed to parse loudness report: {message}")]
    MeasurementParse { message: String },

    /// The correction pass failed, timed out, or produced unusable output.
    #[error("Correction pass failed: {message}")]
    NormalizationExec { message: String },

    /// Verification or the atomic replace of the original file failed.
    #[error("Commit failed for {path}: {message}")]
    AtomicCommit { path: PathBuf, message: String },

    /// The file has no eligible audio stream.
    #[error("No eligible audio stream in {path}")]
    UnsupportedStream { path: PathBuf },
}

impl JobError {
    /// Create a probe error.
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    /// Create a measurement parse error.
    pub fn measurement_parse(message: impl Into<String>) -> Self {
        Self::MeasurementParse {
            message: message.into(),
        }
    }

    /// Create a normalization execution error.
    pub fn normalization_exec(message: impl Into<String>) -> Self {
        Self::NormalizationExec {
            message: message.into(),
        }
    }

    /// Create an atomic commit error.
    pub fn atomic_commit(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AtomicCommit {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported stream error.
    pub fn unsupported_stream(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedStream { path: path.into() }
    }

    /// Map a tool invocation failure into a probe error.
    pub fn probe_tool(err: ToolError) -> Self {
        Self::probe(err.to_string())
    }

    /// Map a tool invocation failure into a normalization error.
    pub fn normalization_tool(err: ToolError) -> Self {
        Self::normalization_exec(err.to_string())
    }
}

/// Result type for per-file pipeline operations.
pub type JobResultT<T> = Result<T, JobError>;

/// Fatal batch-level error.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The root directory cannot be enumerated at all.
    #[error("Cannot enumerate {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    /// Create a root unreadable error.
    pub fn root_unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::RootUnreadable {
            path: path.into(),
            source,
        }
    }
}
