//! Job outcomes and batch aggregation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::measurement::LoudnessMeasurement;

/// Outcome of the skip/normalize gate for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationDecision {
    /// The file is already compliant; carries a human-readable reason.
    Skip { reason: String },
    /// The file needs correction, parameterized by the measured values.
    Normalize { measurement: LoudnessMeasurement },
}

impl NormalizationDecision {
    /// Build a skip decision.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }

    /// Build a normalize decision from a valid measurement.
    pub fn normalize(measurement: LoudnessMeasurement) -> Self {
        Self::Normalize { measurement }
    }

    /// Whether this decision triggers the correction pass.
    pub fn needs_normalization(&self) -> bool {
        matches!(self, Self::Normalize { .. })
    }
}

/// Final status of one file's pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// The correction pass ran and the file was replaced.
    Processed,
    /// The file was already within tolerance; nothing was written.
    Skipped,
    /// The pipeline failed; the original file is untouched.
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed => f.write_str("processed"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of one file's pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// The file that was attempted.
    pub path: PathBuf,
    /// Final status.
    pub status: JobStatus,
    /// When the attempt finished (RFC 3339, local time).
    pub completed_at: String,
    /// Reason string for skips, error string for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Wall-clock duration of the attempt, in seconds.
    pub duration_secs: f64,
    /// File size before normalization, if the file was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_before: Option<u64>,
    /// File size after normalization, if the file was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_after: Option<u64>,
}

impl JobResult {
    /// Build a processed result with before/after byte sizes.
    pub fn processed(
        path: impl Into<PathBuf>,
        duration_secs: f64,
        bytes_before: u64,
        bytes_after: u64,
    ) -> Self {
        Self {
            path: path.into(),
            status: JobStatus::Processed,
            completed_at: chrono::Local::now().to_rfc3339(),
            detail: None,
            duration_secs,
            bytes_before: Some(bytes_before),
            bytes_after: Some(bytes_after),
        }
    }

    /// Build a skipped result with the gate's reason.
    pub fn skipped(path: impl Into<PathBuf>, duration_secs: f64, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: JobStatus::Skipped,
            completed_at: chrono::Local::now().to_rfc3339(),
            detail: Some(reason.into()),
            duration_secs,
            bytes_before: None,
            bytes_after: None,
        }
    }

    /// Build a failed result carrying the error description.
    pub fn failed(path: impl Into<PathBuf>, duration_secs: f64, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: JobStatus::Failed,
            completed_at: chrono::Local::now().to_rfc3339(),
            detail: Some(error.into()),
            duration_secs,
            bytes_before: None,
            bytes_after: None,
        }
    }
}

/// Running aggregate over a batch run.
///
/// Append-only: the orchestrating thread folds each `JobResult` in with
/// `record()` as it completes. Skipped files contribute their analysis
/// duration to `time_saved_secs` as an estimate of the correction time the
/// gate avoided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Files that were normalized and replaced.
    pub processed: u32,
    /// Files already within tolerance.
    pub skipped: u32,
    /// Files whose pipeline failed.
    pub failed: u32,
    /// Estimated time saved by skipping compliant files, in seconds.
    pub time_saved_secs: f64,
    /// Total wall-clock time across all attempts, in seconds.
    pub total_secs: f64,
}

impl BatchSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one job result into the aggregate.
    pub fn record(&mut self, result: &JobResult) {
        match result.status {
            JobStatus::Processed => self.processed += 1,
            JobStatus::Skipped => {
                self.skipped += 1;
                self.time_saved_secs += result.duration_secs;
            }
            JobStatus::Failed => self.failed += 1,
        }
        self.total_secs += result.duration_secs;
    }

    /// Total number of files attempted.
    pub fn attempted(&self) -> u32 {
        self.processed + self.skipped + self.failed
    }

    /// True if no file failed.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} skipped={} failed={} time_saved={:.2}s total={:.2}s",
            self.processed, self.skipped, self.failed, self.time_saved_secs, self.total_secs
        )
    }
}
