//! Validation and atomic replacement of the original file.

use std::fs;
use std::time::Duration;

use crate::errors::{JobError, JobResultT};
use crate::models::MediaFile;
use crate::probe::StreamInspector;
use crate::tools::ToolRunner;

use super::executor::TempGuard;

/// Maximum allowed drift between original and normalized duration.
const DURATION_TOLERANCE_SECS: f64 = 0.1;

/// Byte sizes recorded around a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    /// Size of the original file before the swap.
    pub bytes_before: u64,
    /// Size of the normalized file that replaced it.
    pub bytes_after: u64,
}

/// Performs the all-or-nothing replace of the original file.
///
/// The rename is the only mutation of the original path in the whole
/// pipeline. Any observer of the filesystem sees either the fully-old or
/// fully-new file. On any failure before the swap the temp guard's drop
/// removes the temporary output and the original is left untouched.
pub struct AtomicCommitter<'a, R: ToolRunner> {
    runner: &'a R,
    probe_timeout: Duration,
}

impl<'a, R: ToolRunner> AtomicCommitter<'a, R> {
    /// Create a committer; the timeout bounds the verification probes.
    pub fn new(runner: &'a R, probe_timeout: Duration) -> Self {
        Self {
            runner,
            probe_timeout,
        }
    }

    /// Verify the temporary output and rename it over the original.
    ///
    /// Verification compares container durations of the original and the
    /// temp output; a mismatch beyond 100 ms means the correction pass
    /// produced a truncated file, and the commit is refused.
    pub fn commit(&self, file: &MediaFile, temp: TempGuard) -> JobResultT<CommitStats> {
        let bytes_before = fs::metadata(&file.path)
            .map(|m| m.len())
            .map_err(|e| JobError::atomic_commit(&file.path, format!("cannot stat original: {}", e)))?;
        let bytes_after = fs::metadata(temp.path())
            .map(|m| m.len())
            .map_err(|e| JobError::atomic_commit(&file.path, format!("cannot stat output: {}", e)))?;

        self.verify_duration(file, &temp)?;

        fs::rename(temp.path(), &file.path).map_err(|e| {
            JobError::atomic_commit(
                &file.path,
                format!("rename {} failed: {}", temp.path().display(), e),
            )
        })?;

        // The temp path is gone; nothing left for the guard to clean up.
        temp.disarm();

        Ok(CommitStats {
            bytes_before,
            bytes_after,
        })
    }

    fn verify_duration(&self, file: &MediaFile, temp: &TempGuard) -> JobResultT<()> {
        let inspector = StreamInspector::new(self.runner, self.probe_timeout);

        let original = inspector.duration_secs(&file.path).map_err(|e| {
            JobError::atomic_commit(&file.path, format!("verification probe failed: {}", e))
        })?;
        let normalized = inspector.duration_secs(temp.path()).map_err(|e| {
            JobError::atomic_commit(&file.path, format!("verification probe failed: {}", e))
        })?;

        if (original - normalized).abs() > DURATION_TOLERANCE_SECS {
            return Err(JobError::atomic_commit(
                &file.path,
                format!(
                    "duration mismatch: original {:.3}s, normalized {:.3}s",
                    original, normalized
                ),
            ));
        }
        Ok(())
    }
}
