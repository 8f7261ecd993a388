//! The single-file normalization pipeline.
//!
//! Probe → gate → execute → commit for one media file. The original file
//! is only ever mutated by the committer's atomic rename, and the
//! temporary output is either committed into place or removed before the
//! pipeline returns.

mod commit;
mod executor;
pub mod gate;

pub use commit::{AtomicCommitter, CommitStats};
pub use executor::{NormalizationExecutor, TempGuard};

use std::path::Path;
use std::time::Instant;

use crate::config::Settings;
use crate::errors::{JobError, JobResultT};
use crate::models::{JobResult, MediaFile, NormalizationDecision};
use crate::probe::{LoudnessProbe, StreamInspector};
use crate::tools::ToolRunner;

/// Drives the full pipeline for single files.
///
/// Holds the resolved configuration; all external invocations go through
/// the supplied [`ToolRunner`].
pub struct FilePipeline<'a, R: ToolRunner> {
    runner: &'a R,
    settings: Settings,
}

/// Internal outcome of a pipeline run, before timing is attached.
enum Outcome {
    Skipped { reason: String },
    Processed { bytes_before: u64, bytes_after: u64 },
}

impl<'a, R: ToolRunner> FilePipeline<'a, R> {
    /// Create a pipeline with the given runner and settings.
    pub fn new(runner: &'a R, settings: Settings) -> Self {
        Self { runner, settings }
    }

    /// Process one file end to end, producing a `JobResult`.
    ///
    /// Never panics on per-file errors; every failure kind is folded into
    /// a `Failed` result so batch runs can continue.
    pub fn process(&self, path: &Path) -> JobResult {
        let started = Instant::now();

        let Some(file) = MediaFile::resolve(path) else {
            let elapsed = started.elapsed().as_secs_f64();
            tracing::error!("Unsupported container: {}", path.display());
            return JobResult::failed(path, elapsed, "unsupported container extension");
        };

        match self.run(&file) {
            Ok(Outcome::Skipped { reason }) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::info!(
                    "SKIP: '{}' is already within loudness targets ({}). Time saved: {:.2}s",
                    file.file_name(),
                    reason,
                    elapsed
                );
                JobResult::skipped(path, elapsed, reason)
            }
            Ok(Outcome::Processed {
                bytes_before,
                bytes_after,
            }) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::info!(
                    "SUCCESS: Processed '{}' in {:.2}s ({} -> {} bytes)",
                    file.file_name(),
                    elapsed,
                    bytes_before,
                    bytes_after
                );
                JobResult::processed(path, elapsed, bytes_before, bytes_after)
            }
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::error!("FAILED: '{}': {}", file.file_name(), e);
                JobResult::failed(path, elapsed, e.to_string())
            }
        }
    }

    fn run(&self, file: &MediaFile) -> JobResultT<Outcome> {
        let timeouts = self.settings.timeouts;
        let targets = self.settings.targets;

        let inspector = StreamInspector::new(self.runner, timeouts.probe());
        let info = inspector.inspect(&file.path)?;
        let stream = info
            .audio_stream(file.audio_stream)
            .ok_or_else(|| JobError::unsupported_stream(&file.path))?
            .clone();

        tracing::info!("Pass 1: Analyzing '{}'", file.file_name());
        let probe = LoudnessProbe::new(self.runner, targets, timeouts.probe());
        let measurement = probe.measure(file)?;
        tracing::info!("{}", measurement.describe("BEFORE"));

        match gate::decide(&measurement, &targets) {
            NormalizationDecision::Skip { reason } => Ok(Outcome::Skipped { reason }),
            NormalizationDecision::Normalize { measurement } => {
                tracing::info!("Pass 2: Normalizing '{}'", file.file_name());
                let executor =
                    NormalizationExecutor::new(self.runner, targets, timeouts.normalize());
                let temp = executor.execute(file, &stream, &measurement)?;

                let committer = AtomicCommitter::new(self.runner, timeouts.probe());
                let stats = committer.commit(file, temp)?;

                Ok(Outcome::Processed {
                    bytes_before: stats.bytes_before,
                    bytes_after: stats.bytes_after,
                })
            }
        }
    }
}
