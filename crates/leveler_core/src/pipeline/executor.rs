//! Second-pass loudness correction, writing to a temporary sibling file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::LoudnessTargets;
use crate::errors::{JobError, JobResultT};
use crate::models::{LoudnessMeasurement, MediaFile};
use crate::probe::AudioStreamInfo;
use crate::tools::{CommandSpec, ToolRunner};

/// Scoped ownership of the in-flight temporary output file.
///
/// The guard removes the file on drop. The committer disarms it only after
/// the atomic rename has succeeded, so every other exit path (errors,
/// early returns, panics during the same invocation) cleans up the temp.
#[derive(Debug)]
pub struct TempGuard {
    path: PathBuf,
    armed: bool,
}

impl TempGuard {
    /// Take ownership of the temp file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    /// The guarded path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the guard without removing the file. Called once the file
    /// has been renamed into place (the temp path no longer exists).
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Runs the correction pass for one file.
///
/// All streams are remuxed into the temporary output; only the target audio
/// stream is re-encoded (with its original codec, sample format, and sample
/// rate) through loudnorm in linear mode, parameterized by the exact values
/// measured in pass one. The original file is never written to.
pub struct NormalizationExecutor<'a, R: ToolRunner> {
    runner: &'a R,
    targets: LoudnessTargets,
    timeout: Duration,
}

impl<'a, R: ToolRunner> NormalizationExecutor<'a, R> {
    /// Create an executor with the given targets and per-call timeout.
    pub fn new(runner: &'a R, targets: LoudnessTargets, timeout: Duration) -> Self {
        Self {
            runner,
            targets,
            timeout,
        }
    }

    /// Run the correction pass, returning a guard that owns the temp file.
    pub fn execute(
        &self,
        file: &MediaFile,
        stream: &AudioStreamInfo,
        measurement: &LoudnessMeasurement,
    ) -> JobResultT<TempGuard> {
        let temp_path = file.temp_path();

        // A leftover temp at this path is an orphan from an interrupted
        // prior run; it cannot belong to this invocation.
        if temp_path.exists() {
            tracing::warn!("Orphaned temp file found: {}. Deleting.", temp_path.display());
            fs::remove_file(&temp_path).map_err(|e| {
                JobError::normalization_exec(format!(
                    "cannot remove stale temp {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        let args = self.build_args(file, stream, measurement, &temp_path);
        let spec = CommandSpec::new("ffmpeg", args, self.timeout);

        let guard = TempGuard::new(&temp_path);

        let output = self
            .runner
            .run(&spec)
            .map_err(JobError::normalization_tool)?;
        if !output.success() {
            return Err(JobError::normalization_exec(format!(
                "ffmpeg correction pass exited with code {} for '{}'",
                output.exit_code,
                file.file_name()
            )));
        }

        // A zero-byte or missing output means the mux never really started.
        let size = fs::metadata(&temp_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(JobError::normalization_exec(format!(
                "correction pass produced no output for '{}'",
                file.file_name()
            )));
        }

        Ok(guard)
    }

    fn build_args(
        &self,
        file: &MediaFile,
        stream: &AudioStreamInfo,
        m: &LoudnessMeasurement,
        temp_path: &Path,
    ) -> Vec<String> {
        let filter = format!(
            "loudnorm=I={}:LRA={}:tp={}:measured_I={}:measured_LRA={}:measured_tp={}:measured_thresh={}:offset={}:linear=true",
            self.targets.integrated_lufs,
            self.targets.loudness_range_lu,
            self.targets.true_peak_dbtp,
            m.input_i,
            m.input_lra,
            m.input_tp,
            m.input_thresh,
            m.target_offset
        );

        let n = file.audio_stream;
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-nostats".into(),
            "-i".into(),
            file.path.display().to_string(),
            "-map".into(),
            "0".into(),
            "-c".into(),
            "copy".into(),
            // Only the target audio stream is touched; everything else is
            // remuxed verbatim by the -c copy above.
            format!("-filter:a:{}", n),
            filter,
            format!("-c:a:{}", n),
            stream.codec_name.clone(),
        ];

        if let Some(fmt) = &stream.sample_fmt {
            args.push(format!("-sample_fmt:a:{}", n));
            args.push(fmt.clone());
        }
        if let Some(rate) = &stream.sample_rate {
            args.push(format!("-ar:a:{}", n));
            args.push(rate.clone());
        }

        args.extend([
            "-strict".into(),
            "-2".into(),
            "-f".into(),
            file.container.muxer_name().into(),
            temp_path.display().to_string(),
        ]);

        args
    }
}
