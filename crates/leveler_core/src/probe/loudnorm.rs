//! First-pass loudness analysis using ffmpeg's loudnorm filter.
//!
//! The analysis pass runs loudnorm in measurement mode against the selected
//! audio stream and discards all output (`-f null`). ffmpeg prints the
//! loudness report as a JSON block at the end of stderr; that block is the
//! only thing this pass produces.

use std::time::Duration;

use serde_json::Value;

use crate::config::LoudnessTargets;
use crate::errors::{JobError, JobResultT};
use crate::models::{LoudnessMeasurement, MediaFile};
use crate::tools::{CommandSpec, ToolRunner};

/// Runs the read-only analysis pass over a file's selected audio stream.
pub struct LoudnessProbe<'a, R: ToolRunner> {
    runner: &'a R,
    targets: LoudnessTargets,
    timeout: Duration,
}

impl<'a, R: ToolRunner> LoudnessProbe<'a, R> {
    /// Create a probe with the given targets and per-call timeout.
    pub fn new(runner: &'a R, targets: LoudnessTargets, timeout: Duration) -> Self {
        Self {
            runner,
            targets,
            timeout,
        }
    }

    /// Measure the loudness of the file's selected audio stream.
    ///
    /// No filesystem side effects. A stuck analysis process is killed by
    /// the runner and surfaces as a probe error.
    pub fn measure(&self, file: &MediaFile) -> JobResultT<LoudnessMeasurement> {
        let filter = format!(
            "loudnorm=I={}:LRA={}:tp={}:print_format=json",
            self.targets.integrated_lufs, self.targets.loudness_range_lu, self.targets.true_peak_dbtp
        );
        let stream_map = format!("0:a:{}", file.audio_stream);
        let path_arg = file.path.display().to_string();

        let spec = CommandSpec::new(
            "ffmpeg",
            [
                "-hide_banner",
                "-nostats",
                "-i",
                path_arg.as_str(),
                "-map",
                stream_map.as_str(),
                "-af",
                filter.as_str(),
                "-f",
                "null",
                "-",
            ],
            self.timeout,
        );

        let output = self.runner.run(&spec).map_err(JobError::probe_tool)?;
        if !output.success() {
            return Err(JobError::probe(format!(
                "ffmpeg analysis pass exited with code {} for '{}'",
                output.exit_code,
                file.file_name()
            )));
        }

        parse_loudnorm_report(&output.stderr)
    }
}

/// Extract and parse the trailing loudnorm JSON report from ffmpeg stderr.
///
/// The report is the last `{...}` block in the stream. A missing block,
/// malformed JSON, or any absent field makes the whole measurement invalid.
pub fn parse_loudnorm_report(stderr: &str) -> JobResultT<LoudnessMeasurement> {
    let start = stderr
        .rfind('{')
        .ok_or_else(|| JobError::measurement_parse("no JSON block in ffmpeg output"))?;
    let end = stderr
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| JobError::measurement_parse("unterminated JSON block in ffmpeg output"))?;

    let report: Value = serde_json::from_str(&stderr[start..=end])
        .map_err(|e| JobError::measurement_parse(format!("invalid loudness JSON: {}", e)))?;

    Ok(LoudnessMeasurement {
        input_i: report_field(&report, "input_i")?,
        input_tp: report_field(&report, "input_tp")?,
        input_lra: report_field(&report, "input_lra")?,
        input_thresh: report_field(&report, "input_thresh")?,
        target_offset: report_field(&report, "target_offset")?,
    })
}

/// Read a numeric field that loudnorm reports as a JSON string.
fn report_field(report: &Value, name: &str) -> JobResultT<f64> {
    let value = report
        .get(name)
        .ok_or_else(|| JobError::measurement_parse(format!("missing field '{}'", name)))?;

    // loudnorm emits numbers as strings ("-14.0"); accept bare numbers too.
    match value {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| JobError::measurement_parse(format!("field '{}' is not a number", name))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| JobError::measurement_parse(format!("field '{}' is not a number", name))),
        _ => Err(JobError::measurement_parse(format!(
            "field '{}' has unexpected type",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::FakeRunner;
    use crate::tools::{ToolError, ToolOutput};

    const REPORT: &str = r#"
[Parsed_loudnorm_0 @ 0x55555555]
{
    "input_i" : "-14.02",
    "input_tp" : "1.50",
    "input_lra" : "10.10",
    "input_thresh" : "-24.61",
    "output_i" : "-23.90",
    "output_tp" : "-2.00",
    "output_lra" : "7.00",
    "output_thresh" : "-34.00",
    "normalization_type" : "dynamic",
    "target_offset" : "0.10"
}
"#;

    fn probe_file() -> MediaFile {
        MediaFile::resolve("/media/show/ep1.mkv").unwrap()
    }

    #[test]
    fn parses_full_report() {
        let m = parse_loudnorm_report(REPORT).unwrap();
        assert_eq!(m.input_i, -14.02);
        assert_eq!(m.input_tp, 1.5);
        assert_eq!(m.input_lra, 10.1);
        assert_eq!(m.input_thresh, -24.61);
        assert_eq!(m.target_offset, 0.1);
    }

    #[test]
    fn report_without_json_is_parse_error() {
        let err = parse_loudnorm_report("frame=100 speed=25x").unwrap_err();
        assert!(matches!(err, JobError::MeasurementParse { .. }));
    }

    #[test]
    fn partial_report_is_parse_error() {
        let partial = r#"{ "input_i" : "-14.0", "input_tp" : "1.5" }"#;
        let err = parse_loudnorm_report(partial).unwrap_err();
        assert!(matches!(err, JobError::MeasurementParse { .. }));
        assert!(err.to_string().contains("input_lra"));
    }

    #[test]
    fn garbage_number_is_parse_error() {
        let bad = r#"{ "input_i" : "loud", "input_tp" : "1.5",
            "input_lra" : "10", "input_thresh" : "-24", "target_offset" : "0" }"#;
        assert!(parse_loudnorm_report(bad).is_err());
    }

    #[test]
    fn measure_parses_stderr_report() {
        let runner = FakeRunner::new();
        runner.push_ok("", REPORT);

        let probe = LoudnessProbe::new(
            &runner,
            LoudnessTargets::default(),
            Duration::from_secs(10),
        );
        let m = probe.measure(&probe_file()).unwrap();
        assert_eq!(m.input_i, -14.02);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "ffmpeg");
        assert!(calls[0]
            .args
            .iter()
            .any(|a| a.contains("loudnorm=I=-24:LRA=13:tp=-2")));
        assert!(calls[0].args.iter().any(|a| a == "0:a:0"));
    }

    #[test]
    fn nonzero_exit_is_probe_error() {
        let runner = FakeRunner::new();
        runner.push_output(ToolOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "Invalid data found".to_string(),
        });

        let probe = LoudnessProbe::new(
            &runner,
            LoudnessTargets::default(),
            Duration::from_secs(10),
        );
        let err = probe.measure(&probe_file()).unwrap_err();
        assert!(matches!(err, JobError::Probe { .. }));
    }

    #[test]
    fn timeout_is_probe_error() {
        let runner = FakeRunner::new();
        runner.push_error(ToolError::TimedOut {
            tool: "ffmpeg".to_string(),
            timeout_secs: 10,
        });

        let probe = LoudnessProbe::new(
            &runner,
            LoudnessTargets::default(),
            Duration::from_secs(10),
        );
        let err = probe.measure(&probe_file()).unwrap_err();
        assert!(matches!(err, JobError::Probe { .. }));
    }
}
