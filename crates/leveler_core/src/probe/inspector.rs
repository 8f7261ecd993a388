//! Container and stream inspection using ffprobe.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::errors::{JobError, JobResultT};
use crate::tools::{CommandSpec, ToolRunner};

/// Properties of one audio stream, as reported by ffprobe.
///
/// Codec, sample format, and sample rate are carried verbatim so the
/// correction pass can re-encode the adjusted stream with its original
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStreamInfo {
    /// Absolute stream index within the container.
    pub index: usize,
    /// Codec name (e.g. "aac", "ac3").
    pub codec_name: String,
    /// Sample format (e.g. "fltp"), if reported.
    pub sample_fmt: Option<String>,
    /// Sample rate as reported (e.g. "48000"), if reported.
    pub sample_rate: Option<String>,
}

/// Container-level information needed by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ContainerInfo {
    /// Container duration in seconds, if reported.
    pub duration_secs: Option<f64>,
    /// Audio streams in container order.
    pub audio_streams: Vec<AudioStreamInfo>,
}

impl ContainerInfo {
    /// The nth audio stream (0 = first audio stream).
    pub fn audio_stream(&self, n: usize) -> Option<&AudioStreamInfo> {
        self.audio_streams.get(n)
    }
}

/// Read-only ffprobe wrapper.
pub struct StreamInspector<'a, R: ToolRunner> {
    runner: &'a R,
    timeout: Duration,
}

impl<'a, R: ToolRunner> StreamInspector<'a, R> {
    /// Create an inspector using the given runner and per-call timeout.
    pub fn new(runner: &'a R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Probe a file for format and stream information.
    pub fn inspect(&self, path: &Path) -> JobResultT<ContainerInfo> {
        let path_arg = path.display().to_string();
        let spec = CommandSpec::new(
            "ffprobe",
            [
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                path_arg.as_str(),
            ],
            self.timeout,
        );

        let output = self.runner.run(&spec).map_err(JobError::probe_tool)?;
        if !output.success() {
            return Err(JobError::probe(format!(
                "ffprobe exited with code {} for {}",
                output.exit_code,
                path.display()
            )));
        }

        let json: Value = serde_json::from_str(&output.stdout)
            .map_err(|e| JobError::probe(format!("ffprobe output not valid JSON: {}", e)))?;

        Ok(parse_container_info(&json))
    }

    /// Container duration in seconds; probe error if ffprobe reports none.
    pub fn duration_secs(&self, path: &Path) -> JobResultT<f64> {
        self.inspect(path)?.duration_secs.ok_or_else(|| {
            JobError::probe(format!("no container duration for {}", path.display()))
        })
    }
}

/// Parse ffprobe's `-show_format -show_streams` JSON.
fn parse_container_info(json: &Value) -> ContainerInfo {
    let mut info = ContainerInfo::default();

    if let Some(format) = json.get("format") {
        info.duration_secs = format
            .get("duration")
            .and_then(|d| d.as_str())
            .and_then(|s| s.parse().ok());
    }

    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in streams {
            let codec_type = stream.get("codec_type").and_then(|t| t.as_str());
            if codec_type != Some("audio") {
                continue;
            }

            let index = stream.get("index").and_then(|i| i.as_u64()).unwrap_or(0) as usize;
            let codec_name = stream
                .get("codec_name")
                .and_then(|c| c.as_str())
                .unwrap_or("")
                .to_string();
            let sample_fmt = stream
                .get("sample_fmt")
                .and_then(|f| f.as_str())
                .map(|s| s.to_string());
            let sample_rate = stream
                .get("sample_rate")
                .and_then(|r| r.as_str())
                .map(|s| s.to_string());

            info.audio_streams.push(AudioStreamInfo {
                index,
                codec_name,
                sample_fmt,
                sample_rate,
            });
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::FakeRunner;
    use crate::tools::ToolOutput;

    const FFPROBE_JSON: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac",
             "sample_fmt": "fltp", "sample_rate": "48000"},
            {"index": 2, "codec_type": "subtitle", "codec_name": "subrip"},
            {"index": 3, "codec_type": "audio", "codec_name": "ac3",
             "sample_fmt": "fltp", "sample_rate": "44100"}
        ],
        "format": {"duration": "120.500000"}
    }"#;

    #[test]
    fn parses_audio_streams_and_duration() {
        let runner = FakeRunner::ok(ToolOutput {
            exit_code: 0,
            stdout: FFPROBE_JSON.to_string(),
            stderr: String::new(),
        });
        let inspector = StreamInspector::new(&runner, Duration::from_secs(5));

        let info = inspector.inspect(Path::new("/media/a.mkv")).unwrap();
        assert_eq!(info.duration_secs, Some(120.5));
        assert_eq!(info.audio_streams.len(), 2);

        let first = info.audio_stream(0).unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.codec_name, "aac");
        assert_eq!(first.sample_rate.as_deref(), Some("48000"));

        let second = info.audio_stream(1).unwrap();
        assert_eq!(second.index, 3);
        assert_eq!(second.codec_name, "ac3");
    }

    #[test]
    fn nonzero_exit_is_probe_error() {
        let runner = FakeRunner::ok(ToolOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "no such file".to_string(),
        });
        let inspector = StreamInspector::new(&runner, Duration::from_secs(5));

        let err = inspector.inspect(Path::new("/media/a.mkv")).unwrap_err();
        assert!(matches!(err, JobError::Probe { .. }));
    }

    #[test]
    fn invalid_json_is_probe_error() {
        let runner = FakeRunner::ok(ToolOutput {
            exit_code: 0,
            stdout: "not json".to_string(),
            stderr: String::new(),
        });
        let inspector = StreamInspector::new(&runner, Duration::from_secs(5));

        let err = inspector.inspect(Path::new("/media/a.mkv")).unwrap_err();
        assert!(matches!(err, JobError::Probe { .. }));
    }

    #[test]
    fn missing_duration_is_probe_error() {
        let runner = FakeRunner::ok(ToolOutput {
            exit_code: 0,
            stdout: r#"{"streams": [], "format": {}}"#.to_string(),
            stderr: String::new(),
        });
        let inspector = StreamInspector::new(&runner, Duration::from_secs(5));

        assert!(inspector.duration_secs(Path::new("/media/a.mkv")).is_err());
    }
}
