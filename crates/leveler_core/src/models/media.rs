//! Media file identification (path, container format, target stream).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Container formats the leveler knows how to remux.
///
/// The variant determines the ffmpeg muxer name used when writing the
/// normalized output, since the temporary output path does not carry the
/// original extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerFormat {
    Matroska,
    Mp4,
    Avi,
    Mov,
    Asf,
    Flv,
    WebM,
}

impl ContainerFormat {
    /// File extensions eligible for processing (lowercase, no dot).
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] =
        &["mkv", "mp4", "avi", "mov", "wmv", "flv", "webm"];

    /// Resolve the container format from a file path's extension.
    ///
    /// Matching is case-insensitive. Returns `None` for unsupported or
    /// missing extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "mkv" => Some(Self::Matroska),
            "mp4" => Some(Self::Mp4),
            "avi" => Some(Self::Avi),
            "mov" => Some(Self::Mov),
            "wmv" => Some(Self::Asf),
            "flv" => Some(Self::Flv),
            "webm" => Some(Self::WebM),
            _ => None,
        }
    }

    /// The ffmpeg muxer name for this container (`-f` argument).
    pub fn muxer_name(&self) -> &'static str {
        match self {
            Self::Matroska => "matroska",
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Asf => "asf",
            Self::Flv => "flv",
            Self::WebM => "webm",
        }
    }

    /// Check whether a path carries a supported media extension.
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.muxer_name())
    }
}

/// A media file resolved for one pipeline run.
///
/// Immutable once resolved: the path, container format, and selected audio
/// stream do not change while the pipeline processes the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Absolute or relative path to the file.
    pub path: PathBuf,
    /// Container format derived from the extension.
    pub container: ContainerFormat,
    /// Index of the audio stream selected for normalization, counted among
    /// audio streams only (0 = first audio stream, the default policy).
    pub audio_stream: usize,
}

impl MediaFile {
    /// Resolve a media file from a path, selecting the first audio stream.
    ///
    /// Returns `None` if the extension is not a supported container.
    pub fn resolve(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let container = ContainerFormat::from_path(&path)?;
        Some(Self {
            path,
            container,
            audio_stream: 0,
        })
    }

    /// The file name portion of the path, for log lines.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Deterministic sibling path for the in-flight normalized output.
    ///
    /// `movie.mkv` becomes `movie.mkv.tmp` in the same directory, so the
    /// atomic rename at commit time never crosses a filesystem boundary.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_from_extension() {
        assert_eq!(
            ContainerFormat::from_path(Path::new("a.mkv")),
            Some(ContainerFormat::Matroska)
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("a.MKV")),
            Some(ContainerFormat::Matroska)
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("a.wmv")),
            Some(ContainerFormat::Asf)
        );
        assert_eq!(ContainerFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(ContainerFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn temp_path_appends_suffix() {
        let file = MediaFile::resolve("/media/show/episode.mkv").unwrap();
        assert_eq!(
            file.temp_path(),
            PathBuf::from("/media/show/episode.mkv.tmp")
        );
    }

    #[test]
    fn resolve_rejects_unsupported() {
        assert!(MediaFile::resolve("/media/notes.txt").is_none());
        assert!(MediaFile::resolve("/media/movie.mp4").is_some());
    }

    #[test]
    fn default_audio_stream_is_first() {
        let file = MediaFile::resolve("movie.webm").unwrap();
        assert_eq!(file.audio_stream, 0);
    }
}
