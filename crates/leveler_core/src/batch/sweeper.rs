//! Cleanup sweep for orphaned temporary artifacts.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::errors::BatchError;
use crate::models::ContainerFormat;

/// Suffixes that mark an in-flight or legacy leveler artifact.
const ORPHAN_SUFFIXES: &[&str] = &[".tmp", ".normalized"];

/// Result of one cleanup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Orphaned files removed.
    pub removed: u32,
    /// Orphaned files that could not be removed (permissions etc.).
    pub failed: u32,
}

/// Scans a tree for orphaned temporary outputs left by interrupted prior
/// runs and removes them.
///
/// Only names shaped like a leveler artifact are touched: a known suffix
/// appended to a supported media file name (`movie.mkv.tmp`). Unrelated
/// `.tmp` files never match. The sweep is only safe while no pipeline is
/// running on the same tree, since an in-flight temp uses the same scheme.
pub struct CleanupSweeper;

impl CleanupSweeper {
    /// Sweep the tree under `root`.
    pub fn sweep(root: &Path) -> Result<SweepReport, BatchError> {
        fs::read_dir(root).map_err(|e| BatchError::root_unreadable(root, e))?;

        tracing::info!("Scanning '{}' for orphaned files...", root.display());

        let mut report = SweepReport::default();
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !is_orphan_artifact(path) {
                continue;
            }

            match fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!("Removed orphaned file: {}", path.display());
                    report.removed += 1;
                }
                Err(e) => {
                    tracing::error!("Error removing orphaned file {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        if report.removed == 0 && report.failed == 0 {
            tracing::info!("No orphaned files found.");
        }

        Ok(report)
    }
}

/// Whether a path names an orphaned leveler artifact.
fn is_orphan_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    ORPHAN_SUFFIXES.iter().any(|suffix| {
        name.strip_suffix(suffix)
            .is_some_and(|stem| ContainerFormat::is_supported(Path::new(stem)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn recognizes_leveler_artifacts() {
        assert!(is_orphan_artifact(Path::new("movie.mkv.tmp")));
        assert!(is_orphan_artifact(Path::new("show.mp4.normalized")));
        assert!(!is_orphan_artifact(Path::new("movie.mkv")));
        assert!(!is_orphan_artifact(Path::new("build.tmp")));
        assert!(!is_orphan_artifact(Path::new("notes.txt.tmp")));
    }

    #[test]
    fn removes_orphans_recursively() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.mkv.tmp");
        touch(&dir, "sub/b.mp4.normalized");
        let keep_media = touch(&dir, "a.mkv");
        let keep_other = touch(&dir, "sub/unrelated.tmp");

        let report = CleanupSweeper::sweep(dir.path()).unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 0);
        assert!(keep_media.exists());
        assert!(keep_other.exists());
    }

    #[test]
    fn clean_tree_reports_nothing_removed() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.mkv");

        let report = CleanupSweeper::sweep(dir.path()).unwrap();
        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let err = CleanupSweeper::sweep(Path::new("/nonexistent/root")).unwrap_err();
        assert!(matches!(err, BatchError::RootUnreadable { .. }));
    }
}
