//! Batch scan: walk a directory tree and run the pipeline per file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Settings;
use crate::errors::BatchError;
use crate::models::{BatchSummary, ContainerFormat};
use crate::pipeline::FilePipeline;
use crate::tools::ToolRunner;

/// Walks a directory tree and drives the single-file pipeline for every
/// candidate media file, sequentially.
///
/// A failure on one file is recorded in the summary and never aborts the
/// scan; only an unreadable root is fatal.
pub struct BatchScanner<'a, R: ToolRunner> {
    pipeline: FilePipeline<'a, R>,
}

impl<'a, R: ToolRunner> BatchScanner<'a, R> {
    /// Create a scanner with the given runner and settings.
    pub fn new(runner: &'a R, settings: Settings) -> Self {
        Self {
            pipeline: FilePipeline::new(runner, settings),
        }
    }

    /// Process every candidate file under `root`, returning the summary.
    pub fn run(&self, root: &Path) -> Result<BatchSummary, BatchError> {
        // Fail fast if the root itself cannot be enumerated; per-file
        // errors deeper in the tree are recorded, not fatal.
        fs::read_dir(root).map_err(|e| BatchError::root_unreadable(root, e))?;

        let files = collect_media_files(root);
        tracing::info!("Found {} media files to process.", files.len());

        let mut summary = BatchSummary::new();
        for path in &files {
            let result = self.pipeline.process(path);
            summary.record(&result);
        }

        tracing::info!("--- Batch Processing Summary ---");
        tracing::info!("Files Processed: {}", summary.processed);
        tracing::info!("Files Skipped: {}", summary.skipped);
        tracing::info!("Files Failed: {}", summary.failed);
        tracing::info!(
            "Total Time Saved by Skipping: {:.2}s",
            summary.time_saved_secs
        );
        tracing::info!("Total Processing Time: {:.2}s", summary.total_secs);

        Ok(summary)
    }
}

/// Enumerate candidate media files under `root`.
///
/// De-duplicates by canonicalized path (symlinked duplicates collapse to
/// one entry) and returns a deterministic sorted order.
pub fn collect_media_files(root: &Path) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if !ContainerFormat::is_supported(path) {
            continue;
        }
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        seen.insert(resolved);
    }

    seen.into_iter().collect()
}
