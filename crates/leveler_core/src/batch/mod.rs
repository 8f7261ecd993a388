//! Batch orchestration over a directory tree.
//!
//! `BatchScanner` applies the single-file pipeline across a tree;
//! `CleanupSweeper` is the independent remediation pass for temp files
//! orphaned by abnormal process termination.

mod scanner;
mod sweeper;

pub use scanner::{collect_media_files, BatchScanner};
pub use sweeper::{CleanupSweeper, SweepReport};
