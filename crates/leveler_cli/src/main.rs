//! Media audio leveler - command-line entry point.
//!
//! Resolves the processing mode (media-manager hook, single file, batch,
//! or cleanup), loads configuration, and drives the core pipeline.
//! Exit code 0 on full success; 1 if any file failed or the operation
//! could not start.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use tracing::{error, info};

use leveler_core::batch::{BatchScanner, CleanupSweeper};
use leveler_core::config::ConfigManager;
use leveler_core::hooks::{self, HookTrigger};
use leveler_core::logging;
use leveler_core::models::JobStatus;
use leveler_core::pipeline::FilePipeline;
use leveler_core::tools::SystemRunner;

/// Command-line arguments for the leveler.
#[derive(Parser, Debug)]
#[command(name = "leveler")]
#[command(about = "Two-pass EBU R128 audio loudness normalization for media files")]
#[command(version)]
struct Args {
    /// Process a single media file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Run in batch mode on a directory
    #[arg(long, value_name = "DIR")]
    batch: Option<PathBuf>,

    /// Scan for and remove orphaned temporary files
    #[arg(long)]
    cleanup: bool,

    /// Path to the config file
    #[arg(long, value_name = "PATH", default_value = "leveler.toml", env = "LEVELER_CONFIG")]
    config: PathBuf,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Args::parse();

    let mut config = ConfigManager::new(&args.config);
    if let Err(e) = config.load_or_create() {
        eprintln!("Failed to load config {}: {}", args.config.display(), e);
        return 1;
    }
    let settings = config.settings().clone();

    let log_dir = PathBuf::from(&settings.logging.directory);
    let _log_guard = match logging::init_tracing(&settings.logging.level, &log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging in {}: {}", log_dir.display(), e);
            return 1;
        }
    };

    let runner = SystemRunner::new();

    // Hook environment wins over CLI flags, matching how the media
    // managers invoke post-import scripts.
    match hooks::detect_hook() {
        Some(HookTrigger::TestEvent(source)) => {
            info!("{} connection test received. Nothing to do.", source.name());
            return 0;
        }
        Some(HookTrigger::File(source, path)) => {
            info!("{} integration detected.", source.name());
            return process_single(&runner, settings, &path);
        }
        None => {}
    }

    if let Some(path) = &args.file {
        info!("Single file mode: processing '{}'", path.display());
        return process_single(&runner, settings, path);
    }

    if let Some(root) = &args.batch {
        info!("Batch mode activated for directory: {}", root.display());

        if args.cleanup {
            if let Err(e) = CleanupSweeper::sweep(root) {
                error!("Cleanup failed: {}", e);
                return 1;
            }
        }

        let scanner = BatchScanner::new(&runner, settings);
        return match scanner.run(root) {
            Ok(summary) if summary.all_succeeded() => 0,
            Ok(_) => 1,
            Err(e) => {
                error!("Batch run could not start: {}", e);
                1
            }
        };
    }

    if args.cleanup {
        return match CleanupSweeper::sweep(Path::new(".")) {
            Ok(_) => 0,
            Err(e) => {
                error!("Cleanup failed: {}", e);
                1
            }
        };
    }

    info!("No media file path provided via environment variables, --file, or --batch flag. Exiting.");
    let _ = Args::command().print_help();
    1
}

fn process_single(runner: &SystemRunner, settings: leveler_core::config::Settings, path: &Path) -> i32 {
    let pipeline = FilePipeline::new(runner, settings);
    let result = pipeline.process(path);
    match result.status {
        JobStatus::Failed => 1,
        JobStatus::Processed | JobStatus::Skipped => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_modes() {
        let args = Args::parse_from(["leveler", "--batch", "/media", "--cleanup"]);
        assert_eq!(args.batch, Some(PathBuf::from("/media")));
        assert!(args.cleanup);
        assert!(args.file.is_none());
    }

    #[test]
    fn config_has_default_path() {
        let args = Args::parse_from(["leveler"]);
        assert_eq!(args.config, PathBuf::from("leveler.toml"));
    }

    #[test]
    fn file_mode_parses() {
        let args = Args::parse_from(["leveler", "--file", "/media/a.mkv"]);
        assert_eq!(args.file, Some(PathBuf::from("/media/a.mkv")));
    }
}
