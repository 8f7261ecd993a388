//! Media-manager hook detection.
//!
//! When invoked as a post-import hook by Sonarr or Radarr, the file to
//! process arrives in a tool-specific environment variable instead of a
//! CLI flag. A "Test" event (fired when the user checks the connection)
//! short-circuits into a no-op acknowledgment.

use std::env;
use std::path::PathBuf;

/// Which media manager fired the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSource {
    Sonarr,
    Radarr,
}

impl HookSource {
    /// Display name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sonarr => "Sonarr",
            Self::Radarr => "Radarr",
        }
    }
}

/// A recognized hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookTrigger {
    /// A connection-test event; acknowledge and exit without processing.
    TestEvent(HookSource),
    /// A real import event carrying the file to process.
    File(HookSource, PathBuf),
}

/// Detect a hook invocation from the process environment.
pub fn detect_hook() -> Option<HookTrigger> {
    detect_hook_from(|name| env::var(name).ok())
}

/// Hook detection against an arbitrary variable lookup (testable).
///
/// Test events are checked first so a connection test never enters the
/// pipeline even if a path variable is also present.
pub fn detect_hook_from(var: impl Fn(&str) -> Option<String>) -> Option<HookTrigger> {
    for (source, event_var, path_var) in [
        (HookSource::Sonarr, "sonarr_eventtype", "sonarr_episodefile_path"),
        (HookSource::Radarr, "radarr_eventtype", "radarr_moviefile_path"),
    ] {
        if var(event_var).as_deref() == Some("Test") {
            return Some(HookTrigger::TestEvent(source));
        }
        if let Some(path) = var(path_var).filter(|p| !p.is_empty()) {
            return Some(HookTrigger::File(source, PathBuf::from(path)));
        }
    }
    None
}
