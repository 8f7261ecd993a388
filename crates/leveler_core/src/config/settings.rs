//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Components receive the values they need at construction; nothing reads
//! configuration from ambient globals.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Loudness targets and the skip tolerance.
    #[serde(default)]
    pub targets: LoudnessTargets,

    /// Timeouts for the two external passes.
    #[serde(default)]
    pub timeouts: TimeoutSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Broadcast-style loudness targets (EBU R128 derived).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessTargets {
    /// Target integrated loudness, in LUFS.
    #[serde(default = "default_integrated")]
    pub integrated_lufs: f64,

    /// Target loudness range, in LU.
    #[serde(default = "default_range")]
    pub loudness_range_lu: f64,

    /// Target true peak, in dBTP.
    #[serde(default = "default_true_peak")]
    pub true_peak_dbtp: f64,

    /// Skip tolerance around the integrated target, in LU.
    ///
    /// A file whose measured integrated loudness is within this band of the
    /// target (boundary inclusive) is left untouched.
    #[serde(default = "default_tolerance")]
    pub tolerance_lu: f64,
}

fn default_integrated() -> f64 {
    -24.0
}

fn default_range() -> f64 {
    13.0
}

fn default_true_peak() -> f64 {
    -2.0
}

fn default_tolerance() -> f64 {
    0.5
}

impl Default for LoudnessTargets {
    fn default() -> Self {
        Self {
            integrated_lufs: default_integrated(),
            loudness_range_lu: default_range(),
            true_peak_dbtp: default_true_peak(),
            tolerance_lu: default_tolerance(),
        }
    }
}

/// Timeouts for external tool invocations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Deadline for the analysis pass, in seconds.
    #[serde(default = "default_probe_secs")]
    pub probe_secs: u64,

    /// Deadline for the correction pass, in seconds.
    #[serde(default = "default_normalize_secs")]
    pub normalize_secs: u64,
}

fn default_probe_secs() -> u64 {
    900
}

fn default_normalize_secs() -> u64 {
    3600
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            probe_secs: default_probe_secs(),
            normalize_secs: default_normalize_secs(),
        }
    }
}

impl TimeoutSettings {
    /// Probe timeout as a `Duration`.
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    /// Normalization timeout as a `Duration`.
    pub fn normalize(&self) -> Duration {
        Duration::from_secs(self.normalize_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Directory for the log file.
    #[serde(default = "default_log_dir")]
    pub directory: String,

    /// Default log level (overridden by RUST_LOG).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_dir() -> String {
    ".".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            level: default_log_level(),
        }
    }
}
