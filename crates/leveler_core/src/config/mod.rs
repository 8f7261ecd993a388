//! Configuration for the audio leveler.
//!
//! Explicit configuration values (targets, tolerance, timeouts) are loaded
//! here and handed to components at construction.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{LoggingSettings, LoudnessTargets, Settings, TimeoutSettings};
