//! Core library for the media audio leveler.
//!
//! Normalizes the integrated loudness of audio tracks inside media files
//! to broadcast targets (-24 LUFS / 13 LU / -2.0 dBTP) using ffmpeg's
//! two-pass loudnorm workflow, leaving every other stream untouched.
//! Contains all business logic with no CLI dependencies.

pub mod batch;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod probe;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
