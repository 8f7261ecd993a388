//! Data models for the audio leveler.
//!
//! This module contains the core data structures used throughout the crate:
//! - Media identification (container format, target audio stream)
//! - Loudness measurements from the analysis pass
//! - Per-file job results and the batch summary accumulator

mod jobs;
mod measurement;
mod media;

pub use jobs::{BatchSummary, JobResult, JobStatus, NormalizationDecision};
pub use measurement::LoudnessMeasurement;
pub use media::{ContainerFormat, MediaFile};
