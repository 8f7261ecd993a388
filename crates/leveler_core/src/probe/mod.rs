//! First-pass analysis: stream inspection and loudness measurement.

mod inspector;
mod loudnorm;

pub use inspector::{AudioStreamInfo, ContainerInfo, StreamInspector};
pub use loudnorm::{parse_loudnorm_report, LoudnessProbe};
