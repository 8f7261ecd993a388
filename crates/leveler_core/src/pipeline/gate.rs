//! The skip/normalize decision gate.

use crate::config::LoudnessTargets;
use crate::models::{LoudnessMeasurement, NormalizationDecision};

/// Decide whether a measured file needs the correction pass.
///
/// Pure function, no I/O. A file is compliant when its integrated loudness
/// is within `tolerance_lu` of the target AND its loudness range does not
/// exceed the target range. The tolerance boundary itself counts as
/// compliant: a measurement exactly `tolerance_lu` from the target skips.
pub fn decide(
    measurement: &LoudnessMeasurement,
    targets: &LoudnessTargets,
) -> NormalizationDecision {
    let deviation = (measurement.input_i - targets.integrated_lufs).abs();

    if deviation <= targets.tolerance_lu && measurement.input_lra <= targets.loudness_range_lu {
        NormalizationDecision::skip(format!(
            "integrated {:.2} LUFS within {:.1} LU of target {:.1}",
            measurement.input_i, targets.tolerance_lu, targets.integrated_lufs
        ))
    } else {
        NormalizationDecision::normalize(*measurement)
    }
}
