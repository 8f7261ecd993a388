//! Loudness statistics produced by the analysis pass.

use serde::{Deserialize, Serialize};

/// Measured loudness statistics from the first (analysis) pass.
///
/// A value of this type is only ever constructed from a fully parsed
/// loudnorm report; a partial or unparseable report never becomes a
/// measurement, so the correction pass can rely on all five fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMeasurement {
    /// Integrated loudness of the input, in LUFS.
    pub input_i: f64,
    /// True peak of the input, in dBTP.
    pub input_tp: f64,
    /// Loudness range of the input, in LU.
    pub input_lra: f64,
    /// Gating threshold of the input, in LUFS.
    pub input_thresh: f64,
    /// Target offset reported by the analysis pass, in LU.
    pub target_offset: f64,
}

impl LoudnessMeasurement {
    /// Multi-line description for log output, matching the shape of the
    /// per-file loudness report.
    pub fn describe(&self, label: &str) -> String {
        format!(
            "{} Loudness:\n  Integrated Loudness (I): {:.2} LUFS\n  Loudness Range (LRA):    {:.2} LU\n  True Peak (TP):          {:.2} dBTP",
            label, self.input_i, self.input_lra, self.input_tp
        )
    }
}
