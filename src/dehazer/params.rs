//! Pipeline-wide configuration.
//!
//! Defaults carry the reference constants of the color-lines method. For
//! tuning, start with the RANSAC iteration count (quality of fits) and the
//! scan count (estimate density).

use crate::colorline::{RansacParams, ValidationParams};
use crate::fill::{FillMethod, FillParams, MrfParams};

/// Parameters controlling the whole dehazing pipeline.
#[derive(Clone, Debug)]
pub struct DehazeParams {
    /// Side length of the square estimation patches (>= 2).
    pub patch_size: usize,
    /// Number of offset passes of the sliding window.
    pub scans: usize,
    /// RANSAC fitting knobs applied per patch.
    pub ransac: RansacParams,
    /// Validity-test thresholds applied per fitted line.
    pub validation: ValidationParams,
    /// Densification strategy for the sparse transmission map.
    pub fill_method: FillMethod,
    /// Clamping and fill conventions shared by the densifiers.
    pub fill: FillParams,
    /// Knobs for the MRF densifier (used when `fill_method` is `Mrf`).
    pub mrf: MrfParams,
    /// Base RNG seed; each patch derives its own seed from this and its
    /// coordinates, keeping runs reproducible under parallel execution.
    pub base_seed: u64,
}

impl Default for DehazeParams {
    fn default() -> Self {
        Self {
            patch_size: 7,
            scans: 4,
            ransac: RansacParams::default(),
            validation: ValidationParams::default(),
            fill_method: FillMethod::Linear,
            fill: FillParams::default(),
            mrf: MrfParams::default(),
            base_seed: 0x636c646c,
        }
    }
}
