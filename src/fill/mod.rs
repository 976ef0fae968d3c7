//! Sparse-to-dense completion of the transmission map.
//!
//! Accepted patches leave one scalar per window center; everything else is
//! zero, the "no estimate" sentinel. A [`Densifier`] turns that sparse map
//! into a full-resolution one. Two strategies share the contract:
//!
//! - [`LinearFill`] – separable linear interpolation between known samples,
//!   unresolved cells defaulting to full transmission.
//! - [`MrfFill`] – smoothness-regularized gradient descent guided by the
//!   source image, weighting each estimate by its published uncertainty.
//!
//! The strategy is chosen by [`FillMethod`] in the pipeline configuration.

pub mod linear;
pub mod mrf;

pub use linear::LinearFill;
pub use mrf::{MrfFill, MrfParams};

use crate::image::ImageF32;
use serde::{Deserialize, Serialize};

/// Strategy interface: complete a sparse map into a dense one.
///
/// Zero input cells mean "no estimate"; the output has no zero cells.
pub trait Densifier {
    fn fill(&self, sparse: &ImageF32) -> ImageF32;
}

/// Which densification strategy the pipeline uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    Linear,
    Mrf,
}

/// Bounds applied to accepted estimates before densification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FillParams {
    /// Lower clamp for known transmission values.
    pub clip_min: f32,
    /// Upper clamp for known transmission values.
    pub clip_max: f32,
    /// Value given to cells the linear interpolation cannot reach.
    pub fill_value: f32,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            clip_min: 0.4,
            clip_max: 0.99,
            fill_value: 1.0,
        }
    }
}

/// Clamp the known (non-zero) cells of a sparse map into
/// `[clip_min, clip_max]`. Zero sentinel cells are left untouched so they
/// remain "no estimate" for the densifier.
pub fn clip_sparse(map: &mut ImageF32, params: &FillParams) {
    for v in &mut map.data {
        if *v != 0.0 {
            *v = v.clamp(params.clip_min, params.clip_max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_preserves_the_sentinel() {
        let mut map = ImageF32::new(3, 1);
        map.set(0, 0, 0.1);
        map.set(1, 0, 0.0);
        map.set(2, 0, 1.5);
        clip_sparse(&mut map, &FillParams::default());
        assert_eq!(map.get(0, 0), 0.4);
        assert_eq!(map.get(1, 0), 0.0, "sentinel must survive clipping");
        assert_eq!(map.get(2, 0), 0.99);
    }
}
