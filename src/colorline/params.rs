//! Parameter types for the color-line estimator and validator.
//!
//! All thresholds the reference literature hardcodes are named configuration
//! here, with one canonical default each. Where the field documentation
//! mentions a relaxed variant, that value is an alternative used by some
//! deployments of the same algorithm; pick per image source.

/// Knobs for the RANSAC line fit run on every patch.
#[derive(Clone, Debug)]
pub struct RansacParams {
    /// Number of pixel-pair hypotheses evaluated per patch.
    pub iterations: usize,
    /// Perpendicular distance below which a pixel supports a candidate line.
    pub distance_threshold: f64,
    /// How often a sampled pair with identical colors is re-drawn before the
    /// iteration is abandoned.
    pub max_degenerate_retries: usize,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            iterations: 30,
            distance_threshold: 0.02,
            max_degenerate_retries: 10,
        }
    }
}

/// Thresholds for the color-line validity tests.
///
/// Every test must pass for a patch to contribute a transmission estimate.
#[derive(Clone, Debug)]
pub struct ValidationParams {
    /// Minimum fraction of patch pixels that must support the fitted line.
    pub support_fraction: f64,
    /// Minimum angle (radians) between the line direction and the airlight.
    /// Shallower intersections make the transmission estimate unstable.
    pub min_angle_rad: f64,
    /// Maximum absolute mean cosine score of the rescaled support
    /// projections. Relaxed variant: 0.14.
    pub unimodality_max: f64,
    /// Maximum closest-approach distance between the color line and the
    /// airlight line. Relaxed variant: 0.1.
    pub intersection_max: f64,
    /// Minimum shading variability score (support offset deviation divided
    /// by transmission). Relaxed variant: 0.01.
    pub shading_min: f64,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            support_fraction: 0.4,
            min_angle_rad: std::f64::consts::PI / 12.0,
            unimodality_max: 0.07,
            intersection_max: 0.05,
            shading_min: 0.02,
        }
    }
}
