//! Data model for patches and fitted color lines.

use crate::image::RgbImageF32;
use nalgebra::Vector3;
use serde::Serialize;

/// Immutable square block of pixel color vectors cut from the source image.
///
/// Pixels are promoted to f64 once at extraction; the estimator and
/// validator run in double precision over them.
#[derive(Clone, Debug)]
pub struct Patch {
    size: usize,
    pixels: Vec<Vector3<f64>>,
}

impl Patch {
    /// Extract the `size × size` block whose top-left corner is (x0, y0).
    ///
    /// The caller guarantees the block is in bounds; the sliding window
    /// never produces out-of-range corners.
    pub fn from_image(image: &RgbImageF32, x0: usize, y0: usize, size: usize) -> Self {
        let mut pixels = Vec::with_capacity(size * size);
        for dy in 0..size {
            for dx in 0..size {
                pixels.push(image.pixel_f64(x0 + dx, y0 + dy));
            }
        }
        Self { size, pixels }
    }

    /// Build a patch directly from pixel vectors (row-major, `size × size`).
    pub fn from_pixels(size: usize, pixels: Vec<Vector3<f64>>) -> Self {
        assert_eq!(pixels.len(), size * size, "patch pixel count mismatch");
        Self { size, pixels }
    }

    /// Patch side length in pixels.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel color vector at flat index `idx` (row-major).
    #[inline]
    pub fn pixel(&self, idx: usize) -> &Vector3<f64> {
        &self.pixels[idx]
    }

    /// Iterate over all pixel color vectors in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.pixels.iter()
    }
}

/// Boolean grid marking which patch pixels lie within the support distance
/// of the fitted line. Same shape as the patch, fixed at fitting time.
#[derive(Clone, Debug)]
pub struct SupportMask {
    bits: Vec<bool>,
}

impl SupportMask {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All-false mask for `len` pixels.
    pub fn empty(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        self.bits[idx]
    }

    /// Number of supporting pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Flat indices of the supporting pixels.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }
}

/// A fitted color line: representative point, canonical-sign direction and
/// the support mask recorded for the winning RANSAC hypothesis.
///
/// Transmission is not part of this type; validation promotes a line to a
/// [`ScoredColorLine`] once the transmission is known.
#[derive(Clone, Debug)]
pub struct ColorLine {
    point: Vector3<f64>,
    direction: Vector3<f64>,
    support: SupportMask,
}

impl ColorLine {
    /// Construct a line, canonicalizing the direction sign so that the
    /// first component is non-negative. A line has no intrinsic
    /// orientation; the convention keeps dot-product tests consistent.
    pub fn new(point: Vector3<f64>, direction: Vector3<f64>, support: SupportMask) -> Self {
        let direction = if direction.x < 0.0 {
            -direction
        } else {
            direction
        };
        Self {
            point,
            direction,
            support,
        }
    }

    /// Designated always-invalid line for patches where no usable pixel
    /// pair exists (uniform color, or fewer than two pixels).
    pub fn degenerate(point: Vector3<f64>, pixel_count: usize) -> Self {
        Self {
            point,
            direction: Vector3::zeros(),
            support: SupportMask::empty(pixel_count),
        }
    }

    #[inline]
    pub fn point(&self) -> &Vector3<f64> {
        &self.point
    }

    #[inline]
    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    #[inline]
    pub fn support(&self) -> &SupportMask {
        &self.support
    }

    /// Number of pixels supporting the line.
    pub fn support_count(&self) -> usize {
        self.support.count()
    }

    /// True when the direction is (numerically) the zero vector.
    pub fn is_degenerate(&self) -> bool {
        self.direction.norm_squared() < 1e-24
    }
}

/// A validated color line with its transmission estimate and the shading
/// variability score published as the estimate's uncertainty proxy.
#[derive(Clone, Debug)]
pub struct ScoredColorLine {
    pub line: ColorLine,
    /// Transmission at the patch center, strictly inside (0, 1).
    pub transmission: f64,
    /// Shading variability score; larger means a better-conditioned
    /// estimate. Feeds the MRF densifier's data term.
    pub shading_sigma: f64,
}

/// Why a fitted line failed validation. These are expected, frequent
/// outcomes: a rejected patch contributes no estimate and the run proceeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    /// Zero-length direction; no line was actually fitted.
    DegenerateDirection,
    /// Fewer supporting pixels than the required fraction of the patch.
    InsufficientSupport,
    /// Direction has mixed component signs: not a physical reflectance.
    MixedReflectance,
    /// Line direction nearly parallel to the airlight vector.
    SmallIntersectionAngle,
    /// Support projections do not form a single-peaked distribution.
    Multimodal,
    /// Color line passes too far from the airlight line.
    DistantIntersection,
    /// Computed transmission outside the open interval (0, 1).
    TransmissionOutOfRange,
    /// Too little shading variation relative to the transmission.
    FlatShading,
}
