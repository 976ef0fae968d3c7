//! Multi-pass sliding window over the source image.
//!
//! Estimating a color line at every possible window is costly and redundant
//! because neighbouring windows overlap almost entirely. The scan instead
//! tiles the image in non-overlapping patches and repeats the pass `scans`
//! times with evenly spaced phase offsets, approximating overlapping
//! coverage at a fraction of the cost. Offsets are `k · patch_size / scans`
//! for pass `k`, so passes are distinct whenever `scans <= patch_size`.

use crate::colorline::Patch;
use crate::image::RgbImageF32;

/// One record produced by the scan: the patch and its center coordinate.
#[derive(Clone, Debug)]
pub struct Window {
    pub patch: Patch,
    /// Center column in image coordinates.
    pub x: usize,
    /// Center row in image coordinates.
    pub y: usize,
}

/// Window generator over an image.
#[derive(Clone, Debug)]
pub struct SlidingWindow<'a> {
    image: &'a RgbImageF32,
    patch_size: usize,
    scans: usize,
}

impl<'a> SlidingWindow<'a> {
    pub fn new(image: &'a RgbImageF32, patch_size: usize, scans: usize) -> Self {
        Self {
            image,
            patch_size,
            scans: scans.max(1),
        }
    }

    /// Iterate over all windows of all passes, in pass-major order.
    ///
    /// Empty when the image is smaller than one patch.
    pub fn windows(&self) -> impl Iterator<Item = Window> + 'a {
        let image = self.image;
        let patch_size = self.patch_size;
        let scans = self.scans;
        let half = patch_size / 2;

        (0..scans).flat_map(move |scan| {
            let offset = scan * patch_size / scans;
            let ys = corner_range(image.h, patch_size, offset);
            ys.flat_map(move |y0| {
                let xs = corner_range(image.w, patch_size, offset);
                xs.map(move |x0| Window {
                    patch: Patch::from_image(image, x0, y0, patch_size),
                    x: x0 + half,
                    y: y0 + half,
                })
            })
        })
    }

    /// Number of windows the iteration will produce.
    pub fn count(&self) -> usize {
        (0..self.scans)
            .map(|scan| {
                let offset = scan * self.patch_size / self.scans;
                let nx = corner_range(self.image.w, self.patch_size, offset).count();
                let ny = corner_range(self.image.h, self.patch_size, offset).count();
                nx * ny
            })
            .sum()
    }
}

fn corner_range(extent: usize, patch_size: usize, offset: usize) -> impl Iterator<Item = usize> {
    // First index past the last valid corner; empty when the patch does not fit.
    let end = (extent + 1).saturating_sub(patch_size);
    (offset..end).step_by(patch_size.max(1))
}
