//! Owned 3-channel f32 image in row-major layout, one `[f32; 3]` per pixel.
//!
//! Channel values are expected in [0, 1]. Storage stays in f32; the
//! estimator promotes pixels to f64 vectors when a patch is extracted.
use nalgebra::Vector3;

#[derive(Clone, Debug)]
pub struct RgbImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of pixels between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<[f32; 3]>,
}

impl RgbImageF32 {
    /// Construct a black image of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![[0.0; 3]; w * h],
        }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    #[inline]
    /// Get the pixel at (x, y).
    pub fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.data[self.idx(x, y)]
    }

    #[inline]
    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: usize, y: usize, px: [f32; 3]) {
        let i = self.idx(x, y);
        self.data[i] = px;
    }

    #[inline]
    /// Pixel at (x, y) promoted to an f64 color vector.
    pub fn pixel_f64(&self, x: usize, y: usize) -> Vector3<f64> {
        let [r, g, b] = self.get(x, y);
        Vector3::new(r as f64, g as f64, b as f64)
    }
}

impl crate::image::traits::ImageView for RgbImageF32 {
    type Pixel = [f32; 3];

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[[f32; 3]] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[[f32; 3]]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

impl crate::image::traits::ImageViewMut for RgbImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [[f32; 3]] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}
