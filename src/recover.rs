//! Haze-free image recovery from a dense transmission map.

use crate::image::{ImageF32, RgbImageF32};
use nalgebra::Vector3;

/// Invert the haze imaging model per channel:
/// `restored = (image − (1 − t)·airlight) / t`.
///
/// The transmission map must be dense and zero-free; the validator's strict
/// range test plus the densifier's fill convention guarantee that for maps
/// produced by this crate. A zero or negative entry is a caller bug and
/// fails fast, as does a dimension mismatch.
pub fn recover(
    image: &RgbImageF32,
    transmission: &ImageF32,
    airlight: &Vector3<f64>,
) -> Result<RgbImageF32, String> {
    if image.w != transmission.w || image.h != transmission.h {
        return Err(format!(
            "transmission map {}x{} does not match image {}x{}",
            transmission.w, transmission.h, image.w, image.h
        ));
    }

    let a = [airlight.x as f32, airlight.y as f32, airlight.z as f32];
    let mut restored = RgbImageF32::new(image.w, image.h);
    for y in 0..image.h {
        for x in 0..image.w {
            let t = transmission.get(x, y);
            if t <= 0.0 {
                return Err(format!(
                    "non-positive transmission {t} at ({x}, {y}); the map must be zero-free"
                ));
            }
            let alpha = 1.0 - t;
            let px = image.get(x, y);
            let mut out = [0.0f32; 3];
            for c in 0..3 {
                out[c] = (px[c] - alpha * a[c]) / t;
            }
            restored.set(x, y, out);
        }
    }
    Ok(restored)
}
