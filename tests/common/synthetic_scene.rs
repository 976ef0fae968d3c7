use colorline_dehaze::image::RgbImageF32;
use nalgebra::Vector3;

/// Generates a hazy scene following the imaging model exactly, together
/// with its clean counterpart.
///
/// The clean radiance is `J = s·R̂` with a sawtooth shading `s`, so every
/// patch sees a textured single-reflectance surface; the hazy image is
/// `I = t·J + (1 − t)·â`.
pub fn hazy_scene(
    width: usize,
    height: usize,
    airlight: &Vector3<f64>,
    reflectance: &Vector3<f64>,
    transmission: f64,
) -> (RgbImageF32, RgbImageF32) {
    assert!(width > 0 && height > 0, "scene dimensions must be positive");
    let a = airlight / airlight.norm();
    let r = reflectance / reflectance.norm();

    let mut hazy = RgbImageF32::new(width, height);
    let mut clean = RgbImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let s = 0.35 + 0.6 * ((x + y) % 14) as f64 / 13.0;
            let j = r * s;
            let i = j * transmission + a * (1.0 - transmission);
            clean.set(x, y, [j.x as f32, j.y as f32, j.z as f32]);
            hazy.set(x, y, [i.x as f32, i.y as f32, i.z as f32]);
        }
    }
    (hazy, clean)
}

/// Uniform-color image: every patch is degenerate and must contribute
/// nothing.
pub fn flat_scene(width: usize, height: usize, color: [f32; 3]) -> RgbImageF32 {
    let mut img = RgbImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.set(x, y, color);
        }
    }
    img
}
