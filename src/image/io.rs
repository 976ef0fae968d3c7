//! I/O helpers for color/grayscale images and JSON.
//!
//! - `load_rgb_image`: read a PNG/JPEG/etc. into an owned `[0,1]` float image.
//! - `save_rgb_f32`: write an `RgbImageF32` to an 8-bit color PNG.
//! - `save_grayscale_f32`: write an `ImageF32` (e.g. a transmission map) to a
//!   grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageView, RgbImageF32};
use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to `[0,1]` float RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImageF32, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    let mut out = RgbImageF32::new(w, h);
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b] = px.0;
        out.set(
            x as usize,
            y as usize,
            [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        );
    }
    Ok(out)
}

/// Save a float color image to an 8-bit PNG, clamping channels into [0, 1].
pub fn save_rgb_f32(image: &RgbImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        let row = image.row(y);
        for (x, px) in row.iter().enumerate() {
            let quantized = px.map(|v| (v * 255.0).clamp(0.0, 255.0) as u8);
            out.put_pixel(x as u32, y as u32, Rgb(quantized));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save a float image to a grayscale PNG, clamping values in [0, 255].
pub fn save_grayscale_f32(image: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        let row = image.row(y);
        for (x, &px) in row.iter().enumerate() {
            let v = (px * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
