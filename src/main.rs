use colorline_dehaze::image::RgbImageF32;
use colorline_dehaze::{DehazeParams, Dehazer};
use nalgebra::Vector3;

fn main() {
    // Demo stub: synthesizes a hazy gradient image and runs the pipeline
    let (w, h) = (320usize, 240usize);
    let airlight = Vector3::new(0.95f64, 1.0, 0.95);
    let a = airlight.normalize();

    let reflectance = Vector3::new(0.8f64, 0.35, 0.2).normalize();
    let t = 0.55;
    let mut hazy = RgbImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let shading = 0.35 + 0.6 * ((x + y) % 14) as f64 / 13.0;
            let px = reflectance * (t * shading) + a * (1.0 - t);
            hazy.set(x, y, [px.x as f32, px.y as f32, px.z as f32]);
        }
    }

    let dehazer = Dehazer::new(DehazeParams::default());
    match dehazer.process(&hazy, &airlight) {
        Ok(res) => println!(
            "accepted={} coverage={:.4} latency_ms={:.3}",
            res.accepted_patches, res.coverage, res.latency_ms
        ),
        Err(err) => eprintln!("Error: {err}"),
    }
}
