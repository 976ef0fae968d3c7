use colorline_dehaze::colorline::{RansacParams, ValidationParams};
use colorline_dehaze::fill::{FillMethod, FillParams, MrfParams};
use colorline_dehaze::image::io::{
    load_rgb_image, save_grayscale_f32, save_rgb_f32, write_json_file,
};
use colorline_dehaze::{DehazeParams, Dehazer};
use nalgebra::Vector3;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct DehazeToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    /// Atmospheric light, any positive scale.
    pub airlight: [f64; 3],
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub ransac: RansacConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub fill: FillConfig,
    pub output: DehazeOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub patch_size: usize,
    pub scans: usize,
    pub seed: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let d = DehazeParams::default();
        Self {
            patch_size: d.patch_size,
            scans: d.scans,
            seed: d.base_seed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    pub iterations: usize,
    pub distance_threshold: f64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        let d = RansacParams::default();
        Self {
            iterations: d.iterations,
            distance_threshold: d.distance_threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub support_fraction: f64,
    pub min_angle_deg: f64,
    pub unimodality_max: f64,
    pub intersection_max: f64,
    pub shading_min: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let d = ValidationParams::default();
        Self {
            support_fraction: d.support_fraction,
            min_angle_deg: d.min_angle_rad.to_degrees(),
            unimodality_max: d.unimodality_max,
            intersection_max: d.intersection_max,
            shading_min: d.shading_min,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub method: FillMethod,
    pub params: FillParams,
    pub mrf: MrfParams,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            method: FillMethod::Linear,
            params: FillParams::default(),
            mrf: MrfParams::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DehazeOutputConfig {
    #[serde(rename = "restored")]
    pub restored: PathBuf,
    #[serde(rename = "transmission_map")]
    pub transmission_map: Option<PathBuf>,
    #[serde(rename = "report_json")]
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<DehazeToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let image = load_rgb_image(&config.input)?;
    let airlight = Vector3::new(
        config.airlight[0],
        config.airlight[1],
        config.airlight[2],
    );

    let params = build_params(&config);
    let dehazer = Dehazer::new(params);
    let report = dehazer.process_with_diagnostics(&image, &airlight)?;

    save_rgb_f32(&report.result.restored, &config.output.restored)?;
    println!(
        "Saved restored image to {} (accepted {} patches, coverage {:.4})",
        config.output.restored.display(),
        report.result.accepted_patches,
        report.result.coverage
    );

    if let Some(path) = &config.output.transmission_map {
        save_grayscale_f32(&report.result.transmission, path)?;
        println!("Saved transmission map to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report.trace)?;
        println!("Saved pipeline report to {}", path.display());
    }
    println!(
        "Done in {:.1} ms ({} windows, {} rejected)",
        report.result.latency_ms,
        report.trace.estimation.windows,
        report.trace.estimation.rejections.total()
    );

    Ok(())
}

fn build_params(config: &DehazeToolConfig) -> DehazeParams {
    DehazeParams {
        patch_size: config.scan.patch_size,
        scans: config.scan.scans,
        ransac: RansacParams {
            iterations: config.ransac.iterations,
            distance_threshold: config.ransac.distance_threshold,
            ..RansacParams::default()
        },
        validation: ValidationParams {
            support_fraction: config.thresholds.support_fraction,
            min_angle_rad: config.thresholds.min_angle_deg.to_radians(),
            unimodality_max: config.thresholds.unimodality_max,
            intersection_max: config.thresholds.intersection_max,
            shading_min: config.thresholds.shading_min,
        },
        fill_method: config.fill.method,
        fill: config.fill.params.clone(),
        mrf: config.fill.mrf.clone(),
        base_seed: config.scan.seed,
    }
}

fn usage() -> String {
    "Usage: dehaze_tool <config.json>".to_string()
}
