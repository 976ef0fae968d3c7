//! Dehazer driving the color-lines pipeline end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use colorline_dehaze::{DehazeParams, Dehazer};
//! use colorline_dehaze::image::RgbImageF32;
//! use nalgebra::Vector3;
//!
//! # fn example(hazy: RgbImageF32) -> Result<(), String> {
//! let dehazer = Dehazer::new(DehazeParams::default());
//! let result = dehazer.process(&hazy, &Vector3::new(0.95, 1.0, 0.95))?;
//! println!("accepted={} coverage={:.3}", result.accepted_patches, result.coverage);
//! # Ok(())
//! # }
//! ```
use super::params::DehazeParams;
use crate::colorline::{estimator, validator, Rejection};
use crate::diagnostics::{
    DehazeReport, EstimationStage, FillStage, InputDescriptor, PipelineTrace, RejectionCounts,
    TimingBreakdown,
};
use crate::fill::{clip_sparse, Densifier, FillMethod, LinearFill, MrfFill};
use crate::image::{ImageF32, RgbImageF32};
use crate::recover::recover;
use crate::types::DehazeResult;
use crate::window::{SlidingWindow, Window};
use log::debug;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pipeline front-end: scan, per-patch estimation, merge, densify, recover.
pub struct Dehazer {
    params: DehazeParams,
}

/// One accepted estimate, ready to be merged into the sparse map.
struct PatchEstimate {
    x: usize,
    y: usize,
    transmission: f32,
    sigma: f32,
    support: usize,
}

impl Dehazer {
    /// Create a dehazer with the supplied parameters.
    pub fn new(params: DehazeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DehazeParams {
        &self.params
    }

    /// Run the pipeline, returning the compact result.
    pub fn process(
        &self,
        image: &RgbImageF32,
        airlight: &Vector3<f64>,
    ) -> Result<DehazeResult, String> {
        self.process_with_diagnostics(image, airlight)
            .map(|report| report.result)
    }

    /// Run the pipeline and return both the result and a detailed report.
    ///
    /// Malformed input (empty image, image smaller than one patch, a
    /// non-positive airlight) is a contract error and fails fast.
    /// Per-patch statistical rejections never abort the run.
    pub fn process_with_diagnostics(
        &self,
        image: &RgbImageF32,
        airlight: &Vector3<f64>,
    ) -> Result<DehazeReport, String> {
        let params = &self.params;
        self.check_contract(image, airlight)?;
        let airlight_unit = airlight / airlight.norm();

        debug!(
            "Dehazer::process start w={} h={} patch={} scans={}",
            image.w, image.h, params.patch_size, params.scans
        );
        let total_start = Instant::now();

        let scan_start = Instant::now();
        let windows: Vec<Window> =
            SlidingWindow::new(image, params.patch_size, params.scans)
                .windows()
                .collect();
        let scan_ms = scan_start.elapsed().as_secs_f64() * 1000.0;

        let estimate_start = Instant::now();
        let outcomes = self.estimate_windows(&windows, &airlight_unit);
        let estimation_ms = estimate_start.elapsed().as_secs_f64() * 1000.0;

        let mut sparse = ImageF32::new(image.w, image.h);
        let mut sigma_map = ImageF32::new(image.w, image.h);
        let mut support_map = vec![0u32; image.w * image.h];
        let mut rejections = RejectionCounts::default();
        let mut accepted = 0usize;
        for outcome in outcomes {
            match outcome {
                Ok(est) => {
                    accepted += 1;
                    // Overlapping passes compete for one cell: the estimate
                    // with the larger support wins, ties keep the earlier
                    // pass. Merging is sequential over an order-preserving
                    // collect, so the rule is deterministic either way the
                    // patches were scheduled.
                    let idx = est.y * image.w + est.x;
                    if support_map[idx] < est.support as u32 {
                        support_map[idx] = est.support as u32;
                        sparse.set(est.x, est.y, est.transmission);
                        sigma_map.set(est.x, est.y, est.sigma);
                    }
                }
                Err(rejection) => rejections.record(rejection),
            }
        }
        let estimated_cells = sparse.count_nonzero();
        debug!(
            "Dehazer::process windows={} accepted={} cells={} rejected={}",
            windows.len(),
            accepted,
            estimated_cells,
            rejections.total()
        );

        clip_sparse(&mut sparse, &params.fill);

        let fill_start = Instant::now();
        let densifier: Box<dyn Densifier> = match params.fill_method {
            FillMethod::Linear => Box::new(LinearFill::new(params.fill.fill_value)),
            FillMethod::Mrf => {
                Box::new(MrfFill::new(params.mrf.clone(), sigma_map.clone(), image))
            }
        };
        let dense = densifier.fill(&sparse);
        let fill_ms = fill_start.elapsed().as_secs_f64() * 1000.0;

        let recover_start = Instant::now();
        let restored = recover(image, &dense, &airlight_unit)?;
        let recover_ms = recover_start.elapsed().as_secs_f64() * 1000.0;

        let latency = total_start.elapsed().as_secs_f64() * 1000.0;
        let coverage = estimated_cells as f32 / (image.w * image.h) as f32;
        debug!(
            "Dehazer::process done coverage={:.4} latency_ms={:.3}",
            coverage, latency
        );

        let mut timings = TimingBreakdown::with_total(latency);
        timings.push("scan", scan_ms);
        timings.push("estimation", estimation_ms);
        timings.push("fill", fill_ms);
        timings.push("recovery", recover_ms);

        let trace = PipelineTrace {
            input: InputDescriptor {
                width: image.w,
                height: image.h,
                patch_size: params.patch_size,
                scans: params.scans,
            },
            estimation: EstimationStage {
                elapsed_ms: estimation_ms,
                windows: windows.len(),
                accepted,
                estimated_cells,
                rejections,
            },
            fill: FillStage {
                elapsed_ms: fill_ms,
                method: format!("{:?}", params.fill_method).to_lowercase(),
                known_cells: estimated_cells,
            },
            timings,
        };

        Ok(DehazeReport {
            result: DehazeResult {
                transmission: dense,
                restored,
                accepted_patches: accepted,
                coverage,
                latency_ms: latency,
            },
            trace,
        })
    }

    fn check_contract(&self, image: &RgbImageF32, airlight: &Vector3<f64>) -> Result<(), String> {
        let params = &self.params;
        if params.patch_size < 2 {
            return Err(format!("patch_size must be >= 2, got {}", params.patch_size));
        }
        if image.w == 0 || image.h == 0 {
            return Err("input image is empty".to_string());
        }
        if image.w < params.patch_size || image.h < params.patch_size {
            return Err(format!(
                "image {}x{} is smaller than one {}x{} patch",
                image.w, image.h, params.patch_size, params.patch_size
            ));
        }
        if airlight.iter().any(|&c| !c.is_finite() || c <= 0.0) {
            return Err(format!("airlight must have positive components, got {airlight:?}"));
        }
        Ok(())
    }

    /// Fit and validate every window. Each patch owns an RNG seeded from
    /// its coordinates, so serial and parallel runs agree exactly.
    fn estimate_windows(
        &self,
        windows: &[Window],
        airlight_unit: &Vector3<f64>,
    ) -> Vec<Result<PatchEstimate, Rejection>> {
        #[cfg(feature = "parallel")]
        {
            windows
                .par_iter()
                .map(|w| self.estimate_window(w, airlight_unit))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            windows
                .iter()
                .map(|w| self.estimate_window(w, airlight_unit))
                .collect()
        }
    }

    fn estimate_window(
        &self,
        window: &Window,
        airlight_unit: &Vector3<f64>,
    ) -> Result<PatchEstimate, Rejection> {
        let seed = per_patch_seed(self.params.base_seed, window.x, window.y);
        let mut rng = StdRng::seed_from_u64(seed);
        let line = estimator::estimate(&window.patch, &self.params.ransac, &mut rng);
        let scored = validator::validate(
            &line,
            &window.patch,
            airlight_unit,
            &self.params.validation,
        )?;
        Ok(PatchEstimate {
            x: window.x,
            y: window.y,
            transmission: scored.transmission as f32,
            sigma: scored.shading_sigma as f32,
            support: scored.line.support_count(),
        })
    }
}

#[inline]
fn per_patch_seed(base: u64, x: usize, y: usize) -> u64 {
    let coord = ((y as u64) << 32) ^ (x as u64);
    base.wrapping_add(coord).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}
