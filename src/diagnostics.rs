//! Diagnostics data model exposed by the dehazer.
//!
//! [`DehazeReport`] is the main entry point returned by
//! `Dehazer::process_with_diagnostics`, bundling the compact
//! [`DehazeResult`](crate::types::DehazeResult) with a [`PipelineTrace`]
//! describing every stage the pipeline executed. The trace is serializable
//! and written to JSON by the CLI.

use crate::colorline::Rejection;
use crate::types::DehazeResult;
use serde::{Deserialize, Serialize};

/// Report returned alongside the result for tooling and debugging.
#[derive(Clone, Debug)]
pub struct DehazeReport {
    pub result: DehazeResult,
    pub trace: PipelineTrace,
}

/// Structured trace of one pipeline run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub estimation: EstimationStage,
    pub fill: FillStage,
    pub timings: TimingBreakdown,
}

/// Basic facts about the input and scan configuration.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub patch_size: usize,
    pub scans: usize,
}

/// Outcome counts of the per-patch estimation stage.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationStage {
    pub elapsed_ms: f64,
    /// Windows produced by the sliding scan.
    pub windows: usize,
    /// Windows whose color line passed every validity test.
    pub accepted: usize,
    /// Distinct map cells holding an estimate after merging passes.
    pub estimated_cells: usize,
    pub rejections: RejectionCounts,
}

/// Per-test rejection tally. Rejections are expected outcomes; the counts
/// tell which test does the gating on a given image.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionCounts {
    pub degenerate_direction: usize,
    pub insufficient_support: usize,
    pub mixed_reflectance: usize,
    pub small_intersection_angle: usize,
    pub multimodal: usize,
    pub distant_intersection: usize,
    pub transmission_out_of_range: usize,
    pub flat_shading: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::DegenerateDirection => self.degenerate_direction += 1,
            Rejection::InsufficientSupport => self.insufficient_support += 1,
            Rejection::MixedReflectance => self.mixed_reflectance += 1,
            Rejection::SmallIntersectionAngle => self.small_intersection_angle += 1,
            Rejection::Multimodal => self.multimodal += 1,
            Rejection::DistantIntersection => self.distant_intersection += 1,
            Rejection::TransmissionOutOfRange => self.transmission_out_of_range += 1,
            Rejection::FlatShading => self.flat_shading += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.degenerate_direction
            + self.insufficient_support
            + self.mixed_reflectance
            + self.small_intersection_angle
            + self.multimodal
            + self.distant_intersection
            + self.transmission_out_of_range
            + self.flat_shading
    }
}

/// Densification stage facts.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStage {
    pub elapsed_ms: f64,
    pub method: String,
    /// Map cells known before densification.
    pub known_cells: usize,
}

/// Timing entry describing a single stage of the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for the run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }
}
