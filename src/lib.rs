#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod dehazer;
pub mod diagnostics;
pub mod image;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod colorline;
pub mod fill;
pub mod geometry;
pub mod recover;
pub mod window;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline + results.
pub use crate::dehazer::{DehazeParams, Dehazer};
pub use crate::types::DehazeResult;

// High-level diagnostics returned by the pipeline.
pub use crate::diagnostics::{DehazeReport, PipelineTrace};

// Per-patch model types that show up in public signatures.
pub use crate::colorline::{ColorLine, Rejection, ScoredColorLine};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use colorline_dehaze::prelude::*;
/// use nalgebra::Vector3;
///
/// # fn main() -> Result<(), String> {
/// let hazy = RgbImageF32::new(320, 240);
/// let dehazer = Dehazer::new(DehazeParams::default());
/// let result = dehazer.process(&hazy, &Vector3::new(0.95, 1.0, 0.95))?;
/// println!("coverage={:.3}", result.coverage);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, RgbImageF32};
    pub use crate::{DehazeParams, DehazeResult, Dehazer};
}
