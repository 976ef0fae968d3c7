//! Dehazing pipeline orchestrating scan, estimation and recovery.
//!
//! Overview
//! - Scans the image with a multi-pass sliding window.
//! - Fits a color line to every patch (seeded RANSAC) and gates it through
//!   the validity battery; accepted patches publish one transmission value
//!   at their center coordinate.
//! - Merges overlapping passes into a sparse map (highest support wins),
//!   clamps it, densifies it with the configured strategy and recovers the
//!   haze-free image.
//!
//! Modules
//! - [`params`] – pipeline-wide configuration.
//! - `pipeline` – the [`Dehazer`] implementation.
//!
//! Key Ideas
//! - Per-patch work is stateless and embarrassingly parallel; the
//!   `parallel` feature fans it out over rayon. Each patch seeds its own
//!   RNG from the patch coordinates, so results are identical in serial
//!   and parallel runs.
//! - Rejected patches simply leave map cells unresolved; the densifier's
//!   fill policy handles them. A dehaze run always completes.

pub mod params;
mod pipeline;

pub use params::DehazeParams;
pub use pipeline::Dehazer;
