//! Per-patch color-line estimation.
//!
//! Overview
//! - A patch of a hazy image is modelled as a line in RGB space: the line
//!   direction follows the dominant surface reflectance, the offset along
//!   the atmospheric-light direction encodes transmission.
//! - [`estimator`] fits the line with a seeded RANSAC over pixel pairs.
//! - [`validator`] gates the fit through a battery of statistical tests and
//!   computes the transmission from the line/airlight geometry.
//!
//! Modules
//! - [`params`] – RANSAC and validation thresholds as named configuration.
//! - [`line`] – patch and line data model, including the rejection taxonomy.
//! - [`estimator`] – robust line fitting.
//! - [`validator`] – quality gate and transmission model.
//!
//! Key Ideas
//! - A line has no intrinsic orientation; directions are canonicalized so
//!   the first component is non-negative, keeping downstream dot-product
//!   tests consistent.
//! - Rejections are frequent, expected outcomes, not errors: a patch that
//!   fails any test simply contributes no transmission estimate.
//! - The progression fitted → scored is expressed with two types
//!   ([`ColorLine`] and [`ScoredColorLine`]) so an unset transmission cannot
//!   be read by accident.

pub mod estimator;
pub mod line;
pub mod params;
pub mod validator;

pub use line::{ColorLine, Patch, Rejection, ScoredColorLine, SupportMask};
pub use params::{RansacParams, ValidationParams};
