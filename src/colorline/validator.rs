//! Color-line quality gate and transmission model.
//!
//! A fitted line passes through seven tests before its transmission is
//! published. All tests must pass; evaluation short-circuits with the
//! cheapest and most discriminative checks first. Transmission is computed
//! as soon as the intersection-angle test has ruled out a near-parallel
//! geometry, because the later tests depend on it.
//!
//! The transmission formula is the closed-form intersection of the color
//! line with the atmospheric-light line in the haze imaging model
//! `I = t·shading·R + (1−t)·A`: the airlight coefficient of the line
//! offset is `1 − t`.

use super::line::{ColorLine, Patch, Rejection, ScoredColorLine};
use super::params::ValidationParams;
use crate::geometry::skew_line_closest_distance;
use nalgebra::Vector3;

const DENOM_EPS: f64 = 1e-9;

/// Run the full validity battery for `line` against `airlight`.
///
/// Pure function of its inputs: validating the same line twice yields the
/// same outcome and the same transmission. The airlight may use any
/// positive scale; it is normalized where the math requires it.
pub fn validate(
    line: &ColorLine,
    patch: &Patch,
    airlight: &Vector3<f64>,
    params: &ValidationParams,
) -> Result<ScoredColorLine, Rejection> {
    if line.is_degenerate() {
        return Err(Rejection::DegenerateDirection);
    }

    let support = line.support_count();
    if (support as f64) < params.support_fraction * patch.len() as f64 {
        return Err(Rejection::InsufficientSupport);
    }

    // After sign canonicalization the first component is non-negative, but
    // mixed signs among the rest still mean a non-physical reflectance.
    if line.direction().iter().any(|&c| c < 0.0) {
        return Err(Rejection::MixedReflectance);
    }

    if intersection_angle(line.direction(), airlight) <= params.min_angle_rad {
        return Err(Rejection::SmallIntersectionAngle);
    }

    let transmission =
        calculate_transmission(line, airlight).ok_or(Rejection::SmallIntersectionAngle)?;

    if !unimodal_support(line, patch, params.unimodality_max) {
        return Err(Rejection::Multimodal);
    }

    // Closest approach between the color line (through its representative
    // point) and the airlight line through the origin.
    let gap = skew_line_closest_distance(line.direction(), airlight, line.point());
    if gap >= params.intersection_max {
        return Err(Rejection::DistantIntersection);
    }

    if transmission <= 0.0 || transmission >= 1.0 {
        return Err(Rejection::TransmissionOutOfRange);
    }

    let shading_sigma = shading_variability(line, patch, transmission);
    if shading_sigma <= params.shading_min {
        return Err(Rejection::FlatShading);
    }

    Ok(ScoredColorLine {
        line: line.clone(),
        transmission,
        shading_sigma,
    })
}

/// Transmission from the line/airlight geometry.
///
/// Returns `None` when the direction and airlight are near-parallel (the
/// denominator `1 − (â·d̂)²` vanishes) or either vector has no length;
/// callers treat that as "transmission undefined", never as ±infinity.
pub fn calculate_transmission(line: &ColorLine, airlight: &Vector3<f64>) -> Option<f64> {
    let dir_norm = line.direction().norm();
    let air_norm = airlight.norm();
    if dir_norm < DENOM_EPS || air_norm < DENOM_EPS {
        return None;
    }
    let d_unit = line.direction() / dir_norm;
    let a_unit = airlight / air_norm;

    let ad = a_unit.dot(&d_unit);
    let dv = d_unit.dot(line.point());
    let av = a_unit.dot(line.point());

    let denom = 1.0 - ad * ad;
    if denom.abs() < DENOM_EPS {
        return None;
    }
    let s = (-dv * ad + av) / denom;
    Some(1.0 - s)
}

/// Angle in radians between the airlight and the line direction.
fn intersection_angle(direction: &Vector3<f64>, airlight: &Vector3<f64>) -> f64 {
    let na = airlight.norm().max(DENOM_EPS);
    let nd = direction.norm().max(DENOM_EPS);
    (airlight.dot(direction) / (na * nd)).clamp(-1.0, 1.0).acos()
}

/// Test that the support projections form a single-peaked distribution.
///
/// Projections of the supported offsets onto the direction are rescaled
/// affinely into [0, π] and scored with a cosine; a symmetric unimodal
/// spread averages near zero, clusters or skew pull the mean away. A zero
/// projection spread cannot be scored and fails the test.
fn unimodal_support(line: &ColorLine, patch: &Patch, max_score: f64) -> bool {
    let products: Vec<f64> = line
        .support()
        .indices()
        .map(|idx| (patch.pixel(idx) - line.point()).dot(line.direction()))
        .collect();
    if products.is_empty() {
        return false;
    }

    let min = products.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = products.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range < 1e-12 {
        return false;
    }

    let a = std::f64::consts::PI / range;
    let b = -min;
    let total: f64 = products.iter().map(|p| (a * (p + b)).cos()).sum();
    (total / products.len() as f64).abs() < max_score
}

/// Shading variability score: standard deviation of the supported offset
/// components divided by the transmission.
fn shading_variability(line: &ColorLine, patch: &Patch, transmission: f64) -> f64 {
    let mut values = Vec::with_capacity(line.support_count() * 3);
    for idx in line.support().indices() {
        let offset = patch.pixel(idx) - line.point();
        values.extend_from_slice(&[offset.x, offset.y, offset.z]);
    }
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / transmission
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorline::estimator::{estimate, support_mask};
    use crate::colorline::line::SupportMask;
    use crate::colorline::params::RansacParams;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(v: Vector3<f64>) -> Vector3<f64> {
        v / v.norm()
    }

    /// Patch whose pixels follow the haze model exactly:
    /// `pixel = t·s·R̂ + (1−t)·â` for the given shading values.
    fn model_patch(
        size: usize,
        shadings: &[f64],
        reflectance: &Vector3<f64>,
        airlight: &Vector3<f64>,
        transmission: f64,
    ) -> Patch {
        assert_eq!(shadings.len(), size * size);
        let r = unit(*reflectance);
        let a = unit(*airlight);
        let pixels = shadings
            .iter()
            .map(|&s| r * (transmission * s) + a * (1.0 - transmission))
            .collect();
        Patch::from_pixels(size, pixels)
    }

    fn even_shadings(n: usize, lo: f64, hi: f64) -> Vec<f64> {
        (0..n)
            .map(|k| lo + (hi - lo) * k as f64 / (n - 1) as f64)
            .collect()
    }

    fn fitted_line(patch: &Patch, seed: u64) -> ColorLine {
        let mut rng = StdRng::seed_from_u64(seed);
        estimate(patch, &RansacParams::default(), &mut rng)
    }

    fn airlight() -> Vector3<f64> {
        Vector3::new(0.95, 1.0, 0.95)
    }

    fn reflectance() -> Vector3<f64> {
        Vector3::new(0.8, 0.35, 0.2)
    }

    #[test]
    fn transmission_round_trip_on_exact_model() {
        let t_true = 0.62;
        let patch = model_patch(
            7,
            &even_shadings(49, 0.35, 0.95),
            &reflectance(),
            &airlight(),
            t_true,
        );
        let line = fitted_line(&patch, 11);
        let t = calculate_transmission(&line, &airlight()).expect("geometry is well conditioned");
        assert_relative_eq!(t, t_true, epsilon = 1e-6);
    }

    #[test]
    fn exact_model_patch_is_accepted() {
        let t_true = 0.7;
        let patch = model_patch(
            7,
            &even_shadings(49, 0.35, 0.95),
            &reflectance(),
            &airlight(),
            t_true,
        );
        let line = fitted_line(&patch, 3);
        let scored = validate(&line, &patch, &airlight(), &ValidationParams::default())
            .expect("model patch must pass every test");
        assert_relative_eq!(scored.transmission, t_true, epsilon = 1e-6);
        assert!(scored.shading_sigma > 0.02);
    }

    #[test]
    fn validation_is_idempotent() {
        let patch = model_patch(
            7,
            &even_shadings(49, 0.4, 0.9),
            &reflectance(),
            &airlight(),
            0.55,
        );
        let line = fitted_line(&patch, 5);
        let params = ValidationParams::default();
        let first = validate(&line, &patch, &airlight(), &params).expect("accepted");
        let second = validate(&line, &patch, &airlight(), &params).expect("accepted");
        assert_eq!(first.transmission, second.transmission);
        assert_eq!(first.shading_sigma, second.shading_sigma);
        assert_eq!(line.support_count(), first.line.support_count());
    }

    #[test]
    fn degenerate_line_is_always_rejected() {
        let patch = Patch::from_pixels(2, vec![Vector3::new(0.5, 0.5, 0.5); 4]);
        let line = ColorLine::degenerate(Vector3::new(0.5, 0.5, 0.5), 4);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::DegenerateDirection);
    }

    #[test]
    fn transmission_outside_unit_interval_is_rejected() {
        // Pixels beyond the airlight along â: airlight coefficient > 1,
        // so the computed transmission is negative.
        let r = unit(reflectance());
        let a = unit(airlight());
        let pixels: Vec<Vector3<f64>> = (0..49)
            .map(|k| a * 1.5 + r * (0.2 + 0.3 * k as f64 / 48.0))
            .collect();
        let patch = Patch::from_pixels(7, pixels);
        let line = fitted_line(&patch, 9);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::TransmissionOutOfRange);
    }

    #[test]
    fn mixed_direction_signs_are_rejected() {
        // A line along (1, -1, 0): canonicalization keeps the first
        // component positive but the second stays negative.
        let base = Vector3::new(0.5, 0.5, 0.5);
        let dir = Vector3::new(0.3, -0.3, 0.0);
        let pixels: Vec<Vector3<f64>> = (0..49).map(|k| base + dir * (k as f64 / 48.0)).collect();
        let patch = Patch::from_pixels(7, pixels);
        let line = fitted_line(&patch, 13);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::MixedReflectance);
    }

    #[test]
    fn near_parallel_direction_is_rejected() {
        // Color line along the airlight direction itself.
        let a = unit(airlight());
        let pixels: Vec<Vector3<f64>> = (0..49).map(|k| a * (0.3 + 0.5 * k as f64 / 48.0)).collect();
        let patch = Patch::from_pixels(7, pixels);
        let line = fitted_line(&patch, 17);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::SmallIntersectionAngle);
    }

    #[test]
    fn flat_patch_fails_shading_variability() {
        // Very small shading spread: the line exists but carries almost no
        // brightness variation.
        let t_true = 0.8;
        let patch = model_patch(
            7,
            &even_shadings(49, 0.600, 0.612),
            &reflectance(),
            &airlight(),
            t_true,
        );
        let line = fitted_line(&patch, 19);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::FlatShading);
    }

    #[test]
    fn unbalanced_clusters_fail_unimodality() {
        // 40 pixels at one end of the line, 9 at the other: the rescaled
        // cosine score is |40 − 9| / 49 ≈ 0.63.
        let r = unit(reflectance());
        let a = unit(airlight());
        let t = 0.6;
        let mut pixels = vec![r * (t * 0.35) + a * (1.0 - t); 40];
        pixels.extend(vec![r * (t * 0.95) + a * (1.0 - t); 9]);
        let patch = Patch::from_pixels(7, pixels);
        let line = fitted_line(&patch, 23);
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::Multimodal);
    }

    #[test]
    fn two_balanced_clusters_match_the_closed_form() {
        // Two perfectly separated clusters on a clean line, airlight ~30°
        // away from the direction: the geometric tests pass and the
        // transmission matches the hand-evaluated closed form.
        let a = unit(Vector3::new(1.0, 1.0, 1.0));
        // ~30° from â within the plane spanned with (1, 0, 0).
        let r = unit(a * 30f64.to_radians().cos()
            + unit(Vector3::new(1.0, 0.0, 0.0) - a * a.x) * 30f64.to_radians().sin());
        let t = 0.58;
        let mut pixels = Vec::with_capacity(49);
        for k in 0..25 {
            pixels.push(r * (t * (0.35 + 1e-4 * k as f64)) + a * (1.0 - t));
        }
        for k in 0..24 {
            pixels.push(r * (t * (0.95 + 1e-4 * k as f64)) + a * (1.0 - t));
        }
        let patch = Patch::from_pixels(7, pixels);
        let line = fitted_line(&patch, 29);

        // Geometry gates: support, angle, intersection.
        assert_eq!(line.support_count(), patch.len());
        let angle = super::intersection_angle(line.direction(), &a);
        assert!(angle > std::f64::consts::PI / 12.0);
        let gap = skew_line_closest_distance(line.direction(), &a, line.point());
        assert!(gap < 0.05, "gap = {gap}");

        let computed = calculate_transmission(&line, &a).expect("well conditioned");
        assert_relative_eq!(computed, t, epsilon = 1e-6);
    }

    #[test]
    fn support_mask_matches_validator_expectations() {
        // The mask recorded at fitting time drives every statistic.
        let patch = model_patch(
            5,
            &even_shadings(25, 0.3, 0.9),
            &reflectance(),
            &airlight(),
            0.5,
        );
        let line = fitted_line(&patch, 31);
        let recomputed = support_mask(
            &patch,
            line.point(),
            line.direction(),
            RansacParams::default().distance_threshold,
        );
        assert_eq!(line.support_count(), recomputed.count());
    }

    #[test]
    fn empty_support_fails_before_scoring() {
        let patch = model_patch(
            5,
            &even_shadings(25, 0.3, 0.9),
            &reflectance(),
            &airlight(),
            0.5,
        );
        let line = ColorLine::new(
            Vector3::new(0.1, 0.1, 0.1),
            Vector3::new(0.5, 0.2, 0.1),
            SupportMask::empty(patch.len()),
        );
        let res = validate(&line, &patch, &airlight(), &ValidationParams::default());
        assert_eq!(res.unwrap_err(), Rejection::InsufficientSupport);
    }
}
