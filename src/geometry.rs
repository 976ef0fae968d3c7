//! Vector geometry used by the color-line estimator and validator.

use nalgebra::Vector3;

const EPS: f64 = 1e-12;

/// Orthogonal projection of `v` onto `onto`.
///
/// A zero `onto` vector projects everything to the zero vector. Candidate
/// directions sampled from a patch can coincide, so the fallback is part of
/// the contract rather than an error.
#[inline]
pub fn project(onto: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let denom = onto.dot(onto);
    if denom < EPS {
        return Vector3::zeros();
    }
    onto * (onto.dot(v) / denom)
}

/// Distance of `offset` from the line through the origin spanned by
/// `direction`.
///
/// This is the rejection norm, not a point-to-point distance: a pixel is
/// judged by how far it strays from the line's orientation, irrespective of
/// its position along the line.
#[inline]
pub fn perpendicular_distance(direction: &Vector3<f64>, offset: &Vector3<f64>) -> f64 {
    (offset - project(direction, offset)).norm()
}

/// Closest approach between two 3D lines.
///
/// The lines run along `dir_a` and `dir_b`; `offset` is the vector from a
/// base point of line B to a base point of line A. Near-parallel directions
/// make the 2x2 system singular; instead of dividing by the vanishing
/// determinant the parallel-line distance is returned, which is zero for
/// coincident lines.
pub fn skew_line_closest_distance(
    dir_a: &Vector3<f64>,
    dir_b: &Vector3<f64>,
    offset: &Vector3<f64>,
) -> f64 {
    let a = dir_a.dot(dir_a);
    let b = dir_a.dot(dir_b);
    let c = dir_b.dot(dir_b);
    if a < EPS && c < EPS {
        return offset.norm();
    }
    if a < EPS {
        return perpendicular_distance(dir_b, offset);
    }
    if c < EPS {
        return perpendicular_distance(dir_a, offset);
    }

    let d = dir_a.dot(offset);
    let e = dir_b.dot(offset);
    let det = a * c - b * b;
    if det <= 1e-9 * a * c {
        // Parallel lines: the gap is constant along them.
        return perpendicular_distance(dir_a, offset);
    }

    let sc = (b * e - c * d) / det;
    let tc = (a * e - b * d) / det;
    let gap = offset + dir_a * sc - dir_b * tc;
    gap.norm()
}
