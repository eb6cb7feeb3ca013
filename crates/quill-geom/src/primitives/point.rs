//! 2D points and vectors.

use glam::DVec2;

use super::{Matrix, Rectangle};
use crate::numerical::{EPSILON, TRIGONOMETRIC_EPSILON};

/// A 2D point or vector.
///
/// Arithmetic, dot product (`dot`), cross product (`perp_dot`),
/// normalization and projection (`project_onto`) come from glam; the
/// geometry-specific helpers live on [`PointExt`].
pub type Point = DVec2;

/// Geometry helpers on [`Point`].
pub trait PointExt: Copy {
    /// Returns true if both coordinates differ by at most `tolerance`.
    fn is_close(self, other: Point, tolerance: f64) -> bool;

    /// Returns true if both coordinates are within `EPSILON` of zero.
    fn is_zero(self) -> bool;

    /// Returns true if the two vectors are parallel or anti-parallel.
    fn is_collinear(self, other: Point) -> bool;

    /// Returns true if the two vectors are perpendicular.
    fn is_orthogonal(self, other: Point) -> bool;

    /// Angle of the vector from the positive x-axis, in degrees.
    fn angle_degrees(self) -> f64;

    /// Signed angle from `self` to `other`, in degrees.
    fn directed_angle(self, other: Point) -> f64;

    /// Rotates the vector around the origin by `degrees`.
    fn rotate_degrees(self, degrees: f64) -> Point;

    /// Rotates the point around `center` by `degrees`.
    fn rotate_around(self, degrees: f64, center: Point) -> Point;

    /// Transforms the point by `matrix`.
    fn transform(self, matrix: &Matrix) -> Point;

    /// Returns true if the point lies inside `rect` (edges included).
    fn is_inside(self, rect: &Rectangle) -> bool;
}

impl PointExt for Point {
    fn is_close(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    fn is_zero(self) -> bool {
        self.x.abs() <= EPSILON && self.y.abs() <= EPSILON
    }

    fn is_collinear(self, other: Point) -> bool {
        self.perp_dot(other).abs()
            <= (self.length_squared() * other.length_squared()).sqrt() * TRIGONOMETRIC_EPSILON
    }

    fn is_orthogonal(self, other: Point) -> bool {
        self.dot(other).abs()
            <= (self.length_squared() * other.length_squared()).sqrt() * TRIGONOMETRIC_EPSILON
    }

    fn angle_degrees(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    fn directed_angle(self, other: Point) -> f64 {
        self.perp_dot(other).atan2(self.dot(other)).to_degrees()
    }

    fn rotate_degrees(self, degrees: f64) -> Point {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn rotate_around(self, degrees: f64, center: Point) -> Point {
        (self - center).rotate_degrees(degrees) + center
    }

    fn transform(self, matrix: &Matrix) -> Point {
        matrix.transform_point(self)
    }

    fn is_inside(self, rect: &Rectangle) -> bool {
        rect.contains_point(self)
    }
}
