//! 2×3 affine transformation matrix.

use std::ops::Mul;

use glam::{DAffine2, DMat2, DVec2};
use serde::{Deserialize, Serialize};

use super::{Point, PointExt, Rectangle};
use crate::numerical::EPSILON;

/// An affine transform mapping `(x, y)` to
/// `(a·x + c·y + tx, b·x + d·y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

/// A matrix split into translation, rotation, scaling and skew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub translation: Point,
    /// Rotation in degrees.
    pub rotation: f64,
    pub scaling: Point,
    /// Skew angles in degrees.
    pub skewing: Point,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Creates a matrix from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Returns the identity transform.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// A pure translation.
    pub fn translation(delta: Point) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, delta.x, delta.y)
    }

    /// A scaling around the origin.
    pub fn scaling(scale: Point) -> Self {
        Self::new(scale.x, 0.0, 0.0, scale.y, 0.0, 0.0)
    }

    /// A rotation by `degrees` around the origin.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// A shear with the given horizontal and vertical factors.
    pub fn shearing(shear: Point) -> Self {
        Self::new(1.0, shear.y, shear.x, 1.0, 0.0, 0.0)
    }

    /// Applies `delta` after the current transform's linear part, i.e.
    /// translates in local coordinates.
    pub fn translate(self, delta: Point) -> Self {
        self.append(&Self::translation(delta))
    }

    /// Scales in local coordinates around the origin.
    pub fn scale(self, scale: Point) -> Self {
        self.append(&Self::scaling(scale))
    }

    /// Scales in local coordinates around `center`.
    pub fn scale_around(self, scale: Point, center: Point) -> Self {
        self.translate(center).scale(scale).translate(-center)
    }

    /// Rotates by `degrees` around `center` in local coordinates.
    pub fn rotate(self, degrees: f64, center: Point) -> Self {
        self.translate(center)
            .append(&Self::rotation(degrees))
            .translate(-center)
    }

    /// Shears around `center` in local coordinates.
    pub fn shear(self, shear: Point, center: Point) -> Self {
        self.translate(center)
            .append(&Self::shearing(shear))
            .translate(-center)
    }

    /// Skews by the given angles in degrees around `center`.
    pub fn skew(self, degrees: Point, center: Point) -> Self {
        let shear = Point::new(degrees.x.to_radians().tan(), degrees.y.to_radians().tan());
        self.shear(shear, center)
    }

    /// Returns `self * other`: `other` is applied first, then `self`.
    pub fn append(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Alias of [`Matrix::append`].
    pub fn concatenate(&self, other: &Matrix) -> Matrix {
        self.append(other)
    }

    /// Returns `other * self`: `self` is applied first, then `other`.
    pub fn prepend(&self, other: &Matrix) -> Matrix {
        other.append(self)
    }

    /// Alias of [`Matrix::prepend`].
    pub fn pre_concatenate(&self, other: &Matrix) -> Matrix {
        self.prepend(other)
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns true if the matrix is the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns true if the matrix has an inverse.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > EPSILON && self.tx.is_finite() && self.ty.is_finite()
    }

    /// Returns true if the matrix cannot be inverted.
    pub fn is_singular(&self) -> bool {
        !self.is_invertible()
    }

    /// Returns the inverse transform, or `None` when singular.
    pub fn inverted(&self) -> Option<Matrix> {
        if !self.is_invertible() {
            return None;
        }
        let det = self.determinant();
        Some(Matrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }

    /// Transforms a point.
    pub fn transform_point(&self, point: Point) -> Point {
        DVec2::new(
            self.a * point.x + self.c * point.y + self.tx,
            self.b * point.x + self.d * point.y + self.ty,
        )
    }

    /// Transforms a vector, ignoring the translation.
    pub fn transform_vector(&self, vector: Point) -> Point {
        DVec2::new(
            self.a * vector.x + self.c * vector.y,
            self.b * vector.x + self.d * vector.y,
        )
    }

    /// Maps a point through the inverse transform.
    pub fn inverse_transform_point(&self, point: Point) -> Option<Point> {
        self.inverted().map(|inverse| inverse.transform_point(point))
    }

    /// Axis-aligned bounds of a transformed rectangle.
    pub fn transform_bounds(&self, rect: &Rectangle) -> Rectangle {
        let corners = rect.corners().map(|corner| corner.transform(self));
        Rectangle::from_points(corners).unwrap_or(*rect)
    }

    /// Translation component.
    pub fn translation_part(&self) -> Point {
        DVec2::new(self.tx, self.ty)
    }

    /// Uniform-ish scale factor, the square root of the absolute determinant.
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// Splits the transform into translation, rotation, scaling and skew.
    pub fn decompose(&self) -> Decomposition {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        let det = self.determinant();
        let (rotation, scaling, skewing) = if a != 0.0 || b != 0.0 {
            let r = a.hypot(b);
            let rotation = (a / r).acos() * if b > 0.0 { 1.0 } else { -1.0 };
            let skew = (a * c + b * d).atan2(r * r);
            (rotation, DVec2::new(r, det / r), DVec2::new(skew, 0.0))
        } else if c != 0.0 || d != 0.0 {
            let s = c.hypot(d);
            let rotation = (c / s).asin() * if d > 0.0 { 1.0 } else { -1.0 };
            let skew = (a * c + b * d).atan2(s * s);
            (rotation, DVec2::new(det / s, s), DVec2::new(0.0, skew))
        } else {
            (0.0, DVec2::ZERO, DVec2::ZERO)
        };
        Decomposition {
            translation: self.translation_part(),
            rotation: rotation.to_degrees(),
            scaling,
            skewing: DVec2::new(skewing.x.to_degrees(), skewing.y.to_degrees()),
        }
    }

    /// Converts to a glam affine transform.
    pub fn to_affine(&self) -> DAffine2 {
        DAffine2::from_mat2_translation(
            DMat2::from_cols(DVec2::new(self.a, self.b), DVec2::new(self.c, self.d)),
            DVec2::new(self.tx, self.ty),
        )
    }
}

impl From<DAffine2> for Matrix {
    fn from(affine: DAffine2) -> Self {
        let x = affine.matrix2.x_axis;
        let y = affine.matrix2.y_axis;
        Matrix::new(x.x, x.y, y.x, y.y, affine.translation.x, affine.translation.y)
    }
}

impl From<Matrix> for DAffine2 {
    fn from(matrix: Matrix) -> Self {
        matrix.to_affine()
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        self.append(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_append_order() {
        // Scale first, then translate.
        let m = Matrix::translation(DVec2::new(10.0, 0.0)).append(&Matrix::scaling(DVec2::splat(2.0)));
        assert_point_eq(m.transform_point(DVec2::new(1.0, 1.0)), DVec2::new(12.0, 2.0));
        let p = Matrix::translation(DVec2::new(10.0, 0.0)).prepend(&Matrix::scaling(DVec2::splat(2.0)));
        assert_point_eq(p.transform_point(DVec2::new(1.0, 1.0)), DVec2::new(22.0, 2.0));
    }

    #[test]
    fn test_rotate_around_center() {
        let m = Matrix::identity().rotate(90.0, DVec2::new(1.0, 1.0));
        assert_point_eq(m.transform_point(DVec2::new(2.0, 1.0)), DVec2::new(1.0, 2.0));
    }

    #[test]
    fn test_inverse() {
        let m = Matrix::new(2.0, 1.0, -1.0, 3.0, 5.0, -2.0);
        let inverse = m.inverted().unwrap();
        let id = m * inverse;
        for (actual, expected) in [id.a, id.b, id.c, id.d, id.tx, id.ty]
            .into_iter()
            .zip([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
        {
            assert_relative_eq!(actual, expected, epsilon = 1e-12);
        }
        let p = DVec2::new(3.0, -4.0);
        assert_point_eq(m.inverse_transform_point(m.transform_point(p)).unwrap(), p);
    }

    #[test]
    fn test_singular() {
        let m = Matrix::scaling(DVec2::new(0.0, 1.0));
        assert!(m.is_singular());
        assert!(m.inverted().is_none());
    }

    #[test]
    fn test_affine_round_trip() {
        let m = Matrix::new(2.0, 1.0, -1.0, 3.0, 5.0, -2.0);
        let affine: DAffine2 = m.into();
        let p = DVec2::new(0.5, 7.0);
        assert_point_eq(affine.transform_point2(p), m.transform_point(p));
        assert_eq!(Matrix::from(affine), m);
    }

    #[test]
    fn test_decompose() {
        let m = Matrix::identity()
            .translate(DVec2::new(4.0, 5.0))
            .rotate(30.0, DVec2::ZERO)
            .scale(DVec2::new(2.0, 3.0));
        let parts = m.decompose();
        assert_point_eq(parts.translation, DVec2::new(4.0, 5.0));
        assert_relative_eq!(parts.rotation, 30.0, epsilon = 1e-9);
        assert_point_eq(parts.scaling, DVec2::new(2.0, 3.0));
        assert_relative_eq!(parts.skewing.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transform_bounds() {
        let rect = Rectangle::new(0.0, 0.0, 2.0, 1.0);
        let bounds = Matrix::rotation(90.0).transform_bounds(&rect);
        assert_relative_eq!(bounds.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.width, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.height, 2.0, epsilon = 1e-12);
    }
}
