//! Path segments: an anchor point with incoming and outgoing handles.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::primitives::{Matrix, Point, PointExt};

/// An anchor point with two handles stored relative to it.
///
/// Segments are owned by exactly one [`Path`](crate::Path); their index and
/// neighbours are resolved through the owning path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub point: Point,
    pub handle_in: Point,
    pub handle_out: Point,
}

impl Segment {
    /// Creates a segment from an anchor and two relative handles.
    pub fn new(point: Point, handle_in: Point, handle_out: Point) -> Self {
        Self {
            point,
            handle_in,
            handle_out,
        }
    }

    /// A corner segment without handles.
    pub fn corner(point: Point) -> Self {
        Self::new(point, DVec2::ZERO, DVec2::ZERO)
    }

    /// Returns true if either handle is non-zero.
    pub fn has_handles(&self) -> bool {
        !self.handle_in.is_zero() || !self.handle_out.is_zero()
    }

    /// Collapses both handles onto the anchor.
    pub fn clear_handles(&mut self) {
        self.handle_in = DVec2::ZERO;
        self.handle_out = DVec2::ZERO;
    }

    /// Returns true if both handles are present and point in opposite
    /// directions, giving a continuous tangent through the anchor.
    pub fn is_smooth(&self) -> bool {
        let (h_in, h_out) = (self.handle_in, self.handle_out);
        !h_in.is_zero()
            && !h_out.is_zero()
            && h_in.is_collinear(h_out)
            && h_in.dot(h_out) < 0.0
    }

    /// Swaps the handles, as when the owning path is reversed.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.handle_in, &mut self.handle_out);
    }

    /// Returns a copy with swapped handles.
    pub fn reversed(&self) -> Segment {
        Segment::new(self.point, self.handle_out, self.handle_in)
    }

    /// Transforms the anchor as a point and the handles as vectors.
    pub fn transform(&mut self, matrix: &Matrix) {
        self.point = matrix.transform_point(self.point);
        self.handle_in = matrix.transform_vector(self.handle_in);
        self.handle_out = matrix.transform_vector(self.handle_out);
    }

    /// Absolute position of the incoming handle.
    pub fn handle_in_point(&self) -> Point {
        self.point + self.handle_in
    }

    /// Absolute position of the outgoing handle.
    pub fn handle_out_point(&self) -> Point {
        self.point + self.handle_out
    }
}

impl From<Point> for Segment {
    fn from(point: Point) -> Self {
        Segment::corner(point)
    }
}
