//! Curve views: the cubic between two consecutive segments of a path.

use crate::bezier::Bezier;
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::intersection::intersect_contours;
use crate::location::CurveLocation;
use crate::numerical::GEOMETRIC_EPSILON;
use crate::path::Path;
use crate::path::stroke::{butt_cap, curve_stroke_extent};
use crate::primitives::{Point, Rectangle};
use crate::segment::Segment;

/// A read-only view of curve `index` of a path.
///
/// The view borrows the path, so it can never observe a half-edited
/// segment list. Queries resolve the two segments into a [`Bezier`].
#[derive(Debug, Clone, Copy)]
pub struct Curve<'a> {
    path: &'a Path,
    index: usize,
    values: Bezier,
}

impl<'a> Curve<'a> {
    pub(crate) fn new(path: &'a Path, index: usize) -> Self {
        let segments = path.segments();
        let s1 = &segments[index];
        let s2 = &segments[(index + 1) % segments.len()];
        Self {
            path,
            index,
            values: Bezier::new(s1.point, s1.handle_out_point(), s2.handle_in_point(), s2.point),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    pub fn segment1(&self) -> &'a Segment {
        &self.path.segments()[self.index]
    }

    pub fn segment2(&self) -> &'a Segment {
        let segments = self.path.segments();
        &segments[(self.index + 1) % segments.len()]
    }

    pub fn point1(&self) -> Point {
        self.segment1().point
    }

    /// Outgoing handle of the first segment, relative to `point1`.
    pub fn handle1(&self) -> Point {
        self.segment1().handle_out
    }

    /// Incoming handle of the second segment, relative to `point2`.
    pub fn handle2(&self) -> Point {
        self.segment2().handle_in
    }

    pub fn point2(&self) -> Point {
        self.segment2().point
    }

    /// Absolute control points.
    pub fn values(&self) -> Bezier {
        self.values
    }

    /// The next curve, wrapping on closed paths.
    pub fn next(&self) -> Option<Curve<'a>> {
        let next = self.index + 1;
        if next < self.path.curve_count() {
            Some(Curve::new(self.path, next))
        } else if self.path.is_closed() {
            Some(Curve::new(self.path, 0))
        } else {
            None
        }
    }

    /// The previous curve, wrapping on closed paths.
    pub fn previous(&self) -> Option<Curve<'a>> {
        if self.index > 0 {
            Some(Curve::new(self.path, self.index - 1))
        } else if self.path.is_closed() {
            Some(Curve::new(self.path, self.path.curve_count() - 1))
        } else {
            None
        }
    }

    // ============== Shape ==============

    pub fn length(&self) -> f64 {
        self.values.length()
    }

    pub fn bounds(&self) -> Rectangle {
        self.values.bounds()
    }

    /// Bounds of the curve stroked with `width` and butt ends.
    pub fn stroke_bounds(&self, width: f64) -> Rectangle {
        let radius = width.abs() / 2.0;
        let v = &self.values;
        let mut bounds = curve_stroke_extent(v, radius);
        let ends = butt_cap(v.p1, v.tangent_at_time(0.0), radius)
            .into_iter()
            .chain(butt_cap(v.p2, v.tangent_at_time(1.0), radius));
        for point in ends {
            bounds = bounds.include(point);
        }
        bounds
    }

    pub fn handle_bounds(&self) -> Rectangle {
        self.values.control_bounds()
    }

    /// Returns true if the curve is a straight line between its anchors.
    pub fn is_linear(&self) -> bool {
        self.values.is_linear()
    }

    pub fn has_handles(&self) -> bool {
        self.values.has_handles()
    }

    pub fn has_length(&self) -> bool {
        self.values.has_length(GEOMETRIC_EPSILON)
    }

    /// Signed area between the curve and the origin.
    pub fn area(&self) -> f64 {
        self.values.area()
    }

    // ============== Times and locations ==============

    /// Curve time at arc-length `offset` from `start`.
    pub fn time_at(&self, offset: f64, start: Option<f64>) -> Option<f64> {
        self.values.time_at(offset, start)
    }

    pub fn time_of(&self, point: Point) -> Option<f64> {
        self.values.time_of(point)
    }

    pub fn nearest_time(&self, point: Point) -> f64 {
        self.values.nearest_time(point)
    }

    pub fn location_at_time(&self, time: f64) -> CurveLocation {
        CurveLocation::new(0, self.index, time, self.values.point_at_time(time))
    }

    pub fn location_at(&self, offset: f64) -> Option<CurveLocation> {
        self.time_at(offset, None).map(|time| self.location_at_time(time))
    }

    pub fn location_of(&self, point: Point) -> Option<CurveLocation> {
        self.time_of(point).map(|time| self.location_at_time(time))
    }

    pub fn point_at_time(&self, time: f64) -> Point {
        self.values.point_at_time(time)
    }

    pub fn point_at(&self, offset: f64) -> Option<Point> {
        self.time_at(offset, None).map(|time| self.point_at_time(time))
    }

    pub fn tangent_at_time(&self, time: f64) -> Point {
        self.values.tangent_at_time(time)
    }

    pub fn tangent_at(&self, offset: f64) -> Option<Point> {
        self.time_at(offset, None).map(|time| self.tangent_at_time(time))
    }

    pub fn normal_at_time(&self, time: f64) -> Point {
        self.values.normal_at_time(time)
    }

    pub fn normal_at(&self, offset: f64) -> Option<Point> {
        self.time_at(offset, None).map(|time| self.normal_at_time(time))
    }

    pub fn curvature_at_time(&self, time: f64) -> f64 {
        self.values.curvature_at_time(time)
    }

    pub fn curvature_at(&self, offset: f64) -> Option<f64> {
        self.time_at(offset, None).map(|time| self.curvature_at_time(time))
    }

    /// Intersections with another curve. Locations refer to curve `0` of
    /// each side with times local to the two curves.
    pub fn intersections(&self, other: &Curve<'_>) -> Vec<CurveLocation> {
        let a = [Contour {
            curves: vec![self.values],
            closed: false,
        }];
        let b = [Contour {
            curves: vec![other.values],
            closed: false,
        }];
        intersect_contours(&a, &b, &GeometryConfig::DEFAULT)
            .iter()
            .map(|crossing| crossing.to_location())
            .collect()
    }
}
