use crate::bezier::Bezier;
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::intersection::{intersect_contours, self_intersect_contours};
use crate::location::{CurveLocation, IntersectionKind};
use crate::numerical::GEOMETRIC_EPSILON;
use crate::primitives::{Point, Rectangle};
use crate::winding::{self, Winding, winding_at};

use super::Path;

impl Path {
    // ============== Measures ==============

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.length_with(&GeometryConfig::DEFAULT)
    }

    /// Total arc length using the given tolerances.
    pub fn length_with(&self, config: &GeometryConfig) -> f64 {
        self.beziers()
            .map(|curve| curve.length_between(0.0, 1.0, config))
            .sum()
    }

    /// Signed enclosed area, positive when the path runs clockwise on
    /// screen. Open paths are measured as if closed by a straight line.
    pub fn area(&self) -> f64 {
        Contour::from_path(self).area()
    }

    pub fn is_clockwise(&self) -> bool {
        self.area() >= 0.0
    }

    /// Reverses the path if needed so that it runs in the given direction.
    pub fn set_clockwise(&mut self, clockwise: bool) {
        if self.is_clockwise() != clockwise {
            self.reverse();
        }
    }

    /// Exact bounds of the outline, cached until the next mutation.
    pub fn bounds(&self) -> Option<Rectangle> {
        *self.bounds_cache.get_or_init(|| {
            let anchors = self.segments.iter().map(|segment| segment.point);
            let curves = self.beziers().map(|curve| curve.bounds());
            curves.fold(Rectangle::from_points(anchors), |acc, rect| {
                acc.map(|acc| acc.unite(&rect))
            })
        })
    }

    /// Bounds of all anchors and handle points.
    pub fn handle_bounds(&self) -> Option<Rectangle> {
        Rectangle::from_points(self.segments.iter().flat_map(|segment| {
            [
                segment.point,
                segment.handle_in_point(),
                segment.handle_out_point(),
            ]
        }))
    }

    /// A point inside the filled area, if the path encloses any.
    pub fn interior_point(&self) -> Option<Point> {
        let curves = self.fill_curves();
        if curves.is_empty() {
            return None;
        }
        winding::interior_point(&curves, self.fill_rule)
    }

    // ============== Locations ==============

    /// Location at arc-length `offset` from the start of the path.
    pub fn location_at(&self, offset: f64) -> Option<CurveLocation> {
        if offset < 0.0 {
            return None;
        }
        let mut start = 0.0;
        for (index, curve) in self.beziers().enumerate() {
            let length = curve.length();
            if offset <= start + length + GEOMETRIC_EPSILON {
                let time = curve.time_at((offset - start).min(length), Some(0.0))?;
                return Some(CurveLocation::new(0, index, time, curve.point_at_time(time)));
            }
            start += length;
        }
        None
    }

    /// Location of a point lying on the path.
    pub fn location_of(&self, point: Point) -> Option<CurveLocation> {
        self.beziers().enumerate().find_map(|(index, curve)| {
            let time = curve.time_of(point)?;
            Some(CurveLocation::new(0, index, time, curve.point_at_time(time)))
        })
    }

    /// Arc-length offset of a location from the start of the path.
    pub fn offset_of(&self, location: &CurveLocation) -> Option<f64> {
        let index = location.curve_index();
        let curve = self.bezier(index)?;
        let before: f64 = self.beziers().take(index).map(|curve| curve.length()).sum();
        Some(before + curve.length_between(0.0, location.time(), &GeometryConfig::DEFAULT))
    }

    fn curve_at(&self, offset: f64) -> Option<(Bezier, f64)> {
        let location = self.location_at(offset)?;
        Some((self.bezier(location.curve_index())?, location.time()))
    }

    pub fn point_at(&self, offset: f64) -> Option<Point> {
        self.location_at(offset).map(|location| location.point())
    }

    /// Unit tangent at arc-length `offset`.
    pub fn tangent_at(&self, offset: f64) -> Option<Point> {
        self.curve_at(offset).map(|(curve, t)| curve.tangent_at_time(t))
    }

    /// Unit normal at arc-length `offset`.
    pub fn normal_at(&self, offset: f64) -> Option<Point> {
        self.curve_at(offset).map(|(curve, t)| curve.normal_at_time(t))
    }

    pub fn curvature_at(&self, offset: f64) -> Option<f64> {
        self.curve_at(offset).map(|(curve, t)| curve.curvature_at_time(t))
    }

    /// Location on the path nearest to `point`, carrying its distance.
    pub fn nearest_location(&self, point: Point) -> Option<CurveLocation> {
        if self.curve_count() == 0 {
            let anchor = self.first_segment()?.point;
            return Some(CurveLocation::new(0, 0, 0.0, anchor).with_distance(anchor.distance(point)));
        }
        self.beziers()
            .enumerate()
            .map(|(index, curve)| {
                let time = curve.nearest_time(point);
                let nearest = curve.point_at_time(time);
                CurveLocation::new(0, index, time, nearest).with_distance(nearest.distance(point))
            })
            .min_by(|a, b| {
                let (da, db) = (a.distance().unwrap_or(f64::INFINITY), b.distance().unwrap_or(f64::INFINITY));
                da.total_cmp(&db)
            })
    }

    pub fn nearest_point(&self, point: Point) -> Option<Point> {
        self.nearest_location(point).map(|location| location.point())
    }

    // ============== Containment ==============

    /// Curves bounding the fill: the path's curves plus, for an open path,
    /// the straight line closing it.
    pub(crate) fn fill_curves(&self) -> Vec<Bezier> {
        let mut curves: Vec<Bezier> = self.beziers().collect();
        if !self.closed {
            if let (Some(first), Some(last)) = (self.first_segment(), self.last_segment()) {
                if self.segments.len() > 1 {
                    curves.push(Bezier::line(last.point, first.point));
                }
            }
        }
        curves
    }

    /// Winding number of `point`, treating an open path as closed.
    pub fn winding(&self, point: Point) -> Winding {
        winding_at(point, self.fill_curves(), GEOMETRIC_EPSILON)
    }

    /// Returns true if `point` lies in the filled area or on the outline.
    pub fn contains(&self, point: Point) -> bool {
        if !self.bounds().is_some_and(|bounds| bounds.expand(GEOMETRIC_EPSILON, GEOMETRIC_EPSILON).contains_point(point)) {
            return false;
        }
        let winding = self.winding(point);
        winding.on_path || self.fill_rule.is_inside(winding.winding)
    }

    // ============== Intersections ==============

    /// All locations where this path meets `other`, each paired with its
    /// counterpart on `other`, ordered along this path.
    pub fn intersections(&self, other: &Path) -> Vec<CurveLocation> {
        self.intersections_with(other, &GeometryConfig::DEFAULT)
    }

    pub fn intersections_with(&self, other: &Path, config: &GeometryConfig) -> Vec<CurveLocation> {
        let a = [Contour::from_path(self)];
        let b = [Contour::from_path(other)];
        intersect_contours(&a, &b, config)
            .iter()
            .map(|crossing| crossing.to_location())
            .collect()
    }

    /// Locations where the path meets itself, excluding the anchors shared
    /// by consecutive curves.
    pub fn self_intersections(&self) -> Vec<CurveLocation> {
        let a = [Contour::from_path(self)];
        self_intersect_contours(&a, &GeometryConfig::DEFAULT)
            .iter()
            .map(|crossing| crossing.to_location())
            .collect()
    }

    /// Intersections with `other` where the outlines actually cross.
    pub fn crossings(&self, other: &Path) -> Vec<CurveLocation> {
        self.intersections(other)
            .into_iter()
            .filter(|location| location.kind() == Some(IntersectionKind::Crossing))
            .collect()
    }
}
