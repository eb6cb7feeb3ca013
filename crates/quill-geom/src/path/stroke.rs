//! Stroke geometry: the area covered when an outline is stroked with a
//! given width, join and cap.

use serde::{Deserialize, Serialize};

use crate::bezier::{Axis, Bezier};
use crate::numerical::is_machine_zero;
use crate::primitives::{Point, PointExt, Rectangle};

use super::Path;

/// Shape drawn where two stroked curves meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Shape drawn at the open ends of a stroked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Stroke parameters used by bounds and hit queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub width: f64,
    pub join: StrokeJoin,
    pub cap: StrokeCap,
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: StrokeJoin::default(),
            cap: StrokeCap::default(),
            miter_limit: 10.0,
        }
    }
}

impl StrokeStyle {
    /// A stroke of `width` with default join and cap.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_join(mut self, join: StrokeJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Half the stroke width.
    pub fn radius(&self) -> f64 {
        self.width.abs() / 2.0
    }
}

/// Bounds of the stroke body of one curve, without joins or caps: the end
/// points plus the extrema padded by `radius` along their axis.
pub(crate) fn curve_stroke_extent(curve: &Bezier, radius: f64) -> Rectangle {
    let mut bounds = Rectangle::from_corners(curve.p1, curve.p2);
    for (axis, pad) in [(Axis::X, Point::X * radius), (Axis::Y, Point::Y * radius)] {
        for t in curve.extrema_times(axis) {
            let point = curve.point_at_time(t);
            bounds = bounds.include(point - pad).include(point + pad);
        }
    }
    bounds
}

/// Points bounding a butt cap at `point` with unit `tangent`.
pub(crate) fn butt_cap(point: Point, tangent: Point, radius: f64) -> [Point; 2] {
    let normal = tangent.perp() * radius;
    [point + normal, point - normal]
}

fn cap_points(point: Point, tangent: Point, outward: Point, style: &StrokeStyle) -> Vec<Point> {
    let radius = style.radius();
    match style.cap {
        StrokeCap::Butt => butt_cap(point, tangent, radius).to_vec(),
        StrokeCap::Square => butt_cap(point + outward * radius, tangent, radius).to_vec(),
        StrokeCap::Round => square_around(point, radius).to_vec(),
    }
}

fn square_around(point: Point, radius: f64) -> [Point; 2] {
    [point - Point::splat(radius), point + Point::splat(radius)]
}

fn join_points(point: Point, incoming: Point, outgoing: Point, style: &StrokeStyle) -> Vec<Point> {
    let radius = style.radius();
    let mut points = Vec::with_capacity(5);
    points.extend(butt_cap(point, incoming, radius));
    points.extend(butt_cap(point, outgoing, radius));
    match style.join {
        StrokeJoin::Round => points.extend(square_around(point, radius)),
        StrokeJoin::Bevel => {}
        StrokeJoin::Miter => {
            if let Some(tip) = miter_tip(point, incoming, outgoing, radius) {
                if tip.distance(point) <= style.miter_limit * radius {
                    points.push(tip);
                }
            }
        }
    }
    points
}

/// Outer corner where the offset edges of the two curves meet.
fn miter_tip(point: Point, incoming: Point, outgoing: Point, radius: f64) -> Option<Point> {
    let cross = incoming.perp_dot(outgoing);
    if is_machine_zero(cross) {
        return None;
    }
    let outer = incoming - outgoing;
    [1.0, -1.0].into_iter().find_map(|side| {
        let a = point + incoming.perp() * radius * side;
        let b = point + outgoing.perp() * radius * side;
        let s = outgoing.perp_dot(b - a) / outgoing.perp_dot(incoming);
        let tip = a + incoming * s;
        ((tip - point).dot(outer) > 0.0).then_some(tip)
    })
}

impl Path {
    /// Bounds of the area covered by stroking the path with `style`.
    pub fn stroke_bounds(&self, style: &StrokeStyle) -> Option<Rectangle> {
        let radius = style.radius();
        if radius == 0.0 {
            return self.bounds();
        }
        let curves: Vec<Bezier> = self.beziers().collect();
        let Some(first) = curves.first() else {
            let point = self.first_segment()?.point;
            return Rectangle::from_points(match style.cap {
                StrokeCap::Round | StrokeCap::Square => square_around(point, radius).to_vec(),
                StrokeCap::Butt => vec![point],
            });
        };
        let mut bounds = curves
            .iter()
            .map(|curve| curve_stroke_extent(curve, radius))
            .fold(curve_stroke_extent(first, radius), |a, b| a.unite(&b));

        let mut extra = Vec::new();
        let joins = if self.closed { 0..curves.len() } else { 1..curves.len() };
        for index in joins {
            let previous = &curves[(index + curves.len() - 1) % curves.len()];
            let current = &curves[index];
            extra.extend(join_points(
                current.p1,
                previous.tangent_at_time(1.0),
                current.tangent_at_time(0.0),
                style,
            ));
        }
        if !self.closed {
            let last = &curves[curves.len() - 1];
            let start_tangent = first.tangent_at_time(0.0);
            let end_tangent = last.tangent_at_time(1.0);
            extra.extend(cap_points(first.p1, start_tangent, -start_tangent, style));
            extra.extend(cap_points(last.p2, end_tangent, end_tangent, style));
        }
        for point in extra {
            bounds = bounds.include(point);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;

    #[test]
    fn test_line_caps() {
        let line = Path::line(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
        let butt = line.stroke_bounds(&StrokeStyle::new(2.0)).unwrap();
        assert_eq!(butt, Rectangle::new(0.0, -1.0, 10.0, 2.0));
        let square = line
            .stroke_bounds(&StrokeStyle::new(2.0).with_cap(StrokeCap::Square))
            .unwrap();
        assert_eq!(square, Rectangle::new(-1.0, -1.0, 12.0, 2.0));
        let round = line
            .stroke_bounds(&StrokeStyle::new(2.0).with_cap(StrokeCap::Round))
            .unwrap();
        assert_eq!(round, Rectangle::new(-1.0, -1.0, 12.0, 2.0));
    }

    #[test]
    fn test_square_miter_join() {
        let square = Path::rectangle(Rectangle::new(0.0, 0.0, 10.0, 10.0));
        let bounds = square.stroke_bounds(&StrokeStyle::new(2.0)).unwrap();
        assert_relative_eq!(bounds.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.width, 12.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.height, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_miter_limit_falls_back_to_bevel() {
        let spike = Path::from_points(
            [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.5), DVec2::new(0.0, 1.0)],
            false,
        );
        let mitered = spike
            .stroke_bounds(&StrokeStyle::new(1.0).with_miter_limit(100.0))
            .unwrap();
        let limited = spike
            .stroke_bounds(&StrokeStyle::new(1.0).with_miter_limit(1.0))
            .unwrap();
        assert!(mitered.right() > limited.right());
        assert!(limited.right() < 10.6);
    }

    #[test]
    fn test_circle_stroke() {
        let circle = Path::circle(DVec2::ZERO, 5.0);
        let bounds = circle
            .stroke_bounds(&StrokeStyle::new(2.0).with_join(StrokeJoin::Round))
            .unwrap();
        assert_relative_eq!(bounds.width, 12.0, epsilon = 1e-6);
        assert_relative_eq!(bounds.y, -6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_width_matches_bounds() {
        let circle = Path::circle(DVec2::ZERO, 5.0);
        assert_eq!(circle.stroke_bounds(&StrokeStyle::new(0.0)), circle.bounds());
    }
}
