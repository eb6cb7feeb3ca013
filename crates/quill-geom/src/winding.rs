//! Fill rules and winding numbers.

use serde::{Deserialize, Serialize};

use crate::bezier::{Axis, Bezier};
use crate::numerical::GEOMETRIC_EPSILON;
use crate::primitives::Point;

/// Policy for deciding whether a winding number counts as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    /// Returns true if a point with this winding number is filled.
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Result of a winding query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Winding {
    /// Signed number of times the outline winds around the point. Contours
    /// with positive area contribute +1.
    pub winding: i32,
    /// The point lies within the query tolerance of the outline.
    pub on_path: bool,
}

/// Curve time where a y-monotone curve reaches height `y`.
fn monotone_time_at_y(curve: &Bezier, y: f64) -> f64 {
    if y == curve.p1.y {
        return 0.0;
    }
    if y == curve.p2.y {
        return 1.0;
    }
    if let Some(t) = curve.solve_coordinate(Axis::Y, y).first() {
        return *t;
    }
    let rising = curve.p2.y > curve.p1.y;
    let (mut lo, mut hi) = (0.0, 1.0);
    for _ in 0..64 {
        let mid = (lo + hi) * 0.5;
        let below = curve.point_at_time(mid).y < y;
        if below == rising {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) * 0.5
}

/// Winding number of `point` with respect to a set of curves, counting
/// crossings of a horizontal ray towards positive x.
///
/// Each curve is split into y-monotone pieces; a piece is counted when the
/// point's height falls in its half-open y range, so shared vertices are
/// counted exactly once. With a non-negative `tolerance` the result also
/// reports whether the point lies on the outline.
pub fn winding_at(point: Point, curves: impl IntoIterator<Item = Bezier>, tolerance: f64) -> Winding {
    let mut result = Winding::default();
    for curve in curves {
        let bounds = curve.control_bounds();
        if tolerance >= 0.0
            && !result.on_path
            && bounds
                .expand(tolerance * 2.0, tolerance * 2.0)
                .contains_point(point)
            && curve.nearest_point(point).distance(point) <= tolerance
        {
            result.on_path = true;
        }
        if point.y < bounds.top() || point.y > bounds.bottom() || bounds.right() <= point.x {
            continue;
        }
        for mono in curve.y_monotone_parts() {
            let (y0, y1) = (mono.p1.y, mono.p2.y);
            if y0 == y1 || point.y < y0.min(y1) || point.y >= y0.max(y1) {
                continue;
            }
            let x = mono.point_at_time(monotone_time_at_y(&mono, point.y)).x;
            if x > point.x {
                result.winding += if y1 > y0 { 1 } else { -1 };
            }
        }
    }
    result
}

/// A point inside the filled area of a closed outline: the bounds center
/// if it is filled, otherwise the first filled midpoint between adjacent
/// ray intercepts at the center's height.
pub(crate) fn interior_point(curves: &[Bezier], fill_rule: FillRule) -> Option<Point> {
    let bounds = curves
        .iter()
        .map(Bezier::bounds)
        .reduce(|a, b| a.unite(&b))?;
    let center = bounds.center();
    let is_filled =
        |p: Point| fill_rule.is_inside(winding_at(p, curves.iter().copied(), -1.0).winding);
    if is_filled(center) {
        return Some(center);
    }
    let y = center.y;
    let mut intercepts = Vec::new();
    for curve in curves {
        for mono in curve.y_monotone_parts() {
            let (y0, y1) = (mono.p1.y, mono.p2.y);
            if y0 != y1 && y >= y0.min(y1) && y <= y0.max(y1) {
                intercepts.push(mono.point_at_time(monotone_time_at_y(&mono, y)).x);
            }
        }
    }
    intercepts.sort_by(f64::total_cmp);
    intercepts.dedup_by(|a, b| (*a - *b).abs() <= GEOMETRIC_EPSILON);
    let found = intercepts
        .windows(2)
        .map(|pair| Point::new((pair[0] + pair[1]) * 0.5, y))
        .find(|p| is_filled(*p));
    Some(found.unwrap_or(center))
}
