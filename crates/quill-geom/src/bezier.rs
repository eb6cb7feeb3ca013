//! Cubic Bezier math on absolute control points.
//!
//! [`Bezier`] is the value type every curve query reduces to: a
//! [`Curve`](crate::Curve) view resolves its two segments into one, and the
//! intersection and boolean engines work on them directly.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::GeometryConfig;
use crate::numerical::{
    CURVETIME_EPSILON, EPSILON, GEOMETRIC_EPSILON, find_root, integrate, solve_cubic,
    solve_quadratic,
};
use crate::primitives::{Matrix, Point, PointExt, Rectangle};

/// Coordinate axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, point: Point) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }
}

/// A cubic Bezier curve given by its anchors `p1`, `p2` and absolute
/// control points `c1`, `c2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bezier {
    pub p1: Point,
    pub c1: Point,
    pub c2: Point,
    pub p2: Point,
}

impl Bezier {
    /// Creates a curve from anchors and absolute control points.
    pub fn new(p1: Point, c1: Point, c2: Point, p2: Point) -> Self {
        Self { p1, c1, c2, p2 }
    }

    /// A straight line without handles.
    pub fn line(p1: Point, p2: Point) -> Self {
        Self::new(p1, p1, p2, p2)
    }

    /// The four control points in order.
    pub fn points(&self) -> [Point; 4] {
        [self.p1, self.c1, self.c2, self.p2]
    }

    /// The same curve traversed backwards.
    pub fn reversed(&self) -> Self {
        Self::new(self.p2, self.c2, self.c1, self.p1)
    }

    /// Transforms all control points.
    pub fn transformed(&self, matrix: &Matrix) -> Self {
        let [p1, c1, c2, p2] = self.points().map(|p| matrix.transform_point(p));
        Self::new(p1, c1, c2, p2)
    }

    /// Returns true if all four control points are within `tolerance` of
    /// the other curve's.
    pub fn is_close(&self, other: &Bezier, tolerance: f64) -> bool {
        self.points()
            .iter()
            .zip(other.points().iter())
            .all(|(a, b)| a.is_close(*b, tolerance))
    }

    /// Returns true if any control point differs from its anchor.
    pub fn has_handles(&self) -> bool {
        !(self.c1 - self.p1).is_zero() || !(self.c2 - self.p2).is_zero()
    }

    /// Returns true if the curve is geometrically a straight line: both
    /// handles lie on the anchor-to-anchor line and point inwards without
    /// overshooting the opposite anchor.
    pub fn is_linear(&self) -> bool {
        let h1 = self.c1 - self.p1;
        let h2 = self.c2 - self.p2;
        if h1.is_zero() && h2.is_zero() {
            return true;
        }
        let v = self.p2 - self.p1;
        if v.is_zero() || !v.is_collinear(h1) || !v.is_collinear(h2) {
            return false;
        }
        if line_distance(self.p1, v, self.c1) >= GEOMETRIC_EPSILON
            || line_distance(self.p1, v, self.c2) >= GEOMETRIC_EPSILON
        {
            return false;
        }
        let div = v.dot(v);
        let s1 = v.dot(h1) / div;
        let s2 = v.dot(h2) / div;
        (0.0..=1.0).contains(&s1) && (-1.0..=0.0).contains(&s2)
    }

    /// Returns true if the curve is longer than `epsilon`.
    pub fn has_length(&self, epsilon: f64) -> bool {
        (!self.p1.is_close(self.p2, EPSILON) || self.has_handles()) && self.length() > epsilon
    }

    /// Point at curve time `t`.
    pub fn point_at_time(&self, t: f64) -> Point {
        if t == 0.0 {
            return self.p1;
        }
        if t == 1.0 {
            return self.p2;
        }
        let mt = 1.0 - t;
        self.p1 * (mt * mt * mt)
            + self.c1 * (3.0 * mt * mt * t)
            + self.c2 * (3.0 * mt * t * t)
            + self.p2 * (t * t * t)
    }

    /// First derivative at curve time `t`.
    pub fn derivative_at_time(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        ((self.c1 - self.p1) * (mt * mt)
            + (self.c2 - self.c1) * (2.0 * mt * t)
            + (self.p2 - self.c2) * (t * t))
            * 3.0
    }

    /// Second derivative at curve time `t`.
    pub fn second_derivative_at_time(&self, t: f64) -> Point {
        ((self.c2 - self.c1 * 2.0 + self.p1) * (1.0 - t) + (self.p2 - self.c2 * 2.0 + self.c1) * t)
            * 6.0
    }

    /// Unit tangent at curve time `t`.
    ///
    /// At an end whose handle is zero the direction towards the other
    /// handle is used instead, so a curve with collapsed handles still has
    /// a tangent at its anchors. A curve collapsed to a point yields zero.
    pub fn tangent_at_time(&self, t: f64) -> Point {
        let mut tangent = self.derivative_at_time(t);
        if tangent.is_zero() && (t < CURVETIME_EPSILON || t > 1.0 - CURVETIME_EPSILON) {
            tangent = self.c2 - self.c1;
        }
        if tangent.is_zero() {
            tangent = self.p2 - self.p1;
        }
        tangent.normalize_or_zero()
    }

    /// Unit normal at curve time `t`, the tangent rotated by -90°.
    pub fn normal_at_time(&self, t: f64) -> Point {
        let tangent = self.tangent_at_time(t);
        DVec2::new(tangent.y, -tangent.x)
    }

    /// Signed curvature at curve time `t`.
    pub fn curvature_at_time(&self, t: f64) -> f64 {
        let d = self.derivative_at_time(t);
        let dd = self.second_derivative_at_time(t);
        let denominator = d.length_squared().powf(1.5);
        if denominator == 0.0 {
            return 0.0;
        }
        d.perp_dot(dd) / denominator
    }

    /// Splits the curve at `t` using de Casteljau subdivision.
    pub fn split(&self, t: f64) -> (Bezier, Bezier) {
        let p01 = self.p1.lerp(self.c1, t);
        let p12 = self.c1.lerp(self.c2, t);
        let p23 = self.c2.lerp(self.p2, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = if t == 1.0 { self.p2 } else { p012.lerp(p123, t) };
        (
            Bezier::new(self.p1, p01, p012, mid),
            Bezier::new(mid, p123, p23, self.p2),
        )
    }

    /// The portion of the curve between `from` and `to`. Reversed when
    /// `from > to`.
    pub fn part(&self, from: f64, to: f64) -> Bezier {
        let flip = from > to;
        let (from, to) = if flip { (to, from) } else { (from, to) };
        let mut part = *self;
        if from > 0.0 {
            part = part.split(from).1;
        }
        if to < 1.0 {
            let t = if from >= 1.0 { 0.0 } else { (to - from) / (1.0 - from) };
            part = part.split(t).0;
        }
        if flip { part.reversed() } else { part }
    }

    /// Bounds of the control polygon.
    pub fn control_bounds(&self) -> Rectangle {
        let min = self.p1.min(self.c1).min(self.c2).min(self.p2);
        let max = self.p1.max(self.c1).max(self.c2).max(self.p2);
        Rectangle::from_corners(min, max)
    }

    /// Curve times in `(0, 1)` where the derivative along `axis` vanishes.
    pub fn extrema_times(&self, axis: Axis) -> Vec<f64> {
        let [v0, v1, v2, v3] = self.points().map(|p| axis.of(p));
        let a = 3.0 * (v1 - v2) - v0 + v3;
        let b = 2.0 * (v0 + v2) - 4.0 * v1;
        let c = v1 - v0;
        solve_quadratic(a, b, c, None)
            .into_iter()
            .filter(|t| *t > CURVETIME_EPSILON && *t < 1.0 - CURVETIME_EPSILON)
            .collect()
    }

    /// Exact bounds, using the extrema of the curve rather than its
    /// control polygon.
    pub fn bounds(&self) -> Rectangle {
        let mut min = self.p1.min(self.p2);
        let mut max = self.p1.max(self.p2);
        for axis in [Axis::X, Axis::Y] {
            let lo = axis.of(min).min(axis.of(self.c1)).min(axis.of(self.c2));
            let hi = axis.of(max).max(axis.of(self.c1)).max(axis.of(self.c2));
            if lo >= axis.of(min) && hi <= axis.of(max) {
                continue;
            }
            for t in self.extrema_times(axis) {
                let p = self.point_at_time(t);
                min = min.min(p);
                max = max.max(p);
            }
        }
        Rectangle::from_corners(min, max)
    }

    /// Arc length of the whole curve.
    pub fn length(&self) -> f64 {
        self.length_between(0.0, 1.0, &GeometryConfig::DEFAULT)
    }

    /// Arc length between two curve times.
    pub fn length_between(&self, from: f64, to: f64, config: &GeometryConfig) -> f64 {
        let (from, to) = if from > to { (to, from) } else { (from, to) };
        if !self.has_handles() {
            return self.point_at_time(from).distance(self.point_at_time(to));
        }
        integrate(
            |t| self.derivative_at_time(t).length(),
            from,
            to,
            config.length_tolerance,
            config.max_subdivision_depth,
        )
    }

    /// Curve time at arc-length `offset` from `start`.
    ///
    /// `start` defaults to 0 for positive offsets and 1 for negative ones.
    /// Returns `None` when the offset runs past the end of the curve.
    pub fn time_at(&self, offset: f64, start: Option<f64>) -> Option<f64> {
        let config = GeometryConfig::DEFAULT;
        let start = start.unwrap_or(if offset < 0.0 { 1.0 } else { 0.0 });
        if offset == 0.0 {
            return Some(start);
        }
        if !self.has_handles() {
            let chord = self.p1.distance(self.p2);
            if chord == 0.0 {
                return None;
            }
            let fraction = line_fraction(start) + offset / chord;
            if fraction < -GEOMETRIC_EPSILON / chord || fraction > 1.0 + GEOMETRIC_EPSILON / chord {
                return None;
            }
            return Some(line_time(fraction));
        }
        let forward = offset > 0.0;
        let (a, b) = if forward { (start, 1.0) } else { (0.0, start) };
        let range = self.length_between(a, b, &config);
        let diff = offset.abs() - range;
        if diff.abs() < GEOMETRIC_EPSILON {
            return Some(if forward { b } else { a });
        }
        if diff > 0.0 {
            return None;
        }
        let guess = start + offset / range * (b - a);
        let signed_length = |t: f64| {
            let length = self.length_between(start, t, &config);
            if t >= start { length } else { -length }
        };
        Some(find_root(
            |t| signed_length(t) - offset,
            |t| self.derivative_at_time(t).length(),
            guess,
            a,
            b,
            32,
            EPSILON,
        ))
    }

    /// Roots in `[0, 1]` of `coordinate(t) == value` along `axis`.
    pub fn solve_coordinate(&self, axis: Axis, value: f64) -> Vec<f64> {
        let [v0, v1, v2, v3] = self.points().map(|p| axis.of(p));
        let all_below = v0 < value && v1 < value && v2 < value && v3 < value;
        let all_above = v0 > value && v1 > value && v2 > value && v3 > value;
        if all_below || all_above {
            return Vec::new();
        }
        let c = 3.0 * (v1 - v0);
        let b = 3.0 * (v2 - v1) - c;
        let a = v3 - v0 - c - b;
        solve_cubic(a, b, c, v0 - value, Some((0.0, 1.0)))
    }

    /// Curve time of a point lying on the curve, or `None` if the point is
    /// further than the geometric tolerance from it.
    pub fn time_of(&self, point: Point) -> Option<f64> {
        if point.is_close(self.p1, EPSILON) {
            return Some(0.0);
        }
        if point.is_close(self.p2, EPSILON) {
            return Some(1.0);
        }
        for axis in [Axis::X, Axis::Y] {
            for t in self.solve_coordinate(axis, axis.of(point)) {
                if point.is_close(self.point_at_time(t), GEOMETRIC_EPSILON) {
                    return Some(t);
                }
            }
        }
        if point.is_close(self.p1, GEOMETRIC_EPSILON) {
            Some(0.0)
        } else if point.is_close(self.p2, GEOMETRIC_EPSILON) {
            Some(1.0)
        } else {
            None
        }
    }

    /// Curve time of the point on the curve nearest to `point`.
    pub fn nearest_time(&self, point: Point) -> f64 {
        if !self.has_handles() {
            let v = self.p2 - self.p1;
            let det = v.length_squared();
            if det == 0.0 {
                return 0.0;
            }
            return line_time((point - self.p1).dot(v) / det);
        }

        const SAMPLES: usize = 100;
        let mut min_dist = f64::INFINITY;
        let mut min_t = 0.0;
        let refine = |t: f64, min_dist: &mut f64, min_t: &mut f64| {
            if (0.0..=1.0).contains(&t) {
                let dist = point.distance_squared(self.point_at_time(t));
                if dist < *min_dist {
                    *min_dist = dist;
                    *min_t = t;
                    return true;
                }
            }
            false
        };
        for i in 0..=SAMPLES {
            refine(i as f64 / SAMPLES as f64, &mut min_dist, &mut min_t);
        }
        let mut step = 1.0 / (SAMPLES as f64 * 2.0);
        while step > CURVETIME_EPSILON {
            let current = min_t;
            if !refine(current - step, &mut min_dist, &mut min_t)
                && !refine(current + step, &mut min_dist, &mut min_t)
            {
                step /= 2.0;
            }
        }
        min_t
    }

    /// Point on the curve nearest to `point`.
    pub fn nearest_point(&self, point: Point) -> Point {
        self.point_at_time(self.nearest_time(point))
    }

    /// Signed area between the curve and the origin, so that summing over
    /// a closed contour yields its enclosed area. Positive for contours
    /// that run clockwise on screen (y down).
    pub fn area(&self) -> f64 {
        let [p0, p1, p2, p3] = self.points();
        3.0 * ((p3.y - p0.y) * (p1.x + p2.x) - (p3.x - p0.x) * (p1.y + p2.y)
            + p1.y * (p0.x - p2.x)
            - p1.x * (p0.y - p2.y)
            + p3.y * (p2.x + p0.x / 3.0)
            - p3.x * (p2.y + p0.y / 3.0))
            / 20.0
    }

    /// Returns true if the curve deviates from its chord by at most
    /// `flatness`.
    pub fn is_flat_enough(&self, flatness: f64) -> bool {
        if self.is_linear() {
            return true;
        }
        let u = self.c1 * 3.0 - self.p1 * 2.0 - self.p2;
        let v = self.c2 * 3.0 - self.p2 * 2.0 - self.p1;
        (u.x * u.x).max(v.x * v.x) + (u.y * u.y).max(v.y * v.y) <= 16.0 * flatness * flatness
    }

    /// Splits the curve into pieces that are monotone along the y-axis.
    pub(crate) fn y_monotone_parts(&self) -> Vec<Bezier> {
        let [o0, o1, o2, o3] = self.points().map(|p| p.y);
        if ((o0 >= o1) == (o1 >= o2) && (o1 >= o2) == (o2 >= o3)) || self.is_linear() {
            return vec![*self];
        }
        let a = 3.0 * (o1 - o2) - o0 + o3;
        let b = 2.0 * (o0 + o2) - 4.0 * o1;
        let c = o1 - o0;
        let mut roots: Vec<f64> = solve_quadratic(a, b, c, None)
            .into_iter()
            .filter(|t| *t > CURVETIME_EPSILON && *t < 1.0 - CURVETIME_EPSILON)
            .collect();
        roots.sort_by(f64::total_cmp);
        match roots.as_slice() {
            [] => vec![*self],
            [t] => {
                let (left, right) = self.split(*t);
                vec![left, right]
            }
            [t0, t1, ..] => {
                let (left, rest) = self.split(*t0);
                let (middle, right) = rest.split((t1 - t0) / (1.0 - t0));
                vec![left, middle, right]
            }
        }
    }
}

/// Fraction of the chord covered at curve time `t` on a curve without
/// handles. Such a curve eases in and out of its anchors, so the point at
/// time `t` lies at `3t² - 2t³` of the way along.
fn line_fraction(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Inverse of [`line_fraction`], clamped to `[0, 1]`.
fn line_time(fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }
    0.5 - ((1.0 - 2.0 * fraction).asin() / 3.0).sin()
}

/// Distance from `point` to the infinite line through `origin` along `vector`.
pub(crate) fn line_distance(origin: Point, vector: Point, point: Point) -> f64 {
    let length = vector.length();
    if length == 0.0 {
        return point.distance(origin);
    }
    vector.perp_dot(point - origin).abs() / length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::KAPPA;
    use approx::assert_relative_eq;

    fn quarter_circle() -> Bezier {
        Bezier::new(
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, KAPPA),
            DVec2::new(KAPPA, 1.0),
            DVec2::new(0.0, 1.0),
        )
    }

    fn s_curve() -> Bezier {
        Bezier::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(2.0, -2.0),
            DVec2::new(3.0, 0.0),
        )
    }

    #[test]
    fn test_point_and_tangent() {
        let line = Bezier::line(DVec2::ZERO, DVec2::new(2.0, 0.0));
        assert_eq!(line.point_at_time(0.5), DVec2::new(1.0, 0.0));
        assert_eq!(line.tangent_at_time(0.0), DVec2::new(1.0, 0.0));
        assert_eq!(line.tangent_at_time(1.0), DVec2::new(1.0, 0.0));
        assert_eq!(line.normal_at_time(0.5), DVec2::new(0.0, -1.0));
    }

    #[test]
    fn test_linear_detection() {
        assert!(Bezier::line(DVec2::ZERO, DVec2::new(3.0, 0.0)).is_linear());
        let collinear = Bezier::new(
            DVec2::ZERO,
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(3.0, 0.0),
        );
        assert!(collinear.is_linear());
        assert!(!s_curve().is_linear());
        let overshoot = Bezier::new(
            DVec2::ZERO,
            DVec2::new(4.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(3.0, 0.0),
        );
        assert!(!overshoot.is_linear());
    }

    #[test]
    fn test_exact_bounds() {
        let bounds = s_curve().bounds();
        assert_relative_eq!(bounds.left(), 0.0);
        assert_relative_eq!(bounds.right(), 3.0);
        // The control polygon reaches ±2 but the curve does not.
        assert!(bounds.top() > -1.0 && bounds.top() < -0.5);
        assert!(bounds.bottom() < 1.0 && bounds.bottom() > 0.5);
        let hull = s_curve().control_bounds();
        assert_relative_eq!(hull.top(), -2.0);
    }

    #[test]
    fn test_quarter_circle_length() {
        let length = quarter_circle().length();
        assert_relative_eq!(length, std::f64::consts::FRAC_PI_2, max_relative = 1e-3);
    }

    #[test]
    fn test_time_at_offset_round_trip() {
        let curve = s_curve();
        let total = curve.length();
        let t = curve.time_at(total * 0.3, None).unwrap();
        let partial = curve.length_between(0.0, t, &GeometryConfig::DEFAULT);
        assert_relative_eq!(partial, total * 0.3, max_relative = 1e-6);
        assert!(curve.time_at(total * 2.0, None).is_none());
        let back = curve.time_at(-total * 0.3, None).unwrap();
        let tail = curve.length_between(back, 1.0, &GeometryConfig::DEFAULT);
        assert_relative_eq!(tail, total * 0.3, max_relative = 1e-6);
    }

    #[test]
    fn test_time_of_and_nearest_time() {
        let curve = s_curve();
        let point = curve.point_at_time(0.37);
        assert_relative_eq!(curve.time_of(point).unwrap(), 0.37, epsilon = 1e-9);
        assert!(curve.time_of(DVec2::new(10.0, 10.0)).is_none());
        let t = curve.nearest_time(point + curve.normal_at_time(0.37) * 0.01);
        assert_relative_eq!(t, 0.37, epsilon = 1e-4);
    }

    #[test]
    fn test_split_and_part() {
        let curve = s_curve();
        let (left, right) = curve.split(0.25);
        assert_eq!(left.p2, right.p1);
        assert!(left.p2.is_close(curve.point_at_time(0.25), 1e-12));
        let part = curve.part(0.2, 0.6);
        assert!(part.point_at_time(0.5).is_close(curve.point_at_time(0.4), 1e-12));
        let reversed = curve.part(0.6, 0.2);
        assert!(reversed.p1.is_close(curve.point_at_time(0.6), 1e-12));
    }

    #[test]
    fn test_area_of_unit_square_edges() {
        let corners = [
            DVec2::new(0.0, 1.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
        ];
        let area: f64 = (0..4)
            .map(|i| Bezier::line(corners[i], corners[(i + 1) % 4]).area())
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_curvature_of_arc() {
        let k = quarter_circle().curvature_at_time(0.5);
        assert_relative_eq!(k.abs(), 1.0, max_relative = 1e-2);
    }

    #[test]
    fn test_monotone_parts() {
        let parts = s_curve().y_monotone_parts();
        assert_eq!(parts.len(), 3);
        for part in parts {
            let ys: Vec<f64> = (0..=20).map(|i| part.point_at_time(i as f64 / 20.0).y).collect();
            let rising = ys[20] >= ys[0];
            assert!(ys.windows(2).all(|w| {
                if rising {
                    w[1] >= w[0] - 1e-9
                } else {
                    w[1] <= w[0] + 1e-9
                }
            }));
        }
    }

    #[test]
    fn test_line_time_follows_point_at_time() {
        let line = Bezier::line(DVec2::new(0.5, 0.0), DVec2::new(1.5, 0.0));
        let quarter = DVec2::new(0.75, 0.0);
        let t = line.nearest_time(quarter + DVec2::new(0.0, 0.3));
        assert!(line.point_at_time(t).is_close(quarter, 1e-12));
        assert!(line.nearest_point(quarter).is_close(quarter, 1e-12));
        assert_relative_eq!(line.time_of(quarter).unwrap(), t, epsilon = 1e-9);
        assert_eq!(line.nearest_time(DVec2::new(-3.0, 1.0)), 0.0);
        assert_eq!(line.nearest_time(DVec2::new(9.0, 1.0)), 1.0);
    }

    #[test]
    fn test_line_time_at_offset() {
        let line = Bezier::line(DVec2::ZERO, DVec2::new(4.0, 0.0));
        let t = line.time_at(1.0, None).unwrap();
        assert!(line.point_at_time(t).is_close(DVec2::new(1.0, 0.0), 1e-12));
        let back = line.time_at(-1.0, Some(t)).unwrap();
        assert!(back.abs() < 1e-6);
        let from_end = line.time_at(-1.0, None).unwrap();
        assert!(line.point_at_time(from_end).is_close(DVec2::new(3.0, 0.0), 1e-12));
        assert!(line.time_at(4.5, None).is_none());
        assert_eq!(line.time_at(4.0, None), Some(1.0));
    }

    #[test]
    fn test_flatness() {
        assert!(Bezier::line(DVec2::ZERO, DVec2::new(5.0, 5.0)).is_flat_enough(1e-6));
        assert!(!quarter_circle().is_flat_enough(0.01));
    }
}
