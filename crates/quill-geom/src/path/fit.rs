//! Reshaping operations: flattening curves into polylines, fitting
//! polylines with cubic curves, and smoothing corners.

use tracing::debug;

use crate::bezier::Bezier;
use crate::error::{GeomError, GeomResult};
use crate::numerical::{EPSILON, is_machine_zero};
use crate::primitives::{Point, PointExt};
use crate::segment::Segment;

use super::Path;

/// Subdivision depth limit when flattening one curve.
const MAX_FLATTEN_DEPTH: u32 = 16;

fn flatten_curve(curve: &Bezier, flatness: f64, depth: u32, out: &mut Vec<Point>) {
    if depth >= MAX_FLATTEN_DEPTH || curve.is_flat_enough(flatness) {
        out.push(curve.p2);
        return;
    }
    let (left, right) = curve.split(0.5);
    flatten_curve(&left, flatness, depth + 1, out);
    flatten_curve(&right, flatness, depth + 1, out);
}

impl Path {
    /// Replaces all curves with straight lines that stay within
    /// `flatness` of the original outline.
    pub fn flatten(&mut self, flatness: f64) -> GeomResult<()> {
        if !(flatness > 0.0) {
            return Err(GeomError::MalformedGeometry(format!(
                "flatness must be positive, got {flatness}"
            )));
        }
        let curves: Vec<Bezier> = self.beziers().collect();
        let Some(first) = curves.first() else {
            return Ok(());
        };
        let mut points = vec![first.p1];
        for curve in &curves {
            flatten_curve(curve, flatness, 0, &mut points);
        }
        if self.closed {
            points.pop();
        }
        debug!("Flattened {} curves into {} points", curves.len(), points.len());
        self.segments = points.into_iter().map(Segment::corner).collect();
        self.invalidate();
        Ok(())
    }

    /// Fits the anchors of the path with as few cubic curves as possible
    /// while staying within `tolerance` of every anchor.
    pub fn simplify(&mut self, tolerance: f64) -> GeomResult<()> {
        if !(tolerance > 0.0) {
            return Err(GeomError::MalformedGeometry(format!(
                "simplify tolerance must be positive, got {tolerance}"
            )));
        }
        let fitter = CurveFitter::new(self);
        if let Some(segments) = fitter.fit(tolerance * tolerance) {
            debug!("Simplified {} segments into {}", self.segments.len(), segments.len());
            self.segments = segments;
            self.invalidate();
        }
        Ok(())
    }

    /// Sets handles on every segment so the path passes smoothly through
    /// its anchors, using centripetal Catmull-Rom splines.
    pub fn smooth(&mut self) {
        const ALPHA: f64 = 0.5;
        let n = self.segments.len();
        if n < 2 {
            return;
        }
        let points: Vec<Point> = self.segments.iter().map(|segment| segment.point).collect();
        for i in 0..n {
            let first = i == 0 && !self.closed;
            let last = i == n - 1 && !self.closed;
            let p1 = points[i];
            let p0 = if first { p1 } else { points[(i + n - 1) % n] };
            let p2 = if last { p1 } else { points[(i + 1) % n] };
            let d1_a = p0.distance(p1).powf(ALPHA);
            let d2_a = p1.distance(p2).powf(ALPHA);
            let (d1_2a, d2_2a) = (d1_a * d1_a, d2_a * d2_a);
            let segment = &mut self.segments[i];
            if !first {
                let a = 2.0 * d2_2a + 3.0 * d2_a * d1_a + d1_2a;
                let n = 3.0 * d2_a * (d2_a + d1_a);
                segment.handle_in = if n != 0.0 {
                    (p0 * d2_2a + p1 * a - p2 * d1_2a) / n - p1
                } else {
                    Point::ZERO
                };
            }
            if !last {
                let a = 2.0 * d1_2a + 3.0 * d1_a * d2_a + d2_2a;
                let n = 3.0 * d1_a * (d1_a + d2_a);
                segment.handle_out = if n != 0.0 {
                    (p2 * d1_2a + p1 * a - p0 * d2_2a) / n - p1
                } else {
                    Point::ZERO
                };
            }
        }
        self.invalidate();
    }
}

/// Least-squares cubic fitting of a point sequence, after Schneider's
/// "An Algorithm for Automatically Fitting Digitized Curves".
struct CurveFitter {
    points: Vec<Point>,
    closed: bool,
}

impl CurveFitter {
    fn new(path: &Path) -> Self {
        let mut points: Vec<Point> = Vec::with_capacity(path.segments.len() + 1);
        for segment in &path.segments {
            if points.last() != Some(&segment.point) {
                points.push(segment.point);
            }
        }
        if path.closed && points.len() > 1 {
            if points.first() == points.last() {
                points.pop();
            }
            // Closed outlines are fitted as one run that returns to its start.
            points.push(points[0]);
        }
        Self {
            points,
            closed: path.closed,
        }
    }

    /// Fits the points, `error` being the largest accepted squared distance.
    fn fit(&self, error: f64) -> Option<Vec<Segment>> {
        let points = &self.points;
        let length = points.len();
        let first = *points.first()?;
        let mut segments = vec![Segment::corner(first)];
        if length > 1 {
            let (tan1, tan2) = if self.closed {
                let through = points[1] - points[length - 2];
                (through, -through)
            } else {
                (points[1] - points[0], points[length - 2] - points[length - 1])
            };
            self.fit_cubic(&mut segments, error, 0, length - 1, tan1, tan2);
            if self.closed && segments.len() > 1 {
                if let Some(closing) = segments.pop() {
                    segments[0].handle_in = closing.handle_in;
                }
            }
        }
        Some(segments)
    }

    fn fit_cubic(
        &self,
        segments: &mut Vec<Segment>,
        error: f64,
        first: usize,
        last: usize,
        tan1: Point,
        tan2: Point,
    ) {
        let points = &self.points;
        if last - first == 1 {
            let (p1, p2) = (points[first], points[last]);
            let dist = p1.distance(p2) / 3.0;
            let curve = Bezier::new(
                p1,
                p1 + tan1.normalize_or_zero() * dist,
                p2 + tan2.normalize_or_zero() * dist,
                p2,
            );
            add_curve(segments, &curve);
            return;
        }
        let mut u = self.chord_length_parameterize(first, last);
        let mut max_error = error.max(error * error);
        let mut split = (first + last + 1) / 2;
        let mut in_order = true;
        for _ in 0..=4 {
            let curve = self.generate_bezier(first, last, &u, tan1, tan2);
            let (max, index) = self.find_max_error(first, last, &curve, &u);
            if max < error && in_order {
                add_curve(segments, &curve);
                return;
            }
            split = index;
            if max >= max_error {
                break;
            }
            in_order = self.reparameterize(first, last, &mut u, &curve);
            max_error = max;
        }
        let tan_center = points[split - 1] - points[split + 1];
        self.fit_cubic(segments, error, first, split, tan1, tan_center);
        self.fit_cubic(segments, error, split, last, -tan_center, tan2);
    }

    fn generate_bezier(&self, first: usize, last: usize, u: &[f64], tan1: Point, tan2: Point) -> Bezier {
        let points = &self.points;
        let (pt1, pt2) = (points[first], points[last]);
        let (tan1, tan2) = (tan1.normalize_or_zero(), tan2.normalize_or_zero());
        let mut c = [[0.0; 2]; 2];
        let mut x = [0.0; 2];
        for (i, &ui) in u.iter().enumerate() {
            let t = 1.0 - ui;
            let b = 3.0 * ui * t;
            let (b0, b1, b2, b3) = (t * t * t, b * t, b * ui, ui * ui * ui);
            let a1 = tan1 * b1;
            let a2 = tan2 * b2;
            let tmp = points[first + i] - pt1 * (b0 + b1) - pt2 * (b2 + b3);
            c[0][0] += a1.dot(a1);
            c[0][1] += a1.dot(a2);
            c[1][1] += a2.dot(a2);
            x[0] += a1.dot(tmp);
            x[1] += a2.dot(tmp);
        }
        c[1][0] = c[0][1];
        let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
        let (mut alpha1, mut alpha2);
        if det_c0_c1.abs() > EPSILON {
            let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
            let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];
            alpha1 = det_x_c1 / det_c0_c1;
            alpha2 = det_c0_x / det_c0_c1;
        } else {
            let c0 = c[0][0] + c[0][1];
            let c1 = c[1][0] + c[1][1];
            let alpha = if c0.abs() > EPSILON {
                x[0] / c0
            } else if c1.abs() > EPSILON {
                x[1] / c1
            } else {
                0.0
            };
            alpha1 = alpha;
            alpha2 = alpha;
        }
        let seg_length = pt2.distance(pt1);
        let eps = EPSILON * seg_length;
        if alpha1 < eps || alpha2 < eps {
            alpha1 = seg_length / 3.0;
            alpha2 = alpha1;
        } else {
            // Handles that overshoot each other would produce a loop.
            let line = pt2 - pt1;
            let (h1, h2) = (tan1 * alpha1, tan2 * alpha2);
            if h1.dot(line) - h2.dot(line) > seg_length * seg_length {
                alpha1 = seg_length / 3.0;
                alpha2 = alpha1;
            }
        }
        Bezier::new(pt1, pt1 + tan1 * alpha1, pt2 + tan2 * alpha2, pt2)
    }

    /// Newton step on every parameter. Returns false when the parameters
    /// are no longer increasing.
    fn reparameterize(&self, first: usize, last: usize, u: &mut [f64], curve: &Bezier) -> bool {
        for i in first..=last {
            u[i - first] = find_root(curve, self.points[i], u[i - first]);
        }
        u.windows(2).all(|pair| pair[1] > pair[0])
    }

    fn chord_length_parameterize(&self, first: usize, last: usize) -> Vec<f64> {
        let mut u = vec![0.0; last - first + 1];
        for i in first + 1..=last {
            u[i - first] = u[i - first - 1] + self.points[i].distance(self.points[i - 1]);
        }
        let total = u[last - first];
        if total > 0.0 {
            for value in u.iter_mut().skip(1) {
                *value /= total;
            }
        }
        u
    }

    /// Largest squared distance between the points and the curve, with
    /// the index where it occurs.
    fn find_max_error(&self, first: usize, last: usize, curve: &Bezier, u: &[f64]) -> (f64, usize) {
        let mut index = (last - first + 1) / 2 + first;
        let mut max = 0.0;
        for i in first + 1..last {
            let distance = curve.point_at_time(u[i - first]).distance_squared(self.points[i]);
            if distance >= max {
                max = distance;
                index = i;
            }
        }
        (max, index)
    }
}

fn add_curve(segments: &mut Vec<Segment>, curve: &Bezier) {
    if let Some(previous) = segments.last_mut() {
        previous.handle_out = curve.c1 - curve.p1;
    }
    segments.push(Segment::new(curve.p2, curve.c2 - curve.p2, Point::ZERO));
}

/// One Newton-Raphson step towards the parameter of `point` on `curve`.
fn find_root(curve: &Bezier, point: Point, u: f64) -> f64 {
    let diff = curve.point_at_time(u) - point;
    let d1 = curve.derivative_at_time(u);
    let d2 = curve.second_derivative_at_time(u);
    let df = d1.dot(d1) + diff.dot(d2);
    if is_machine_zero(df) { u } else { u - diff.dot(d1) / df }
}
