//! Pairwise curve intersection primitives.
//!
//! Hits are reported as `(t1, t2)` pairs of curve times on the first and
//! second curve.

use crate::bezier::{Axis, Bezier};
use crate::numerical::{EPSILON, clamp, is_machine_zero};
use crate::primitives::{Point, PointExt};

const MAX_RECURSION: u32 = 40;
const FAT_LINE_EPSILON: f64 = 1e-9;

/// Signed distance from `x` to the line through `p` and `q`.
fn signed_distance(p: Point, q: Point, x: Point) -> f64 {
    let v = q - p;
    let length = v.length();
    if length == 0.0 {
        return p.x - x.x;
    }
    (x - p).perp_dot(v) / length
}

/// Intersection point of the segments `p1..p2` and `q1..q2`.
pub(crate) fn line_intersection(p1: Point, p2: Point, q1: Point, q2: Point) -> Option<Point> {
    let v1 = p2 - p1;
    let v2 = q2 - q1;
    let cross = v1.perp_dot(v2);
    if is_machine_zero(cross) {
        return None;
    }
    let d = p1 - q1;
    let u1 = v2.perp_dot(d) / cross;
    let u2 = v1.perp_dot(d) / cross;
    let range = -EPSILON..1.0 + EPSILON;
    if range.contains(&u1) && range.contains(&u2) {
        Some(p1 + v1 * clamp(u1, 0.0, 1.0))
    } else {
        None
    }
}

/// Intersections of two straight curves.
pub(crate) fn line_line(v1: &Bezier, v2: &Bezier) -> Vec<(f64, f64)> {
    line_intersection(v1.p1, v1.p2, v2.p1, v2.p2)
        .and_then(|point| Some((v1.time_of(point)?, v2.time_of(point)?)))
        .into_iter()
        .collect()
}

/// Intersections of a curve with a straight curve, found by rotating the
/// curve so that the line lies on the x-axis and solving for `y = 0`.
pub(crate) fn curve_line(curve: &Bezier, line: &Bezier) -> Vec<(f64, f64)> {
    let origin = line.p1;
    let direction = line.p2 - line.p1;
    let roots = if direction.is_zero() {
        curve.time_of(origin).into_iter().collect()
    } else {
        let (sin, cos) = (-direction.y).atan2(direction.x).sin_cos();
        let [p1, c1, c2, p2] = curve.points().map(|q| {
            let d = q - origin;
            Point::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
        });
        Bezier::new(p1, c1, c2, p2).solve_coordinate(Axis::Y, 0.0)
    };
    roots
        .into_iter()
        .filter_map(|t1| {
            let t2 = line.time_of(curve.point_at_time(t1))?;
            Some((t1, t2))
        })
        .collect()
}

/// Upper and lower convex hull of the distance function of a curve's
/// control points, as `(t, distance)` vertices.
fn convex_hull(dq0: f64, dq1: f64, dq2: f64, dq3: f64) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    let p0 = [0.0, dq0];
    let p1 = [1.0 / 3.0, dq1];
    let p2 = [2.0 / 3.0, dq2];
    let p3 = [1.0, dq3];
    let dist1 = dq1 - (2.0 * dq0 + dq3) / 3.0;
    let dist2 = dq2 - (dq0 + 2.0 * dq3) / 3.0;
    let (top, bottom) = if dist1 * dist2 < 0.0 {
        (vec![p0, p1, p3], vec![p0, p2, p3])
    } else {
        let ratio = dist1 / dist2;
        let top = if ratio >= 2.0 {
            vec![p0, p1, p3]
        } else if ratio <= 0.5 {
            vec![p0, p2, p3]
        } else {
            vec![p0, p1, p2, p3]
        };
        (top, vec![p0, p3])
    };
    let sign = if dist1 != 0.0 { dist1 } else { dist2 };
    if sign < 0.0 { (bottom, top) } else { (top, bottom) }
}

fn clip_hull_part(part: &[[f64; 2]], top: bool, threshold: f64) -> Option<f64> {
    let [mut px, mut py] = part[0];
    for &[qx, qy] in &part[1..] {
        let reached = if top { qy >= threshold } else { qy <= threshold };
        if reached {
            return Some(if qy == threshold {
                qx
            } else {
                px + (threshold - py) * (qx - px) / (qy - py)
            });
        }
        px = qx;
        py = qy;
    }
    None
}

fn clip_hull(top: &[[f64; 2]], bottom: &[[f64; 2]], d_min: f64, d_max: f64) -> Option<f64> {
    if top[0][1] < d_min {
        clip_hull_part(top, true, d_min)
    } else if bottom[0][1] > d_max {
        clip_hull_part(bottom, false, d_max)
    } else {
        Some(top[0][0])
    }
}

/// Recursive fat-line clipping of two curves.
struct Clipper {
    hits: Vec<(f64, f64)>,
    calls: u32,
    max_calls: u32,
}

impl Clipper {
    fn push(&mut self, flip: bool, t: f64, u: f64) {
        self.hits.push(if flip { (u, t) } else { (t, u) });
    }

    #[allow(clippy::too_many_arguments)]
    fn clip(
        &mut self,
        v1: Bezier,
        v2: Bezier,
        flip: bool,
        recursion: u32,
        t_min: f64,
        t_max: f64,
        u_min: f64,
        u_max: f64,
    ) {
        self.calls += 1;
        let recursion = recursion + 1;
        if self.calls >= self.max_calls || recursion >= MAX_RECURSION {
            return;
        }

        // A closed loop has no usable fat line; halve it first.
        if v2.p1.is_close(v2.p2, EPSILON) {
            let (left, right) = v2.split(0.5);
            let u = (u_min + u_max) * 0.5;
            self.clip(left, v1, !flip, recursion, u_min, u, t_min, t_max);
            self.clip(right, v1, !flip, recursion, u, u_max, t_min, t_max);
            return;
        }

        let (q0, q3) = (v2.p1, v2.p2);
        let d1 = signed_distance(q0, q3, v2.c1);
        let d2 = signed_distance(q0, q3, v2.c2);
        let factor = if d1 * d2 > 0.0 { 3.0 / 4.0 } else { 4.0 / 9.0 };
        let d_min = factor * 0f64.min(d1).min(d2);
        let d_max = factor * 0f64.max(d1).max(d2);
        let [dp0, dp1, dp2, dp3] = v1.points().map(|p| signed_distance(q0, q3, p));
        if d1 == 0.0 && d2 == 0.0 && dp0 == 0.0 && dp1 == 0.0 && dp2 == 0.0 && dp3 == 0.0 {
            return;
        }
        let (top, bottom) = convex_hull(dp0, dp1, dp2, dp3);
        let Some(t_min_clip) = clip_hull(&top, &bottom, d_min, d_max) else {
            return;
        };
        let top_rev: Vec<_> = top.iter().rev().copied().collect();
        let bottom_rev: Vec<_> = bottom.iter().rev().copied().collect();
        let Some(t_max_clip) = clip_hull(&top_rev, &bottom_rev, d_min, d_max) else {
            return;
        };

        let t_min_new = t_min + (t_max - t_min) * t_min_clip;
        let t_max_new = t_min + (t_max - t_min) * t_max_clip;
        if (u_max - u_min).max(t_max_new - t_min_new) < FAT_LINE_EPSILON {
            let t = (t_min_new + t_max_new) * 0.5;
            let u = (u_min + u_max) * 0.5;
            self.push(flip, t, u);
            return;
        }

        let v1 = v1.part(t_min_clip, t_max_clip);
        let u_diff = u_max - u_min;
        if t_max_clip - t_min_clip > 0.8 {
            // Clipping made little progress: subdivide the longer range.
            if t_max_new - t_min_new > u_diff {
                let (left, right) = v1.split(0.5);
                let t = (t_min_new + t_max_new) * 0.5;
                self.clip(v2, left, !flip, recursion, u_min, u_max, t_min_new, t);
                self.clip(v2, right, !flip, recursion, u_min, u_max, t, t_max_new);
            } else {
                let (left, right) = v2.split(0.5);
                let u = (u_min + u_max) * 0.5;
                self.clip(left, v1, !flip, recursion, u_min, u, t_min_new, t_max_new);
                self.clip(right, v1, !flip, recursion, u, u_max, t_min_new, t_max_new);
            }
        } else if u_diff == 0.0 || u_diff >= FAT_LINE_EPSILON {
            self.clip(v2, v1, !flip, recursion, u_min, u_max, t_min_new, t_max_new);
        } else {
            self.clip(v1, v2, flip, recursion, t_min_new, t_max_new, u_min, u_max);
        }
    }
}

/// Intersections of two general curves by fat-line clipping, bounded by
/// `max_calls` clipping steps.
pub(crate) fn curve_curve(v1: &Bezier, v2: &Bezier, max_calls: u32) -> Vec<(f64, f64)> {
    let mut clipper = Clipper {
        hits: Vec::new(),
        calls: 0,
        max_calls,
    };
    clipper.clip(*v1, *v2, false, 0, 0.0, 1.0, 0.0, 1.0);
    clipper.hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;

    #[test]
    fn test_line_intersection() {
        let p = line_intersection(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(2.0, 0.0),
        )
        .unwrap();
        assert_eq!(p, DVec2::new(1.0, 1.0));
        assert!(
            line_intersection(
                DVec2::ZERO,
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
                DVec2::new(1.0, 1.0)
            )
            .is_none()
        );
    }

    #[test]
    fn test_curve_line() {
        let arch = Bezier::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 4.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(4.0, 0.0),
        );
        let line = Bezier::line(DVec2::new(-1.0, 1.0), DVec2::new(5.0, 1.0));
        let hits = curve_line(&arch, &line);
        assert_eq!(hits.len(), 2);
        for (t1, t2) in hits {
            let p = arch.point_at_time(t1);
            assert_relative_eq!(p.y, 1.0, epsilon = 1e-9);
            assert!(p.is_close(line.point_at_time(t2), 1e-7));
        }
    }

    #[test]
    fn test_curve_curve_two_arches() {
        let a = Bezier::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(4.0, 0.0),
        );
        let b = Bezier::new(
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(3.0, -1.0),
            DVec2::new(4.0, 2.0),
        );
        let hits = curve_curve(&a, &b, 4096);
        let mut distinct: Vec<(f64, f64)> = Vec::new();
        for hit in hits {
            if !distinct.iter().any(|d| (d.0 - hit.0).abs() < 1e-6) {
                distinct.push(hit);
            }
        }
        assert_eq!(distinct.len(), 2);
        for (t1, t2) in distinct {
            assert!(a.point_at_time(t1).is_close(b.point_at_time(t2), 1e-6));
        }
    }
}
