//! Curve-curve intersection engine.
//!
//! Curve pairs are prefiltered by their control bounds, checked for
//! coincident stretches, and otherwise dispatched by shape: line-line,
//! curve-line (root solving after rotating the line onto the x-axis) or
//! fat-line clipping for two curved inputs. The resulting hits are
//! normalized so that a hit at the end of a curve is reported at the start
//! of the next one, merged when they describe the same point, and
//! classified as crossing, tangent or overlap by comparing the directions
//! in which the two outlines leave the intersection.

mod clip;
mod overlap;

use std::f64::consts::TAU;

use tracing::trace;

use crate::bezier::Bezier;
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::location::{CurveLocation, IntersectionKind};
use crate::numerical::{CURVETIME_EPSILON, EPSILON};
use crate::primitives::{Point, PointExt};

pub(crate) use clip::line_intersection;

/// Angular tolerance in radians below which two rays count as collinear.
const ANGLE_EPSILON: f64 = 1e-7;
/// Distance tolerance for merging duplicate hits.
const MERGE_DISTANCE_EPSILON: f64 = 1e-6;
/// Sine of the angle below which interior hits get a side test.
const NEAR_TANGENT_SINE: f64 = 1e-3;
/// Curve-time step used to probe either side of a near-tangent hit.
const SIDE_PROBE_STEP: f64 = 1e-3;

/// Position on one contour of a contour set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Site {
    pub contour: usize,
    pub curve: usize,
    pub time: f64,
}

/// An intersection between two contour sets.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Crossing {
    pub a: Site,
    pub b: Site,
    pub point: Point,
    pub kind: IntersectionKind,
}

impl Crossing {
    /// The intersection as a location on the first outline paired with its
    /// counterpart on the second.
    pub fn to_location(&self) -> CurveLocation {
        let b = CurveLocation::new(self.b.contour, self.b.curve, self.b.time, self.point);
        CurveLocation::new(self.a.contour, self.a.curve, self.a.time, self.point)
            .paired(b, self.kind)
    }
}

/// Raw `(t1, t2, overlap)` hits between two curves.
///
/// `exclude_start` and `exclude_end` suppress the vertex that `v1` shares
/// with `v2` when `v2` is its predecessor or successor on the same contour.
pub(crate) fn curve_hits(
    v1: &Bezier,
    v2: &Bezier,
    exclude_start: bool,
    exclude_end: bool,
    config: &GeometryConfig,
) -> Vec<(f64, f64, bool)> {
    if !v1
        .control_bounds()
        .intersects(&v2.control_bounds(), EPSILON)
    {
        return Vec::new();
    }

    if let Some(pairs) = overlap::overlaps(v1, v2) {
        return pairs.iter().map(|&(t1, t2)| (t1, t2, true)).collect();
    }

    let straight1 = v1.is_linear();
    let straight2 = v2.is_linear();
    let mut hits = if straight1 && straight2 {
        clip::line_line(v1, v2)
    } else if straight1 {
        clip::curve_line(v2, v1)
            .into_iter()
            .map(|(t2, t1)| (t1, t2))
            .collect()
    } else if straight2 {
        clip::curve_line(v1, v2)
    } else {
        clip::curve_curve(v1, v2, config.max_clip_calls)
    };

    // Shared end points are reported exactly, unless a line-line hit was
    // already found.
    if !(straight1 && straight2) || hits.is_empty() {
        for (t1, p1) in [(0.0, v1.p1), (1.0, v1.p2)] {
            for (t2, p2) in [(0.0, v2.p1), (1.0, v2.p2)] {
                if p1.is_close(p2, EPSILON) {
                    hits.push((t1, t2));
                }
            }
        }
    }

    let t_min = CURVETIME_EPSILON;
    let t_max = 1.0 - t_min;
    hits.into_iter()
        .filter(|&(t1, t2)| {
            t1 >= if exclude_start { t_min } else { 0.0 }
                && t1 <= if exclude_end { t_max } else { 1.0 }
                && t2 >= if exclude_end { t_min } else { 0.0 }
                && t2 <= if exclude_start { t_max } else { 1.0 }
        })
        .map(|(t1, t2)| (t1, t2, false))
        .collect()
}

/// Moves hits at the end of a curve to the start of the next one.
fn normalize(contours: &[Contour], contour: usize, curve: usize, time: f64) -> Site {
    if time > 1.0 - CURVETIME_EPSILON {
        if let Some(next) = contours[contour].next(curve) {
            return Site {
                contour,
                curve: next,
                time: 0.0,
            };
        }
        return Site {
            contour,
            curve,
            time: 1.0,
        };
    }
    Site {
        contour,
        curve,
        time: if time < CURVETIME_EPSILON { 0.0 } else { time },
    }
}

/// Directions in which an outline leaves a site: backwards along the
/// incoming curve and forwards along the outgoing one.
fn rays(contours: &[Contour], site: &Site) -> (Option<Point>, Option<Point>) {
    let contour = &contours[site.contour];
    let curve = &contour.curves[site.curve];
    if site.time > 0.0 && site.time < 1.0 {
        let tangent = curve.tangent_at_time(site.time);
        return (Some(-tangent), Some(tangent));
    }
    if site.time >= 1.0 {
        return (Some(-curve.tangent_at_time(1.0)), None);
    }
    let incoming = contour
        .previous(site.curve)
        .map(|prev| -contour.curves[prev].tangent_at_time(1.0));
    (incoming, Some(curve.tangent_at_time(0.0)))
}

fn ray_angle(ray: Point) -> f64 {
    ray.y.atan2(ray.x)
}

/// Counter-clockwise angle from `from` to `to`, in `(0, 2π]`.
fn ccw_angle(from: Point, to: Point) -> f64 {
    let mut angle = ray_angle(to) - ray_angle(from);
    while angle <= 0.0 {
        angle += TAU;
    }
    while angle > TAU {
        angle -= TAU;
    }
    angle
}

fn collinear_rays(a: Point, b: Point) -> bool {
    let angle = ccw_angle(a, b);
    angle < ANGLE_EPSILON || angle > TAU - ANGLE_EPSILON
}

/// Decides whether two outlines cross at a shared point from the rays
/// each of them leaves the point along. Rays that coincide are treated as
/// touching, never as crossing.
fn classify(a: (Option<Point>, Option<Point>), b: (Option<Point>, Option<Point>)) -> IntersectionKind {
    let a_rays: Vec<Point> = [a.0, a.1].into_iter().flatten().filter(|r| !r.is_zero()).collect();
    let b_rays: Vec<Point> = [b.0, b.1].into_iter().flatten().filter(|r| !r.is_zero()).collect();
    if a_rays.is_empty() || b_rays.is_empty() {
        return IntersectionKind::Tangent;
    }
    if a_rays
        .iter()
        .any(|ra| b_rays.iter().any(|rb| collinear_rays(*ra, *rb)))
    {
        return IntersectionKind::Tangent;
    }
    match (a_rays.as_slice(), b_rays.as_slice()) {
        ([a_in, a_out], [b_in, b_out]) => {
            let span = ccw_angle(*a_in, *a_out);
            let first = ccw_angle(*a_in, *b_in) < span;
            let second = ccw_angle(*a_in, *b_out) < span;
            if first != second {
                IntersectionKind::Crossing
            } else {
                IntersectionKind::Tangent
            }
        }
        // An open end meeting the other outline transversally.
        ([_], [_, _]) | ([_, _], [_]) => IntersectionKind::Crossing,
        _ => IntersectionKind::Tangent,
    }
}

fn collect(a: &[Contour], b: &[Contour], same: bool, config: &GeometryConfig) -> Vec<Crossing> {
    let mut raw: Vec<Crossing> = Vec::new();
    for (ca, contour_a) in a.iter().enumerate() {
        for (ia, va) in contour_a.curves.iter().enumerate() {
            for (cb, contour_b) in b.iter().enumerate() {
                if same && cb < ca {
                    continue;
                }
                for (ib, vb) in contour_b.curves.iter().enumerate() {
                    if same && cb == ca && ib <= ia {
                        continue;
                    }
                    let adjacent = same && cb == ca;
                    let exclude_start = adjacent && contour_a.previous(ia) == Some(ib);
                    let exclude_end = adjacent && contour_a.next(ia) == Some(ib);
                    for (t1, t2, overlap) in curve_hits(va, vb, exclude_start, exclude_end, config)
                    {
                        let site_a = normalize(a, ca, ia, t1);
                        let site_b = normalize(b, cb, ib, t2);
                        if same && site_a == site_b {
                            continue;
                        }
                        let kind = if overlap {
                            IntersectionKind::Overlap
                        } else {
                            IntersectionKind::Crossing
                        };
                        merge(
                            &mut raw,
                            a,
                            b,
                            Crossing {
                                a: site_a,
                                b: site_b,
                                point: va.point_at_time(t1),
                                kind,
                            },
                        );
                    }
                }
            }
        }
    }

    let kinds: Vec<IntersectionKind> = raw
        .iter()
        .map(|crossing| match crossing.kind {
            IntersectionKind::Overlap => IntersectionKind::Overlap,
            _ => classify_hit(a, b, crossing),
        })
        .collect();
    for (crossing, kind) in raw.iter_mut().zip(kinds) {
        crossing.kind = kind;
    }
    raw.sort_by(|x, y| {
        (x.a.contour, x.a.curve)
            .cmp(&(y.a.contour, y.a.curve))
            .then(x.a.time.total_cmp(&y.a.time))
    });
    trace!("Found {} intersections", raw.len());
    raw
}

/// Returns true if two sites of one contour set lie on the same curve or
/// on consecutive curves.
fn nearby_sites(contours: &[Contour], x: &Site, y: &Site) -> bool {
    if x.contour != y.contour {
        return false;
    }
    let contour = &contours[x.contour];
    x.curve == y.curve
        || contour.next(x.curve) == Some(y.curve)
        || contour.previous(x.curve) == Some(y.curve)
}

fn is_vertex(site: &Site) -> bool {
    site.time == 0.0 || site.time == 1.0
}

/// Adds `crossing` unless an equivalent hit is already listed. Hits are
/// equivalent when they lie within the merge distance of each other on
/// the same or neighbouring curves of both outlines. A merged hit keeps
/// exact vertex sites over approximate ones and overlap status over any
/// other kind.
fn merge(list: &mut Vec<Crossing>, a: &[Contour], b: &[Contour], crossing: Crossing) {
    let duplicate = list.iter_mut().find(|existing| {
        existing.point.distance(crossing.point) <= MERGE_DISTANCE_EPSILON
            && nearby_sites(a, &existing.a, &crossing.a)
            && nearby_sites(b, &existing.b, &crossing.b)
    });
    match duplicate {
        Some(existing) => {
            if is_vertex(&crossing.a) && !is_vertex(&existing.a) {
                existing.a = crossing.a;
                existing.point = crossing.point;
            }
            if is_vertex(&crossing.b) && !is_vertex(&existing.b) {
                existing.b = crossing.b;
            }
            if crossing.kind == IntersectionKind::Overlap {
                existing.kind = IntersectionKind::Overlap;
            }
        }
        None => list.push(crossing),
    }
}

/// Side of `point` relative to the curve near it: the sign of the cross
/// product of the local tangent and the offset from the nearest point.
fn side_of(curve: &Bezier, point: Point) -> f64 {
    let t = curve.nearest_time(point);
    let offset = point - curve.point_at_time(t);
    let cross = curve.tangent_at_time(t).perp_dot(offset);
    if cross.abs() <= EPSILON { 0.0 } else { cross.signum() }
}

/// Classifies a hit. Interior hits whose tangents are nearly parallel are
/// resolved by checking on which side of the first outline the second one
/// lies just before and just after the hit.
fn classify_hit(a: &[Contour], b: &[Contour], crossing: &Crossing) -> IntersectionKind {
    let rays_a = rays(a, &crossing.a);
    let rays_b = rays(b, &crossing.b);
    let kind = classify(rays_a, rays_b);
    let interior = !is_vertex(&crossing.a) && !is_vertex(&crossing.b);
    if kind != IntersectionKind::Crossing || !interior {
        return kind;
    }
    let (Some(ta), Some(tb)) = (rays_a.1, rays_b.1) else {
        return kind;
    };
    let sine = ta.perp_dot(tb).abs();
    if sine > NEAR_TANGENT_SINE {
        return kind;
    }
    let curve_a = &a[crossing.a.contour].curves[crossing.a.curve];
    let curve_b = &b[crossing.b.contour].curves[crossing.b.curve];
    let time = crossing.b.time;
    let before = side_of(curve_a, curve_b.point_at_time((time - SIDE_PROBE_STEP).max(0.0)));
    let after = side_of(curve_a, curve_b.point_at_time((time + SIDE_PROBE_STEP).min(1.0)));
    if before * after < 0.0 {
        IntersectionKind::Crossing
    } else {
        IntersectionKind::Tangent
    }
}

/// All intersections between two sets of contours.
pub(crate) fn intersect_contours(
    a: &[Contour],
    b: &[Contour],
    config: &GeometryConfig,
) -> Vec<Crossing> {
    collect(a, b, false, config)
}

/// All intersections of a set of contours with itself, excluding the
/// vertices shared by consecutive curves.
pub(crate) fn self_intersect_contours(a: &[Contour], config: &GeometryConfig) -> Vec<Crossing> {
    collect(a, a, true, config)
}
