//! Detection of coincident stretches between two curves.

use crate::bezier::{Bezier, line_distance};
use crate::numerical::{CURVETIME_EPSILON, GEOMETRIC_EPSILON};

/// Returns the curve-time pairs bounding the stretch where `v1` and `v2`
/// coincide, or `None` if they do not overlap.
///
/// Both curves must be straight, or both curved with identical control
/// points over the shared stretch.
pub(crate) fn overlaps(v1: &Bezier, v2: &Bezier) -> Option<[(f64, f64); 2]> {
    let mut straight1 = v1.is_linear();
    let mut straight2 = v2.is_linear();
    let mut straight_both = straight1 && straight2;
    let flip = (v1.p2 - v1.p1).length_squared() < (v2.p2 - v2.p1).length_squared();
    let (l1, l2) = if flip { (v2, v1) } else { (v1, v2) };
    let origin = l1.p1;
    let vector = l1.p2 - l1.p1;
    let near = |p| line_distance(origin, vector, p) < GEOMETRIC_EPSILON;

    if near(l2.p1) && near(l2.p2) {
        if !straight_both && near(l1.c1) && near(l1.c2) && near(l2.c1) && near(l2.c2) {
            straight1 = true;
            straight2 = true;
            straight_both = true;
        }
    } else if straight_both {
        return None;
    }
    if straight1 != straight2 {
        return None;
    }

    let curves = [v1, v2];
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(2);
    for i in 0..4 {
        if pairs.len() >= 2 {
            break;
        }
        let i1 = i & 1;
        let i2 = i1 ^ 1;
        let at_end = i >> 1 == 1;
        let other = curves[i2];
        let probe = if at_end { other.p2 } else { other.p1 };
        let t_end = if at_end { 1.0 } else { 0.0 };
        if let Some(t) = curves[i1].time_of(probe) {
            let pair = if i1 == 1 { (t_end, t) } else { (t, t_end) };
            let distinct = pairs.first().is_none_or(|first| {
                (pair.0 - first.0).abs() > CURVETIME_EPSILON
                    && (pair.1 - first.1).abs() > CURVETIME_EPSILON
            });
            if distinct {
                pairs.push(pair);
            }
        }
        if i > 2 && pairs.is_empty() {
            break;
        }
    }

    if pairs.len() != 2 {
        return None;
    }
    if !straight_both {
        let o1 = v1.part(pairs[0].0, pairs[1].0);
        let o2 = v2.part(pairs[0].1, pairs[1].1);
        if (o2.c1 - o1.c1).abs().max_element() > GEOMETRIC_EPSILON
            || (o2.c2 - o1.c2).abs().max_element() > GEOMETRIC_EPSILON
        {
            return None;
        }
    }
    Some([pairs[0], pairs[1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_collinear_lines_overlap() {
        let a = Bezier::line(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        let b = Bezier::line(DVec2::new(0.5, 0.0), DVec2::new(1.5, 0.0));
        let pairs = overlaps(&a, &b).unwrap();
        let mut points: Vec<f64> = pairs.iter().map(|(t, _)| a.point_at_time(*t).x).collect();
        points.sort_by(f64::total_cmp);
        assert!((points[0] - 0.5).abs() < 1e-9);
        assert!((points[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_lines_do_not_overlap() {
        let a = Bezier::line(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        let b = Bezier::line(DVec2::new(0.0, 1.0), DVec2::new(1.0, 1.0));
        assert!(overlaps(&a, &b).is_none());
        let c = Bezier::line(DVec2::new(2.0, 0.0), DVec2::new(3.0, 0.0));
        assert!(overlaps(&a, &c).is_none());
    }

    #[test]
    fn test_identical_curves_overlap() {
        let a = Bezier::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(3.0, 2.0),
            DVec2::new(4.0, 0.0),
        );
        let pairs = overlaps(&a, &a.reversed()).unwrap();
        assert!(pairs.iter().all(|(t1, t2)| (t1 + t2 - 1.0).abs() < 1e-9));
    }
}
