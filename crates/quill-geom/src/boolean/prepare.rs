//! Operand preparation: validation, removal of degenerate curves,
//! resolution of self-crossings and reorientation.

use tracing::debug;

use crate::bezier::{Bezier, line_distance};
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::error::{GeomError, GeomResult};
use crate::intersection::self_intersect_contours;
use crate::location::IntersectionKind;
use crate::numerical::GEOMETRIC_EPSILON;
use crate::path_item::PathItem;
use crate::primitives::Point;
use crate::winding::{FillRule, interior_point, winding_at};

use super::graph::{Operand, Vertices, build_edges, split};
use super::trace::{heal, trace};

/// Distance of the side probes used to decide which side of a fragment
/// is filled, for an outline of unit size.
const SIDE_PROBE_DISTANCE: f64 = 1e-6;

/// Rejects operands that are open or hold non-finite coordinates.
pub(super) fn validate(item: &PathItem, name: &str) -> GeomResult<()> {
    for (index, path) in item.paths().iter().enumerate() {
        if !path.is_closed() && !path.is_empty() {
            return Err(GeomError::MalformedGeometry(format!(
                "{name} operand contour {index} is not closed"
            )));
        }
        let finite = path.segments().iter().all(|segment| {
            segment.point.is_finite() && segment.handle_in.is_finite() && segment.handle_out.is_finite()
        });
        if !finite {
            return Err(GeomError::MalformedGeometry(format!(
                "{name} operand contour {index} has non-finite coordinates"
            )));
        }
    }
    Ok(())
}

/// Contours of a validated operand, cleaned and reoriented so that outer
/// contours have positive area, holes negative area, and the non-zero
/// rule fills exactly the operand's area.
pub(super) fn prepare(item: &PathItem, config: &GeometryConfig) -> Vec<Contour> {
    let contours: Vec<Contour> = item
        .contours()
        .iter()
        .map(Contour::without_degenerate_curves)
        .filter(|contour| !is_flat(contour))
        .collect();
    let crossings = self_intersect_contours(&contours, config);
    let resolve = crossings
        .iter()
        .any(|crossing| crossing.kind != IntersectionKind::Tangent);
    if resolve {
        debug!("Resolving {} self intersections", crossings.len());
        let sites: Vec<_> = crossings
            .iter()
            .filter(|crossing| crossing.kind != IntersectionKind::Tangent)
            .flat_map(|crossing| [crossing.a, crossing.b])
            .collect();
        let resolved = resolve_self_crossings(&contours, &sites, item.fill_rule());
        reorient(resolved, FillRule::NonZero, true)
    } else {
        reorient(contours, item.fill_rule(), true)
    }
}

/// Returns true if every control point of `contour` lies on one line, so
/// that it bounds no area whatever its crossings. Contours whose lobes
/// cancel out to a zero signed area are not flat.
fn is_flat(contour: &Contour) -> bool {
    let points: Vec<Point> = contour.curves.iter().flat_map(Bezier::points).collect();
    let Some(&origin) = points.first() else {
        return true;
    };
    let Some(&far) = points
        .iter()
        .max_by(|p, q| p.distance_squared(origin).total_cmp(&q.distance_squared(origin)))
    else {
        return true;
    };
    let direction = far - origin;
    direction.length() < GEOMETRIC_EPSILON
        || points
            .iter()
            .all(|&point| line_distance(origin, direction, point) < GEOMETRIC_EPSILON)
}

/// Rebuilds contours that cross themselves or each other as simple
/// contours bounding the same filled area, with the fill on the left.
fn resolve_self_crossings(
    contours: &[Contour],
    sites: &[crate::intersection::Site],
    fill_rule: FillRule,
) -> Vec<Contour> {
    let fragments = split(contours, Operand::A, sites);
    let scale = contours
        .iter()
        .filter_map(Contour::bounds)
        .map(|bounds| bounds.size().length())
        .fold(1.0, f64::max);
    let probe = SIDE_PROBE_DISTANCE * scale;
    let is_filled = |point: Point| {
        let curves = contours.iter().flat_map(|contour| contour.curves.iter().copied());
        fill_rule.is_inside(winding_at(point, curves, -1.0).winding)
    };
    let selection: Vec<Option<bool>> = fragments
        .iter()
        .map(|fragment| {
            let point = fragment.curve.point_at_time(0.5);
            let normal = fragment.curve.normal_at_time(0.5);
            // The normal points to the right of the direction of travel.
            let left = is_filled(point - normal * probe);
            let right = is_filled(point + normal * probe);
            (left != right).then_some(right)
        })
        .collect();
    let mut vertices = Vertices::default();
    let edges = build_edges(&fragments, &selection, &mut vertices);
    trace(&edges, vertices.len())
        .iter()
        .map(|chain| heal(chain, &edges, &fragments))
        .collect()
}

/// Resolves the nesting of `contours` under `fill_rule`.
///
/// Contours are visited from the largest to the smallest area. Each one is
/// assigned the contour that most tightly contains it; contours whose
/// inside and outside are equally filled are dropped. Top-level contours
/// are oriented clockwise when `clockwise` is set, and each remaining
/// contour opposite to its container.
pub(crate) fn reorient(mut contours: Vec<Contour>, fill_rule: FillRule, clockwise: bool) -> Vec<Contour> {
    let n = contours.len();
    let areas: Vec<f64> = contours.iter().map(Contour::area).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| areas[b].abs().total_cmp(&areas[a].abs()));

    let mut winding: Vec<i32> = areas.iter().map(|area| if *area >= 0.0 { 1 } else { -1 }).collect();
    let mut container: Vec<Option<usize>> = vec![None; n];
    let mut excluded = vec![false; n];

    for (rank, &i) in order.iter().enumerate() {
        let point = interior_point(&contours[i].curves, FillRule::NonZero);
        let mut container_winding = 0;
        if let Some(point) = point {
            for &j in order[..rank].iter().rev() {
                let curves = contours[j].curves.iter().copied();
                if winding_at(point, curves, -1.0).winding != 0 {
                    container_winding = winding[j];
                    winding[i] += container_winding;
                    container[i] = if excluded[j] { container[j] } else { Some(j) };
                    break;
                }
            }
        }
        if fill_rule.is_inside(winding[i]) == fill_rule.is_inside(container_winding) {
            excluded[i] = true;
        } else {
            let want = match container[i] {
                Some(parent) => contours[parent].area() < 0.0,
                None => clockwise,
            };
            if (contours[i].area() >= 0.0) != want {
                contours[i] = contours[i].reversed();
            }
        }
    }
    contours
        .into_iter()
        .zip(excluded)
        .filter_map(|(contour, excluded)| (!excluded).then_some(contour))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::CompoundPath;
    use crate::path::Path;
    use crate::primitives::Rectangle;
    use glam::DVec2;

    fn square(x: f64, y: f64, size: f64) -> Path {
        Path::rectangle(Rectangle::new(x, y, size, size))
    }

    #[test]
    fn test_validate_rejects_open_and_non_finite() {
        let open = PathItem::from(Path::line(DVec2::ZERO, DVec2::ONE));
        assert!(matches!(validate(&open, "first"), Err(GeomError::MalformedGeometry(_))));
        let mut bad = square(0.0, 0.0, 1.0);
        if let Some(segment) = bad.segment_mut(0) {
            segment.point.x = f64::NAN;
        }
        assert!(validate(&PathItem::from(bad), "second").is_err());
        assert!(validate(&PathItem::from(square(0.0, 0.0, 1.0)), "first").is_ok());
    }

    #[test]
    fn test_prepare_drops_zero_area() {
        let flat = Path::from_points([DVec2::ZERO, DVec2::new(1.0, 0.0)], true);
        let item = PathItem::from(flat);
        assert!(prepare(&item, &GeometryConfig::DEFAULT).is_empty());
    }

    #[test]
    fn test_reorient_nested_squares() {
        let contours = vec![
            Contour::from_path(&square(0.0, 0.0, 10.0)),
            Contour::from_path(&square(2.0, 2.0, 6.0)),
            Contour::from_path(&square(4.0, 4.0, 2.0)),
        ];
        let even_odd = reorient(contours.clone(), FillRule::EvenOdd, true);
        assert_eq!(even_odd.len(), 3);
        assert!(even_odd[0].area() > 0.0);
        assert!(even_odd[1].area() < 0.0);
        assert!(even_odd[2].area() > 0.0);
        let non_zero = reorient(contours, FillRule::NonZero, true);
        assert_eq!(non_zero.len(), 1);
    }

    #[test]
    fn test_prepare_resolves_overlapping_children() {
        let compound = CompoundPath::from_paths([square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]);
        let contours = prepare(&PathItem::from(compound), &GeometryConfig::DEFAULT);
        assert_eq!(contours.len(), 1);
        assert!((contours[0].area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_contours() {
        let flat = Path::from_points([DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::new(3.0, 3.0)], true);
        assert!(is_flat(&Contour::from_path(&flat)));
        assert!(!is_flat(&Contour::from_path(&square(0.0, 0.0, 1.0))));
        let bow = Path::from_points(
            [DVec2::ZERO, DVec2::new(2.0, 2.0), DVec2::new(2.0, 0.0), DVec2::new(0.0, 2.0)],
            true,
        );
        let contour = Contour::from_path(&bow);
        assert!(contour.area().abs() < 1e-12);
        assert!(!is_flat(&contour));
    }

    #[test]
    fn test_prepare_resolves_bow_tie() {
        let bow = Path::from_points(
            [
                DVec2::new(0.0, 0.0),
                DVec2::new(2.0, 2.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(0.0, 2.0),
            ],
            true,
        );
        let contours = prepare(&PathItem::from(bow), &GeometryConfig::DEFAULT);
        assert_eq!(contours.len(), 2);
        for contour in &contours {
            assert!((contour.area() - 1.0).abs() < 1e-9);
        }
    }
}
