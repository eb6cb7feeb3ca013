//! Boolean operations on closed paths.
//!
//! Both operands are cleaned and reoriented, then every curve is split
//! where the outlines cross or start and stop overlapping. Each fragment
//! is classified by the winding number of its midpoint against the other
//! operand as inside, outside or on the other outline. The operator
//! decides which fragments to keep and in which direction, and the kept
//! fragments are traced into closed contours through the shared
//! vertices. Tangent contacts never split a curve.

mod graph;
mod prepare;
mod trace;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::compound::CompoundPath;
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::error::{GeomError, GeomResult};
use crate::intersection::{Site, intersect_contours};
use crate::location::IntersectionKind;
use crate::numerical::GEOMETRIC_EPSILON;
use crate::path::Path;
use crate::path_item::PathItem;
use crate::winding::{FillRule, winding_at};

use graph::{Fragment, Operand, Vertices, build_edges, split};

pub(crate) use prepare::reorient;

/// Distance within which a fragment sample counts as lying on the other
/// operand's outline.
const ON_PATH_TOLERANCE: f64 = 1e-6;

/// The four area-combining operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Unite,
    Intersect,
    Subtract,
    Exclude,
}

impl BooleanOp {
    pub fn name(self) -> &'static str {
        match self {
            BooleanOp::Unite => "unite",
            BooleanOp::Intersect => "intersect",
            BooleanOp::Subtract => "subtract",
            BooleanOp::Exclude => "exclude",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BooleanOp {
    type Err = GeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unite" | "union" => Ok(BooleanOp::Unite),
            "intersect" => Ok(BooleanOp::Intersect),
            "subtract" => Ok(BooleanOp::Subtract),
            "exclude" => Ok(BooleanOp::Exclude),
            other => Err(GeomError::UnsupportedOperation(format!(
                "unknown boolean operation '{other}'"
            ))),
        }
    }
}

/// Position of a fragment relative to the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Inside,
    Outside,
    /// On the other outline, running the same way as it or not.
    Boundary { same_direction: bool },
}

fn classify(fragment: &Fragment, other: &[Contour]) -> Class {
    let curves = || other.iter().flat_map(|contour| contour.curves.iter().copied());
    for t in [0.5, 0.25, 0.75] {
        let point = fragment.curve.point_at_time(t);
        let winding = winding_at(point, curves(), ON_PATH_TOLERANCE);
        if !winding.on_path {
            return if winding.winding != 0 {
                Class::Inside
            } else {
                Class::Outside
            };
        }
    }
    let point = fragment.curve.point_at_time(0.5);
    let tangent = fragment.curve.tangent_at_time(0.5);
    let nearest = curves()
        .map(|curve| {
            let t = curve.nearest_time(point);
            (curve.point_at_time(t).distance_squared(point), curve.tangent_at_time(t))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));
    Class::Boundary {
        same_direction: nearest.is_some_and(|(_, other)| other.dot(tangent) > 0.0),
    }
}

/// Whether `op` keeps a fragment, and if so whether it runs reversed.
fn select(op: BooleanOp, operand: Operand, class: Class) -> Option<bool> {
    use BooleanOp::*;
    use Class::*;
    match (op, operand, class) {
        (Unite, _, Outside) => Some(false),
        (Intersect, _, Inside) => Some(false),
        (Subtract, Operand::A, Outside) => Some(false),
        (Subtract, Operand::B, Inside) => Some(true),
        (Exclude, _, Outside) => Some(false),
        (Exclude, _, Inside) => Some(true),
        // Shared stretches are kept once, from the first operand.
        (Unite | Intersect, Operand::A, Boundary { same_direction }) => {
            same_direction.then_some(false)
        }
        (Subtract, Operand::A, Boundary { same_direction }) => (!same_direction).then_some(false),
        _ => None,
    }
}

/// Builds the result item: an empty path, a single path, or an even-odd
/// compound path.
fn into_item(contours: Vec<Contour>) -> PathItem {
    let mut paths: Vec<Path> = contours.iter().map(Contour::to_path).collect();
    match paths.len() {
        0 => PathItem::Path(Path::new()),
        1 => PathItem::Path(paths.remove(0)),
        _ => PathItem::Compound(CompoundPath::from_paths(paths).with_fill_rule(FillRule::EvenOdd)),
    }
}

/// Returns true if both contour sets describe the same outlines, allowing
/// each closed contour to start at a different curve.
fn same_outlines(a: &[Contour], b: &[Contour]) -> bool {
    let same_contour = |x: &Contour, y: &Contour| {
        let n = x.curves.len();
        n == y.curves.len()
            && (0..n).any(|shift| {
                (0..n).all(|i| x.curves[i].is_close(&y.curves[(i + shift) % n], GEOMETRIC_EPSILON))
            })
    };
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| same_contour(x, y)))
}

/// Applies `op` to `a` and `b` with the default tolerances.
pub fn boolean(a: &PathItem, b: &PathItem, op: BooleanOp) -> GeomResult<PathItem> {
    boolean_with(a, b, op, &GeometryConfig::DEFAULT)
}

/// Applies `op` to `a` and `b`. Both operands must be closed; their fill
/// rules decide which areas they cover. The operands are not modified.
pub fn boolean_with(
    a: &PathItem,
    b: &PathItem,
    op: BooleanOp,
    config: &GeometryConfig,
) -> GeomResult<PathItem> {
    prepare::validate(a, "first")?;
    prepare::validate(b, "second")?;
    let contours_a = prepare::prepare(a, config);
    let contours_b = prepare::prepare(b, config);

    match (contours_a.is_empty(), contours_b.is_empty()) {
        (true, true) => return Ok(into_item(Vec::new())),
        (true, false) => {
            return Ok(match op {
                BooleanOp::Unite | BooleanOp::Exclude => into_item(contours_b),
                BooleanOp::Intersect | BooleanOp::Subtract => into_item(Vec::new()),
            });
        }
        (false, true) => {
            return Ok(match op {
                BooleanOp::Intersect => into_item(Vec::new()),
                _ => into_item(contours_a),
            });
        }
        (false, false) => {}
    }

    if same_outlines(&contours_a, &contours_b) {
        debug!("Operands of {} coincide", op);
        return Ok(match op {
            BooleanOp::Unite | BooleanOp::Intersect => into_item(contours_a),
            BooleanOp::Subtract | BooleanOp::Exclude => into_item(Vec::new()),
        });
    }

    let crossings: Vec<_> = intersect_contours(&contours_a, &contours_b, config)
        .into_iter()
        .filter(|crossing| crossing.kind != IntersectionKind::Tangent)
        .collect();
    let sites_a: Vec<Site> = crossings.iter().map(|crossing| crossing.a).collect();
    let sites_b: Vec<Site> = crossings.iter().map(|crossing| crossing.b).collect();

    let mut fragments = split(&contours_a, Operand::A, &sites_a);
    fragments.extend(split(&contours_b, Operand::B, &sites_b));
    let selection: Vec<Option<bool>> = fragments
        .iter()
        .map(|fragment| {
            let other = match fragment.operand {
                Operand::A => &contours_b,
                Operand::B => &contours_a,
            };
            select(op, fragment.operand, classify(fragment, other))
        })
        .collect();

    let mut vertices = Vertices::default();
    let edges = build_edges(&fragments, &selection, &mut vertices);
    debug!(
        "Boolean {}: {} crossings, {} fragments, {} edges, {} vertices",
        op,
        crossings.len(),
        fragments.len(),
        edges.len(),
        vertices.len()
    );
    let contours: Vec<Contour> = trace::trace(&edges, vertices.len())
        .iter()
        .map(|chain| trace::heal(chain, &edges, &fragments))
        .filter(|contour| contour.area().abs() > GEOMETRIC_EPSILON * GEOMETRIC_EPSILON)
        .collect();
    trace!("Boolean {} produced {} contours", op, contours.len());
    Ok(into_item(contours))
}

pub fn unite(a: &PathItem, b: &PathItem) -> GeomResult<PathItem> {
    boolean(a, b, BooleanOp::Unite)
}

pub fn intersect(a: &PathItem, b: &PathItem) -> GeomResult<PathItem> {
    boolean(a, b, BooleanOp::Intersect)
}

pub fn subtract(a: &PathItem, b: &PathItem) -> GeomResult<PathItem> {
    boolean(a, b, BooleanOp::Subtract)
}

pub fn exclude(a: &PathItem, b: &PathItem) -> GeomResult<PathItem> {
    boolean(a, b, BooleanOp::Exclude)
}

/// Splits two items along their intersections without removing area.
///
/// For closed operands the result holds the non-empty parts among
/// `a ∩ b`, `a − b` and `b − a`, in that order. For open operands each
/// path is cut at every point where it crosses or overlaps the other
/// item, giving one open path per piece, the pieces of `a` first. Mixing
/// open and closed operands is unsupported.
pub fn divide(a: &PathItem, b: &PathItem) -> GeomResult<Vec<PathItem>> {
    divide_with(a, b, &GeometryConfig::DEFAULT)
}

pub fn divide_with(a: &PathItem, b: &PathItem, config: &GeometryConfig) -> GeomResult<Vec<PathItem>> {
    match (a.is_closed(), b.is_closed()) {
        (true, true) => {
            let parts = [
                boolean_with(a, b, BooleanOp::Intersect, config)?,
                boolean_with(a, b, BooleanOp::Subtract, config)?,
                boolean_with(b, a, BooleanOp::Subtract, config)?,
            ];
            Ok(parts.into_iter().filter(|part| !part.is_empty()).collect())
        }
        (false, false) => {
            let contours_a = a.contours();
            let contours_b = b.contours();
            let crossings: Vec<_> = intersect_contours(&contours_a, &contours_b, config)
                .into_iter()
                .filter(|crossing| crossing.kind != IntersectionKind::Tangent)
                .collect();
            debug!("Dividing open paths at {} intersections", crossings.len());
            let mut pieces = Vec::new();
            for (index, path) in a.paths().iter().enumerate() {
                let cuts: Vec<(usize, f64)> = crossings
                    .iter()
                    .filter(|crossing| crossing.a.contour == index)
                    .map(|crossing| (crossing.a.curve, crossing.a.time))
                    .collect();
                pieces.extend(path.pieces(&cuts).into_iter().map(PathItem::Path));
            }
            for (index, path) in b.paths().iter().enumerate() {
                let cuts: Vec<(usize, f64)> = crossings
                    .iter()
                    .filter(|crossing| crossing.b.contour == index)
                    .map(|crossing| (crossing.b.curve, crossing.b.time))
                    .collect();
                pieces.extend(path.pieces(&cuts).into_iter().map(PathItem::Path));
            }
            Ok(pieces)
        }
        _ => Err(GeomError::UnsupportedOperation(
            "divide needs both operands open or both closed".into(),
        )),
    }
}

/// Curves of a boolean result, for tests comparing outlines.
#[cfg(test)]
fn result_curves(item: &PathItem) -> Vec<crate::bezier::Bezier> {
    item.paths().iter().flat_map(|path| path.beziers().collect::<Vec<_>>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{PointExt, Rectangle};
    use approx::assert_relative_eq;
    use glam::DVec2;
    use std::f64::consts::PI;

    fn square(x: f64, y: f64, size: f64) -> PathItem {
        PathItem::from(Path::rectangle(Rectangle::new(x, y, size, size)))
    }

    fn circle(x: f64, y: f64, radius: f64) -> PathItem {
        PathItem::from(Path::circle(DVec2::new(x, y), radius))
    }

    #[test]
    fn test_op_names_round_trip() {
        for op in [BooleanOp::Unite, BooleanOp::Intersect, BooleanOp::Subtract, BooleanOp::Exclude] {
            assert_eq!(op.name().parse::<BooleanOp>().unwrap(), op);
        }
        assert!("merge".parse::<BooleanOp>().is_err());
    }

    #[test]
    fn test_unite_overlapping_squares() {
        let result = unite(&square(0.0, 0.0, 1.0), &square(0.5, 0.0, 1.0)).unwrap();
        let path = result.as_path().unwrap();
        assert_eq!(path.segment_count(), 6);
        assert_relative_eq!(result.area(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_intersect_and_subtract_squares() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        let both = intersect(&a, &b).unwrap();
        assert_relative_eq!(both.area(), 1.0, epsilon = 1e-9);
        assert_eq!(both.as_path().unwrap().segment_count(), 4);
        let rest = subtract(&a, &b).unwrap();
        assert_relative_eq!(rest.area(), 3.0, epsilon = 1e-9);
        assert!(rest.contains(DVec2::new(0.5, 0.5)));
        assert!(!rest.contains(DVec2::new(1.5, 1.5)));
        let either = exclude(&a, &b).unwrap();
        assert_relative_eq!(either.area(), 6.0, epsilon = 1e-9);
        assert!(!either.contains(DVec2::new(1.5, 1.5)));
    }

    #[test]
    fn test_disjoint_operands() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        let union = unite(&a, &b).unwrap();
        assert_eq!(union.paths().len(), 2);
        assert_eq!(union.fill_rule(), FillRule::EvenOdd);
        assert!(intersect(&a, &b).unwrap().is_empty());
        assert_relative_eq!(subtract(&a, &b).unwrap().area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nested_operands() {
        let outer = square(0.0, 0.0, 4.0);
        let inner = square(1.0, 1.0, 2.0);
        assert_relative_eq!(unite(&outer, &inner).unwrap().area(), 16.0, epsilon = 1e-9);
        assert_relative_eq!(intersect(&outer, &inner).unwrap().area(), 4.0, epsilon = 1e-9);
        let ring = subtract(&outer, &inner).unwrap();
        assert_relative_eq!(ring.area(), 12.0, epsilon = 1e-9);
        assert_eq!(ring.paths().len(), 2);
        assert!(subtract(&inner, &outer).unwrap().is_empty());
    }

    #[test]
    fn test_shared_edges() {
        let left = square(0.0, 0.0, 1.0);
        let right = square(1.0, 0.0, 1.0);
        let union = unite(&left, &right).unwrap();
        assert_relative_eq!(union.area(), 2.0, epsilon = 1e-9);
        assert_eq!(union.paths().len(), 1);
        assert!(intersect(&left, &right).unwrap().is_empty());
        assert_relative_eq!(subtract(&left, &right).unwrap().area(), 1.0, epsilon = 1e-9);

        let wide = PathItem::from(Path::rectangle(Rectangle::new(0.0, 0.0, 2.0, 1.0)));
        let half = subtract(&wide, &right).unwrap();
        assert_relative_eq!(half.area(), 1.0, epsilon = 1e-9);
        let bounds = half.bounds().unwrap();
        assert_relative_eq!(bounds.right(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_overlap_off_midpoint() {
        // The shared stretch starts a quarter of the way along the top and
        // bottom edges of the first square.
        let a = square(0.0, 0.0, 4.0);
        let b = square(1.0, 0.0, 4.0);
        let union = unite(&a, &b).unwrap();
        assert_eq!(union.paths().len(), 1);
        assert_relative_eq!(union.area(), 20.0, epsilon = 1e-9);
        let bounds = union.bounds().unwrap();
        assert_relative_eq!(bounds.left(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.right(), 5.0, epsilon = 1e-9);
        assert!(union.contains(DVec2::new(0.5, 2.0)));
        assert!(union.contains(DVec2::new(4.5, 2.0)));
        assert!(!union.contains(DVec2::new(5.5, 2.0)));

        let both = intersect(&a, &b).unwrap();
        assert_relative_eq!(both.area(), 12.0, epsilon = 1e-9);
        assert!(!both.contains(DVec2::new(0.5, 2.0)));
        assert_relative_eq!(subtract(&a, &b).unwrap().area(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(exclude(&a, &b).unwrap().area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_self_crossing_operand() {
        let bow = PathItem::from(Path::from_points(
            [
                DVec2::new(0.0, 0.0),
                DVec2::new(2.0, 2.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(0.0, 2.0),
            ],
            true,
        ));
        let big = square(-1.0, -1.0, 4.0);
        let both = intersect(&bow, &big).unwrap();
        assert_relative_eq!(both.area(), 2.0, epsilon = 1e-9);
        assert!(both.contains(DVec2::new(0.25, 1.0)));
        assert!(!both.contains(DVec2::new(1.0, 0.25)));
        let rest = subtract(&big, &bow).unwrap();
        assert_relative_eq!(rest.area(), 14.0, epsilon = 1e-9);
        assert!(!rest.contains(DVec2::new(1.75, 1.0)));
        assert!(rest.contains(DVec2::new(1.0, 1.75)));
    }

    #[test]
    fn test_coincident_operands() {
        let a = circle(0.0, 0.0, 1.0);
        let curves = result_curves(&intersect(&a, &a).unwrap());
        let original = result_curves(&a);
        assert_eq!(curves.len(), original.len());
        assert!(subtract(&a, &a).unwrap().is_empty());
        assert!(exclude(&a, &a).unwrap().is_empty());
    }

    #[test]
    fn test_circles() {
        let a = circle(0.0, 0.0, 1.0);
        let b = circle(1.0, 0.0, 1.0);
        let union = unite(&a, &b).unwrap();
        let both = intersect(&a, &b).unwrap();
        let lens = 2.0 * PI / 3.0 - 3f64.sqrt() / 2.0;
        assert_relative_eq!(both.area(), lens, max_relative = 1e-2);
        assert_relative_eq!(union.area() + both.area(), a.area() + b.area(), epsilon = 1e-6);
    }

    #[test]
    fn test_open_operand_is_rejected() {
        let open = PathItem::from(Path::line(DVec2::ZERO, DVec2::ONE));
        let err = unite(&open, &square(0.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeomError::MalformedGeometry(_)));
    }

    #[test]
    fn test_divide_closed() {
        let parts = divide(&square(0.0, 0.0, 2.0), &square(1.0, 1.0, 2.0)).unwrap();
        assert_eq!(parts.len(), 3);
        let areas: Vec<f64> = parts.iter().map(PathItem::area).collect();
        assert_relative_eq!(areas[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(areas[1], 3.0, epsilon = 1e-9);
        assert_relative_eq!(areas[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_divide_open_lines() {
        let a = PathItem::from(Path::line(DVec2::new(0.0, 0.0), DVec2::new(2.0, 2.0)));
        let b = PathItem::from(Path::line(DVec2::new(0.0, 2.0), DVec2::new(2.0, 0.0)));
        let pieces = divide(&a, &b).unwrap();
        assert_eq!(pieces.len(), 4);
        for piece in &pieces {
            let path = piece.as_path().unwrap();
            assert_eq!(path.segment_count(), 2);
            let ends = [path.segments()[0].point, path.segments()[1].point];
            assert!(ends.iter().any(|p| p.is_close(DVec2::new(1.0, 1.0), 1e-9)));
        }
    }

    #[test]
    fn test_divide_mixed_is_unsupported() {
        let open = PathItem::from(Path::line(DVec2::ZERO, DVec2::ONE));
        let err = divide(&open, &square(0.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeomError::UnsupportedOperation(_)));
    }
}
