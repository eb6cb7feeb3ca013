//! Fragment graph: operand curves split at the intersection sites, with
//! fragment ends merged into shared vertices.

use crate::bezier::Bezier;
use crate::contour::Contour;
use crate::intersection::Site;
use crate::numerical::CURVETIME_EPSILON;
use crate::primitives::{Point, PointExt};

/// Distance within which fragment ends share a vertex.
pub(super) const VERTEX_TOLERANCE: f64 = 1e-6;

/// Which operand a fragment comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operand {
    A,
    B,
}

/// A piece of one operand curve between two consecutive split times.
#[derive(Debug, Clone)]
pub(super) struct Fragment {
    pub curve: Bezier,
    pub operand: Operand,
    pub contour: usize,
    pub source: usize,
    /// The whole operand curve the fragment was cut from.
    pub original: Bezier,
    pub from: f64,
    pub to: f64,
}

impl Fragment {
    /// Returns true if `next` continues this fragment along the same
    /// source curve in the same direction.
    pub fn continues_into(&self, reversed: bool, next: &Fragment, next_reversed: bool) -> bool {
        if self.operand != next.operand
            || self.contour != next.contour
            || self.source != next.source
            || reversed != next_reversed
        {
            return false;
        }
        if reversed {
            (self.from - next.to).abs() <= CURVETIME_EPSILON
        } else {
            (self.to - next.from).abs() <= CURVETIME_EPSILON
        }
    }
}

/// Splits every curve of `contours` at the curve times in `sites`.
pub(super) fn split(contours: &[Contour], operand: Operand, sites: &[Site]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for (contour_index, contour) in contours.iter().enumerate() {
        for (curve_index, curve) in contour.curves.iter().enumerate() {
            let mut times: Vec<f64> = sites
                .iter()
                .filter(|site| site.contour == contour_index && site.curve == curve_index)
                .map(|site| site.time)
                .filter(|t| *t > CURVETIME_EPSILON && *t < 1.0 - CURVETIME_EPSILON)
                .collect();
            times.sort_by(f64::total_cmp);
            times.dedup_by(|a, b| (*a - *b).abs() <= CURVETIME_EPSILON);

            let straight = !curve.has_handles();
            let bounds = std::iter::once(0.0).chain(times).chain(std::iter::once(1.0));
            let bounds: Vec<f64> = bounds.collect();
            for pair in bounds.windows(2) {
                let mut piece = curve.part(pair[0], pair[1]);
                if straight {
                    piece = Bezier::line(piece.p1, piece.p2);
                }
                fragments.push(Fragment {
                    curve: piece,
                    operand,
                    contour: contour_index,
                    source: curve_index,
                    original: *curve,
                    from: pair[0],
                    to: pair[1],
                });
            }
        }
    }
    fragments
}

/// Points shared by fragment ends.
#[derive(Debug, Default)]
pub(super) struct Vertices {
    points: Vec<Point>,
}

impl Vertices {
    /// Id of the vertex at `point`, registering a new one if no existing
    /// vertex lies within [`VERTEX_TOLERANCE`].
    pub fn id(&mut self, point: Point) -> usize {
        if let Some(index) = self
            .points
            .iter()
            .position(|vertex| vertex.is_close(point, VERTEX_TOLERANCE))
        {
            return index;
        }
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn point(&self, id: usize) -> Point {
        self.points[id]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// A selected fragment oriented for tracing.
#[derive(Debug, Clone)]
pub(super) struct Edge {
    pub curve: Bezier,
    pub start: usize,
    pub end: usize,
    pub fragment: usize,
    pub reversed: bool,
}

/// Moves the anchors of `curve` onto `p1` and `p2`, dragging the
/// adjacent control points along.
pub(super) fn snap(curve: &Bezier, p1: Point, p2: Point) -> Bezier {
    Bezier::new(p1, curve.c1 + (p1 - curve.p1), curve.c2 + (p2 - curve.p2), p2)
}

/// Orients the selected fragments and connects them through shared
/// vertices. `selection[i]` is `None` for dropped fragments and
/// `Some(reversed)` for kept ones. Fragments collapsing onto a single
/// vertex and exact duplicates of an earlier edge are dropped.
pub(super) fn build_edges(
    fragments: &[Fragment],
    selection: &[Option<bool>],
    vertices: &mut Vertices,
) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    for (index, (fragment, selected)) in fragments.iter().zip(selection).enumerate() {
        let Some(reversed) = *selected else {
            continue;
        };
        let curve = if reversed {
            fragment.curve.reversed()
        } else {
            fragment.curve
        };
        let start = vertices.id(curve.p1);
        let end = vertices.id(curve.p2);
        if start == end && !curve.has_length(VERTEX_TOLERANCE) {
            continue;
        }
        let curve = snap(&curve, vertices.point(start), vertices.point(end));
        let duplicate = edges.iter().any(|edge| {
            edge.start == start && edge.end == end && edge.curve.is_close(&curve, VERTEX_TOLERANCE)
        });
        if duplicate {
            continue;
        }
        edges.push(Edge {
            curve,
            start,
            end,
            fragment: index,
            reversed,
        });
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn square() -> Contour {
        let p = [
            DVec2::new(0.0, 1.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
        ];
        Contour {
            curves: (0..4).map(|i| Bezier::line(p[i], p[(i + 1) % 4])).collect(),
            closed: true,
        }
    }

    #[test]
    fn test_split_at_sites() {
        let sites = [
            Site { contour: 0, curve: 1, time: 0.5 },
            Site { contour: 0, curve: 1, time: 0.5 + 1e-10 },
            Site { contour: 0, curve: 2, time: 1.0 },
        ];
        let fragments = split(&[square()], Operand::A, &sites);
        assert_eq!(fragments.len(), 5);
        let halves: Vec<&Fragment> = fragments.iter().filter(|f| f.source == 1).collect();
        assert_eq!(halves.len(), 2);
        assert!(halves[0].curve.p2.is_close(DVec2::new(0.5, 0.0), 1e-12));
        assert!(!halves[0].curve.has_handles());
        assert!(halves[0].continues_into(false, halves[1], false));
        assert!(halves[1].continues_into(true, halves[0], true));
        assert!(!halves[1].continues_into(false, halves[0], false));
    }

    #[test]
    fn test_vertices_merge_close_points() {
        let mut vertices = Vertices::default();
        let a = vertices.id(DVec2::new(1.0, 1.0));
        let b = vertices.id(DVec2::new(1.0 + 1e-8, 1.0));
        let c = vertices.id(DVec2::new(2.0, 1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(vertices.len(), 2);
    }

    #[test]
    fn test_build_edges_drops_duplicates_and_points() {
        let fragments = split(&[square(), square()], Operand::A, &[]);
        let mut selection = vec![Some(false); fragments.len()];
        selection[0] = None;
        let mut vertices = Vertices::default();
        let edges = build_edges(&fragments, &selection, &mut vertices);
        assert_eq!(edges.len(), 4);
        assert_eq!(vertices.len(), 4);
        assert!(edges.iter().all(|edge| edge.start != edge.end));
    }
}
