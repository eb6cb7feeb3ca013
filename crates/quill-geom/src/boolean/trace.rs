//! Walks the selected edges into closed contours.

use tracing::{trace, warn};

use crate::bezier::Bezier;
use crate::contour::Contour;
use crate::primitives::{Point, PointExt};

use super::graph::{Edge, Fragment, snap};

/// Angles closer than this, in degrees, are resolved by the chord test.
const ANGLE_TIE_DEGREES: f64 = 1e-7;

/// Clockwise angle in degrees, in `(0, 360]`, from `from` to `to`, taken
/// with the y-axis pointing up: the sweep runs towards decreasing
/// [`angle_degrees`](PointExt::angle_degrees). On a y-down screen the same
/// sweep turns counterclockwise.
fn clockwise_angle(from: Point, to: Point) -> f64 {
    let angle = (from.angle_degrees() - to.angle_degrees()).rem_euclid(360.0);
    if angle <= ANGLE_TIE_DEGREES { 360.0 } else { angle }
}

/// Picks the edge leaving the vertex after `incoming`: the first one met
/// sweeping clockwise from the reversed incoming direction, which keeps
/// the traced area on the left and splits touching contours apart.
fn next_edge(edges: &[Edge], incoming: &Edge, candidates: &[usize]) -> Option<usize> {
    let back = -incoming.curve.tangent_at_time(1.0);
    let back_chord = incoming.curve.point_at_time(0.75) - incoming.curve.p2;
    let key = |index: usize| {
        let curve = &edges[index].curve;
        let tangent = clockwise_angle(back, curve.tangent_at_time(0.0));
        let chord = clockwise_angle(back_chord, curve.point_at_time(0.25) - curve.p1);
        (tangent, chord)
    };
    candidates.iter().copied().min_by(|&a, &b| {
        let (ta, ca) = key(a);
        let (tb, cb) = key(b);
        if (ta - tb).abs() <= ANGLE_TIE_DEGREES {
            ca.total_cmp(&cb)
        } else {
            ta.total_cmp(&tb)
        }
    })
}

/// Traces closed loops through `edges`. Chains that run into a vertex
/// without unused outgoing edges are discarded.
pub(super) fn trace(edges: &[Edge], vertex_count: usize) -> Vec<Vec<usize>> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (index, edge) in edges.iter().enumerate() {
        outgoing[edge.start].push(index);
    }
    let mut visited = vec![false; edges.len()];
    let mut loops = Vec::new();

    for first in 0..edges.len() {
        if visited[first] {
            continue;
        }
        visited[first] = true;
        let origin = edges[first].start;
        let mut chain = vec![first];
        let mut current = first;
        loop {
            let vertex = edges[current].end;
            if vertex == origin {
                trace!("Closed loop of {} edges at vertex {}", chain.len(), origin);
                loops.push(chain);
                break;
            }
            let candidates: Vec<usize> = outgoing[vertex]
                .iter()
                .copied()
                .filter(|&index| !visited[index])
                .collect();
            let Some(next) = next_edge(edges, &edges[current], &candidates) else {
                warn!(
                    "Discarding open chain of {} edges ending at vertex {}",
                    chain.len(),
                    vertex
                );
                break;
            };
            visited[next] = true;
            chain.push(next);
            current = next;
        }
    }
    loops
}

/// Turns a traced loop into a contour, healing consecutive pieces of the
/// same operand curve back into one curve.
pub(super) fn heal(chain: &[usize], edges: &[Edge], fragments: &[Fragment]) -> Contour {
    let continues = |a: usize, b: usize| {
        let (ea, eb) = (&edges[a], &edges[b]);
        fragments[ea.fragment].continues_into(ea.reversed, &fragments[eb.fragment], eb.reversed)
    };
    let mut chain = chain.to_vec();
    if chain.len() > 1 {
        let n = chain.len();
        if let Some(start) = (0..n).find(|&i| !continues(chain[(i + n - 1) % n], chain[i])) {
            chain.rotate_left(start);
        }
    }

    let mut curves: Vec<Bezier> = Vec::with_capacity(chain.len());
    let mut run_start = 0;
    for i in 1..=chain.len() {
        if i < chain.len() && continues(chain[i - 1], chain[i]) {
            continue;
        }
        let (first, last) = (&edges[chain[run_start]], &edges[chain[i - 1]]);
        if i - run_start == 1 {
            curves.push(first.curve);
        } else {
            let (from_fragment, to_fragment) = (&fragments[first.fragment], &fragments[last.fragment]);
            let (from, to) = if first.reversed {
                (from_fragment.to, to_fragment.from)
            } else {
                (from_fragment.from, to_fragment.to)
            };
            let original = &from_fragment.original;
            let mut merged = original.part(from, to);
            if !original.has_handles() {
                merged = Bezier::line(merged.p1, merged.p2);
            }
            curves.push(snap(&merged, first.curve.p1, last.curve.p2));
        }
        run_start = i;
    }
    Contour {
        curves,
        closed: true,
    }
}
