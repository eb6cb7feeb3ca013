//! Flattened contour representation used by the intersection and boolean
//! engines.

use crate::bezier::Bezier;
use crate::numerical::GEOMETRIC_EPSILON;
use crate::path::Path;
use crate::primitives::{Point, PointExt, Rectangle};
use crate::segment::Segment;
use crate::winding::{Winding, winding_at};

/// One contour as a list of absolute curves.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Contour {
    pub curves: Vec<Bezier>,
    pub closed: bool,
}

impl Contour {
    pub fn from_path(path: &Path) -> Self {
        Self {
            curves: path.beziers().collect(),
            closed: path.is_closed(),
        }
    }

    /// Index of the curve before `index`, wrapping on closed contours.
    pub fn previous(&self, index: usize) -> Option<usize> {
        if index > 0 {
            Some(index - 1)
        } else if self.closed && !self.curves.is_empty() {
            Some(self.curves.len() - 1)
        } else {
            None
        }
    }

    /// Index of the curve after `index`, wrapping on closed contours.
    pub fn next(&self, index: usize) -> Option<usize> {
        if index + 1 < self.curves.len() {
            Some(index + 1)
        } else if self.closed && !self.curves.is_empty() {
            Some(0)
        } else {
            None
        }
    }

    /// Signed area, treating an open contour as closed by a straight line.
    pub fn area(&self) -> f64 {
        let area: f64 = self.curves.iter().map(Bezier::area).sum();
        match (self.closed, self.curves.first(), self.curves.last()) {
            (false, Some(first), Some(last)) => area + Bezier::line(last.p2, first.p1).area(),
            _ => area,
        }
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        self.curves
            .iter()
            .map(Bezier::bounds)
            .reduce(|a, b| a.unite(&b))
    }

    pub fn winding(&self, point: Point, tolerance: f64) -> Winding {
        winding_at(point, self.curves.iter().copied(), tolerance)
    }

    /// The contour traversed backwards.
    pub fn reversed(&self) -> Contour {
        Contour {
            curves: self.curves.iter().rev().map(Bezier::reversed).collect(),
            closed: self.closed,
        }
    }

    /// Drops curves without length, carrying their outgoing handle onto
    /// the previous curve so the outline stays connected.
    pub fn without_degenerate_curves(&self) -> Contour {
        let mut curves: Vec<Bezier> = Vec::with_capacity(self.curves.len());
        for curve in &self.curves {
            if curve.has_length(GEOMETRIC_EPSILON) {
                if let Some(last) = curves.last_mut() {
                    last.p2 = curve.p1;
                }
                curves.push(*curve);
            } else if let Some(last) = curves.last_mut() {
                let shift = curve.p2 - last.p2;
                last.p2 = curve.p2;
                last.c2 += shift;
            }
        }
        if self.closed && curves.len() > 1 {
            let start = curves[0].p1;
            if let Some(last) = curves.last_mut() {
                last.p2 = start;
            }
        }
        Contour {
            curves,
            closed: self.closed,
        }
    }

    /// Rebuilds a path from the curves. Consecutive curves are assumed to
    /// share their joining anchor.
    pub fn to_path(&self) -> Path {
        Path::from_segments(segments_from_curves(&self.curves, self.closed), self.closed)
    }
}

/// Converts a chain of curves into segments. Curves whose source had no
/// handles keep none.
pub(crate) fn segments_from_curves(curves: &[Bezier], closed: bool) -> Vec<Segment> {
    let n = curves.len();
    if n == 0 {
        return Vec::new();
    }
    let mut segments = Vec::with_capacity(n + 1);
    for (i, curve) in curves.iter().enumerate() {
        let handle_in = if i > 0 {
            curves[i - 1].c2 - curve.p1
        } else if closed {
            curves[n - 1].c2 - curve.p1
        } else {
            Point::ZERO
        };
        segments.push(Segment::new(curve.p1, clean(handle_in), clean(curve.c1 - curve.p1)));
    }
    if !closed {
        let last = curves[n - 1];
        segments.push(Segment::new(last.p2, clean(last.c2 - last.p2), Point::ZERO));
    }
    segments
}

fn clean(handle: Point) -> Point {
    if handle.is_zero() { Point::ZERO } else { handle }
}
