//! Resolved positions on curves.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::primitives::Point;

/// How two outlines meet at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionKind {
    /// The outlines pass through each other.
    Crossing,
    /// The outlines touch without crossing.
    Tangent,
    /// The location bounds a stretch where the outlines coincide.
    Overlap,
}

/// A point on a curve, identified by contour, curve index and curve time.
///
/// Locations are immutable once created. When a location describes an
/// intersection, [`CurveLocation::intersection`] holds the matching
/// location on the other outline.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLocation {
    contour: usize,
    curve: usize,
    time: f64,
    point: Point,
    kind: Option<IntersectionKind>,
    intersection: Option<Box<CurveLocation>>,
    distance: Option<f64>,
}

impl CurveLocation {
    /// Creates a plain location on curve `curve` of contour `contour`.
    pub fn new(contour: usize, curve: usize, time: f64, point: Point) -> Self {
        Self {
            contour,
            curve,
            time,
            point,
            kind: None,
            intersection: None,
            distance: None,
        }
    }

    /// Pairs `self` with its counterpart on the other outline.
    pub(crate) fn paired(mut self, mut other: CurveLocation, kind: IntersectionKind) -> Self {
        other.kind = Some(kind);
        self.kind = Some(kind);
        self.intersection = Some(Box::new(other));
        self
    }

    pub(crate) fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Index of the contour (child path) the location lies on. Always 0 for
    /// a plain path.
    pub fn contour(&self) -> usize {
        self.contour
    }

    /// Index of the curve within its contour.
    pub fn curve_index(&self) -> usize {
        self.curve
    }

    /// Curve time in `[0, 1]`.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// Intersection classification, if this location is an intersection.
    pub fn kind(&self) -> Option<IntersectionKind> {
        self.kind
    }

    /// The matching location on the other outline.
    pub fn intersection(&self) -> Option<&CurveLocation> {
        self.intersection.as_deref()
    }

    /// Distance to the query point, for locations produced by nearest-point
    /// searches.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn is_crossing(&self) -> bool {
        self.kind == Some(IntersectionKind::Crossing)
    }

    pub fn is_tangent(&self) -> bool {
        self.kind == Some(IntersectionKind::Tangent)
    }

    pub fn is_overlap(&self) -> bool {
        self.kind == Some(IntersectionKind::Overlap)
    }

    /// Orders locations by contour, curve and time.
    pub fn cmp_position(&self, other: &CurveLocation) -> Ordering {
        self.contour
            .cmp(&other.contour)
            .then(self.curve.cmp(&other.curve))
            .then(self.time.total_cmp(&other.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_paired_location() {
        let a = CurveLocation::new(0, 2, 0.5, DVec2::new(1.0, 1.0));
        let b = CurveLocation::new(1, 0, 0.25, DVec2::new(1.0, 1.0));
        let paired = a.paired(b, IntersectionKind::Crossing);
        assert!(paired.is_crossing());
        let peer = paired.intersection().unwrap();
        assert_eq!(peer.contour(), 1);
        assert!(peer.is_crossing());
        assert!(peer.intersection().is_none());
    }

    #[test]
    fn test_position_order() {
        let mut locations = vec![
            CurveLocation::new(0, 1, 0.2, DVec2::ZERO),
            CurveLocation::new(0, 0, 0.9, DVec2::ZERO),
            CurveLocation::new(0, 1, 0.1, DVec2::ZERO),
        ];
        locations.sort_by(CurveLocation::cmp_position);
        let keys: Vec<_> = locations.iter().map(|l| (l.curve_index(), l.time())).collect();
        assert_eq!(keys, vec![(0, 0.9), (1, 0.1), (1, 0.2)]);
    }
}
