//! [`PathItem`]: either a single path or a compound path, the operand and
//! result type of the boolean operators.

use serde::{Deserialize, Serialize};

use crate::boolean::{self, BooleanOp};
use crate::compound::CompoundPath;
use crate::config::GeometryConfig;
use crate::contour::Contour;
use crate::error::GeomResult;
use crate::intersection::intersect_contours;
use crate::location::CurveLocation;
use crate::path::{Path, StrokeStyle};
use crate::primitives::{Matrix, Point, Rectangle};
use crate::winding::{FillRule, Winding};

/// A path or compound path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathItem {
    Path(Path),
    Compound(CompoundPath),
}

impl Default for PathItem {
    fn default() -> Self {
        PathItem::Path(Path::new())
    }
}

impl From<Path> for PathItem {
    fn from(path: Path) -> Self {
        PathItem::Path(path)
    }
}

impl From<CompoundPath> for PathItem {
    fn from(compound: CompoundPath) -> Self {
        PathItem::Compound(compound)
    }
}

impl PathItem {
    /// The contours of the item: the path itself or the compound's
    /// children.
    pub fn paths(&self) -> &[Path] {
        match self {
            PathItem::Path(path) => std::slice::from_ref(path),
            PathItem::Compound(compound) => compound.children(),
        }
    }

    pub fn into_paths(self) -> Vec<Path> {
        match self {
            PathItem::Path(path) => vec![path],
            PathItem::Compound(compound) => compound.into_children(),
        }
    }

    pub(crate) fn contours(&self) -> Vec<Contour> {
        self.paths().iter().map(Contour::from_path).collect()
    }

    pub fn fill_rule(&self) -> FillRule {
        match self {
            PathItem::Path(path) => path.fill_rule(),
            PathItem::Compound(compound) => compound.fill_rule(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths().iter().all(Path::is_empty)
    }

    /// Returns true if every contour is closed.
    pub fn is_closed(&self) -> bool {
        self.paths().iter().all(Path::is_closed)
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            PathItem::Path(path) => Some(path),
            PathItem::Compound(_) => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundPath> {
        match self {
            PathItem::Compound(compound) => Some(compound),
            PathItem::Path(_) => None,
        }
    }

    /// Collapses a compound path with at most one child into a path.
    pub fn reduce(self) -> PathItem {
        match self {
            PathItem::Compound(compound) if compound.child_count() <= 1 => {
                let fill_rule = compound.fill_rule();
                let path = compound.into_children().pop().unwrap_or_default();
                PathItem::Path(path.with_fill_rule(fill_rule))
            }
            item => item,
        }
    }

    // ============== Geometry ==============

    pub fn length(&self) -> f64 {
        self.paths().iter().map(Path::length).sum()
    }

    pub fn area(&self) -> f64 {
        self.paths().iter().map(Path::area).sum()
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        match self {
            PathItem::Path(path) => path.bounds(),
            PathItem::Compound(compound) => compound.bounds(),
        }
    }

    pub fn stroke_bounds(&self, style: &StrokeStyle) -> Option<Rectangle> {
        match self {
            PathItem::Path(path) => path.stroke_bounds(style),
            PathItem::Compound(compound) => compound.stroke_bounds(style),
        }
    }

    pub fn handle_bounds(&self) -> Option<Rectangle> {
        match self {
            PathItem::Path(path) => path.handle_bounds(),
            PathItem::Compound(compound) => compound.handle_bounds(),
        }
    }

    pub fn winding(&self, point: Point) -> Winding {
        match self {
            PathItem::Path(path) => path.winding(point),
            PathItem::Compound(compound) => compound.winding(point),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            PathItem::Path(path) => path.contains(point),
            PathItem::Compound(compound) => compound.contains(point),
        }
    }

    /// Location nearest to `point`; the location's contour indexes
    /// [`PathItem::paths`].
    pub fn nearest_location(&self, point: Point) -> Option<CurveLocation> {
        match self {
            PathItem::Path(path) => path.nearest_location(point),
            PathItem::Compound(compound) => compound.nearest_location(point),
        }
    }

    pub fn transform(&mut self, matrix: &Matrix) {
        match self {
            PathItem::Path(path) => path.transform(matrix),
            PathItem::Compound(compound) => compound.transform(matrix),
        }
    }

    pub fn reverse(&mut self) {
        match self {
            PathItem::Path(path) => path.reverse(),
            PathItem::Compound(compound) => compound.reverse(),
        }
    }

    /// Intersections with `other`; location contours index the two items'
    /// [`PathItem::paths`].
    pub fn intersections(&self, other: &PathItem) -> Vec<CurveLocation> {
        intersect_contours(&self.contours(), &other.contours(), &GeometryConfig::DEFAULT)
            .iter()
            .map(|crossing| crossing.to_location())
            .collect()
    }

    // ============== Boolean operations ==============

    /// Area covered by either item.
    pub fn unite(&self, other: &PathItem) -> GeomResult<PathItem> {
        boolean::boolean(self, other, BooleanOp::Unite)
    }

    /// Area covered by both items.
    pub fn intersect(&self, other: &PathItem) -> GeomResult<PathItem> {
        boolean::boolean(self, other, BooleanOp::Intersect)
    }

    /// Area of this item not covered by `other`.
    pub fn subtract(&self, other: &PathItem) -> GeomResult<PathItem> {
        boolean::boolean(self, other, BooleanOp::Subtract)
    }

    /// Area covered by exactly one of the items.
    pub fn exclude(&self, other: &PathItem) -> GeomResult<PathItem> {
        boolean::boolean(self, other, BooleanOp::Exclude)
    }

    /// Splits both items along their intersections. See [`boolean::divide`].
    pub fn divide(&self, other: &PathItem) -> GeomResult<Vec<PathItem>> {
        boolean::divide(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_reduce_single_child_compound() {
        let compound = CompoundPath::from_paths([Path::circle(DVec2::ZERO, 1.0)])
            .with_fill_rule(FillRule::EvenOdd);
        let reduced = PathItem::from(compound).reduce();
        let path = reduced.as_path().unwrap();
        assert_eq!(path.segment_count(), 4);
        assert_eq!(path.fill_rule(), FillRule::EvenOdd);
        let empty = PathItem::from(CompoundPath::new()).reduce();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_paths_view() {
        let item = PathItem::from(Path::circle(DVec2::ZERO, 1.0));
        assert_eq!(item.paths().len(), 1);
        assert!(item.is_closed());
        assert!(item.contains(DVec2::ZERO));
    }

    #[test]
    fn test_item_intersections() {
        let a = PathItem::from(Path::rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0)));
        let b = PathItem::from(CompoundPath::from_paths([
            Path::rectangle(Rectangle::new(1.0, 1.0, 2.0, 2.0)),
            Path::rectangle(Rectangle::new(10.0, 10.0, 1.0, 1.0)),
        ]));
        let hits = a.intersections(&b);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|hit| hit.intersection().unwrap().contour() == 0));
    }
}
