//! Compound paths: several closed paths sharing one fill rule.

use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::curve::Curve;
use crate::location::CurveLocation;
use crate::numerical::GEOMETRIC_EPSILON;
use crate::path::{Path, StrokeStyle};
use crate::primitives::{Matrix, Point, Rectangle};
use crate::segment::Segment;
use crate::winding::{self, FillRule, Winding, winding_at};

/// An ordered set of closed paths filled together, used for shapes with
/// holes. Children are closed on insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundPath {
    children: Vec<Path>,
    #[serde(default)]
    fill_rule: FillRule,
}

impl CompoundPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compound path from `paths`, closing any open ones.
    pub fn from_paths(paths: impl IntoIterator<Item = Path>) -> Self {
        let mut compound = Self::new();
        for path in paths {
            compound.add_child(path);
        }
        compound
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    // ============== Children ==============

    pub fn children(&self) -> &[Path] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Path> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Path::is_empty)
    }

    /// Appends a child, closing it.
    pub fn add_child(&mut self, mut path: Path) {
        path.set_closed(true);
        path.set_fill_rule(self.fill_rule);
        self.children.push(path);
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Path> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Takes the children out, leaving the compound path empty.
    pub fn into_children(self) -> Vec<Path> {
        self.children
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.children.first().and_then(Path::first_segment)
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.children.last().and_then(Path::last_segment)
    }

    /// Curves of all children, in child order.
    pub fn curves(&self) -> impl Iterator<Item = Curve<'_>> + '_ {
        self.children.iter().flat_map(Path::curves)
    }

    pub fn curve_count(&self) -> usize {
        self.children.iter().map(Path::curve_count).sum()
    }

    // ============== Geometry ==============

    pub fn length(&self) -> f64 {
        self.children.iter().map(Path::length).sum()
    }

    /// Sum of the signed child areas.
    pub fn area(&self) -> f64 {
        self.children.iter().map(Path::area).sum()
    }

    pub fn is_clockwise(&self) -> bool {
        self.children.first().is_none_or(Path::is_clockwise)
    }

    /// Reverses every child if the first child does not run in the given
    /// direction.
    pub fn set_clockwise(&mut self, clockwise: bool) {
        if self.is_clockwise() != clockwise {
            self.reverse();
        }
    }

    pub fn reverse(&mut self) {
        for child in &mut self.children {
            child.reverse();
        }
    }

    pub fn transform(&mut self, matrix: &Matrix) {
        for child in &mut self.children {
            child.transform(matrix);
        }
    }

    pub fn translate(&mut self, delta: Point) {
        self.transform(&Matrix::translation(delta));
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        unite_all(self.children.iter().map(Path::bounds))
    }

    pub fn stroke_bounds(&self, style: &StrokeStyle) -> Option<Rectangle> {
        unite_all(self.children.iter().map(|child| child.stroke_bounds(style)))
    }

    pub fn handle_bounds(&self) -> Option<Rectangle> {
        unite_all(self.children.iter().map(Path::handle_bounds))
    }

    /// Combined winding number of all children.
    pub fn winding(&self, point: Point) -> Winding {
        let curves = self.children.iter().flat_map(Path::beziers);
        winding_at(point, curves, GEOMETRIC_EPSILON)
    }

    /// Returns true if `point` is filled under the fill rule or lies on
    /// an outline.
    pub fn contains(&self, point: Point) -> bool {
        let winding = self.winding(point);
        winding.on_path || self.fill_rule.is_inside(winding.winding)
    }

    /// A point inside the filled area.
    pub fn interior_point(&self) -> Option<Point> {
        let curves: Vec<_> = self.children.iter().flat_map(Path::beziers).collect();
        if curves.is_empty() {
            return None;
        }
        winding::interior_point(&curves, self.fill_rule)
    }

    /// Location on any child nearest to `point`; the location's contour is
    /// the child index.
    pub fn nearest_location(&self, point: Point) -> Option<CurveLocation> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| {
                let location = child.nearest_location(point)?;
                let distance = location.distance()?;
                Some(
                    CurveLocation::new(index, location.curve_index(), location.time(), location.point())
                        .with_distance(distance),
                )
            })
            .min_by(|a, b| a.distance().unwrap_or(f64::INFINITY).total_cmp(&b.distance().unwrap_or(f64::INFINITY)))
    }

    /// Resolves nesting: children that do not bound the fill under the
    /// current rule are removed, outer children are oriented clockwise or
    /// not as requested and holes the other way. Afterwards the non-zero
    /// and even-odd rules fill the same area.
    pub fn reorient(&mut self, clockwise: bool) {
        let contours: Vec<Contour> = self.children.iter().map(Contour::from_path).collect();
        let kept = crate::boolean::reorient(contours, self.fill_rule, clockwise);
        let fill_rule = self.fill_rule;
        self.children = kept
            .iter()
            .map(|contour| contour.to_path().with_fill_rule(fill_rule))
            .collect();
    }
}

fn unite_all(rects: impl Iterator<Item = Option<Rectangle>>) -> Option<Rectangle> {
    rects.flatten().reduce(|a, b| a.unite(&b))
}
