//! Axis-aligned rectangles.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned rectangle. `y` grows downwards, so `top` is the smaller
/// y coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle from its origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle spanning two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Creates a rectangle from its top-left point and size.
    pub fn from_point_size(point: Point, size: Point) -> Self {
        Self::new(point.x, point.y, size.x, size.y)
    }

    /// Smallest rectangle containing all given points, or `None` if there
    /// are none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::from_corners(min, max))
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn point(&self) -> Point {
        DVec2::new(self.x, self.y)
    }

    /// Width and height as a vector.
    pub fn size(&self) -> Point {
        DVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        DVec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn top_left(&self) -> Point {
        DVec2::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        DVec2::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        DVec2::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        DVec2::new(self.right(), self.bottom())
    }

    /// The four corners, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
        ]
    }

    /// The eight named handle points of the rectangle, plus its center.
    pub fn named_points(&self) -> [(&'static str, Point); 9] {
        let c = self.center();
        [
            ("top-left", self.top_left()),
            ("top-center", DVec2::new(c.x, self.top())),
            ("top-right", self.top_right()),
            ("right-center", DVec2::new(self.right(), c.y)),
            ("bottom-right", self.bottom_right()),
            ("bottom-center", DVec2::new(c.x, self.bottom())),
            ("bottom-left", self.bottom_left()),
            ("left-center", DVec2::new(self.left(), c.y)),
            ("center", c),
        ]
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if the rectangle has no width or no height.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Returns true if the point lies inside or on the edge.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Returns true if `other` lies fully inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Returns true if the rectangles overlap, allowing a gap of `epsilon`.
    pub fn intersects(&self, other: &Rectangle, epsilon: f64) -> bool {
        other.right() > self.left() - epsilon
            && other.bottom() > self.top() - epsilon
            && other.left() < self.right() + epsilon
            && other.top() < self.bottom() + epsilon
    }

    /// Overlapping area of the two rectangles. Disjoint rectangles produce
    /// an empty rectangle at the nearest corner.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let x1 = self.left().max(other.left());
        let y1 = self.top().max(other.top());
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rectangle::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }

    /// Smallest rectangle containing both rectangles.
    pub fn unite(&self, other: &Rectangle) -> Rectangle {
        Rectangle::from_corners(
            self.top_left().min(other.top_left()),
            self.bottom_right().max(other.bottom_right()),
        )
    }

    /// Smallest rectangle containing this one and `point`.
    pub fn include(&self, point: Point) -> Rectangle {
        Rectangle::from_corners(self.top_left().min(point), self.bottom_right().max(point))
    }

    /// Grows the rectangle by `horizontal` and `vertical` in total, keeping
    /// the center in place.
    pub fn expand(&self, horizontal: f64, vertical: f64) -> Rectangle {
        Rectangle::new(
            self.x - horizontal * 0.5,
            self.y - vertical * 0.5,
            self.width + horizontal,
            self.height + vertical,
        )
    }

    /// Scales the size around the center.
    pub fn scale(&self, horizontal: f64, vertical: f64) -> Rectangle {
        self.expand(
            self.width * horizontal - self.width,
            self.height * vertical - self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let rect = Rectangle::from_points([
            DVec2::new(1.0, 5.0),
            DVec2::new(-2.0, 3.0),
            DVec2::new(4.0, 4.0),
        ])
        .unwrap();
        assert_eq!(rect, Rectangle::new(-2.0, 3.0, 6.0, 2.0));
        assert!(Rectangle::from_points(Vec::<Point>::new()).is_none());
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = Rectangle::new(0.0, 0.0, 2.0, 2.0);
        let b = Rectangle::new(1.0, 1.0, 2.0, 2.0);
        assert!(a.contains_point(DVec2::new(2.0, 2.0)));
        assert!(!a.contains_point(DVec2::new(2.1, 1.0)));
        assert!(a.intersects(&b, 0.0));
        assert!(!a.intersects(&Rectangle::new(3.0, 0.0, 1.0, 1.0), 0.0));
        assert_eq!(a.intersect(&b), Rectangle::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(a.unite(&b), Rectangle::new(0.0, 0.0, 3.0, 3.0));
        assert!(a.unite(&b).contains_rect(&a));
    }

    #[test]
    fn test_expand_and_scale() {
        let rect = Rectangle::new(0.0, 0.0, 2.0, 4.0);
        assert_eq!(rect.expand(2.0, 2.0), Rectangle::new(-1.0, -1.0, 4.0, 6.0));
        assert_eq!(rect.scale(2.0, 0.5), Rectangle::new(-1.0, 1.0, 4.0, 2.0));
    }

    #[test]
    fn test_named_points() {
        let rect = Rectangle::new(0.0, 0.0, 2.0, 2.0);
        let names = rect.named_points();
        assert_eq!(names[0], ("top-left", DVec2::new(0.0, 0.0)));
        assert_eq!(names[8], ("center", DVec2::new(1.0, 1.0)));
    }
}
