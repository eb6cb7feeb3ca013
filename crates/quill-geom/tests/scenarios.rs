//! End-to-end boolean scenarios on simple shapes.

use approx::assert_relative_eq;
use glam::DVec2;
use quill_geom::{FillRule, Path, PathItem, PointExt, Rectangle};
use std::f64::consts::PI;

fn square(x: f64, y: f64, size: f64) -> PathItem {
    Path::rectangle(Rectangle::new(x, y, size, size)).into()
}

fn circle(center: DVec2, radius: f64) -> PathItem {
    Path::circle(center, radius).into()
}

#[test]
fn test_unite_half_overlapping_squares() {
    let a = square(0.0, 0.0, 1.0);
    let b = square(0.5, 0.0, 1.0);
    let result = a.unite(&b).unwrap();

    let path = result.as_path().expect("single contour");
    assert!(path.is_closed());
    assert_eq!(path.segment_count(), 6);
    assert_relative_eq!(result.area(), 1.5, epsilon = 1e-9);
    let bounds = result.bounds().unwrap();
    assert_relative_eq!(bounds.width, 1.5, epsilon = 1e-9);
    assert_relative_eq!(bounds.height, 1.0, epsilon = 1e-9);
}

#[test]
fn test_intersect_concentric_circles() {
    let big = circle(DVec2::ZERO, 2.0);
    let small = circle(DVec2::ZERO, 1.0);
    let result = big.intersect(&small).unwrap();

    let path = result.as_path().expect("single contour");
    assert_eq!(path.segment_count(), 4);
    assert_relative_eq!(result.area(), PI, max_relative = 1e-2);
    for segment in path.segments() {
        assert_relative_eq!(segment.point.length(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_subtract_circle_from_square() {
    let square = square(-2.0, -2.0, 4.0);
    let hole = circle(DVec2::ZERO, 1.0);
    let result = square.subtract(&hole).unwrap();

    let compound = result.as_compound().expect("outline with a hole");
    assert_eq!(compound.child_count(), 2);
    assert_eq!(compound.fill_rule(), FillRule::EvenOdd);
    assert_relative_eq!(result.area(), 16.0 - hole.area(), epsilon = 1e-9);

    assert!(result.contains(DVec2::new(1.5, 1.5)));
    assert!(!result.contains(DVec2::ZERO));
    assert!(!result.contains(DVec2::new(0.5, 0.0)));

    let (outer, inner): (Vec<_>, Vec<_>) = compound.children().iter().partition(|path| path.area() > 0.0);
    assert_eq!(outer.len(), 1);
    assert_eq!(inner.len(), 1);
    assert_relative_eq!(outer[0].area(), 16.0, epsilon = 1e-9);
    let hole_bounds = inner[0].bounds().unwrap();
    assert!(hole_bounds.center().is_close(DVec2::ZERO, 1e-9));
    assert_relative_eq!(hole_bounds.width, 2.0, epsilon = 1e-9);
}

#[test]
fn test_divide_crossing_lines() {
    let a: PathItem = Path::line(DVec2::new(0.0, 0.0), DVec2::new(4.0, 4.0)).into();
    let b: PathItem = Path::line(DVec2::new(0.0, 4.0), DVec2::new(4.0, 0.0)).into();
    let pieces = a.divide(&b).unwrap();
    assert_eq!(pieces.len(), 4);

    let crossing = DVec2::new(2.0, 2.0);
    let ends = [
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 4.0),
        DVec2::new(0.0, 4.0),
        DVec2::new(4.0, 0.0),
    ];
    for (piece, end) in pieces.iter().zip(ends) {
        let path = piece.as_path().unwrap();
        assert!(!path.is_closed());
        assert_eq!(path.segment_count(), 2);
        assert!(path.curve(0).unwrap().is_linear());
        let points = [path.segments()[0].point, path.segments()[1].point];
        assert!(points.iter().any(|p| p.is_close(crossing, 1e-9)));
        assert!(points.iter().any(|p| p.is_close(end, 1e-9)));
    }
}

#[test]
fn test_inputs_are_not_mutated() {
    let a = square(0.0, 0.0, 2.0);
    let b = circle(DVec2::new(2.0, 2.0), 1.0);
    let (a_before, b_before) = (a.clone(), b.clone());
    let _ = a.exclude(&b).unwrap();
    let _ = a.divide(&b).unwrap();
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}
