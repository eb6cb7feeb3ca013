//! Shape constructors. Closed shapes run clockwise on screen, so their
//! area is positive.

use glam::DVec2;

use crate::error::{GeomError, GeomResult};
use crate::numerical::KAPPA;
use crate::primitives::{Point, PointExt, Rectangle};
use crate::segment::Segment;

use super::Path;

impl Path {
    /// Straight line from `from` to `to`.
    pub fn line(from: Point, to: Point) -> Path {
        Path::from_points([from, to], false)
    }

    /// Rectangle starting at its bottom-left corner.
    pub fn rectangle(rect: Rectangle) -> Path {
        Path::from_points(
            [
                rect.bottom_left(),
                rect.top_left(),
                rect.top_right(),
                rect.bottom_right(),
            ],
            true,
        )
    }

    /// Rectangle spanning two opposite corners.
    pub fn rectangle_from_corners(a: Point, b: Point) -> Path {
        Path::rectangle(Rectangle::from_corners(a, b))
    }

    /// Rectangle with elliptical corners of the given radii, clamped to
    /// half the rectangle size.
    pub fn rounded_rectangle(rect: Rectangle, radius: Point) -> Path {
        let rx = radius.x.abs().min(rect.width / 2.0);
        let ry = radius.y.abs().min(rect.height / 2.0);
        if rx == 0.0 || ry == 0.0 {
            return Path::rectangle(rect);
        }
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let (left, top, right, bottom) = (rect.left(), rect.top(), rect.right(), rect.bottom());
        let segments = [
            Segment::new(DVec2::new(left, bottom - ry), DVec2::new(0.0, ky), DVec2::ZERO),
            Segment::new(DVec2::new(left, top + ry), DVec2::ZERO, DVec2::new(0.0, -ky)),
            Segment::new(DVec2::new(left + rx, top), DVec2::new(-kx, 0.0), DVec2::ZERO),
            Segment::new(DVec2::new(right - rx, top), DVec2::ZERO, DVec2::new(kx, 0.0)),
            Segment::new(DVec2::new(right, top + ry), DVec2::new(0.0, -ky), DVec2::ZERO),
            Segment::new(DVec2::new(right, bottom - ry), DVec2::ZERO, DVec2::new(0.0, ky)),
            Segment::new(DVec2::new(right - rx, bottom), DVec2::new(kx, 0.0), DVec2::ZERO),
            Segment::new(DVec2::new(left + rx, bottom), DVec2::ZERO, DVec2::new(-kx, 0.0)),
        ];
        Path::from_segments(segments, true)
    }

    /// Circle approximated by four cubic curves.
    pub fn circle(center: Point, radius: f64) -> Path {
        Path::ellipse(center, DVec2::splat(radius))
    }

    /// Axis-aligned ellipse with radii `radius.x` and `radius.y`, starting
    /// at its leftmost point.
    pub fn ellipse(center: Point, radius: Point) -> Path {
        let (rx, ry) = (radius.x, radius.y);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let segments = [
            Segment::new(
                center + DVec2::new(-rx, 0.0),
                DVec2::new(0.0, ky),
                DVec2::new(0.0, -ky),
            ),
            Segment::new(
                center + DVec2::new(0.0, -ry),
                DVec2::new(-kx, 0.0),
                DVec2::new(kx, 0.0),
            ),
            Segment::new(
                center + DVec2::new(rx, 0.0),
                DVec2::new(0.0, -ky),
                DVec2::new(0.0, ky),
            ),
            Segment::new(
                center + DVec2::new(0.0, ry),
                DVec2::new(kx, 0.0),
                DVec2::new(-kx, 0.0),
            ),
        ];
        Path::from_segments(segments, true)
    }

    /// Regular polygon with `sides` corners on a circle of `radius`.
    pub fn regular_polygon(center: Point, sides: usize, radius: f64) -> GeomResult<Path> {
        if sides < 3 {
            return Err(GeomError::MalformedGeometry(format!(
                "a regular polygon needs at least 3 sides, got {sides}"
            )));
        }
        let step = 360.0 / sides as f64;
        let triangle = sides == 3;
        let vector = DVec2::new(0.0, if triangle { -radius } else { radius });
        let offset = if triangle { -1.0 } else { 0.5 };
        let points = (0..sides).map(|i| center + vector.rotate_degrees((i as f64 + offset) * step));
        Ok(Path::from_points(points, true))
    }

    /// Star with `points` tips alternating between `outer` and `inner`
    /// radius, the first tip pointing up.
    pub fn star(center: Point, points: usize, outer: f64, inner: f64) -> GeomResult<Path> {
        if points < 2 {
            return Err(GeomError::MalformedGeometry(format!(
                "a star needs at least 2 points, got {points}"
            )));
        }
        let count = points * 2;
        let step = 360.0 / count as f64;
        let vertices = (0..count).map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            center + DVec2::new(0.0, -radius).rotate_degrees(step * i as f64)
        });
        Ok(Path::from_points(vertices, true))
    }
}
