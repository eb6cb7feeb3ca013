//! Pen-style path construction: `move_to`, `line_to`, curve and arc
//! commands that extend the path from its current end point.

use crate::bezier::line_distance;
use crate::error::{GeomError, GeomResult};
use crate::numerical::{EPSILON, GEOMETRIC_EPSILON, is_machine_zero};
use crate::primitives::{Point, PointExt};
use crate::segment::Segment;

use super::Path;

impl Path {
    /// Starts a new path at `point`. Only valid on an empty path.
    pub fn move_to(&mut self, point: Point) -> GeomResult<()> {
        if !self.is_empty() {
            return Err(GeomError::UnsupportedOperation(
                "move_to on a non-empty path; use a compound path for several contours".into(),
            ));
        }
        self.add(point);
        Ok(())
    }

    fn current_point(&self, command: &str) -> GeomResult<Point> {
        self.last_segment().map(|segment| segment.point).ok_or_else(|| {
            GeomError::UnsupportedOperation(format!("{command} requires a current point"))
        })
    }

    /// Adds a straight line to `point`.
    pub fn line_to(&mut self, point: Point) -> GeomResult<()> {
        self.current_point("line_to")?;
        self.add(point);
        Ok(())
    }

    /// Adds a line by a relative offset.
    pub fn line_by(&mut self, delta: Point) -> GeomResult<()> {
        let current = self.current_point("line_by")?;
        self.add(current + delta);
        Ok(())
    }

    /// Adds a cubic curve with absolute control points.
    pub fn cubic_curve_to(&mut self, handle1: Point, handle2: Point, to: Point) -> GeomResult<()> {
        let current = self.current_point("cubic_curve_to")?;
        let last = self.segments.len() - 1;
        self.segments[last].handle_out = handle1 - current;
        self.add(Segment::new(to, handle2 - to, Point::ZERO));
        Ok(())
    }

    /// Adds a cubic curve with control points relative to the current point.
    pub fn cubic_curve_by(&mut self, handle1: Point, handle2: Point, to: Point) -> GeomResult<()> {
        let current = self.current_point("cubic_curve_by")?;
        self.cubic_curve_to(current + handle1, current + handle2, current + to)
    }

    /// Adds a quadratic curve, elevated to a cubic.
    pub fn quadratic_curve_to(&mut self, handle: Point, to: Point) -> GeomResult<()> {
        let current = self.current_point("quadratic_curve_to")?;
        self.cubic_curve_to(
            current + (handle - current) * (2.0 / 3.0),
            to + (handle - to) * (2.0 / 3.0),
            to,
        )
    }

    /// Adds a curve that passes through `through` at curve time `time`
    /// and ends at `to`.
    pub fn curve_to(&mut self, through: Point, to: Point, time: f64) -> GeomResult<()> {
        let current = self.current_point("curve_to")?;
        let t = time;
        let t1 = 1.0 - t;
        let denominator = 2.0 * t * t1;
        if denominator.abs() < EPSILON {
            return Err(GeomError::MalformedGeometry(format!(
                "curve_to time must lie strictly inside (0, 1), got {t}"
            )));
        }
        // Quadratic control point that puts `through` at `t`.
        let handle = (through - current * (t1 * t1) - to * (t * t)) / denominator;
        self.quadratic_curve_to(handle, to)
    }

    /// Adds a circular arc from the current point through `through` to `to`.
    pub fn arc_to(&mut self, through: Point, to: Point) -> GeomResult<()> {
        let from = self.current_point("arc_to")?;
        let arc = Path::arc(from, through, to)?;
        let Some((first, rest)) = arc.segments.split_first() else {
            return Ok(());
        };
        let last = self.segments.len() - 1;
        self.segments[last].handle_out = first.handle_out;
        self.add_segments(rest.iter().copied());
        Ok(())
    }

    /// Closes the path. With `join`, a last segment that coincides with
    /// the first is merged into it.
    pub fn close_path(&mut self, join: bool) {
        if join && self.segments.len() > 1 {
            let n = self.segments.len();
            if self.segments[0].point.is_close(self.segments[n - 1].point, GEOMETRIC_EPSILON) {
                if let Some(last) = self.segments.pop() {
                    self.segments[0].handle_in = last.handle_in;
                    self.invalidate();
                }
            }
        }
        self.set_closed(true);
    }
}

impl Path {
    /// Circular arc from `from` through `through` to `to`, as an open path.
    ///
    /// Collinear points produce a straight line when `through` lies between
    /// the end points and an error otherwise.
    pub fn arc(from: Point, through: Point, to: Point) -> GeomResult<Path> {
        let line = (to - from).normalize_or_zero();
        let through_side = line_distance(from, to - from, through);
        let center = bisector_intersection(from, through, to).filter(|_| through_side > EPSILON);
        let Some(center) = center else {
            let t = (through - from).dot(line) / from.distance(to).max(EPSILON);
            if (0.0..=1.0).contains(&t) {
                return Ok(Path::from_points([from, to], false));
            }
            return Err(GeomError::MalformedGeometry(format!(
                "cannot draw an arc through collinear points {from}, {through}, {to}"
            )));
        };

        let vector = from - center;
        let radius = vector.length();
        let mut extent = vector.directed_angle(to - center);
        let through_angle = vector.directed_angle(through - center);
        // Sweep in the direction that passes through `through`.
        let sweeps_through = |extent: f64| {
            if extent >= 0.0 {
                (0.0..=extent).contains(&through_angle)
                    || (0.0..=extent).contains(&(through_angle + 360.0))
            } else {
                (extent..=0.0).contains(&through_angle)
                    || (extent..=0.0).contains(&(through_angle - 360.0))
            }
        };
        if !sweeps_through(extent) {
            extent += if extent < 0.0 { 360.0 } else { -360.0 };
        }
        Ok(arc_segments(center, radius, vector.angle_degrees(), extent, from, to))
    }
}

/// Builds an arc of `extent` degrees around `center`, starting at angle
/// `start`, using at most 90 degrees per cubic.
fn arc_segments(
    center: Point,
    radius: f64,
    start: f64,
    extent: f64,
    from: Point,
    to: Point,
) -> Path {
    let count = (extent.abs() / 90.0).ceil().max(1.0) as usize;
    let step = extent / count as f64;
    let half = step.to_radians() / 2.0;
    let z = 4.0 / 3.0 * half.sin() / (1.0 + half.cos());
    let mut segments = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let angle = start + step * i as f64;
        let vector = Point::new(radius, 0.0).rotate_degrees(angle);
        let tangent = Point::new(-vector.y, vector.x) * z;
        let point = if i == 0 {
            from
        } else if i == count {
            to
        } else {
            center + vector
        };
        let handle_in = if i > 0 { -tangent } else { Point::ZERO };
        let handle_out = if i < count { tangent } else { Point::ZERO };
        segments.push(Segment::new(point, handle_in, handle_out));
    }
    Path::from_segments(segments, false)
}

/// Center of the circle through three points: where the perpendicular
/// bisectors of the two chords meet.
fn bisector_intersection(a: Point, b: Point, c: Point) -> Option<Point> {
    let (m1, d1) = ((a + b) * 0.5, (b - a).perp());
    let (m2, d2) = ((b + c) * 0.5, (c - b).perp());
    let cross = d1.perp_dot(d2);
    if is_machine_zero(cross) {
        return None;
    }
    Some(m1 + d1 * (d2.perp_dot(m1 - m2) / cross))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;

    #[test]
    fn test_pen_commands() {
        let mut path = Path::new();
        path.move_to(DVec2::new(0.0, 0.0)).unwrap();
        path.line_to(DVec2::new(10.0, 0.0)).unwrap();
        path.line_by(DVec2::new(0.0, 10.0)).unwrap();
        path.cubic_curve_by(DVec2::new(0.0, 5.0), DVec2::new(-5.0, 10.0), DVec2::new(-10.0, 10.0))
            .unwrap();
        assert_eq!(path.segment_count(), 4);
        assert_eq!(path.segments()[2].handle_out, DVec2::new(0.0, 5.0));
        assert_eq!(path.segments()[3].handle_in, DVec2::new(5.0, 0.0));
        assert!(path.move_to(DVec2::ZERO).is_err());
    }

    #[test]
    fn test_commands_need_current_point() {
        let mut path = Path::new();
        assert!(path.line_to(DVec2::new(1.0, 1.0)).is_err());
        assert!(path.quadratic_curve_to(DVec2::ONE, DVec2::ONE).is_err());
    }

    #[test]
    fn test_curve_to_passes_through_point() {
        let mut path = Path::new();
        path.move_to(DVec2::new(0.0, 0.0)).unwrap();
        path.curve_to(DVec2::new(5.0, 5.0), DVec2::new(10.0, 0.0), 0.5).unwrap();
        let curve = path.bezier(0).unwrap();
        assert!(curve.point_at_time(0.5).is_close(DVec2::new(5.0, 5.0), 1e-9));
        assert!(path.curve_to(DVec2::ONE, DVec2::ONE, 0.0).is_err());
    }

    #[test]
    fn test_arc_through_point() {
        let arc = Path::arc(DVec2::new(-1.0, 0.0), DVec2::new(0.0, -1.0), DVec2::new(1.0, 0.0))
            .unwrap();
        assert_eq!(arc.segment_count(), 3);
        assert_relative_eq!(arc.length(), std::f64::consts::PI, epsilon = 1e-3);
        let mid = arc.point_at(arc.length() / 2.0).unwrap();
        assert!(mid.is_close(DVec2::new(0.0, -1.0), 1e-3));
        assert_eq!(arc.first_segment().unwrap().point, DVec2::new(-1.0, 0.0));
        assert_eq!(arc.last_segment().unwrap().point, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_arc_collinear_points() {
        let line = Path::arc(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0))
            .unwrap();
        assert_eq!(line.segment_count(), 2);
        assert!(Path::arc(DVec2::new(0.0, 0.0), DVec2::new(3.0, 0.0), DVec2::new(2.0, 0.0))
            .is_err());
    }

    #[test]
    fn test_close_path_joins_coincident_end() {
        let mut path = Path::new();
        path.move_to(DVec2::new(0.0, 0.0)).unwrap();
        path.line_to(DVec2::new(1.0, 0.0)).unwrap();
        path.line_to(DVec2::new(1.0, 1.0)).unwrap();
        path.line_to(DVec2::new(0.0, 0.0)).unwrap();
        path.close_path(true);
        assert!(path.is_closed());
        assert_eq!(path.segment_count(), 3);
    }
}
