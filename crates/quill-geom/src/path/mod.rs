//! Paths: ordered segments forming one open or closed contour.

mod build;
mod fit;
mod query;
mod shapes;
pub(crate) mod stroke;

use std::cell::OnceCell;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bezier::Bezier;
use crate::curve::Curve;
use crate::error::{GeomError, GeomResult};
use crate::location::CurveLocation;
use crate::numerical::CURVETIME_EPSILON;
use crate::primitives::{Matrix, Point, PointExt, Rectangle};
use crate::segment::Segment;
use crate::winding::FillRule;

pub use stroke::{StrokeCap, StrokeJoin, StrokeStyle};

/// An ordered sequence of segments forming one contour.
///
/// When the path is closed the curve from the last segment back to the
/// first is implicit and included in every curve-indexed query. Curves are
/// views computed from pairs of segments; borrowing one keeps the path
/// immutable until the view is dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<Segment>,
    closed: bool,
    #[serde(default)]
    fill_rule: FillRule,
    #[serde(skip)]
    bounds_cache: OnceCell<Option<Rectangle>>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
            && self.closed == other.closed
            && self.fill_rule == other.fill_rule
    }
}

impl Path {
    /// Creates an empty open path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from segments.
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>, closed: bool) -> Self {
        Self {
            segments: segments.into_iter().collect(),
            closed,
            ..Self::default()
        }
    }

    /// Creates a polyline or polygon through `points`.
    pub fn from_points(points: impl IntoIterator<Item = Point>, closed: bool) -> Self {
        Self::from_segments(points.into_iter().map(Segment::corner), closed)
    }

    /// Sets the fill rule, builder style.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    fn invalidate(&mut self) {
        self.bounds_cache = OnceCell::new();
    }

    // ============== Segments ==============

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Mutable access to one segment. Invalidates cached bounds.
    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.invalidate();
        self.segments.get_mut(index)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Index of the segment after `index`, wrapping on closed paths.
    pub fn next_segment_index(&self, index: usize) -> Option<usize> {
        if index + 1 < self.segments.len() {
            Some(index + 1)
        } else if self.closed && index < self.segments.len() {
            Some(0)
        } else {
            None
        }
    }

    /// Index of the segment before `index`, wrapping on closed paths.
    pub fn previous_segment_index(&self, index: usize) -> Option<usize> {
        if index >= self.segments.len() {
            None
        } else if index > 0 {
            Some(index - 1)
        } else if self.closed {
            Some(self.segments.len() - 1)
        } else {
            None
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.closed = closed;
            self.invalidate();
        }
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    // ============== Curves ==============

    /// Number of curves, including the closing curve of a closed path.
    pub fn curve_count(&self) -> usize {
        match self.segments.len() {
            0 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// View of the curve starting at segment `index`.
    pub fn curve(&self, index: usize) -> Option<Curve<'_>> {
        (index < self.curve_count()).then(|| Curve::new(self, index))
    }

    /// All curves in order.
    pub fn curves(&self) -> impl Iterator<Item = Curve<'_>> + '_ {
        (0..self.curve_count()).map(move |index| Curve::new(self, index))
    }

    /// Absolute control points of curve `index`.
    pub fn bezier(&self, index: usize) -> Option<Bezier> {
        if index >= self.curve_count() {
            return None;
        }
        let s1 = &self.segments[index];
        let s2 = &self.segments[(index + 1) % self.segments.len()];
        Some(Bezier::new(
            s1.point,
            s1.handle_out_point(),
            s2.handle_in_point(),
            s2.point,
        ))
    }

    /// Absolute control points of every curve.
    pub fn beziers(&self) -> impl Iterator<Item = Bezier> + '_ {
        (0..self.curve_count()).filter_map(move |index| self.bezier(index))
    }

    // ============== Editing ==============

    /// Appends a segment and returns its index.
    pub fn add(&mut self, segment: impl Into<Segment>) -> usize {
        self.segments.push(segment.into());
        self.invalidate();
        self.segments.len() - 1
    }

    /// Inserts a segment at `index`.
    pub fn insert(&mut self, index: usize, segment: impl Into<Segment>) -> GeomResult<()> {
        if index > self.segments.len() {
            return Err(GeomError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.segments.insert(index, segment.into());
        self.invalidate();
        Ok(())
    }

    /// Appends several segments.
    pub fn add_segments(&mut self, segments: impl IntoIterator<Item = Segment>) {
        self.segments.extend(segments);
        self.invalidate();
    }

    /// Inserts several segments starting at `index`.
    pub fn insert_segments(
        &mut self,
        index: usize,
        segments: impl IntoIterator<Item = Segment>,
    ) -> GeomResult<()> {
        if index > self.segments.len() {
            return Err(GeomError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.segments.splice(index..index, segments);
        self.invalidate();
        Ok(())
    }

    /// Removes and returns the segment at `index`.
    pub fn remove_segment(&mut self, index: usize) -> GeomResult<Segment> {
        if index >= self.segments.len() {
            return Err(GeomError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.invalidate();
        Ok(self.segments.remove(index))
    }

    /// Removes and returns the segments in `range`.
    pub fn remove_segments(&mut self, range: Range<usize>) -> GeomResult<Vec<Segment>> {
        if range.start > range.end || range.end > self.segments.len() {
            return Err(GeomError::IndexOutOfRange {
                index: range.end,
                len: self.segments.len(),
            });
        }
        self.invalidate();
        Ok(self.segments.drain(range).collect())
    }

    /// Removes all segments.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.invalidate();
    }

    /// Reverses the direction of the path.
    pub fn reverse(&mut self) {
        self.segments.reverse();
        for segment in &mut self.segments {
            segment.reverse();
        }
        self.invalidate();
    }

    /// Transforms all segments by `matrix`.
    pub fn transform(&mut self, matrix: &Matrix) {
        if matrix.is_identity() {
            return;
        }
        for segment in &mut self.segments {
            segment.transform(matrix);
        }
        self.invalidate();
    }

    /// Moves the path by `delta`.
    pub fn translate(&mut self, delta: Point) {
        self.transform(&Matrix::translation(delta));
    }

    /// Joins `other` onto this path where their end points meet within
    /// `tolerance`, reversing `other` if needed. Unconnected paths are
    /// appended. The result is closed when its two ends meet.
    pub fn join(&mut self, other: &Path, tolerance: f64) {
        let mut incoming = other.segments.clone();
        if incoming.is_empty() {
            return;
        }
        self.invalidate();
        if self.segments.is_empty() {
            self.segments = incoming;
            return;
        }
        let first = self.segments[0].point;
        let last = self.segments[self.segments.len() - 1].point;
        let other_first = incoming[0].point;
        let other_last = incoming[incoming.len() - 1].point;

        if last.is_close(other_last, tolerance)
            || (first.is_close(other_first, tolerance) && !last.is_close(other_first, tolerance))
        {
            incoming.reverse();
            for segment in &mut incoming {
                segment.reverse();
            }
        }
        let other_first = incoming[0].point;
        let other_last = incoming[incoming.len() - 1].point;

        if last.is_close(other_first, tolerance) {
            let joint = incoming.remove(0);
            if let Some(end) = self.segments.last_mut() {
                end.handle_out = joint.handle_out;
            }
            self.segments.extend(incoming);
        } else if first.is_close(other_last, tolerance) {
            if let Some(end) = incoming.last_mut() {
                end.handle_out = self.segments[0].handle_out;
            }
            incoming.extend(self.segments.drain(1..));
            self.segments = incoming;
        } else {
            self.segments.extend(incoming);
        }

        let n = self.segments.len();
        if n > 1 && self.segments[0].point.is_close(self.segments[n - 1].point, tolerance) {
            let end = self.segments.remove(n - 1);
            self.segments[0].handle_in = end.handle_in;
            self.closed = true;
        }
    }

    /// Splits curve `curve` at curve time `time` by inserting a segment.
    ///
    /// Returns the index of the new segment, or `None` when `time` falls on
    /// an existing segment.
    pub fn divide_at_time(&mut self, curve: usize, time: f64) -> GeomResult<Option<usize>> {
        let bezier = self.bezier(curve).ok_or(GeomError::IndexOutOfRange {
            index: curve,
            len: self.curve_count(),
        })?;
        if time <= CURVETIME_EPSILON || time >= 1.0 - CURVETIME_EPSILON {
            return Ok(None);
        }
        let (left, right) = bezier.split(time);
        let segment = if bezier.has_handles() {
            let next = (curve + 1) % self.segments.len();
            self.segments[curve].handle_out = left.c1 - left.p1;
            self.segments[next].handle_in = right.c2 - right.p2;
            Segment::new(left.p2, left.c2 - left.p2, right.c1 - right.p1)
        } else {
            Segment::corner(left.p2)
        };
        self.segments.insert(curve + 1, segment);
        self.invalidate();
        Ok(Some(curve + 1))
    }

    /// Splits the curve under `location` by inserting a segment.
    pub fn divide_at(&mut self, location: &CurveLocation) -> GeomResult<Option<usize>> {
        self.divide_at_time(location.curve_index(), location.time())
    }

    /// Splits the path at curve time `time` of curve `curve`.
    ///
    /// An open path keeps the part before the split and the part after it
    /// is returned as a new path. A closed path is opened at the split so
    /// that it starts and ends there, and `None` is returned.
    pub fn split_at_time(&mut self, curve: usize, time: f64) -> GeomResult<Option<Path>> {
        let count = self.curve_count();
        if curve >= count {
            return Err(GeomError::IndexOutOfRange {
                index: curve,
                len: count,
            });
        }
        let (mut index, mut time) = (curve, time);
        if time > 1.0 - CURVETIME_EPSILON {
            index += 1;
            time = 0.0;
        }
        if time >= CURVETIME_EPSILON && self.divide_at_time(index, time)?.is_some() {
            index += 1;
        }
        self.invalidate();
        let index = index % self.segments.len().max(1);
        let tail: Vec<Segment> = self.segments.drain(index..).collect();
        if self.closed {
            let head = std::mem::take(&mut self.segments);
            self.segments = tail;
            self.segments.extend(head);
            if let Some(first) = self.segments.first().copied() {
                self.segments.push(first);
            }
            self.closed = false;
            debug!("Opened closed path at segment {}", index);
            Ok(None)
        } else {
            if let Some(first) = tail.first().copied() {
                self.segments.push(first);
            }
            Ok(Some(Path::from_segments(tail, false).with_fill_rule(self.fill_rule)))
        }
    }

    /// Splits the path at `location`. See [`Path::split_at_time`].
    pub fn split_at(&mut self, location: &CurveLocation) -> GeomResult<Option<Path>> {
        self.split_at_time(location.curve_index(), location.time())
    }

    /// Removes curves without length, merging their end segments.
    pub fn reduce(&mut self, tolerance: f64) {
        let mut index = self.curve_count();
        while index > 0 {
            index -= 1;
            if self.segments.len() < 2 {
                break;
            }
            let Some(bezier) = self.bezier(index) else {
                continue;
            };
            if !bezier.has_length(tolerance) {
                let removed = (index + 1) % self.segments.len();
                let handle_out = self.segments[removed].handle_out;
                self.segments.remove(removed);
                let keep = if removed == 0 { self.segments.len() - 1 } else { index };
                self.segments[keep].handle_out = handle_out;
                index = index.min(self.curve_count());
            }
        }
        self.invalidate();
    }

    /// Splits the path into open pieces at the given `(curve, time)` cuts.
    /// Cuts on an existing segment split there without inserting one.
    pub(crate) fn pieces(&self, cuts: &[(usize, f64)]) -> Vec<Path> {
        let curves: Vec<Bezier> = self.beziers().collect();
        let count = curves.len();
        let mut cuts: Vec<(usize, f64)> = cuts
            .iter()
            .filter(|cut| cut.0 < count)
            .filter_map(|&(curve, time)| {
                if time > 1.0 - CURVETIME_EPSILON {
                    (self.closed || curve + 1 < count).then(|| ((curve + 1) % count, 0.0))
                } else if time < CURVETIME_EPSILON {
                    Some((curve, 0.0))
                } else {
                    Some((curve, time))
                }
            })
            .filter(|&cut| self.closed || cut != (0, 0.0))
            .collect();
        cuts.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        cuts.dedup_by(|a, b| a.0 == b.0 && (a.1 - b.1).abs() <= CURVETIME_EPSILON);
        if cuts.is_empty() {
            return vec![self.clone()];
        }

        // Each part remembers whether a cut precedes it.
        let mut parts: Vec<(bool, Bezier)> = Vec::new();
        for (index, bezier) in curves.iter().enumerate() {
            let part = |from: f64, to: f64| {
                let part = bezier.part(from, to);
                if bezier.has_handles() { part } else { Bezier::line(part.p1, part.p2) }
            };
            let mut from = 0.0;
            let mut cut_before = cuts.contains(&(index, 0.0));
            for &(_, time) in cuts.iter().filter(|c| c.0 == index && c.1 > 0.0) {
                parts.push((cut_before, part(from, time)));
                cut_before = true;
                from = time;
            }
            parts.push((cut_before, part(from, 1.0)));
        }
        if self.closed {
            if let Some(first) = parts.iter().position(|part| part.0) {
                parts.rotate_left(first);
            }
        }

        let mut pieces: Vec<Vec<Bezier>> = Vec::new();
        for (cut_before, bezier) in parts {
            match pieces.last_mut() {
                Some(piece) if !cut_before => piece.push(bezier),
                _ => pieces.push(vec![bezier]),
            }
        }
        pieces
            .into_iter()
            .map(|curves| {
                let segments = crate::contour::segments_from_curves(&curves, false);
                Path::from_segments(segments, false).with_fill_rule(self.fill_rule)
            })
            .collect()
    }
}
