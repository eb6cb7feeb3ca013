//! SVG-style path data: parsing command strings into paths and exporting
//! paths back to strings.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::compound::CompoundPath;
use crate::error::{GeomError, GeomResult, PathDataError};
use crate::path::Path;
use crate::path_item::PathItem;
use crate::primitives::Point;
use crate::segment::Segment;

/// One drawing command with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    QuadTo(Point, Point),
    Close,
}

/// Number formatting for exported path data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathDataFormat {
    /// Maximum number of fractional digits.
    pub precision: usize,
    /// Emit relative commands after the initial move.
    pub relative: bool,
}

impl Default for PathDataFormat {
    fn default() -> Self {
        Self {
            precision: 5,
            relative: false,
        }
    }
}

impl PathDataFormat {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }
}

// ============== Parsing ==============

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Next command letter, if the next token is one.
    fn command(&mut self) -> Option<char> {
        self.skip_separators();
        let b = *self.bytes.get(self.pos)?;
        if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            self.pos += 1;
            Some(b as char)
        } else {
            None
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
    }

    fn number(&mut self) -> Result<f64, PathDataError> {
        self.skip_separators();
        let start = self.pos;
        let mut end = start;
        let bytes = self.bytes;
        if matches!(bytes.get(end), Some(b'-' | b'+')) {
            end += 1;
        }
        let mut seen_dot = false;
        let mut digits = 0;
        while let Some(&b) = bytes.get(end) {
            if b.is_ascii_digit() {
                digits += 1;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            end += 1;
        }
        if digits == 0 {
            return Err(PathDataError::ExpectedNumber(start));
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
                exp_end += 1;
            }
            let exp_digits = bytes[exp_end.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if exp_digits > 0 {
                end = exp_end + exp_digits;
            }
        }
        let text = std::str::from_utf8(&bytes[start..end])
            .map_err(|_| PathDataError::ExpectedNumber(start))?;
        let value = text
            .parse::<f64>()
            .map_err(|_| PathDataError::ExpectedNumber(start))?;
        self.pos = end;
        Ok(value)
    }

    fn point(&mut self) -> Result<Point, PathDataError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(DVec2::new(x, y))
    }

    fn unexpected(&self) -> PathDataError {
        let rest = &self.bytes[self.pos..];
        let character = std::str::from_utf8(rest)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or('\u{FFFD}');
        PathDataError::UnexpectedCharacter {
            character,
            offset: self.pos,
        }
    }
}

/// Parses path data into absolute commands. Shorthand commands (`H`, `V`,
/// `S`, `T`) are expanded; quadratic commands stay quadratic.
pub fn parse(data: &str) -> Result<Vec<PathCommand>, PathDataError> {
    let mut lexer = Lexer::new(data);
    let mut commands = Vec::new();
    let mut current = DVec2::ZERO;
    let mut start = DVec2::ZERO;
    let mut has_current = false;
    // Reflection sources for the smooth shorthands.
    let mut last_cubic_control: Option<Point> = None;
    let mut last_quad_control: Option<Point> = None;

    while !lexer.at_end() {
        let Some(letter) = lexer.command() else {
            return Err(lexer.unexpected());
        };
        let relative = letter.is_ascii_lowercase();
        let upper = letter.to_ascii_uppercase();
        if !matches!(upper, 'M' | 'L' | 'H' | 'V' | 'C' | 'S' | 'Q' | 'T' | 'Z') {
            return Err(PathDataError::UnknownCommand(letter));
        }
        if upper != 'M' && !has_current {
            return Err(PathDataError::MissingMoveTo(letter));
        }
        let origin = |current: Point| if relative { current } else { DVec2::ZERO };

        if upper == 'Z' {
            commands.push(PathCommand::Close);
            current = start;
            last_cubic_control = None;
            last_quad_control = None;
            continue;
        }

        let mut first = true;
        loop {
            if !first && !lexer.at_number() {
                break;
            }
            match upper {
                'M' if first => {
                    let point = lexer.point()? + origin(current);
                    commands.push(PathCommand::MoveTo(point));
                    current = point;
                    start = point;
                    has_current = true;
                    last_cubic_control = None;
                    last_quad_control = None;
                }
                'M' | 'L' => {
                    let point = lexer.point()? + origin(current);
                    commands.push(PathCommand::LineTo(point));
                    current = point;
                    last_cubic_control = None;
                    last_quad_control = None;
                }
                'H' => {
                    let x = lexer.number()? + origin(current).x;
                    current = DVec2::new(x, current.y);
                    commands.push(PathCommand::LineTo(current));
                    last_cubic_control = None;
                    last_quad_control = None;
                }
                'V' => {
                    let y = lexer.number()? + origin(current).y;
                    current = DVec2::new(current.x, y);
                    commands.push(PathCommand::LineTo(current));
                    last_cubic_control = None;
                    last_quad_control = None;
                }
                'C' | 'S' => {
                    let base = origin(current);
                    let c1 = if upper == 'C' {
                        lexer.point()? + base
                    } else {
                        last_cubic_control.map_or(current, |control| current * 2.0 - control)
                    };
                    let c2 = lexer.point()? + base;
                    let to = lexer.point()? + base;
                    commands.push(PathCommand::CubicTo(c1, c2, to));
                    current = to;
                    last_cubic_control = Some(c2);
                    last_quad_control = None;
                }
                'Q' | 'T' => {
                    let base = origin(current);
                    let control = if upper == 'Q' {
                        lexer.point()? + base
                    } else {
                        last_quad_control.map_or(current, |control| current * 2.0 - control)
                    };
                    let to = lexer.point()? + base;
                    commands.push(PathCommand::QuadTo(control, to));
                    current = to;
                    last_quad_control = Some(control);
                    last_cubic_control = None;
                }
                _ => return Err(PathDataError::UnknownCommand(letter)),
            }
            first = false;
        }
    }
    Ok(commands)
}

/// Builds one path per subpath. A command after a close without a new
/// move starts a subpath at the closed subpath's start.
pub fn commands_to_paths(commands: &[PathCommand]) -> Vec<Path> {
    let mut paths: Vec<Path> = Vec::new();
    let mut current: Option<Path> = None;
    let mut start = DVec2::ZERO;
    for command in commands {
        match *command {
            PathCommand::MoveTo(point) => {
                if let Some(path) = current.take() {
                    paths.push(path);
                }
                start = point;
                current = Some(Path::from_points([point], false));
            }
            PathCommand::LineTo(point) => {
                let path = current.get_or_insert_with(|| Path::from_points([start], false));
                path.add(point);
            }
            PathCommand::CubicTo(c1, c2, to) => {
                let path = current.get_or_insert_with(|| Path::from_points([start], false));
                append_cubic(path, c1, c2, to);
            }
            PathCommand::QuadTo(control, to) => {
                let path = current.get_or_insert_with(|| Path::from_points([start], false));
                let from = path.last_segment().map_or(start, |segment| segment.point);
                let c1 = from + (control - from) * (2.0 / 3.0);
                let c2 = to + (control - to) * (2.0 / 3.0);
                append_cubic(path, c1, c2, to);
            }
            PathCommand::Close => {
                if let Some(mut path) = current.take() {
                    path.close_path(true);
                    paths.push(path);
                }
            }
        }
    }
    if let Some(path) = current {
        paths.push(path);
    }
    paths
}

fn append_cubic(path: &mut Path, c1: Point, c2: Point, to: Point) {
    let last = path.segment_count() - 1;
    if let Some(segment) = path.segment_mut(last) {
        segment.handle_out = c1 - segment.point;
    }
    path.add(Segment::new(to, c2 - to, DVec2::ZERO));
}

// ============== Export ==============

fn format_number(out: &mut String, value: f64, precision: usize) {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".into();
    }
    out.push_str(&text);
}

fn push_point(out: &mut String, point: Point, precision: usize) {
    format_number(out, point.x, precision);
    out.push(',');
    format_number(out, point.y, precision);
}

/// Writes the commands of one path to `out`.
fn write_path(out: &mut String, path: &Path, format: &PathDataFormat) {
    let Some(first) = path.first_segment() else {
        return;
    };
    let precision = format.precision;
    if !out.is_empty() {
        out.push(' ');
    }
    out.push('M');
    push_point(out, first.point, precision);
    let mut current = first.point;
    let count = path.curve_count();
    for (index, curve) in path.beziers().enumerate() {
        let closing = path.is_closed() && index + 1 == count;
        let base = if format.relative { current } else { DVec2::ZERO };
        if curve.has_handles() {
            out.push(if format.relative { 'c' } else { 'C' });
            push_point(out, curve.c1 - base, precision);
            out.push(' ');
            push_point(out, curve.c2 - base, precision);
            out.push(' ');
            push_point(out, curve.p2 - base, precision);
        } else if !closing {
            out.push(if format.relative { 'l' } else { 'L' });
            push_point(out, curve.p2 - base, precision);
        }
        current = curve.p2;
    }
    if path.is_closed() {
        out.push(if format.relative { 'z' } else { 'Z' });
    }
}

impl Path {
    /// Parses path data holding a single subpath.
    pub fn from_path_data(data: &str) -> GeomResult<Path> {
        let mut paths = commands_to_paths(&parse(data)?);
        match paths.len() {
            0 => Ok(Path::new()),
            1 => Ok(paths.remove(0)),
            n => Err(GeomError::UnsupportedOperation(format!(
                "path data holds {n} subpaths; parse it as a compound path"
            ))),
        }
    }

    /// Path data with the default format.
    pub fn path_data(&self) -> String {
        self.to_path_data(&PathDataFormat::default())
    }

    pub fn to_path_data(&self, format: &PathDataFormat) -> String {
        let mut out = String::new();
        write_path(&mut out, self, format);
        out
    }
}

impl CompoundPath {
    /// Parses path data, one child per subpath.
    pub fn from_path_data(data: &str) -> GeomResult<CompoundPath> {
        Ok(CompoundPath::from_paths(commands_to_paths(&parse(data)?)))
    }

    pub fn path_data(&self) -> String {
        self.to_path_data(&PathDataFormat::default())
    }

    pub fn to_path_data(&self, format: &PathDataFormat) -> String {
        let mut out = String::new();
        for child in self.children() {
            write_path(&mut out, child, format);
        }
        out
    }
}

impl PathItem {
    /// Parses path data into a path, or a compound path when it holds
    /// several subpaths.
    pub fn from_path_data(data: &str) -> GeomResult<PathItem> {
        let mut paths = commands_to_paths(&parse(data)?);
        if paths.len() == 1 {
            Ok(PathItem::Path(paths.remove(0)))
        } else {
            Ok(PathItem::Compound(CompoundPath::from_paths(paths)))
        }
    }

    pub fn path_data(&self) -> String {
        self.to_path_data(&PathDataFormat::default())
    }

    pub fn to_path_data(&self, format: &PathDataFormat) -> String {
        let mut out = String::new();
        for path in self.paths() {
            write_path(&mut out, path, format);
        }
        out
    }
}

/// Formats `value` the way exported path data does.
pub fn format_coordinate(value: f64, precision: usize) -> String {
    let mut out = String::new();
    format_number(&mut out, value, precision);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{PointExt, Rectangle};
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_absolute_and_relative() {
        let commands = parse("M10,10 l5 0 V20 h-5 z").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(DVec2::new(10.0, 10.0)),
                PathCommand::LineTo(DVec2::new(15.0, 10.0)),
                PathCommand::LineTo(DVec2::new(15.0, 20.0)),
                PathCommand::LineTo(DVec2::new(10.0, 20.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_parse_compact_numbers() {
        let commands = parse("M0-1.5.5,0L1e1,2E-1").unwrap();
        assert_eq!(commands[0], PathCommand::MoveTo(DVec2::new(0.0, -1.5)));
        assert_eq!(commands[1], PathCommand::LineTo(DVec2::new(0.5, 0.0)));
        assert_eq!(commands[2], PathCommand::LineTo(DVec2::new(10.0, 0.2)));
    }

    #[test]
    fn test_implicit_line_after_move() {
        let commands = parse("m1 1 2 2 3 3").unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2], PathCommand::LineTo(DVec2::new(6.0, 6.0)));
    }

    #[test]
    fn test_smooth_shorthands_reflect_controls() {
        let commands = parse("M0,0 C0,10 10,10 10,0 S20,-10 20,0 Q25,5 30,0 T40,0").unwrap();
        assert_eq!(
            commands[2],
            PathCommand::CubicTo(DVec2::new(10.0, -10.0), DVec2::new(20.0, -10.0), DVec2::new(20.0, 0.0))
        );
        assert_eq!(
            commands[4],
            PathCommand::QuadTo(DVec2::new(35.0, -5.0), DVec2::new(40.0, 0.0))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("L1,1"), Err(PathDataError::MissingMoveTo('L')));
        assert_eq!(parse("M0,0 A1,1"), Err(PathDataError::UnknownCommand('A')));
        assert_eq!(parse("M0,0 L1"), Err(PathDataError::ExpectedNumber(7)));
        assert!(matches!(
            parse("M0,0 #"),
            Err(PathDataError::UnexpectedCharacter { character: '#', offset: 5 })
        ));
    }

    #[test]
    fn test_subpaths_become_children() {
        let compound = CompoundPath::from_path_data("M0,0 L10,0 L10,10 Z M2,2 L4,2 L4,4 Z").unwrap();
        assert_eq!(compound.child_count(), 2);
        assert!(compound.children().iter().all(Path::is_closed));
        assert!(Path::from_path_data("M0,0 L1,1 M2,2 L3,3").is_err());
        let item = PathItem::from_path_data("M0,0 L1,1").unwrap();
        assert!(item.as_path().is_some());
    }

    #[test]
    fn test_close_joins_repeated_start() {
        let path = Path::from_path_data("M0,0 L10,0 L10,10 L0,0 Z").unwrap();
        assert!(path.is_closed());
        assert_eq!(path.segment_count(), 3);
    }

    #[test]
    fn test_export_rectangle() {
        let path = Path::rectangle(Rectangle::new(0.0, 0.0, 10.0, 5.5));
        assert_eq!(path.path_data(), "M0,5.5L0,0L10,0L10,5.5Z");
        let relative = path.to_path_data(&PathDataFormat::default().relative());
        assert_eq!(relative, "M0,5.5l0,-5.5l10,0l0,5.5z");
    }

    #[test]
    fn test_export_precision() {
        let path = Path::line(DVec2::new(1.0 / 3.0, -0.0000001), DVec2::new(2.0, 2.0));
        let data = path.to_path_data(&PathDataFormat::default().with_precision(2));
        assert_eq!(data, "M0.33,0L2,2");
        assert_eq!(format_coordinate(2.50, 3), "2.5");
    }

    #[test]
    fn test_round_trip_samples_match() {
        let mut original = Path::circle(DVec2::new(3.0, 4.0), 7.25);
        original.transform(&crate::primitives::Matrix::rotation(17.0));
        let format = PathDataFormat::default().with_precision(12);
        for data in [original.to_path_data(&format), original.to_path_data(&format.relative())] {
            let parsed = Path::from_path_data(&data).unwrap();
            assert_eq!(parsed.curve_count(), original.curve_count());
            for (a, b) in original.beziers().zip(parsed.beziers()) {
                for i in 0..=100 {
                    let t = i as f64 / 100.0;
                    assert!(a.point_at_time(t).is_close(b.point_at_time(t), 1e-6));
                }
            }
        }
    }

    #[test]
    fn test_quadratic_is_elevated() {
        let path = Path::from_path_data("M0,0 Q5,10 10,0").unwrap();
        let curve = path.bezier(0).unwrap();
        assert_relative_eq!(curve.point_at_time(0.5).y, 5.0, epsilon = 1e-12);
    }
}
