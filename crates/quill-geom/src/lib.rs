//! Quill Geometry
//!
//! Cubic Bezier path geometry for the Quill vector editor:
//! - Primitives: points, affine matrices and rectangles
//! - Bezier: single cubic curve math
//! - Path / CompoundPath: segment lists, construction and measurement
//! - Intersections and winding-number containment
//! - Boolean operations: unite, intersect, subtract, exclude, divide
//! - Path data: SVG-style command strings

pub mod bezier;
pub mod boolean;
pub mod compound;
pub mod config;
mod contour;
pub mod curve;
pub mod error;
mod intersection;
pub mod location;
pub mod numerical;
pub mod path;
pub mod path_data;
pub mod path_item;
pub mod primitives;
pub mod segment;
pub mod winding;

pub use bezier::Bezier;
pub use boolean::BooleanOp;
pub use compound::CompoundPath;
pub use config::GeometryConfig;
pub use curve::Curve;
pub use error::{GeomError, GeomResult, PathDataError};
pub use location::{CurveLocation, IntersectionKind};
pub use path::{Path, StrokeCap, StrokeJoin, StrokeStyle};
pub use path_data::{PathCommand, PathDataFormat};
pub use path_item::PathItem;
pub use primitives::{Matrix, Point, PointExt, Rectangle};
pub use segment::Segment;
pub use winding::{FillRule, Winding};
