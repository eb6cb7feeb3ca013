//! Value types: points, affine matrices and axis-aligned rectangles.

mod matrix;
mod point;
mod rectangle;

pub use matrix::{Decomposition, Matrix};
pub use point::{Point, PointExt};
pub use rectangle::Rectangle;
