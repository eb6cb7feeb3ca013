//! Drawable items and their per-kind data

mod style;

use std::collections::BTreeMap;

use quill_geom::{CompoundPath, Matrix, Path, PathItem, Point, Rectangle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use style::{Color, Style};

/// Primitive shape, centered on the item's local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f64 },
    Rectangle { size: Point, radius: Point },
    Ellipse { radius: Point },
}

impl Shape {
    /// Outline of the shape as a closed path.
    pub fn to_path(&self) -> Path {
        match *self {
            Shape::Circle { radius } => Path::circle(Point::ZERO, radius),
            Shape::Rectangle { size, radius } => {
                let rect = Rectangle::new(-size.x / 2.0, -size.y / 2.0, size.x, size.y);
                if radius.x > 0.0 && radius.y > 0.0 {
                    Path::rounded_rectangle(rect, radius)
                } else {
                    Path::rectangle(rect)
                }
            }
            Shape::Ellipse { radius } => Path::ellipse(Point::ZERO, radius),
        }
    }
}

/// Per-kind item data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Group,
    Layer,
    Shape(Shape),
    Path(Path),
    CompoundPath(CompoundPath),
}

/// Item kinds without their data, used to filter queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemClass {
    Group,
    Layer,
    Shape,
    Path,
    CompoundPath,
}

/// A node of the scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: Option<String>,
    pub kind: ItemKind,
    /// Transform from item space to parent space
    #[serde(default)]
    pub matrix: Matrix,
    #[serde(default)]
    pub style: Style,
    pub visible: bool,
    pub locked: bool,
    pub selected: bool,
    /// Guides are skipped by hit-testing unless asked for
    pub guide: bool,
    /// The first child of a group with this flag clips its siblings
    pub clip_mask: bool,
    /// Free-form user data
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Item {
    /// Create an item of the given kind with default attributes
    pub fn new(kind: ItemKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            kind,
            matrix: Matrix::IDENTITY,
            style: Style::default(),
            visible: true,
            locked: false,
            selected: false,
            guide: false,
            clip_mask: false,
            data: BTreeMap::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(ItemKind::Group)
    }

    pub fn layer() -> Self {
        Self::new(ItemKind::Layer)
    }

    pub fn path(path: Path) -> Self {
        Self::new(ItemKind::Path(path))
    }

    pub fn compound_path(compound: CompoundPath) -> Self {
        Self::new(ItemKind::CompoundPath(compound))
    }

    /// Path or compound path item holding `item`.
    pub fn path_item(item: PathItem) -> Self {
        match item {
            PathItem::Path(path) => Self::path(path),
            PathItem::Compound(compound) => Self::compound_path(compound),
        }
    }

    /// Circle centered at `center`, placed through the item matrix.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(ItemKind::Shape(Shape::Circle { radius })).with_matrix(Matrix::translation(center))
    }

    pub fn rectangle(rect: Rectangle) -> Self {
        Self::new(ItemKind::Shape(Shape::Rectangle {
            size: rect.size(),
            radius: Point::ZERO,
        }))
        .with_matrix(Matrix::translation(rect.center()))
    }

    pub fn ellipse(center: Point, radius: Point) -> Self {
        Self::new(ItemKind::Shape(Shape::Ellipse { radius })).with_matrix(Matrix::translation(center))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn class(&self) -> ItemClass {
        match self.kind {
            ItemKind::Group => ItemClass::Group,
            ItemKind::Layer => ItemClass::Layer,
            ItemKind::Shape(_) => ItemClass::Shape,
            ItemKind::Path(_) => ItemClass::Path,
            ItemKind::CompoundPath(_) => ItemClass::CompoundPath,
        }
    }

    /// Groups and layers hold children; everything else is a leaf.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ItemKind::Group | ItemKind::Layer)
    }

    /// Outline in item space, for the kinds that have one.
    pub fn geometry(&self) -> Option<PathItem> {
        match &self.kind {
            ItemKind::Shape(shape) => Some(PathItem::Path(shape.to_path())),
            ItemKind::Path(path) => Some(PathItem::Path(path.clone())),
            ItemKind::CompoundPath(compound) => Some(PathItem::Compound(compound.clone())),
            ItemKind::Group | ItemKind::Layer => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;

    #[test]
    fn test_shape_outlines() {
        let circle = Item::circle(DVec2::new(5.0, 5.0), 2.0);
        let outline = circle.geometry().unwrap();
        let bounds = outline.bounds().unwrap();
        assert_relative_eq!(bounds.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.width, 4.0, epsilon = 1e-12);
        assert_eq!(circle.matrix.translation_part(), DVec2::new(5.0, 5.0));

        let rect = Item::rectangle(Rectangle::new(10.0, 20.0, 4.0, 2.0));
        let outline = rect.geometry().unwrap();
        assert_relative_eq!(outline.area(), 8.0, epsilon = 1e-12);
        assert_eq!(rect.matrix.translation_part(), DVec2::new(12.0, 21.0));
    }

    #[test]
    fn test_classes() {
        assert!(Item::group().is_container());
        assert!(Item::layer().is_container());
        let path = Item::path(Path::new());
        assert!(!path.is_container());
        assert_eq!(path.class(), ItemClass::Path);
        assert!(Item::group().geometry().is_none());
    }
}
