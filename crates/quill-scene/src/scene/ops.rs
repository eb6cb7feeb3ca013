//! Boolean operations between scene items

use quill_geom::boolean::{boolean_with, divide_with};
use quill_geom::{BooleanOp, GeometryConfig, Matrix, PathItem};
use tracing::debug;
use uuid::Uuid;

use super::Scene;
use crate::error::{SceneError, SceneResult};
use crate::item::Item;

impl Scene {
    /// Outline of `id` expressed in the coordinates of `space`'s parent
    fn outline_in_parent_of(&self, id: Uuid, space: Uuid) -> SceneResult<PathItem> {
        let item = self.items.get(&id).ok_or(SceneError::ItemNotFound(id))?;
        let mut outline = item.geometry().ok_or(SceneError::NotAPath(id))?;
        let to_scene = self.global_matrix(id).ok_or(SceneError::ItemNotFound(id))?;
        let from_scene = match self.parent(space) {
            Some(parent_id) => self
                .global_matrix(parent_id)
                .and_then(|matrix| matrix.inverted())
                .unwrap_or(Matrix::IDENTITY),
            None => Matrix::IDENTITY,
        };
        outline.transform(&from_scene.append(&to_scene));
        Ok(outline)
    }

    /// Combine two items and insert the result directly above `a`, with
    /// `a`'s style. With `replace`, both inputs are removed.
    pub fn boolean(&mut self, op: BooleanOp, a: Uuid, b: Uuid, replace: bool) -> SceneResult<Uuid> {
        self.boolean_with(op, a, b, replace, &GeometryConfig::DEFAULT)
    }

    pub fn boolean_with(
        &mut self,
        op: BooleanOp,
        a: Uuid,
        b: Uuid,
        replace: bool,
        config: &GeometryConfig,
    ) -> SceneResult<Uuid> {
        let outline_a = self.outline_in_parent_of(a, a)?;
        let outline_b = self.outline_in_parent_of(b, a)?;
        let result = boolean_with(&outline_a, &outline_b, op, config)?;
        let style = self.items.get(&a).map(|item| item.style).unwrap_or_default();
        let id = self.insert_above(a, Item::path_item(result).with_style(style))?;
        debug!("Inserted {} of {} and {} as {}", op, a, b, id);
        if replace {
            self.remove(a)?;
            self.remove(b)?;
        }
        Ok(id)
    }

    /// Split two items along their intersections into a new group above
    /// `a`, one child per piece. With `replace`, both inputs are removed.
    pub fn divide(&mut self, a: Uuid, b: Uuid, replace: bool) -> SceneResult<Uuid> {
        let outline_a = self.outline_in_parent_of(a, a)?;
        let outline_b = self.outline_in_parent_of(b, a)?;
        let pieces = divide_with(&outline_a, &outline_b, &GeometryConfig::DEFAULT)?;
        let style = self.items.get(&a).map(|item| item.style).unwrap_or_default();
        let group = self.insert_above(a, Item::group())?;
        for piece in pieces {
            self.add_child(group, Item::path_item(piece).with_style(style))?;
        }
        if replace {
            self.remove(a)?;
            self.remove(b)?;
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec2;
    use quill_geom::{Path, Rectangle};

    #[test]
    fn test_boolean_inserts_above_first_operand() {
        let mut scene = Scene::new();
        let layer = scene.add_layer("base");
        let a = scene
            .add_child(layer, Item::path(Path::rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0))))
            .unwrap();
        let b = scene.add_child(layer, Item::circle(DVec2::new(2.0, 2.0), 1.0)).unwrap();

        let result = scene.boolean(BooleanOp::Unite, a, b, false).unwrap();
        assert_eq!(scene.children(layer), &[a, result, b]);
        let area = scene.item(result).unwrap().geometry().unwrap().area();
        assert_relative_eq!(area, 4.0 + std::f64::consts::PI * 0.75, max_relative = 1e-2);

        let replaced = scene.boolean(BooleanOp::Intersect, a, b, true).unwrap();
        assert!(scene.item(a).is_none());
        assert!(scene.item(b).is_none());
        assert_eq!(scene.children(layer), &[replaced, result]);
    }

    #[test]
    fn test_boolean_uses_scene_coordinates() {
        let mut scene = Scene::new();
        let layer = scene.add_layer("base");
        let group = scene.add_child(layer, Item::group()).unwrap();
        scene.translate(group, DVec2::new(10.0, 0.0)).unwrap();
        let a = scene
            .add_child(group, Item::path(Path::rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0))))
            .unwrap();
        let b = scene
            .add_child(layer, Item::path(Path::rectangle(Rectangle::new(11.0, 0.0, 2.0, 2.0))))
            .unwrap();

        let result = scene.boolean(BooleanOp::Intersect, a, b, false).unwrap();
        assert_eq!(scene.parent(result), Some(group));
        let bounds = scene.global_bounds(result).unwrap();
        assert_relative_eq!(bounds.x, 11.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.width, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_groups_are_not_operands() {
        let mut scene = Scene::new();
        let layer = scene.add_layer("base");
        let group = scene.add_child(layer, Item::group()).unwrap();
        let a = scene.add_child(layer, Item::circle(DVec2::ZERO, 1.0)).unwrap();
        assert!(matches!(
            scene.boolean(BooleanOp::Unite, group, a, false),
            Err(SceneError::NotAPath(_))
        ));
    }

    #[test]
    fn test_divide_into_group() {
        let mut scene = Scene::new();
        let layer = scene.add_layer("base");
        let a = scene
            .add_child(layer, Item::path(Path::rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0))))
            .unwrap();
        let b = scene
            .add_child(layer, Item::path(Path::rectangle(Rectangle::new(1.0, 1.0, 2.0, 2.0))))
            .unwrap();
        let group = scene.divide(a, b, true).unwrap();
        assert_eq!(scene.children(group).len(), 3);
        assert_eq!(scene.children(layer), &[group]);
    }
}
