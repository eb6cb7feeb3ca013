//! Transforms and cached bounds
//!
//! Local bounds are cached per item and kind. A change to an item drops
//! its entry and the entries of all its ancestors; global matrices are
//! cached per item and dropped for the changed item's whole subtree.

use std::collections::HashMap;

use quill_geom::{Matrix, Path, Point, Rectangle};
use uuid::Uuid;

use super::Scene;
use crate::error::{SceneError, SceneResult};
use crate::item::{Item, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum BoundsKind {
    Fill,
    Stroke,
    Handle,
}

#[derive(Debug, Clone, Default)]
pub(super) struct BoundsCache {
    local: HashMap<(Uuid, BoundsKind), Option<Rectangle>>,
    global_matrices: HashMap<Uuid, Matrix>,
}

impl BoundsCache {
    pub fn forget_bounds(&mut self, id: Uuid) {
        for kind in [BoundsKind::Fill, BoundsKind::Stroke, BoundsKind::Handle] {
            self.local.remove(&(id, kind));
        }
    }

    pub fn forget_matrix(&mut self, id: Uuid) {
        self.global_matrices.remove(&id);
    }
}

fn unite(a: Option<Rectangle>, b: Option<Rectangle>) -> Option<Rectangle> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.unite(&b)),
        (a, b) => a.or(b),
    }
}

impl Scene {
    // ============== Transforms ==============

    /// Replace an item's matrix
    pub fn set_matrix(&mut self, id: Uuid, matrix: Matrix) -> SceneResult<()> {
        self.update_item(id, |item| item.matrix = matrix)
    }

    /// Apply `matrix` after the item's current transform, in parent space
    pub fn transform(&mut self, id: Uuid, matrix: &Matrix) -> SceneResult<()> {
        self.update_item(id, |item| item.matrix = item.matrix.prepend(matrix))
    }

    pub fn translate(&mut self, id: Uuid, delta: Point) -> SceneResult<()> {
        self.transform(id, &Matrix::translation(delta))
    }

    /// Rotate by `degrees` around `center` in parent space, defaulting to
    /// the center of the item's bounds.
    pub fn rotate(&mut self, id: Uuid, degrees: f64, center: Option<Point>) -> SceneResult<()> {
        let center = self.pivot(id, center)?;
        self.transform(id, &Matrix::IDENTITY.rotate(degrees, center))
    }

    /// Scale around `center` in parent space, defaulting to the center of
    /// the item's bounds.
    pub fn scale(&mut self, id: Uuid, scale: Point, center: Option<Point>) -> SceneResult<()> {
        let center = self.pivot(id, center)?;
        self.transform(id, &Matrix::IDENTITY.scale_around(scale, center))
    }

    fn pivot(&self, id: Uuid, center: Option<Point>) -> SceneResult<Point> {
        let item = self.items.get(&id).ok_or(SceneError::ItemNotFound(id))?;
        Ok(center
            .or_else(|| self.bounds(id).map(|bounds| bounds.center()))
            .unwrap_or_else(|| item.matrix.translation_part()))
    }

    /// Composition of all matrices from the layer down to `id`
    pub fn global_matrix(&self, id: Uuid) -> Option<Matrix> {
        if let Some(matrix) = self.bounds_cache.borrow().global_matrices.get(&id) {
            return Some(*matrix);
        }
        let item = self.items.get(&id)?;
        let matrix = match self.parent.get(&id) {
            Some(parent_id) => self.global_matrix(*parent_id)?.append(&item.matrix),
            None => item.matrix,
        };
        self.bounds_cache.borrow_mut().global_matrices.insert(id, matrix);
        Some(matrix)
    }

    /// Convert a scene point into the item's own coordinates
    pub fn global_to_local(&self, id: Uuid, point: Point) -> Option<Point> {
        self.global_matrix(id)?.inverse_transform_point(point)
    }

    /// Convert a point in the item's own coordinates into scene coordinates
    pub fn local_to_global(&self, id: Uuid, point: Point) -> Option<Point> {
        Some(self.global_matrix(id)?.transform_point(point))
    }

    /// Bake an item's matrix into its geometry (or into its children for
    /// containers) and reset it to the identity. Shapes become paths.
    pub fn apply_matrix(&mut self, id: Uuid) -> SceneResult<()> {
        let item = self.items.get(&id).ok_or(SceneError::ItemNotFound(id))?;
        let matrix = item.matrix;
        if matrix.is_identity() {
            return Ok(());
        }
        if item.is_container() {
            for child_id in self.children.get(&id).cloned().unwrap_or_default() {
                self.update_item(child_id, |child| child.matrix = child.matrix.prepend(&matrix))?;
            }
        }
        self.update_item(id, |item| {
            match &mut item.kind {
                ItemKind::Path(path) => path.transform(&matrix),
                ItemKind::CompoundPath(compound) => compound.transform(&matrix),
                ItemKind::Shape(shape) => {
                    let mut path: Path = shape.to_path();
                    path.transform(&matrix);
                    item.kind = ItemKind::Path(path);
                }
                ItemKind::Group | ItemKind::Layer => {}
            }
            item.matrix = Matrix::IDENTITY;
        })
    }

    // ============== Bounds ==============

    /// Geometric bounds in parent space
    pub fn bounds(&self, id: Uuid) -> Option<Rectangle> {
        self.parent_space_bounds(id, BoundsKind::Fill)
    }

    /// Bounds including the stroke, in parent space
    pub fn stroke_bounds(&self, id: Uuid) -> Option<Rectangle> {
        self.parent_space_bounds(id, BoundsKind::Stroke)
    }

    /// Bounds including all handles, in parent space
    pub fn handle_bounds(&self, id: Uuid) -> Option<Rectangle> {
        self.parent_space_bounds(id, BoundsKind::Handle)
    }

    /// Geometric bounds in scene coordinates
    pub fn global_bounds(&self, id: Uuid) -> Option<Rectangle> {
        let local = self.local_bounds(id, BoundsKind::Fill)?;
        Some(self.global_matrix(id)?.transform_bounds(&local))
    }

    fn parent_space_bounds(&self, id: Uuid, kind: BoundsKind) -> Option<Rectangle> {
        let local = self.local_bounds(id, kind)?;
        Some(self.items.get(&id)?.matrix.transform_bounds(&local))
    }

    fn local_bounds(&self, id: Uuid, kind: BoundsKind) -> Option<Rectangle> {
        if let Some(bounds) = self.bounds_cache.borrow().local.get(&(id, kind)) {
            return *bounds;
        }
        let item = self.items.get(&id)?;
        let bounds = if item.is_container() {
            self.container_bounds(id, kind)
        } else {
            Self::leaf_bounds(item, kind)
        };
        self.bounds_cache.borrow_mut().local.insert((id, kind), bounds);
        bounds
    }

    fn leaf_bounds(item: &Item, kind: BoundsKind) -> Option<Rectangle> {
        let geometry = item.geometry()?;
        match kind {
            BoundsKind::Fill => geometry.bounds(),
            BoundsKind::Stroke if item.style.has_stroke() => geometry.stroke_bounds(&item.style.stroke),
            BoundsKind::Stroke => geometry.bounds(),
            BoundsKind::Handle => geometry.handle_bounds(),
        }
    }

    /// Union of the visible children's bounds; a clip mask alone defines
    /// the bounds of its group.
    fn container_bounds(&self, id: Uuid, kind: BoundsKind) -> Option<Rectangle> {
        let children = self.children.get(&id)?;
        let mask = children
            .iter()
            .find(|child| self.items.get(*child).is_some_and(|item| item.clip_mask));
        if let Some(mask) = mask {
            return self.parent_space_bounds(*mask, kind);
        }
        children
            .iter()
            .filter(|child| self.items.get(*child).is_some_and(|item| item.visible))
            .map(|child| self.parent_space_bounds(*child, kind))
            .fold(None, unite)
    }
}
