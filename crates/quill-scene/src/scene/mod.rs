//! Scene graph: an arena of items with ordered children and layers

mod bounds;
mod ops;
mod queries;
mod tree_cache;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{SceneError, SceneResult};
use crate::events::Emitter;
use crate::item::Item;

use bounds::BoundsCache;
use tree_cache::TreeCache;

/// Raw scene data for deserialization (used internally)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneData {
    items: HashMap<Uuid, Item>,
    children: HashMap<Uuid, Vec<Uuid>>,
    parent: HashMap<Uuid, Uuid>,
    layers: Vec<Uuid>,
}

/// Item tree. Layers are the roots; later siblings draw on top of
/// earlier ones.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(into = "SceneData")]
pub struct Scene {
    items: HashMap<Uuid, Item>,
    /// Children mapping: parent -> ordered children
    children: HashMap<Uuid, Vec<Uuid>>,
    /// Parent mapping: child -> parent
    parent: HashMap<Uuid, Uuid>,
    layers: Vec<Uuid>,
    /// Cached tree structure (interior mutability for lazy evaluation)
    cache: RefCell<TreeCache>,
    /// Cached local bounds and global matrices
    bounds_cache: RefCell<BoundsCache>,
    pub(crate) emitters: HashMap<Uuid, Emitter>,
}

impl From<Scene> for SceneData {
    fn from(scene: Scene) -> Self {
        Self {
            items: scene.items,
            children: scene.children,
            parent: scene.parent,
            layers: scene.layers,
        }
    }
}

impl From<SceneData> for Scene {
    fn from(data: SceneData) -> Self {
        Self {
            items: data.items,
            children: data.children,
            parent: data.parent,
            layers: data.layers,
            ..Self::default()
        }
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = SceneData::deserialize(deserializer)?;
        Ok(Scene::from(data))
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    // ============== Cache Management ==============

    /// Ensure the tree cache is valid, rebuilding if necessary
    pub(crate) fn ensure_cache_valid(&self) {
        let mut cache = self.cache.borrow_mut();
        if !cache.valid {
            cache.rebuild(&self.layers, &self.children);
        }
    }

    /// Drop cached bounds of `id` and its ancestors, and cached global
    /// matrices of `id` and its descendants.
    pub(crate) fn invalidate_item(&self, id: Uuid) {
        let mut bounds = self.bounds_cache.borrow_mut();
        let mut current = Some(id);
        while let Some(item_id) = current {
            bounds.forget_bounds(item_id);
            current = self.parent.get(&item_id).copied();
        }
        let mut pending = vec![id];
        while let Some(item_id) = pending.pop() {
            bounds.forget_matrix(item_id);
            if let Some(children) = self.children.get(&item_id) {
                pending.extend(children.iter().copied());
            }
        }
    }

    fn structure_changed(&self, parent: Option<Uuid>) {
        self.cache.borrow_mut().invalidate();
        if let Some(parent_id) = parent {
            self.invalidate_item(parent_id);
        }
    }

    // ============== Structure ==============

    /// Add an empty layer on top of the existing ones
    pub fn add_layer(&mut self, name: impl Into<String>) -> Uuid {
        let layer = Item::layer().with_name(name);
        let index = self.layers.len();
        self.attach(layer, None, index)
    }

    /// Append `item` as the topmost child of `parent`
    pub fn add_child(&mut self, parent: Uuid, item: Item) -> SceneResult<Uuid> {
        let index = self.children.get(&parent).map_or(0, Vec::len);
        self.insert_child(parent, index, item)
    }

    /// Insert `item` among the children of `parent` at `index` (clamped)
    pub fn insert_child(&mut self, parent: Uuid, index: usize, item: Item) -> SceneResult<Uuid> {
        self.check_container(parent)?;
        Ok(self.attach(item, Some(parent), index))
    }

    /// Insert `item` directly above `sibling`
    pub fn insert_above(&mut self, sibling: Uuid, item: Item) -> SceneResult<Uuid> {
        let (parent, index) = self.position(sibling)?;
        Ok(self.attach(item, parent, index + 1))
    }

    /// Insert `item` directly below `sibling`
    pub fn insert_below(&mut self, sibling: Uuid, item: Item) -> SceneResult<Uuid> {
        let (parent, index) = self.position(sibling)?;
        Ok(self.attach(item, parent, index))
    }

    /// Remove an item with all its descendants, returning the item
    pub fn remove(&mut self, id: Uuid) -> SceneResult<Item> {
        let (parent, _) = self.position(id)?;

        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            if let Some(children) = self.children.get(&to_remove[i]) {
                to_remove.extend(children.iter().copied());
            }
            i += 1;
        }

        self.detach(id, parent);
        let mut removed = None;
        for item_id in &to_remove {
            self.children.remove(item_id);
            self.parent.remove(item_id);
            self.emitters.remove(item_id);
            let item = self.items.remove(item_id);
            if *item_id == id {
                removed = item;
            }
        }
        {
            let mut bounds = self.bounds_cache.borrow_mut();
            for item_id in &to_remove {
                bounds.forget_bounds(*item_id);
                bounds.forget_matrix(*item_id);
            }
        }
        self.structure_changed(parent);
        debug!("Removed item {} with {} descendants", id, to_remove.len() - 1);
        removed.ok_or(SceneError::ItemNotFound(id))
    }

    /// Move an item under `new_parent` at `index` (topmost when None).
    /// The local matrix is kept as is.
    pub fn reparent(&mut self, id: Uuid, new_parent: Uuid, index: Option<usize>) -> SceneResult<()> {
        let (old_parent, _) = self.position(id)?;
        self.check_container(new_parent)?;
        if self.would_create_cycle(id, new_parent) {
            return Err(SceneError::WouldCreateCycle(id));
        }
        self.detach(id, old_parent);
        self.structure_changed(old_parent);
        let index = index.unwrap_or(usize::MAX);
        let siblings = self.children.entry(new_parent).or_default();
        siblings.insert(index.min(siblings.len()), id);
        self.parent.insert(id, new_parent);
        self.invalidate_item(id);
        self.structure_changed(Some(new_parent));
        debug!("Moved item {} under {}", id, new_parent);
        Ok(())
    }

    /// Move an item above all its siblings
    pub fn bring_to_front(&mut self, id: Uuid) -> SceneResult<()> {
        self.move_within_siblings(id, usize::MAX)
    }

    /// Move an item below all its siblings
    pub fn send_to_back(&mut self, id: Uuid) -> SceneResult<()> {
        self.move_within_siblings(id, 0)
    }

    /// Reverse the stacking order of a container's children
    pub fn reverse_children(&mut self, id: Uuid) -> SceneResult<()> {
        self.check_container(id)?;
        if let Some(children) = self.children.get_mut(&id) {
            children.reverse();
        }
        self.structure_changed(Some(id));
        Ok(())
    }

    /// Apply `f` to an item and invalidate what depends on it.
    /// The item id cannot be changed.
    pub fn update_item<R>(&mut self, id: Uuid, f: impl FnOnce(&mut Item) -> R) -> SceneResult<R> {
        let item = self.items.get_mut(&id).ok_or(SceneError::ItemNotFound(id))?;
        let result = f(item);
        item.id = id;
        self.invalidate_item(id);
        Ok(result)
    }

    // ============== Internal Helpers ==============

    fn check_container(&self, id: Uuid) -> SceneResult<()> {
        let item = self.items.get(&id).ok_or(SceneError::ItemNotFound(id))?;
        if item.is_container() {
            Ok(())
        } else {
            Err(SceneError::NotAContainer(id))
        }
    }

    /// Parent (None for layers) and index among siblings
    fn position(&self, id: Uuid) -> SceneResult<(Option<Uuid>, usize)> {
        if !self.items.contains_key(&id) {
            return Err(SceneError::ItemNotFound(id));
        }
        let parent = self.parent.get(&id).copied();
        let siblings = match parent {
            Some(parent_id) => self.children.get(&parent_id).map(Vec::as_slice).unwrap_or_default(),
            None => self.layers.as_slice(),
        };
        let index = siblings
            .iter()
            .position(|sibling| *sibling == id)
            .ok_or(SceneError::ItemNotFound(id))?;
        Ok((parent, index))
    }

    fn attach(&mut self, item: Item, parent: Option<Uuid>, index: usize) -> Uuid {
        let id = item.id;
        self.items.insert(id, item);
        let siblings = match parent {
            Some(parent_id) => {
                self.parent.insert(id, parent_id);
                self.children.entry(parent_id).or_default()
            }
            None => &mut self.layers,
        };
        siblings.insert(index.min(siblings.len()), id);
        self.structure_changed(parent);
        debug!("Added item {} at index {}", id, index);
        id
    }

    fn detach(&mut self, id: Uuid, parent: Option<Uuid>) {
        match parent {
            Some(parent_id) => {
                if let Some(children) = self.children.get_mut(&parent_id) {
                    children.retain(|child| *child != id);
                }
                self.parent.remove(&id);
            }
            None => self.layers.retain(|layer| *layer != id),
        }
    }

    fn move_within_siblings(&mut self, id: Uuid, index: usize) -> SceneResult<()> {
        let (parent, current) = self.position(id)?;
        let siblings = match parent {
            Some(parent_id) => self.children.entry(parent_id).or_default(),
            None => &mut self.layers,
        };
        siblings.remove(current);
        siblings.insert(index.min(siblings.len()), id);
        self.structure_changed(parent);
        Ok(())
    }

    /// Check if moving `id` under `new_parent` would create a cycle
    fn would_create_cycle(&self, id: Uuid, new_parent: Uuid) -> bool {
        let mut current = Some(new_parent);
        while let Some(item_id) = current {
            if item_id == id {
                return true;
            }
            current = self.parent.get(&item_id).copied();
        }
        false
    }
}
