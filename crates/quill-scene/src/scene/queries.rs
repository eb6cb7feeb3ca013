//! Query methods for Scene

use uuid::Uuid;

use super::Scene;
use crate::item::Item;

impl Scene {
    // ============== Query Helpers ==============

    /// Get an item by ID
    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn contains_item(&self, id: Uuid) -> bool {
        self.items.contains_key(&id)
    }

    /// Count all items, layers included
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Root layers, bottom first
    pub fn layers(&self) -> &[Uuid] {
        &self.layers
    }

    /// Direct children, bottom first
    pub fn children(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn parent(&self, id: Uuid) -> Option<Uuid> {
        self.parent.get(&id).copied()
    }

    /// Index among siblings (layers index among layers)
    pub fn index(&self, id: Uuid) -> Option<usize> {
        self.siblings(id)?.iter().position(|sibling| *sibling == id)
    }

    /// The sibling drawn directly above
    pub fn next_sibling(&self, id: Uuid) -> Option<Uuid> {
        let index = self.index(id)?;
        self.siblings(id)?.get(index + 1).copied()
    }

    /// The sibling drawn directly below
    pub fn previous_sibling(&self, id: Uuid) -> Option<Uuid> {
        let index = self.index(id)?.checked_sub(1)?;
        self.siblings(id)?.get(index).copied()
    }

    fn siblings(&self, id: Uuid) -> Option<&[Uuid]> {
        if !self.items.contains_key(&id) {
            return None;
        }
        match self.parent.get(&id) {
            Some(parent_id) => Some(self.children(*parent_id)),
            None => Some(&self.layers),
        }
    }

    /// Check if an item is a strict ancestor of another
    pub fn is_ancestor(&self, ancestor_id: Uuid, descendant_id: Uuid) -> bool {
        if ancestor_id == descendant_id {
            return false;
        }
        self.ensure_cache_valid();
        self.cache
            .borrow()
            .ancestors
            .get(&descendant_id)
            .is_some_and(|chain| chain.contains(&ancestor_id))
    }

    /// Check if an item is a strict descendant of another
    pub fn is_descendant(&self, descendant_id: Uuid, ancestor_id: Uuid) -> bool {
        self.is_ancestor(ancestor_id, descendant_id)
    }

    /// Depth below the layers (layer = 0)
    pub fn depth(&self, id: Uuid) -> Option<usize> {
        self.ensure_cache_valid();
        self.cache.borrow().depths.get(&id).copied()
    }

    /// All descendants in paint order
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        self.ensure_cache_valid();
        self.cache
            .borrow()
            .descendants
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every item in paint order, bottom first
    pub fn paint_order(&self) -> Vec<Uuid> {
        self.ensure_cache_valid();
        self.cache.borrow().paint_order.clone()
    }

    // ============== Extended Query API ==============

    /// Items matching a predicate, in paint order
    pub fn items_matching<F>(&self, predicate: F) -> Vec<Uuid>
    where
        F: Fn(&Item) -> bool,
    {
        self.paint_order()
            .into_iter()
            .filter(|id| self.items.get(id).is_some_and(&predicate))
            .collect()
    }

    /// First item with the given name, in paint order
    pub fn find_by_name(&self, name: &str) -> Option<Uuid> {
        self.items_matching(|item| item.name.as_deref() == Some(name))
            .into_iter()
            .next()
    }

    pub fn select_all(&mut self) {
        for item in self.items.values_mut() {
            item.selected = true;
        }
    }

    pub fn deselect_all(&mut self) {
        for item in self.items.values_mut() {
            item.selected = false;
        }
    }

    /// Selected items, in paint order
    pub fn selected_items(&self) -> Vec<Uuid> {
        self.items_matching(|item| item.selected)
    }
}
