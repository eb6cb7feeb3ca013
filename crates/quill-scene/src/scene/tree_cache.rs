//! Cached tree structure for efficient traversal

use std::collections::HashMap;
use uuid::Uuid;

/// Cached tree structure (computed on demand after structural changes)
#[derive(Debug, Clone, Default)]
pub(super) struct TreeCache {
    /// Depth of each item (layer = 0)
    pub depths: HashMap<Uuid, usize>,
    /// Chain from the layer down to each item, inclusive
    pub ancestors: HashMap<Uuid, Vec<Uuid>>,
    /// Descendants of each item in paint order
    pub descendants: HashMap<Uuid, Vec<Uuid>>,
    /// Every item in paint order (bottom first)
    pub paint_order: Vec<Uuid>,
    /// Whether cache is valid
    pub valid: bool,
}

impl TreeCache {
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn rebuild(&mut self, layers: &[Uuid], children: &HashMap<Uuid, Vec<Uuid>>) {
        self.depths.clear();
        self.ancestors.clear();
        self.descendants.clear();
        self.paint_order.clear();

        for &layer_id in layers {
            Self::build_recursive(self, children, layer_id, 0, vec![layer_id]);
        }

        // Paint order lists ancestors before descendants, so every chain
        // pushes in paint order too.
        for item_id in &self.paint_order {
            if let Some(chain) = self.ancestors.get(item_id) {
                for &ancestor_id in &chain[..chain.len() - 1] {
                    self.descendants.entry(ancestor_id).or_default().push(*item_id);
                }
            }
        }

        self.valid = true;
    }

    fn build_recursive(
        &mut self,
        children: &HashMap<Uuid, Vec<Uuid>>,
        item_id: Uuid,
        depth: usize,
        ancestor_chain: Vec<Uuid>,
    ) {
        self.depths.insert(item_id, depth);
        self.ancestors.insert(item_id, ancestor_chain.clone());
        self.paint_order.push(item_id);
        if let Some(child_list) = children.get(&item_id) {
            for child_id in child_list {
                let mut child_ancestors = ancestor_chain.clone();
                child_ancestors.push(*child_id);
                self.build_recursive(children, *child_id, depth + 1, child_ancestors);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_orders_and_chains() {
        let (layer, group, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut children = HashMap::new();
        children.insert(layer, vec![group, b]);
        children.insert(group, vec![a]);

        let mut cache = TreeCache::default();
        cache.rebuild(&[layer], &children);
        assert!(cache.valid);
        assert_eq!(cache.paint_order, vec![layer, group, a, b]);
        assert_eq!(cache.depths[&a], 2);
        assert_eq!(cache.ancestors[&a], vec![layer, group, a]);
        assert_eq!(cache.descendants[&layer], vec![group, a, b]);
        assert!(!cache.descendants.contains_key(&b));

        cache.invalidate();
        assert!(!cache.valid);
    }
}
