//! Subscriber lists keyed by event type
//!
//! Handlers run synchronously in registration order. A handler can stop
//! an event, which skips the remaining handlers and ends bubbling.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use quill_geom::Point;
use uuid::Uuid;

use crate::error::{SceneError, SceneResult};
use crate::hit_test::{HitOptions, HitResult};
use crate::scene::Scene;

/// Identifies a registered handler for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Rc<dyn Fn(&mut Event)>;

/// Event passed to handlers
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: String,
    pub point: Option<Point>,
    pub hit: Option<HitResult>,
    /// Item the event was first fired on
    pub target: Option<Uuid>,
    /// Item whose handlers are currently running
    pub current_target: Option<Uuid>,
    pub stopped: bool,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            point: None,
            hit: None,
            target: None,
            current_target: None,
            stopped: false,
        }
    }

    pub fn at(mut self, point: Point) -> Self {
        self.point = Some(point);
        self
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Handlers registered per event type
#[derive(Clone, Default)]
pub struct Emitter {
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(kind, list)| (kind.as_str(), list.len()))
            .collect();
        f.debug_struct("Emitter").field("handlers", &counts).finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`
    pub fn on(&mut self, kind: impl Into<String>, handler: impl Fn(&mut Event) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind.into()).or_default().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn off(&mut self, kind: &str, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(kind);
        }
        removed
    }

    /// Run the handlers for `event.kind` until one stops the event.
    /// Returns true if any handler ran.
    pub fn fire(&self, event: &mut Event) -> bool {
        let Some(list) = self.handlers.get(&event.kind) else {
            return false;
        };
        // Snapshot so handlers see a stable list
        let handlers: Vec<Handler> = list.iter().map(|(_, handler)| Rc::clone(handler)).collect();
        for handler in &handlers {
            handler(event);
            if event.stopped {
                break;
            }
        }
        !handlers.is_empty()
    }

    pub fn responds(&self, kind: &str) -> bool {
        self.handlers.get(kind).is_some_and(|list| !list.is_empty())
    }
}

impl Scene {
    /// Register a handler on an item
    pub fn on(
        &mut self,
        id: Uuid,
        kind: impl Into<String>,
        handler: impl Fn(&mut Event) + 'static,
    ) -> SceneResult<HandlerId> {
        if !self.contains_item(id) {
            return Err(SceneError::ItemNotFound(id));
        }
        Ok(self.emitters.entry(id).or_default().on(kind, handler))
    }

    /// Remove a handler from an item
    pub fn off(&mut self, id: Uuid, kind: &str, handler: HandlerId) -> bool {
        self.emitters.get_mut(&id).is_some_and(|emitter| emitter.off(kind, handler))
    }

    pub fn responds(&self, id: Uuid, kind: &str) -> bool {
        self.emitters.get(&id).is_some_and(|emitter| emitter.responds(kind))
    }

    /// Fire an event on an item and bubble it up through its ancestors
    /// until a handler stops it. Returns true if any handler ran.
    pub fn fire(&self, id: Uuid, event: &mut Event) -> bool {
        event.target.get_or_insert(id);
        let mut handled = false;
        let mut current = Some(id);
        while let Some(item_id) = current {
            event.current_target = Some(item_id);
            if let Some(emitter) = self.emitters.get(&item_id) {
                handled |= emitter.fire(event);
            }
            if event.stopped {
                break;
            }
            current = self.parent(item_id);
        }
        handled
    }

    /// Hit-test `point` and fire `kind` on the item that was hit
    pub fn fire_at(&self, kind: &str, point: Point, options: &HitOptions) -> Option<HitResult> {
        let hit = self.hit_test(point, options)?;
        let mut event = Event::new(kind).at(point);
        event.hit = Some(hit.clone());
        self.fire(hit.item, &mut event);
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_handlers_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::new();
        let first = Rc::clone(&log);
        emitter.on("click", move |_| first.borrow_mut().push(1));
        let second = Rc::clone(&log);
        let id = emitter.on("click", move |_| second.borrow_mut().push(2));
        assert!(emitter.responds("click"));
        assert!(!emitter.responds("drag"));

        assert!(emitter.fire(&mut Event::new("click")));
        assert_eq!(*log.borrow(), vec![1, 2]);

        assert!(emitter.off("click", id));
        assert!(!emitter.off("click", id));
        emitter.fire(&mut Event::new("click"));
        assert_eq!(*log.borrow(), vec![1, 2, 1]);
        assert!(!emitter.fire(&mut Event::new("drag")));
    }

    #[test]
    fn test_stop_skips_remaining_handlers() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::new();
        emitter.on("click", |event| event.stop());
        let counter = Rc::clone(&count);
        emitter.on("click", move |_| *counter.borrow_mut() += 1);
        let mut event = Event::new("click");
        emitter.fire(&mut event);
        assert!(event.stopped);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_scene_events_bubble() {
        use crate::item::Item;
        use quill_geom::Path;

        let mut scene = Scene::new();
        let layer = scene.add_layer("base");
        let a = scene.add_child(layer, Item::path(Path::new())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let on_item = Rc::clone(&seen);
        scene
            .on(a, "click", move |event| on_item.borrow_mut().push(event.current_target))
            .unwrap();
        let on_layer = Rc::clone(&seen);
        scene
            .on(layer, "click", move |event| on_layer.borrow_mut().push(event.current_target))
            .unwrap();

        let mut event = Event::new("click");
        assert!(scene.fire(a, &mut event));
        assert_eq!(*seen.borrow(), vec![Some(a), Some(layer)]);
        assert_eq!(event.target, Some(a));
        assert!(scene.on(uuid::Uuid::new_v4(), "click", |_| {}).is_err());
    }
}
