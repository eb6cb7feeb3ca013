//! Quill Scene
//!
//! The item tree built on top of `quill-geom`:
//! - Item: groups, layers, shapes and paths with style and transform
//! - Scene: arena of items with cached structure, bounds and matrices
//! - Hit-testing against fill, stroke and control geometry
//! - Events: per-item subscriber lists fed by hit results
//! - Project: RON snapshots and the explicit insertion context

pub mod config;
pub mod error;
pub mod events;
pub mod item;
pub mod project;
pub mod scene;

pub use config::{HitConfig, SceneConfig, StyleConfig};
pub use error::{SceneError, SceneResult};
pub use events::{Emitter, Event, HandlerId};
pub use hit_test::{HitKind, HitOptions, HitResult};
pub use item::{Color, Item, ItemClass, ItemKind, Shape, Style};
pub use project::{Context, Project};
pub use scene::Scene;
