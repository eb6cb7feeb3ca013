//! Project snapshots and explicit insertion context

use std::path::Path;

use quill_geom::{BooleanOp, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::hit_test::HitResult;
use crate::item::{Item, Style};
use crate::scene::Scene;

/// Target layer and style for newly created items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Context {
    pub layer: Uuid,
    pub style: Style,
}

impl Context {
    pub fn new(layer: Uuid, style: Style) -> Self {
        Self { layer, style }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Add `item` on top of the context layer. Items still carrying the
    /// default style take the context style; explicit styles are kept.
    pub fn insert(&self, scene: &mut Scene, item: Item) -> SceneResult<Uuid> {
        let item = if item.style == Style::default() {
            item.with_style(self.style)
        } else {
            item
        };
        scene.add_child(self.layer, item)
    }
}

/// A scene with its name, configuration and current style
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Snapshot format version
    pub version: u32,
    pub name: String,
    pub scene: Scene,
    /// Style applied by [`Context::insert`]
    pub current_style: Style,
    #[serde(default)]
    pub config: SceneConfig,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Project {
    /// Create a new empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, SceneConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: SceneConfig) -> Self {
        Self {
            version: 1,
            name: name.into(),
            scene: Scene::new(),
            current_style: config.style.to_style(),
            config,
        }
    }

    /// Context targeting the topmost layer, creating one if the scene
    /// has none
    pub fn context(&mut self) -> Context {
        let layer = match self.scene.layers().last() {
            Some(layer) => *layer,
            None => self.scene.add_layer("Layer 1"),
        };
        Context::new(layer, self.current_style)
    }

    /// Hit-test with the configured default options
    pub fn hit_test(&self, point: Point) -> Option<HitResult> {
        self.scene.hit_test(point, &self.config.hit.options)
    }

    /// Scene boolean with the configured geometric tolerances
    pub fn boolean(&mut self, op: BooleanOp, a: Uuid, b: Uuid, replace: bool) -> SceneResult<Uuid> {
        self.scene.boolean_with(op, a, b, replace, &self.config.geometry)
    }

    /// Save project to a file
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        std::fs::write(path, content).map_err(|e| SceneError::Io(e.to_string()))?;
        debug!("Saved project '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Serialize project to RON bytes
    pub fn to_bytes(&self) -> SceneResult<Vec<u8>> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load project from a file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| SceneError::Io(e.to_string()))?;
        let project = Self::load_from_bytes(&content)?;
        debug!("Loaded project '{}' from {}", project.name, path.display());
        Ok(project)
    }

    /// Load project from RON bytes
    pub fn load_from_bytes(data: &[u8]) -> SceneResult<Self> {
        let content = std::str::from_utf8(data).map_err(|e| SceneError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| SceneError::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use quill_geom::{Path as GeomPath, Rectangle};

    #[test]
    fn test_context_creates_layer_once() {
        let mut project = Project::new("demo");
        let first = project.context();
        let second = project.context();
        assert_eq!(first.layer, second.layer);
        assert_eq!(project.scene.layers().len(), 1);
    }

    #[test]
    fn test_context_applies_style() {
        let mut project = Project::new("demo");
        project.current_style = Style::fill([0.0, 0.5, 1.0, 1.0]);
        let context = project.context();
        let id = context
            .insert(&mut project.scene, Item::circle(DVec2::new(5.0, 5.0), 2.0))
            .unwrap();
        assert!(project.scene.item(id).unwrap().style.has_fill());
        let hit = project.hit_test(DVec2::new(5.0, 5.0)).unwrap();
        assert_eq!(hit.item, id);
    }

    #[test]
    fn test_context_keeps_explicit_style() {
        let mut project = Project::new("demo");
        project.current_style = Style::fill([0.0, 0.5, 1.0, 1.0]);
        let context = project.context();
        let outline = Style::stroke([0.0, 0.0, 0.0, 1.0], 4.0);
        let square = Item::path(GeomPath::rectangle(Rectangle::new(0.0, 0.0, 20.0, 20.0))).with_style(outline);
        let id = context.insert(&mut project.scene, square).unwrap();
        let style = project.scene.item(id).unwrap().style;
        assert_eq!(style, outline);
        assert!(!style.has_fill());
        assert!(style.has_stroke());
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut project = Project::new("demo");
        let context = project.context();
        let square = Item::path(GeomPath::rectangle(Rectangle::new(0.0, 0.0, 3.0, 3.0))).with_name("square");
        let id = context.insert(&mut project.scene, square).unwrap();

        let bytes = project.to_bytes().unwrap();
        let loaded = Project::load_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.scene.find_by_name("square"), Some(id));
        assert_eq!(loaded.scene.item(id), project.scene.item(id));
        assert!(Project::load_from_bytes(b"not ron").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.ron");
        let mut project = Project::new("on disk");
        project.context();
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded.name, "on disk");
        assert_eq!(loaded.scene.layers(), project.scene.layers());
    }
}
