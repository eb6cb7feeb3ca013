//! Scene configuration
//!
//! Settings that can be serialized to and loaded from RON files. Every
//! section falls back to its defaults when missing.

use std::path::Path;

use quill_geom::{GeometryConfig, StrokeStyle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::hit_test::HitOptions;
use crate::item::Style;

/// Default hit-testing behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HitConfig {
    /// Options used when the caller does not pass any
    pub options: HitOptions,
}

/// Style given to newly created items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StyleConfig {
    pub stroke: StrokeStyle,
}

impl StyleConfig {
    pub fn to_style(&self) -> Style {
        Style {
            stroke: self.stroke,
            ..Style::default()
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SceneConfig {
    /// Hit-testing settings
    #[serde(default)]
    pub hit: HitConfig,
    /// Geometric tolerances
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Default style
    #[serde(default)]
    pub style: StyleConfig,
}

impl SceneConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ron(text: &str) -> SceneResult<Self> {
        ron::from_str(text).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    pub fn to_ron(&self) -> SceneResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        let config = Self::from_ron(&content)?;
        debug!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron()?).map_err(|e| SceneError::Io(e.to_string()))?;
        debug!("Saved scene config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_geom::StrokeJoin;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = SceneConfig::from_ron("(hit: (options: (tolerance: 2.5)))").unwrap();
        assert_eq!(config.hit.options.tolerance, 2.5);
        assert!(config.hit.options.fill);
        assert_eq!(config.geometry, GeometryConfig::default());
        assert_eq!(config.style, StyleConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        let mut config = SceneConfig::new();
        config.style.stroke = StrokeStyle::new(3.0).with_join(StrokeJoin::Round);
        config.geometry = config.geometry.with_geometric_epsilon(1e-6);
        config.save(&path).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.style.to_style().stroke.width, 3.0);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(SceneConfig::load("/nonexistent/scene.ron"), Err(SceneError::Io(_))));
        assert!(matches!(SceneConfig::from_ron("(hit: 3)"), Err(SceneError::Deserialize(_))));
    }
}
