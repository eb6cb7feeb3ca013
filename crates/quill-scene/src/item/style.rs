//! Paint and stroke attributes carried by items

use quill_geom::{StrokeCap, StrokeJoin, StrokeStyle};
use serde::{Deserialize, Serialize};

/// Opaque RGBA paint. The scene never interprets it beyond presence.
pub type Color = [f32; 4];

/// Fill and stroke attributes of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke: StrokeStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            stroke: StrokeStyle::default(),
        }
    }
}

impl Style {
    /// Style with only a fill.
    pub fn fill(color: Color) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::default()
        }
    }

    /// Style with only a stroke of the given width.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            stroke_color: Some(color),
            stroke: StrokeStyle::new(width),
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, color: Option<Color>) -> Self {
        self.fill_color = color;
        self
    }

    pub fn with_stroke(mut self, color: Option<Color>) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke.width = width;
        self
    }

    pub fn with_stroke_join(mut self, join: StrokeJoin) -> Self {
        self.stroke.join = join;
        self
    }

    pub fn with_stroke_cap(mut self, cap: StrokeCap) -> Self {
        self.stroke.cap = cap;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.stroke.miter_limit = limit;
        self
    }

    pub fn has_fill(&self) -> bool {
        self.fill_color.is_some_and(|color| color[3] > 0.0)
    }

    /// True when a visible stroke with positive width is set.
    pub fn has_stroke(&self) -> bool {
        self.stroke_color.is_some_and(|color| color[3] > 0.0) && self.stroke.width > 0.0
    }
}
