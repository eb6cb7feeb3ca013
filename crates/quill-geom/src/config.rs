//! Geometry tolerances.
//!
//! The defaults are the tolerances every operation uses when called without
//! an explicit configuration. Callers that work at unusual scales can pass
//! their own values to the `*_with` variants of the length, intersection
//! and boolean entry points.

use serde::{Deserialize, Serialize};

use crate::numerical::{CURVETIME_EPSILON, GEOMETRIC_EPSILON};

/// Tolerances for curve math, intersection and boolean operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryConfig {
    /// Distance below which two points are considered identical.
    pub geometric_epsilon: f64,
    /// Curve-time distance below which two parameters are considered identical.
    pub curve_time_epsilon: f64,
    /// Relative tolerance of the adaptive arc-length integration.
    pub length_tolerance: f64,
    /// Maximum recursion depth of arc-length subdivision.
    pub max_subdivision_depth: u32,
    /// Upper bound on fat-line clipping calls per curve pair.
    pub max_clip_calls: u32,
}

impl GeometryConfig {
    /// The built-in tolerances.
    pub const DEFAULT: Self = Self {
        geometric_epsilon: GEOMETRIC_EPSILON,
        curve_time_epsilon: CURVETIME_EPSILON,
        length_tolerance: 1e-4,
        max_subdivision_depth: 12,
        max_clip_calls: 4096,
    };

    /// Sets the geometric tolerance.
    pub fn with_geometric_epsilon(mut self, epsilon: f64) -> Self {
        self.geometric_epsilon = epsilon;
        self
    }

    /// Sets the relative arc-length tolerance.
    pub fn with_length_tolerance(mut self, tolerance: f64) -> Self {
        self.length_tolerance = tolerance;
        self
    }

    /// Sets the fat-line clipping budget.
    pub fn with_max_clip_calls(mut self, calls: u32) -> Self {
        self.max_clip_calls = calls;
        self
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constant() {
        assert_eq!(GeometryConfig::default(), GeometryConfig::DEFAULT);
        assert_eq!(GeometryConfig::default().max_clip_calls, 4096);
    }

    #[test]
    fn test_builder_methods() {
        let config = GeometryConfig::default()
            .with_geometric_epsilon(1e-5)
            .with_length_tolerance(1e-6)
            .with_max_clip_calls(10);
        assert_eq!(config.geometric_epsilon, 1e-5);
        assert_eq!(config.length_tolerance, 1e-6);
        assert_eq!(config.max_clip_calls, 10);
    }
}
