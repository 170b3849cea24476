//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides: `{"layout": {"groupSpacingY": 300}}` is a complete config.

use crate::error::ConfigError;
use crate::model::{FontName, Rgb};
use serde::{Deserialize, Serialize};

// ─── Typography rendering ────────────────────────────────────────────────

/// Settings for the instruction interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Name prefix marking containers owned by the interpreter. Every
    /// top-level frame starting with it is removed before a new render.
    pub container_prefix: String,

    /// Top-left corner of the container on the page.
    pub container_x: f32,
    pub container_y: f32,

    /// Container size used when the requested size is rejected.
    pub fallback_width: f32,
    pub fallback_height: f32,

    /// Container background.
    pub container_fill: Rgb,

    /// Face used when a node names no family or its font cannot be applied.
    pub fallback_font: FontName,

    /// Font size used when the requested size is missing or below 1.
    pub default_font_size: f32,

    /// Text fill when `style.color` is absent.
    pub default_text_color: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            container_prefix: "Design Container".into(),
            container_x: 100.0,
            container_y: 100.0,
            fallback_width: 800.0,
            fallback_height: 600.0,
            container_fill: Rgb::WHITE,
            fallback_font: FontName::new("Inter", "Regular"),
            default_font_size: 12.0,
            default_text_color: Rgb::BLACK,
        }
    }
}

// ─── Grouped frame layout ────────────────────────────────────────────────

/// Settings for the grouped frame layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Left margin for titles and the first frame of each row.
    pub start_x: f32,

    /// Cursor start on an empty page.
    pub empty_page_y: f32,

    /// Gap between the lowest existing node and the first title.
    pub below_content_gap: f32,

    /// Gap between the lowest edge of a group and the next title.
    pub group_spacing_y: f32,

    /// Gap between a title and the first row of frames.
    pub title_spacing_y: f32,

    /// Gaps between frames within a row and between rows.
    pub frame_spacing_x: f32,
    pub frame_spacing_y: f32,

    /// Fraction of the viewport width a row may use before wrapping.
    pub wrap_ratio: f32,

    /// Group title face and size.
    pub title_font: FontName,
    pub title_font_size: f32,

    /// Cosmetic frame styling.
    pub frame_fill: Rgb,
    pub frame_stroke: Rgb,
    pub frame_stroke_weight: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            empty_page_y: 100.0,
            below_content_gap: 150.0,
            group_spacing_y: 500.0,
            title_spacing_y: 70.0,
            frame_spacing_x: 40.0,
            frame_spacing_y: 40.0,
            wrap_ratio: 0.8,
            title_font: FontName::new("Inter", "Bold"),
            title_font_size: 80.0,
            frame_fill: Rgb::WHITE,
            frame_stroke: Rgb::new(0.8, 0.8, 0.8),
            frame_stroke_weight: 1.0,
        }
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub render: RenderConfig,
    pub layout: LayoutConfig,

    /// Upper bound for each font load and asset lookup. `None` waits
    /// indefinitely.
    pub host_timeout_ms: Option<u64>,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and check its invariants.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.wrap_ratio.is_nan() || self.layout.wrap_ratio <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "layout.wrapRatio",
                reason: format!("must be positive, got {}", self.layout.wrap_ratio),
            });
        }
        if self.render.default_font_size < 1.0 {
            return Err(ConfigError::Invalid {
                field: "render.defaultFontSize",
                reason: format!("must be at least 1, got {}", self.render.default_font_size),
            });
        }
        if self.render.fallback_width <= 0.0 || self.render.fallback_height <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "render.fallbackWidth/fallbackHeight",
                reason: "must be positive".into(),
            });
        }
        if self.render.container_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "render.containerPrefix",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            EngineConfig::from_json(r#"{"layout":{"groupSpacingY":300},"hostTimeoutMs":2500}"#)
                .unwrap();
        assert_eq!(config.layout.group_spacing_y, 300.0);
        assert_eq!(config.layout.frame_spacing_x, 40.0);
        assert_eq!(config.host_timeout_ms, Some(2500));
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"layout":{"wrapRatio":0}}"#),
            Err(ConfigError::Invalid { field: "layout.wrapRatio", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"render":{"defaultFontSize":0.5}}"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
