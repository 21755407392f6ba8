//! The `Config` struct: every user preference of the tab counter.
//!
//! Field names serialise in camelCase so the keys match the flat
//! key/value names used by [`crate::PreferenceStore`] (`iconFont`,
//! `iconDimension`, ...).

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{ConfigError, Result};
use crate::types::{DisplayMode, IconColor, Scope, deserialize_lenient_u32};

/// Largest accepted icon edge in px.
pub const MAX_ICON_DIMENSION: u32 = 1024;

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Which tabs are counted.
    #[serde(default)]
    pub scope: Scope,

    /// Icon or badge presentation.
    #[serde(default)]
    pub display_mode: DisplayMode,

    // ========================================================================
    // Badge mode
    // ========================================================================
    /// Badge background colour.
    #[serde(default = "defaults::badge_bg")]
    pub badge_bg: IconColor,

    // ========================================================================
    // Icon mode
    // ========================================================================
    /// Icon canvas width and height in px.
    #[serde(
        default = "defaults::icon_dimension",
        deserialize_with = "deserialize_lenient_u32"
    )]
    pub icon_dimension: u32,

    /// Font family list, CSS style (`"Foo Sans", sans-serif`).
    #[serde(default = "defaults::icon_font")]
    pub icon_font: String,

    /// Glyph fill colour.
    #[serde(default = "defaults::icon_color")]
    pub icon_color: IconColor,

    /// Margin in percent of the icon height (0-100).
    #[serde(
        default = "defaults::icon_margin",
        deserialize_with = "deserialize_lenient_u32"
    )]
    pub icon_margin: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            display_mode: DisplayMode::default(),
            badge_bg: defaults::badge_bg(),
            icon_dimension: defaults::icon_dimension(),
            icon_font: defaults::icon_font(),
            icon_color: defaults::icon_color(),
            icon_margin: defaults::icon_margin(),
        }
    }
}

impl Config {
    /// Preference keys in declaration order.
    pub const KEYS: &'static [&'static str] = &[
        "scope",
        "displayMode",
        "badgeBg",
        "iconDimension",
        "iconFont",
        "iconColor",
        "iconMargin",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_icon_dimension(mut self, dimension: u32) -> Self {
        self.icon_dimension = dimension;
        self
    }

    pub fn with_icon_font(mut self, font: impl Into<String>) -> Self {
        self.icon_font = font.into();
        self
    }

    pub fn with_icon_color(mut self, color: IconColor) -> Self {
        self.icon_color = color;
        self
    }

    pub fn with_icon_margin(mut self, percent: u32) -> Self {
        self.icon_margin = percent;
        self
    }

    /// Margin as a fraction of the icon height, as consumed by the renderer.
    pub fn icon_margin_fraction(&self) -> f32 {
        self.icon_margin as f32 / 100.0
    }

    /// Check semantic constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.icon_dimension == 0 || self.icon_dimension > MAX_ICON_DIMENSION {
            return Err(ConfigError::Validation(format!(
                "iconDimension must be between 1 and {MAX_ICON_DIMENSION}, got {}",
                self.icon_dimension
            )));
        }
        if self.icon_margin > 100 {
            return Err(ConfigError::Validation(format!(
                "iconMargin is a percentage (0-100), got {}",
                self.icon_margin
            )));
        }
        if self.icon_font.trim().is_empty() {
            return Err(ConfigError::Validation(
                "iconFont must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Keys whose values differ between `self` and `other`.
    pub fn diff_keys(&self, other: &Config) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.scope != other.scope {
            keys.push("scope");
        }
        if self.display_mode != other.display_mode {
            keys.push("displayMode");
        }
        if self.badge_bg != other.badge_bg {
            keys.push("badgeBg");
        }
        if self.icon_dimension != other.icon_dimension {
            keys.push("iconDimension");
        }
        if self.icon_font != other.icon_font {
            keys.push("iconFont");
        }
        if self.icon_color != other.icon_color {
            keys.push("iconColor");
        }
        if self.icon_margin != other.icon_margin {
            keys.push("iconMargin");
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.icon_margin_fraction(), 0.05);
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let config = Config::new().with_icon_dimension(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_margin_over_100() {
        let config = Config::new().with_icon_margin(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_font() {
        let config = Config::new().with_icon_font("   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_diff_keys() {
        let a = Config::default();
        let b = a
            .clone()
            .with_icon_font("serif")
            .with_scope(Scope::Both);
        assert_eq!(a.diff_keys(&b), vec!["scope", "iconFont"]);
        assert!(a.diff_keys(&a.clone()).is_empty());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml_ng::from_str("iconDimension: \"64\"\n").unwrap();
        assert_eq!(config.icon_dimension, 64);
        assert_eq!(config.icon_font, "sans-serif");
        assert_eq!(config.scope, Scope::Window);
    }

    #[test]
    fn test_keys_match_serialized_fields() {
        let value = serde_json::to_value(Config::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), Config::KEYS.len());
        for key in Config::KEYS {
            assert!(object.contains_key(*key), "missing key {key}");
        }
    }
}
