//! Preference value types: counting scope, display mode and colours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

// ============================================================================
// Scope / Display Mode
// ============================================================================

/// Which tabs are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// All tabs of all normal windows.
    Global,
    /// Tabs of the window the indicator belongs to (default).
    #[default]
    Window,
    /// Per-window count plus the grand total.
    Both,
}

impl Scope {
    /// Number of lines an icon shows for this scope.
    pub fn line_count(self) -> usize {
        match self {
            Scope::Global | Scope::Window => 1,
            Scope::Both => 2,
        }
    }
}

/// How the count is shown in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Render the digits into the toolbar icon (default).
    #[default]
    Icon,
    /// Use the platform badge text.
    Badge,
}

// ============================================================================
// Colors
// ============================================================================

/// An sRGB colour with alpha, written in preferences as a CSS-style string.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` and a handful of
/// CSS colour names. Serialises back as `#rrggbb` (or `#rrggbbaa` when not
/// fully opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
];

impl IconColor {
    pub const BLACK: IconColor = IconColor::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl Default for IconColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for IconColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex),
            None => NAMED_COLORS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
                .map(|(_, [r, g, b, a])| Self::rgba(*r, *g, *b, *a)),
        };
        parsed.ok_or_else(|| ConfigError::Validation(format!("invalid color '{s}'")))
    }
}

impl fmt::Display for IconColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for IconColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IconColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Lenient numbers
// ============================================================================

/// Form inputs hand numbers over as strings, and migrated values may carry
/// a fractional part. Both are accepted and rounded to the nearest integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(u64),
    Float(f64),
    Text(String),
}

pub(crate) fn deserialize_lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Int(v) => v as f64,
        LenientNumber::Float(v) => v,
        LenientNumber::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{s}'")))?,
    };
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(D::Error::custom(format!("number out of range: {value}")));
    }
    Ok(value.round() as u32)
}
