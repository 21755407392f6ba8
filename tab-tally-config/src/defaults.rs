//! Default value functions for preferences.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! [`crate::Config`] fields so a partial preferences file fills in the rest.

use crate::types::IconColor;

pub fn badge_bg() -> IconColor {
    IconColor::rgb(0x21, 0x21, 0x21)
}

/// Icon edge length in CSS px; 32 covers the common toolbar sizes at 2x.
pub fn icon_dimension() -> u32 {
    32
}

pub fn icon_font() -> String {
    "sans-serif".to_string()
}

pub fn icon_color() -> IconColor {
    IconColor::BLACK
}

/// Percent of icon height placed above, below and between rows.
pub fn icon_margin() -> u32 {
    5
}

/// Characters the icon ever renders.
pub fn charset() -> &'static str {
    "0123456789"
}
