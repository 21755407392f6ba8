//! System font discovery and glyph rasterization for the tab-tally icon.
//!
//! This crate provides:
//! - Resolution of CSS-style family lists (`"Foo", sans-serif`) against the
//!   installed fonts, with a built-in fallback chain
//! - Single-line glyph layout from charmap advances
//! - Ink measurement from scaled outlines
//! - Alpha-mask rasterization composited into an RGBA canvas

mod error;
pub mod font_manager;
pub mod rasterizer;

pub use error::FontError;
pub use font_manager::{FALLBACK_FAMILIES, FamilySpec, FontData, FontManager, parse_family_list};
pub use rasterizer::{GlyphRasterizer, InkBounds, TextRun, blend_over};
