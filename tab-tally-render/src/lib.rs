//! Glyph-fitting icon renderer for tab-tally.
//!
//! This crate provides:
//!
//! - The [`TextRenderer`] surface the fitter measures and draws through
//! - [`GlyphFitter`]: finds the font size and baseline offset that make a
//!   line of digits exactly fill its height, caches the result per line
//!   height, and composes stacked lines into an RGBA icon
//! - [`LineLayout`]: margin and baseline arithmetic for stacked lines

mod error;
pub mod glyph_fitter;
pub mod layout;
pub mod text_renderer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{FitError, RenderError, Result};
pub use glyph_fitter::{
    DEFAULT_CHARSET, FIT_CACHE_CAPACITY, FitConfig, GlyphFitter, LineHeightKey,
    MeasurementStrategy,
};
pub use layout::LineLayout;
pub use text_renderer::{InkExtents, TextPlacement, TextRenderer, supports_ink_extents};
