//! Typed error types for tab-tally-render.

use tab_tally_fonts::FontError;
use thiserror::Error;

/// Failure of the font-size search for one line height.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The line height is zero, negative, or not a finite number.
    #[error("invalid line height: {0}")]
    InvalidLineHeight(f32),

    /// Even the smallest candidate size (equal to the line height) produces
    /// ink taller than the line.
    #[error(
        "glyph ink ({ink_height:.3}px) already exceeds line height {line_height:.3}px at the smallest candidate size"
    )]
    OvershootAtMinimum {
        /// Line height being fitted.
        line_height: f32,
        /// Ink height measured at the first candidate size.
        ink_height: f32,
    },

    /// No size in `[line_height, 2 * line_height)` reached the line height.
    #[error("no font size below twice the line height fills {line_height}px")]
    SearchExhausted {
        /// Line height being fitted.
        line_height: f32,
    },

    /// The renderer stopped reporting ink extents part-way through a search.
    #[error("renderer reported no ink extents at {font_size_px}px")]
    MetricsUnavailable {
        /// Candidate size that failed to measure.
        font_size_px: f32,
    },
}

/// Top-level error type for building a fitter and composing icons.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Raster width or height is zero.
    #[error("invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The measurement character set is empty.
    #[error("measurement charset must not be empty")]
    InvalidCharset,

    /// `draw` was called without any line of text.
    #[error("at least one line of text is required")]
    NoLines,

    /// Margin fraction is negative or not finite.
    #[error("invalid margin fraction: {0}")]
    InvalidMargin(f32),

    /// Margins leave no room for the lines.
    #[error("{lines} line(s) with margin {margin} do not fit in {height}px")]
    Unfittable {
        height: u32,
        lines: usize,
        margin: f32,
    },

    /// No usable font could be loaded.
    #[error(transparent)]
    Font(#[from] FontError),

    /// The font-size search failed.
    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, RenderError>;
