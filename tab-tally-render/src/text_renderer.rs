//! The text-rendering surface the fitter measures and draws through.
//!
//! [`GlyphRasterizer`] is the production implementation. Tests use the
//! deterministic renderer in [`crate::testing`].

use image::{Rgba, RgbaImage};
use tab_tally_fonts::GlyphRasterizer;

/// Text used by the ink-metrics capability probe.
pub const PROBE_TEXT: &str = "foo";
/// Font size used by the ink-metrics capability probe.
pub const PROBE_SIZE_PX: f32 = 16.0;

/// Vertical extent of the ink of a run of text, relative to its baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InkExtents {
    /// Distance from the baseline up to the highest inked pixel.
    pub ascent: f32,
    /// Distance from the baseline down to the lowest inked pixel.
    pub descent: f32,
}

impl InkExtents {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    pub fn is_finite(&self) -> bool {
        self.ascent.is_finite() && self.descent.is_finite()
    }
}

/// Where a line of text goes on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Horizontal centre of the line.
    pub center_x: f32,
    /// Baseline row; snapped to the nearest whole pixel when drawn.
    pub baseline_y: f32,
    /// Lines wider than this are compressed horizontally to fit.
    pub max_width: f32,
}

/// A surface that can measure and fill single lines of text.
pub trait TextRenderer: Send + Sync {
    /// Ink extents of `text` at `font_size_px`, or `None` when the renderer
    /// cannot measure ink directly.
    fn ink_extents(&self, text: &str, font_size_px: f32) -> Option<InkExtents>;

    /// Fill `text` into `canvas` at `placement` with `color`.
    fn fill_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font_size_px: f32,
        placement: TextPlacement,
        color: Rgba<u8>,
    );
}

/// Whether `renderer` reports usable ink extents.
pub fn supports_ink_extents(renderer: &dyn TextRenderer) -> bool {
    renderer
        .ink_extents(PROBE_TEXT, PROBE_SIZE_PX)
        .is_some_and(|extents| extents.is_finite())
}

impl TextRenderer for GlyphRasterizer {
    fn ink_extents(&self, text: &str, font_size_px: f32) -> Option<InkExtents> {
        // Text without ink still measures; it is just empty.
        Some(
            self.ink_bounds(text, font_size_px)
                .map(|bounds| InkExtents {
                    ascent: bounds.ascent,
                    descent: bounds.descent,
                })
                .unwrap_or_default(),
        )
    }

    fn fill_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font_size_px: f32,
        placement: TextPlacement,
        color: Rgba<u8>,
    ) {
        let advance = self.layout(text, font_size_px).advance;
        let x_scale = if advance > placement.max_width && advance > 0.0 {
            placement.max_width / advance
        } else {
            1.0
        };
        let origin_x = placement.center_x - advance * x_scale / 2.0;
        self.draw_text(
            canvas,
            text,
            font_size_px,
            origin_x,
            placement.baseline_y,
            x_scale,
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BlockRenderer;

    #[test]
    fn test_probe_accepts_ink_metrics() {
        assert!(supports_ink_extents(&BlockRenderer::new()));
    }

    #[test]
    fn test_probe_rejects_missing_metrics() {
        assert!(!supports_ink_extents(
            &BlockRenderer::new().without_ink_metrics()
        ));
    }

    #[test]
    fn test_probe_rejects_non_finite_metrics() {
        let renderer = BlockRenderer::new().with_proportions(f32::NAN, 0.1);
        assert!(!supports_ink_extents(&renderer));
    }

    #[test]
    fn test_extents_height() {
        let extents = InkExtents {
            ascent: 11.5,
            descent: 0.5,
        };
        assert_eq!(extents.height(), 12.0);
    }
}
