//! CPU glyph layout, ink measurement and rasterization with swash.
//!
//! Text is laid out on a single line from its charmap advances (digits need
//! no shaping), measured from scaled outlines, and rendered as alpha masks
//! that are composited source-over into an RGBA canvas.

use image::{Rgba, RgbaImage};
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Format, Transform, Vector};

use crate::font_manager::FontManager;

/// Vertical and horizontal extent of rendered ink, relative to the pen
/// origin on the baseline. `ascent` grows upward, `descent` downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkBounds {
    pub ascent: f32,
    pub descent: f32,
    pub left: f32,
    pub right: f32,
}

impl InkBounds {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

#[derive(Debug, Clone, Copy)]
struct PositionedGlyph {
    font_index: usize,
    glyph_id: u16,
    x: f32,
}

/// A laid-out line of glyphs.
#[derive(Debug, Clone)]
pub struct TextRun {
    glyphs: Vec<PositionedGlyph>,
    /// Total advance width in pixels.
    pub advance: f32,
}

impl TextRun {
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// Rasterizes lines of text with a [`FontManager`]'s faces.
pub struct GlyphRasterizer {
    fonts: FontManager,
    hinting: bool,
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRasterizer")
            .field("fonts", &self.fonts)
            .field("hinting", &self.hinting)
            .finish()
    }
}

impl GlyphRasterizer {
    /// Hinting is off: it snaps outlines to the grid per size and would make
    /// ink height jump unevenly between neighbouring font sizes.
    pub fn new(fonts: FontManager) -> Self {
        Self {
            fonts,
            hinting: false,
        }
    }

    pub fn with_hinting(mut self, hinting: bool) -> Self {
        self.hinting = hinting;
        self
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    /// Lay `text` out on one line at `size_px`, starting at x = 0.
    ///
    /// Characters no face maps fall back to the primary face's .notdef.
    pub fn layout(&self, text: &str, size_px: f32) -> TextRun {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut x = 0.0;
        for character in text.chars() {
            let (font_index, glyph_id) = self.fonts.find_glyph(character).unwrap_or((0, 0));
            let Some(font) = self.fonts.get_font(font_index) else {
                continue;
            };
            let units_per_em = font.metrics(&[]).units_per_em.max(1) as f32;
            let scale = size_px / units_per_em;
            glyphs.push(PositionedGlyph {
                font_index,
                glyph_id,
                x,
            });
            x += font.glyph_metrics(&[]).advance_width(glyph_id) * scale;
        }
        TextRun { glyphs, advance: x }
    }

    /// Ink extents of `text` at `size_px` from its scaled outlines.
    ///
    /// # Returns
    /// `None` if no glyph produces any ink (empty text, spaces only).
    pub fn ink_bounds(&self, text: &str, size_px: f32) -> Option<InkBounds> {
        let run = self.layout(text, size_px);
        let mut context = ScaleContext::new();
        let mut bounds: Option<InkBounds> = None;

        for glyph in &run.glyphs {
            let Some(font) = self.fonts.get_font(glyph.font_index) else {
                continue;
            };
            let mut scaler = context
                .builder(font)
                .size(size_px)
                .hint(self.hinting)
                .build();
            let Some(outline) = scaler.scale_outline(glyph.glyph_id) else {
                continue;
            };
            let b = outline.bounds();
            if b.max.x <= b.min.x || b.max.y <= b.min.y {
                continue;
            }
            // Outlines are y-up with the baseline at 0.
            let glyph_bounds = InkBounds {
                ascent: b.max.y,
                descent: -b.min.y,
                left: glyph.x + b.min.x,
                right: glyph.x + b.max.x,
            };
            bounds = Some(match bounds {
                None => glyph_bounds,
                Some(acc) => InkBounds {
                    ascent: acc.ascent.max(glyph_bounds.ascent),
                    descent: acc.descent.max(glyph_bounds.descent),
                    left: acc.left.min(glyph_bounds.left),
                    right: acc.right.max(glyph_bounds.right),
                },
            });
        }
        bounds
    }

    /// Render `text` into `canvas` with the pen starting at `origin_x` on the
    /// baseline row `baseline_y` (rounded to a whole row).
    ///
    /// `x_scale` < 1 compresses the line horizontally around `origin_x`.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size_px: f32,
        origin_x: f32,
        baseline_y: f32,
        x_scale: f32,
        color: Rgba<u8>,
    ) {
        let run = self.layout(text, size_px);
        let baseline_row = baseline_y.round() as i64;
        let transform = (x_scale < 1.0).then(|| Transform::scale(x_scale, 1.0));
        let mut context = ScaleContext::new();

        for glyph in &run.glyphs {
            let Some(font) = self.fonts.get_font(glyph.font_index) else {
                continue;
            };
            let mut scaler = context
                .builder(font)
                .size(size_px)
                .hint(self.hinting)
                .build();

            let pen_x = origin_x + glyph.x * x_scale;
            let whole_x = pen_x.floor();
            let Some(image) = Render::new(&[Source::Outline])
                .format(Format::Alpha)
                .offset(Vector::new(pen_x - whole_x, 0.0))
                .transform(transform)
                .render(&mut scaler, glyph.glyph_id)
            else {
                continue;
            };
            if !matches!(image.content, Content::Mask) {
                continue;
            }

            let left = whole_x as i64 + image.placement.left as i64;
            let top = baseline_row - image.placement.top as i64;
            let width = image.placement.width as usize;
            for (row, coverage_row) in image.data.chunks(width.max(1)).enumerate() {
                for (col, &coverage) in coverage_row.iter().enumerate() {
                    if coverage == 0 {
                        continue;
                    }
                    let x = left + col as i64;
                    let y = top + row as i64;
                    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64
                    {
                        continue;
                    }
                    blend_over(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
                }
            }
        }
    }
}

/// Source-over blend of `color` at `coverage` (0-255) onto `dst`, straight
/// (non-premultiplied) alpha.
pub fn blend_over(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: u8) {
    let src_a = color[3] as f32 / 255.0 * coverage as f32 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for channel in 0..3 {
        let src_c = color[channel] as f32;
        let dst_c = dst[channel] as f32;
        let out_c = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
        dst[channel] = out_c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
