//! Deterministic text renderer for tests.
//!
//! [`BlockRenderer`] draws every non-space character as a solid block whose
//! height above and below the baseline is a fixed fraction of the font
//! size, so fitting results can be computed by hand and do not depend on
//! installed fonts. It counts measure and fill calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::text_renderer::{InkExtents, TextPlacement, TextRenderer};

/// Absorbs float noise before rounding block edges outward.
const EDGE_EPSILON: f32 = 1e-4;

/// One recorded `fill_text` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FillCall {
    pub text: String,
    pub font_size_px: f32,
    pub placement: TextPlacement,
}

#[derive(Debug)]
pub struct BlockRenderer {
    ascent_ratio: f32,
    descent_ratio: f32,
    advance_ratio: f32,
    ink_metrics: bool,
    measure_calls: AtomicUsize,
    fill_calls: AtomicUsize,
    fills: Mutex<Vec<FillCall>>,
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRenderer {
    /// Blocks reaching 0.72 em above and 0.05 em below the baseline, each
    /// 0.6 em wide, roughly the proportions of sans-serif digits.
    pub fn new() -> Self {
        Self {
            ascent_ratio: 0.72,
            descent_ratio: 0.05,
            advance_ratio: 0.6,
            ink_metrics: true,
            measure_calls: AtomicUsize::new(0),
            fill_calls: AtomicUsize::new(0),
            fills: Mutex::new(Vec::new()),
        }
    }

    pub fn with_proportions(mut self, ascent_ratio: f32, descent_ratio: f32) -> Self {
        self.ascent_ratio = ascent_ratio;
        self.descent_ratio = descent_ratio;
        self
    }

    pub fn with_advance_ratio(mut self, advance_ratio: f32) -> Self {
        self.advance_ratio = advance_ratio;
        self
    }

    /// Report no ink extents, as a renderer without ink metrics would.
    pub fn without_ink_metrics(mut self) -> Self {
        self.ink_metrics = false;
        self
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls.load(Ordering::SeqCst)
    }

    pub fn fill_calls(&self) -> usize {
        self.fill_calls.load(Ordering::SeqCst)
    }

    /// Measure and fill calls combined.
    pub fn total_calls(&self) -> usize {
        self.measure_calls() + self.fill_calls()
    }

    /// Every fill call so far, oldest first.
    pub fn fills(&self) -> Vec<FillCall> {
        self.fills.lock().clone()
    }

    pub fn clear_fills(&self) {
        self.fills.lock().clear();
    }

    fn inked_chars(text: &str) -> usize {
        text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

impl TextRenderer for BlockRenderer {
    fn ink_extents(&self, text: &str, font_size_px: f32) -> Option<InkExtents> {
        self.measure_calls.fetch_add(1, Ordering::SeqCst);
        if !self.ink_metrics {
            return None;
        }
        if Self::inked_chars(text) == 0 {
            return Some(InkExtents::default());
        }
        Some(InkExtents {
            ascent: self.ascent_ratio * font_size_px,
            descent: self.descent_ratio * font_size_px,
        })
    }

    fn fill_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font_size_px: f32,
        placement: TextPlacement,
        color: Rgba<u8>,
    ) {
        self.fill_calls.fetch_add(1, Ordering::SeqCst);
        self.fills.lock().push(FillCall {
            text: text.to_string(),
            font_size_px,
            placement,
        });
        if Self::inked_chars(text) == 0 {
            return;
        }

        let baseline = placement.baseline_y.round() as i64;
        let above = (self.ascent_ratio * font_size_px - EDGE_EPSILON).ceil() as i64;
        let below = (self.descent_ratio * font_size_px - EDGE_EPSILON).ceil() as i64;
        let advance = text.chars().count() as f32 * self.advance_ratio * font_size_px;
        let width = advance.min(placement.max_width);
        let left = (placement.center_x - width / 2.0).floor() as i64;
        let right = (placement.center_x + width / 2.0).ceil() as i64;

        let clamp_x = |x: i64| x.clamp(0, canvas.width() as i64) as u32;
        let clamp_y = |y: i64| y.clamp(0, canvas.height() as i64) as u32;
        let (x0, x1) = (clamp_x(left), clamp_x(right));
        let (y0, y1) = (clamp_y(baseline - above), clamp_y(baseline + below));
        for y in y0..y1 {
            for x in x0..x1 {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}
