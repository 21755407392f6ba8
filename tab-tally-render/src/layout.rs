//! Vertical layout of stacked icon lines.
//!
//! An icon of height `Hc` holding `N` lines has `N + 1` margins of
//! `margin * Hc` pixels (above, between and below the lines) and splits
//! the rest evenly between the lines.

use crate::error::{RenderError, Result};

/// Margin and line-height split for `line_count` lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub line_count: usize,
    /// Height of one margin band in pixels.
    pub margin_px: f32,
    /// Height allotted to each line in pixels.
    pub line_height: f32,
}

impl LineLayout {
    /// Split `height` pixels between `line_count` lines and their margins.
    ///
    /// `margin` is a fraction of `height`.
    pub fn compute(height: u32, line_count: usize, margin: f32) -> Result<Self> {
        if line_count == 0 {
            return Err(RenderError::NoLines);
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(RenderError::InvalidMargin(margin));
        }
        let height_px = height as f32;
        let margin_px = margin * height_px;
        let margin_count = line_count + 1;
        let line_height = (height_px - margin_count as f32 * margin_px) / line_count as f32;
        if line_height <= 0.0 {
            return Err(RenderError::Unfittable {
                height,
                lines: line_count,
                margin,
            });
        }
        Ok(Self {
            line_count,
            margin_px,
            line_height,
        })
    }

    pub fn margin_count(&self) -> usize {
        self.line_count + 1
    }

    /// Baseline of line `index` (0 = top) for a fit whose ink bottom sits
    /// `baseline_offset_px` below the baseline.
    pub fn baseline(&self, index: usize, baseline_offset_px: f32) -> f32 {
        (index + 1) as f32 * (self.margin_px + self.line_height) - baseline_offset_px
    }

    /// Total height covered by margins and lines.
    pub fn total_height(&self) -> f32 {
        self.margin_count() as f32 * self.margin_px + self.line_count as f32 * self.line_height
    }
}
