//! Font-size search and the two ways of measuring ink.
//!
//! Both strategies walk candidate sizes `H, H + 1, ...` below `2H` and stop
//! at the first size whose ink height reaches the target. An exact hit is
//! used as is; an overshoot backs off to the previous size.

use image::{Rgba, RgbaImage};

use super::FitConfig;
use crate::error::FitError;
use crate::text_renderer::{TextPlacement, TextRenderer, supports_ink_extents};

/// Direct measurements within this distance of the target count as a hit.
const DIRECT_TOLERANCE_PX: f32 = 1e-3;

/// A scanned row counts as ink once some pixel in it is at least half
/// covered. Fainter antialiasing fringes stay out, which keeps the row count
/// within a pixel of the exact outline height.
const INK_ROW_MIN_ALPHA: u8 = 128;

/// How ink height is measured while fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementStrategy {
    /// Ask the renderer for ink ascent and descent.
    DirectMeasurement,
    /// Rasterize into a scratch canvas and count inked rows.
    PixelScan,
}

impl MeasurementStrategy {
    /// Pick the strategy `renderer` supports.
    pub fn probe(renderer: &dyn TextRenderer) -> Self {
        Self::select(supports_ink_extents(renderer))
    }

    pub fn select(has_ink_metrics: bool) -> Self {
        if has_ink_metrics {
            Self::DirectMeasurement
        } else {
            Self::PixelScan
        }
    }

    /// Find the size at which `charset` fills `line_height`.
    pub fn fit(
        self,
        renderer: &dyn TextRenderer,
        charset: &str,
        line_height: f32,
    ) -> Result<FitConfig, FitError> {
        if !line_height.is_finite() || line_height <= 0.0 {
            return Err(FitError::InvalidLineHeight(line_height));
        }
        match self {
            Self::DirectMeasurement => {
                search(line_height, line_height, DIRECT_TOLERANCE_PX, |size| {
                    let extents = renderer
                        .ink_extents(charset, size)
                        .filter(|extents| extents.is_finite())
                        .ok_or(FitError::MetricsUnavailable { font_size_px: size })?;
                    Ok(Measurement {
                        ink_height: extents.height(),
                        descent: extents.descent,
                    })
                })
            }
            Self::PixelScan => {
                let mut scanner = PixelScanner::new(charset, line_height);
                search(line_height, line_height.round(), 0.0, |size| {
                    Ok(scanner.measure(renderer, size))
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Measurement {
    ink_height: f32,
    descent: f32,
}

fn search(
    line_height: f32,
    target: f32,
    tolerance: f32,
    mut measure: impl FnMut(f32) -> Result<Measurement, FitError>,
) -> Result<FitConfig, FitError> {
    let limit = 2.0 * line_height;
    let mut previous: Option<Measurement> = None;
    let mut size = line_height;

    while size < limit {
        let measurement = measure(size)?;
        log::trace!(
            "fit {:.3}px: size {:.3} -> ink {:.3} (target {:.3})",
            line_height,
            size,
            measurement.ink_height,
            target
        );

        if (measurement.ink_height - target).abs() <= tolerance {
            return Ok(FitConfig {
                font_size_px: size,
                baseline_offset_px: measurement.descent,
            });
        }
        if measurement.ink_height > target {
            return match previous {
                Some(previous) => Ok(FitConfig {
                    font_size_px: size - 1.0,
                    baseline_offset_px: previous.descent,
                }),
                None => Err(FitError::OvershootAtMinimum {
                    line_height,
                    ink_height: measurement.ink_height,
                }),
            };
        }
        previous = Some(measurement);
        size += 1.0;
    }
    Err(FitError::SearchExhausted { line_height })
}

/// Scratch canvas for measuring ink by rasterizing.
struct PixelScanner<'a> {
    charset: &'a str,
    canvas: RgbaImage,
    anchor_row: u32,
}

impl<'a> PixelScanner<'a> {
    fn new(charset: &'a str, line_height: f32) -> Self {
        let chars = charset.chars().count().max(1) as f32;
        let width = (2.0 * chars * line_height).ceil().max(1.0) as u32;
        let height = (3.0 * line_height).ceil().max(1.0) as u32;
        Self {
            charset,
            canvas: RgbaImage::new(width, height),
            anchor_row: (2.0 * line_height).round() as u32,
        }
    }

    fn measure(&mut self, renderer: &dyn TextRenderer, size: f32) -> Measurement {
        self.canvas.fill(0);
        let width = self.canvas.width() as f32;
        renderer.fill_text(
            &mut self.canvas,
            self.charset,
            size,
            TextPlacement {
                center_x: width / 2.0,
                baseline_y: self.anchor_row as f32,
                max_width: width,
            },
            Rgba([0, 0, 0, 255]),
        );

        let mut filled_rows = 0u32;
        let mut last_filled_row = None;
        for (y, row) in self.canvas.enumerate_rows() {
            if row
                .into_iter()
                .any(|(_, _, pixel)| pixel[3] >= INK_ROW_MIN_ALPHA)
            {
                filled_rows += 1;
                last_filled_row = Some(y);
            }
        }
        let descent = last_filled_row
            .map(|row| (row as i64 - self.anchor_row as i64 + 1).max(0))
            .unwrap_or(0);
        Measurement {
            ink_height: filled_rows as f32,
            descent: descent as f32,
        }
    }
}
