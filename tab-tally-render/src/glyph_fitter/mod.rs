//! Glyph-fitting icon composer.
//!
//! A [`GlyphFitter`] is built for one font, charset and raster size and is
//! never mutated afterwards; a settings change means building a new one.
//! It owns:
//! - the [`MeasurementStrategy`], probed once from its renderer
//! - a bounded cache from quantized line height to [`FitConfig`]

mod cache;
mod strategy;

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tab_tally_fonts::{FontManager, GlyphRasterizer};

use crate::error::{FitError, RenderError, Result};
use crate::layout::LineLayout;
use crate::text_renderer::{TextPlacement, TextRenderer};

use cache::FitCache;
pub use cache::{FIT_CACHE_CAPACITY, LineHeightKey};
pub use strategy::MeasurementStrategy;

/// Characters an icon ever shows.
pub const DEFAULT_CHARSET: &str = "0123456789";

/// Font size and baseline offset that make the charset fill one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub font_size_px: f32,
    /// Distance from the baseline to the bottom of the ink. The baseline
    /// sits this far above the bottom edge of the line box.
    pub baseline_offset_px: f32,
}

/// Composes lines of digits into an icon whose glyph ink fills each line.
pub struct GlyphFitter {
    charset: String,
    font: String,
    width: u32,
    height: u32,
    strategy: MeasurementStrategy,
    renderer: Arc<dyn TextRenderer>,
    cache: FitCache,
}

impl std::fmt::Debug for GlyphFitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFitter")
            .field("charset", &self.charset)
            .field("font", &self.font)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("strategy", &self.strategy)
            .field("cached_configs", &self.cached_configs())
            .finish_non_exhaustive()
    }
}

impl GlyphFitter {
    /// Fitter rendering with the system font that best matches `font`, a
    /// CSS-style family list.
    pub fn new(
        charset: impl Into<String>,
        font: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let charset = charset.into();
        let font = font.into();
        Self::validate(&charset, width, height)?;
        let fonts = FontManager::new(&font)?;
        log::info!(
            "Icon font '{}' resolved to '{}' ({} faces)",
            font,
            fonts.primary_family(),
            fonts.font_count()
        );
        let renderer = Arc::new(GlyphRasterizer::new(fonts));
        Self::with_renderer(charset, font, width, height, renderer)
    }

    /// Fitter drawing through `renderer`; the strategy is probed from it.
    pub fn with_renderer(
        charset: impl Into<String>,
        font: impl Into<String>,
        width: u32,
        height: u32,
        renderer: Arc<dyn TextRenderer>,
    ) -> Result<Self> {
        Self::with_probe(charset, font, width, height, renderer, |renderer| {
            MeasurementStrategy::probe(renderer)
        })
    }

    /// Fitter whose strategy is chosen by `probe` instead of the default
    /// ink-metrics check.
    pub fn with_probe(
        charset: impl Into<String>,
        font: impl Into<String>,
        width: u32,
        height: u32,
        renderer: Arc<dyn TextRenderer>,
        probe: impl FnOnce(&dyn TextRenderer) -> MeasurementStrategy,
    ) -> Result<Self> {
        let charset = charset.into();
        Self::validate(&charset, width, height)?;
        let strategy = probe(renderer.as_ref());
        log::debug!(
            "GlyphFitter {}x{} for {:?} using {:?}",
            width,
            height,
            charset,
            strategy
        );
        Ok(Self {
            charset,
            font: font.into(),
            width,
            height,
            strategy,
            renderer,
            cache: FitCache::new(FIT_CACHE_CAPACITY),
        })
    }

    fn validate(charset: &str, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if charset.is_empty() {
            return Err(RenderError::InvalidCharset);
        }
        Ok(())
    }

    /// Fit for `line_height`, computed once per quantized height.
    pub fn get_config(&self, line_height: f32) -> std::result::Result<FitConfig, FitError> {
        if !line_height.is_finite() || line_height <= 0.0 {
            return Err(FitError::InvalidLineHeight(line_height));
        }
        let key = LineHeightKey::quantize(line_height);
        self.cache.get_or_fit(key, || {
            let quantized = key.line_height();
            let config = self
                .strategy
                .fit(self.renderer.as_ref(), &self.charset, quantized)?;
            log::debug!(
                "Fitted line height {:.3}px: size {:.3}px, baseline offset {:.3}px",
                quantized,
                config.font_size_px,
                config.baseline_offset_px
            );
            Ok(config)
        })
    }

    /// Render `lines` top to bottom, separated and surrounded by margins of
    /// `margin * height` pixels, on a transparent `width x height` raster.
    pub fn draw<S: AsRef<str>>(
        &self,
        lines: &[S],
        margin: f32,
        color: Rgba<u8>,
    ) -> Result<RgbaImage> {
        let layout = LineLayout::compute(self.height, lines.len(), margin)?;
        let config = self.get_config(layout.line_height)?;

        let mut canvas = RgbaImage::new(self.width, self.height);
        for (index, line) in lines.iter().enumerate() {
            self.renderer.fill_text(
                &mut canvas,
                line.as_ref(),
                config.font_size_px,
                TextPlacement {
                    center_x: self.width as f32 / 2.0,
                    baseline_y: layout.baseline(index, config.baseline_offset_px),
                    max_width: self.width as f32,
                },
                color,
            );
        }
        Ok(canvas)
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn strategy(&self) -> MeasurementStrategy {
        self.strategy
    }

    /// Number of line heights with a cached fit.
    pub fn cached_configs(&self) -> usize {
        self.cache.len()
    }
}
