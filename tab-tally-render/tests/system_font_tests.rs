//! GlyphFitter against the installed system fonts.
//!
//! Machines without any font skip these checks.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tab_tally_fonts::{FontManager, GlyphRasterizer};
use tab_tally_render::{
    DEFAULT_CHARSET, GlyphFitter, MeasurementStrategy, RenderError, TextRenderer,
};

fn system_fitter(size: u32) -> Option<GlyphFitter> {
    match GlyphFitter::new(DEFAULT_CHARSET, "sans-serif", size, size) {
        Ok(fitter) => Some(fitter),
        Err(RenderError::Font(e)) => {
            eprintln!("skipping: {e}");
            None
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

/// Fitter over the system rasterizer with `strategy` forced.
fn forced_fitter(renderer: &Arc<GlyphRasterizer>, strategy: MeasurementStrategy) -> GlyphFitter {
    let renderer: Arc<dyn TextRenderer> = renderer.clone();
    GlyphFitter::with_probe(DEFAULT_CHARSET, "sans-serif", 32, 32, renderer, |_| strategy)
        .expect("valid fitter")
}

fn inked_rows(canvas: &RgbaImage) -> Vec<u32> {
    (0..canvas.height())
        .filter(|&y| (0..canvas.width()).any(|x| canvas.get_pixel(x, y)[3] != 0))
        .collect()
}

#[test]
fn test_outline_renderer_measures_ink() {
    let Some(fitter) = system_fitter(32) else {
        return;
    };
    assert_eq!(fitter.strategy(), MeasurementStrategy::DirectMeasurement);
}

#[test]
fn test_fitted_size_exceeds_line_height() {
    let Some(fitter) = system_fitter(32) else {
        return;
    };
    // Digit ink is shorter than the em box, so the fit is larger than H.
    let config = fitter.get_config(28.8).expect("fit");
    assert!(config.font_size_px > 28.8);
    assert!(config.font_size_px < 57.6);
    assert!(config.baseline_offset_px >= -1.0);
    assert_eq!(fitter.get_config(28.8).unwrap(), config);
}

#[test]
fn test_single_line_ink_stays_inside_margins() {
    let Some(fitter) = system_fitter(32) else {
        return;
    };
    let icon = fitter
        .draw(&["8"], 0.05, Rgba([0, 0, 0, 255]))
        .expect("draw");
    let rows = inked_rows(&icon);
    assert!(!rows.is_empty());
    // Line box is rows 1.6..30.4; allow a pixel of antialiasing either side.
    assert!(*rows.first().unwrap() >= 1);
    assert!(*rows.last().unwrap() <= 31);
    // The fit fills the box, so ink spans most of it.
    assert!(rows.last().unwrap() - rows.first().unwrap() >= 24);
}

#[test]
fn test_two_lines_fill_both_halves() {
    let Some(fitter) = system_fitter(32) else {
        return;
    };
    let icon = fitter
        .draw(&["3", "15"], 0.05, Rgba([0, 0, 0, 255]))
        .expect("draw");
    let rows = inked_rows(&icon);
    // Rows around the middle margin (15.2..16.8) separate the two lines.
    assert!(rows.iter().any(|&y| y < 15));
    assert!(rows.iter().any(|&y| y > 17));
}

#[test]
fn test_strategies_agree_on_outline_fonts() {
    let fonts = match FontManager::new("sans-serif") {
        Ok(fonts) => fonts,
        Err(e) => {
            eprintln!("skipping: {e}");
            return;
        }
    };
    let renderer = Arc::new(GlyphRasterizer::new(fonts));
    let direct = forced_fitter(&renderer, MeasurementStrategy::DirectMeasurement);
    let pixel = forced_fitter(&renderer, MeasurementStrategy::PixelScan);

    for line_height in [10.0, 13.6, 16.0, 20.0, 24.0, 28.8, 40.0] {
        let a = direct.get_config(line_height).expect("direct fit");
        let b = pixel.get_config(line_height).expect("pixel fit");
        assert!(
            (a.font_size_px - b.font_size_px).abs() <= 1.0,
            "H={line_height}: direct size {} vs pixel size {}",
            a.font_size_px,
            b.font_size_px
        );
        assert!(
            (a.baseline_offset_px - b.baseline_offset_px).abs() <= 1.0,
            "H={line_height}: direct offset {} vs pixel offset {}",
            a.baseline_offset_px,
            b.baseline_offset_px
        );
    }
}
