//! Integration tests for tab-tally-fonts against the installed system fonts.
//!
//! Machines without any font (minimal containers) skip the rendering checks.

use image::{Rgba, RgbaImage};
use tab_tally_fonts::{FALLBACK_FAMILIES, FontData, FontManager, GlyphRasterizer};

fn system_rasterizer() -> Option<GlyphRasterizer> {
    match FontManager::new("sans-serif") {
        Ok(fonts) => Some(GlyphRasterizer::new(fonts)),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

fn ink_rows(canvas: &RgbaImage) -> Vec<u32> {
    (0..canvas.height())
        .filter(|&y| (0..canvas.width()).any(|x| canvas.get_pixel(x, y)[3] != 0))
        .collect()
}

#[test]
fn test_font_data_invalid_bytes() {
    assert!(FontData::new(vec![0u8; 100]).is_none());
    assert!(FontData::new(Vec::new()).is_none());
}

#[test]
fn test_fallback_families_not_empty() {
    assert!(!FALLBACK_FAMILIES.is_empty());
}

#[test]
fn test_digits_resolve_to_glyphs() {
    let Some(raster) = system_rasterizer() else {
        return;
    };
    for digit in '0'..='9' {
        assert!(
            raster.fonts().find_glyph(digit).is_some(),
            "no glyph for {digit}"
        );
    }
}

#[test]
fn test_layout_advance_scales_with_size() {
    let Some(raster) = system_rasterizer() else {
        return;
    };
    let small = raster.layout("0123456789", 10.0);
    let large = raster.layout("0123456789", 20.0);
    assert_eq!(small.glyph_count(), 10);
    assert!(small.advance > 0.0);
    let ratio = large.advance / small.advance;
    assert!((ratio - 2.0).abs() < 0.01, "ratio was {ratio}");
}

#[test]
fn test_ink_bounds_of_digits() {
    let Some(raster) = system_rasterizer() else {
        return;
    };
    let bounds = raster.ink_bounds("0123456789", 40.0).expect("digits have ink");
    assert!(bounds.ascent > 20.0 && bounds.ascent < 40.0);
    assert!(bounds.descent >= -1.0 && bounds.descent < 10.0);
    assert!(raster.ink_bounds("   ", 40.0).is_none());
}

#[test]
fn test_draw_text_ink_matches_bounds() {
    let Some(raster) = system_rasterizer() else {
        return;
    };
    let mut canvas = RgbaImage::new(400, 120);
    raster.draw_text(&mut canvas, "0123456789", 40.0, 10.0, 80.0, 1.0, Rgba([0, 0, 0, 255]));

    let rows = ink_rows(&canvas);
    assert!(!rows.is_empty());
    let bounds = raster.ink_bounds("0123456789", 40.0).unwrap();
    let rendered_height = (rows[rows.len() - 1] - rows[0] + 1) as f32;
    assert!(
        (rendered_height - bounds.height()).abs() <= 2.0,
        "rendered {rendered_height} vs measured {}",
        bounds.height()
    );
}

#[test]
fn test_draw_text_compression_narrows_ink() {
    let Some(raster) = system_rasterizer() else {
        return;
    };
    let ink_columns = |scale: f32| {
        let mut canvas = RgbaImage::new(400, 80);
        raster.draw_text(&mut canvas, "88", 40.0, 0.0, 60.0, scale, Rgba([0, 0, 0, 255]));
        (0..canvas.width())
            .filter(|&x| (0..canvas.height()).any(|y| canvas.get_pixel(x, y)[3] != 0))
            .count()
    };
    assert!(ink_columns(0.5) < ink_columns(1.0));
}
