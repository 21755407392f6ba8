//! Font resolution with a fallback chain.
//!
//! A [`FontManager`] turns a CSS-style family list into loaded faces:
//! - index 0: the first family of the list the system can provide
//! - 1..: built-in fallback families, consulted for characters the
//!   primary face lacks

mod fallbacks;
mod loader;
mod types;

use fontdb::Database;
use swash::FontRef;

use crate::error::FontError;

pub use fallbacks::FALLBACK_FAMILIES;
pub use loader::{FamilySpec, parse_family_list};
pub use types::FontData;

/// Loaded faces for one family list.
pub struct FontManager {
    /// Primary face first, then fallbacks in priority order.
    fonts: Vec<FontData>,
    /// Family name of the primary face as reported by the font database.
    primary_family: String,
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("primary_family", &self.primary_family)
            .field("font_count", &self.fonts.len())
            .finish()
    }
}

impl FontManager {
    /// Resolve `family_list` against the installed system fonts.
    pub fn new(family_list: &str) -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system font faces", db.len());
        Self::from_database(&db, family_list)
    }

    /// Resolve `family_list` against an already populated database.
    pub fn from_database(db: &Database, family_list: &str) -> Result<Self, FontError> {
        let requested = parse_family_list(family_list);
        if requested.is_empty() {
            return Err(FontError::EmptyFamilyList);
        }

        let mut primary = None;
        for family in &requested {
            if let Some(found) = loader::load_family(db, family) {
                log::info!("Resolved font '{}' for {:?}", found.1, family);
                primary = Some(found);
                break;
            }
            log::debug!("Font family {:?} not available", family);
        }

        let mut fonts = Vec::new();
        let mut primary_family = None;
        if let Some((font, name)) = primary {
            fonts.push(font);
            primary_family = Some(name);
        } else {
            log::warn!(
                "None of '{}' is installed, falling back to built-in families",
                family_list
            );
        }

        for name in FALLBACK_FAMILIES {
            if primary_family.as_deref() == Some(*name) {
                continue;
            }
            if let Some((font, resolved)) =
                loader::load_family(db, &FamilySpec::Named((*name).to_string()))
            {
                log::debug!("Added fallback font: {}", resolved);
                primary_family.get_or_insert(resolved);
                fonts.push(font);
            }
        }

        match primary_family {
            Some(primary_family) if !fonts.is_empty() => Ok(Self {
                fonts,
                primary_family,
            }),
            _ => Err(FontError::NoFontAvailable(family_list.to_string())),
        }
    }

    /// Use a single face from raw bytes, with no fallbacks.
    pub fn from_bytes(data: Vec<u8>, face_index: usize) -> Result<Self, FontError> {
        let len = data.len();
        let font = FontData::new_with_index(data, face_index)
            .ok_or(FontError::InvalidFontData { len, face_index })?;
        Ok(Self {
            fonts: vec![font],
            primary_family: String::from("<embedded>"),
        })
    }

    /// Family name of the primary face.
    pub fn primary_family(&self) -> &str {
        &self.primary_family
    }

    /// Number of loaded faces (primary plus fallbacks).
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Face at `font_index`.
    pub fn get_font(&self, font_index: usize) -> Option<FontRef<'_>> {
        self.fonts.get(font_index).map(FontData::font_ref)
    }

    /// Find a face with a glyph for `character`.
    ///
    /// # Returns
    /// `(font_index, glyph_id)`, or `None` if no loaded face maps it.
    pub fn find_glyph(&self, character: char) -> Option<(usize, u16)> {
        self.fonts.iter().enumerate().find_map(|(idx, font)| {
            let glyph_id = font.font_ref().charmap().map(character);
            (glyph_id != 0).then_some((idx, glyph_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_rejected() {
        let db = Database::new();
        assert!(matches!(
            FontManager::from_database(&db, " , "),
            Err(FontError::EmptyFamilyList)
        ));
    }

    #[test]
    fn test_empty_database_has_no_font() {
        let db = Database::new();
        assert!(matches!(
            FontManager::from_database(&db, "sans-serif"),
            Err(FontError::NoFontAvailable(_))
        ));
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        assert!(matches!(
            FontManager::from_bytes(vec![0u8; 64], 0),
            Err(FontError::InvalidFontData { len: 64, .. })
        ));
    }
}
