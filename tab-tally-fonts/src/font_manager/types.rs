//! Owned font data.

use std::sync::Arc;

use swash::{CacheKey, FontRef};

/// Font bytes plus the location of one face inside them.
///
/// Swash font references borrow their data, so this keeps the bytes alive
/// and hands out a fresh [`FontRef`] on demand. Clones share the bytes.
#[derive(Clone)]
pub struct FontData {
    /// Raw font data bytes (TTF/OTF/TTC)
    pub data: Arc<Vec<u8>>,
    /// Offset of the face's table directory within `data`
    offset: u32,
    /// Swash cache key identifying this face
    key: CacheKey,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("data_len", &self.data.len())
            .field("offset", &self.offset)
            .finish()
    }
}

impl FontData {
    /// Parse the first face of `data`. `None` if the bytes are not a font.
    pub fn new(data: Vec<u8>) -> Option<Self> {
        Self::new_with_index(data, 0)
    }

    /// Parse face `face_index` of `data` (TrueType collections hold several).
    pub fn new_with_index(data: Vec<u8>, face_index: usize) -> Option<Self> {
        let font = FontRef::from_index(&data, face_index)?;
        let (offset, key) = (font.offset, font.key);
        Some(Self {
            data: Arc::new(data),
            offset,
            key,
        })
    }

    /// Borrowing swash reference for metrics, charmap and scaling.
    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }
}
