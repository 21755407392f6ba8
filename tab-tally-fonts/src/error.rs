//! Typed error variants for the tab-tally-fonts crate.

use thiserror::Error;

/// Errors raised while resolving or loading fonts.
#[derive(Debug, Error)]
pub enum FontError {
    /// The family list was empty after parsing.
    #[error("Font family list is empty")]
    EmptyFamilyList,

    /// None of the requested families nor any built-in fallback could be loaded.
    #[error("No usable font found for '{0}'")]
    NoFontAvailable(String),

    /// Font bytes were supplied directly but could not be parsed.
    #[error("Invalid font data ({len} bytes, face {face_index})")]
    InvalidFontData {
        /// Length of the rejected data.
        len: usize,
        /// Face index that was requested.
        face_index: usize,
    },
}
