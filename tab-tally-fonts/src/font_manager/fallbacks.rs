//! Fallback families tried after the requested family list.
//!
//! Digits exist in practically every text face, so the list only needs to
//! make sure *something* loads on each platform.
pub const FALLBACK_FAMILIES: &[&str] = &[
    // Linux
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Cantarell",
    "FreeSans",
    // macOS
    "Helvetica Neue",
    "Helvetica",
    // Windows
    "Segoe UI",
    "Arial",
    "Verdana",
];
