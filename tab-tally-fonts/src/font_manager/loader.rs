//! Font family list parsing and system font lookup.

use fontdb::{Database, Family, Query};

use super::types::FontData;

/// One entry of a CSS-style font family list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilySpec {
    Named(String),
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
}

impl FamilySpec {
    fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let unquoted = entry
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| entry.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
        if let Some(name) = unquoted {
            // Quoted names are never generic keywords.
            let name = name.trim();
            return (!name.is_empty()).then(|| FamilySpec::Named(name.to_string()));
        }
        if entry.is_empty() {
            return None;
        }
        Some(match entry.to_ascii_lowercase().as_str() {
            "serif" => FamilySpec::Serif,
            "sans-serif" | "system-ui" => FamilySpec::SansSerif,
            "monospace" => FamilySpec::Monospace,
            "cursive" => FamilySpec::Cursive,
            "fantasy" => FamilySpec::Fantasy,
            _ => FamilySpec::Named(entry.to_string()),
        })
    }

    fn as_family(&self) -> Family<'_> {
        match self {
            FamilySpec::Named(name) => Family::Name(name),
            FamilySpec::Serif => Family::Serif,
            FamilySpec::SansSerif => Family::SansSerif,
            FamilySpec::Monospace => Family::Monospace,
            FamilySpec::Cursive => Family::Cursive,
            FamilySpec::Fantasy => Family::Fantasy,
        }
    }
}

/// Split a family list such as `"Foo Sans", Bar, sans-serif` into entries,
/// preserving order and dropping empty ones.
pub fn parse_family_list(spec: &str) -> Vec<FamilySpec> {
    spec.split(',').filter_map(FamilySpec::parse).collect()
}

/// Load the first face matching `family` (regular weight, upright).
///
/// # Returns
/// The font data and the family name the database reports for it.
pub fn load_family(db: &Database, family: &FamilySpec) -> Option<(FontData, String)> {
    let families = [family.as_family()];
    let query = Query {
        families: &families,
        weight: fontdb::Weight::NORMAL,
        style: fontdb::Style::Normal,
        ..Query::default()
    };
    let id = db.query(&query)?;
    let name = db
        .face(id)
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| format!("{family:?}"));

    // TrueType collections share data between faces; the index selects one.
    let font = db
        .with_face_data(id, |data, face_index| {
            FontData::new_with_index(data.to_vec(), face_index as usize)
        })
        .flatten()?;
    Some((font, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_list() {
        let list = parse_family_list(r#""Fira Sans", 'Open Sans' , Ubuntu,sans-serif"#);
        assert_eq!(
            list,
            vec![
                FamilySpec::Named("Fira Sans".into()),
                FamilySpec::Named("Open Sans".into()),
                FamilySpec::Named("Ubuntu".into()),
                FamilySpec::SansSerif,
            ]
        );
    }

    #[test]
    fn test_quoted_generic_is_a_name() {
        let list = parse_family_list("'serif', MONOSPACE");
        assert_eq!(
            list,
            vec![FamilySpec::Named("serif".into()), FamilySpec::Monospace]
        );
    }

    #[test]
    fn test_empty_entries_dropped() {
        assert!(parse_family_list(" , ,''").is_empty());
        assert_eq!(parse_family_list("system-ui"), vec![FamilySpec::SansSerif]);
    }

    #[test]
    fn test_empty_database_finds_nothing() {
        let db = Database::new();
        assert!(load_family(&db, &FamilySpec::SansSerif).is_none());
    }
}
