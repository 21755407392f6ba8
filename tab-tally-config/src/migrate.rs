//! Upgrades of legacy preference keys.
//!
//! Runs on the raw YAML mapping before it is deserialized into
//! [`crate::Config`], so renamed or reinterpreted keys never reach the
//! strict field check.

use serde_yaml_ng::{Mapping, Value};

/// Legacy key: fraction of the icon height the font filled.
const LEGACY_FONT_MULTIPLIER: &str = "iconFontMultiplier";
const ICON_MARGIN: &str = "iconMargin";
/// `iconMargin` is a percentage.
const MAX_MARGIN_PERCENT: f64 = 100.0;

/// Apply every migration in order. Returns true if the mapping changed.
pub fn migrate(mapping: &mut Mapping) -> bool {
    migrate_margin(mapping)
}

/// `iconFontMultiplier` (m) becomes `iconMargin = (1 - m) * 50`.
///
/// The multiplier described how much of the height the text used, split
/// evenly above and below; the margin is the percentage on each side.
/// Multipliers outside -1..=1 clamp to the 0-100 range.
fn migrate_margin(mapping: &mut Mapping) -> bool {
    let Some(legacy) = mapping.remove(LEGACY_FONT_MULTIPLIER) else {
        return false;
    };
    match legacy.as_f64().filter(|m| m.is_finite()) {
        Some(multiplier) => {
            let margin = ((1.0 - multiplier) * 50.0).clamp(0.0, MAX_MARGIN_PERCENT);
            log::info!(
                "Migrating {LEGACY_FONT_MULTIPLIER}={multiplier} to {ICON_MARGIN}={margin}"
            );
            mapping.insert(Value::from(ICON_MARGIN), Value::from(margin));
        }
        None => {
            log::warn!("Dropping unusable {LEGACY_FONT_MULTIPLIER}: {legacy:?}");
        }
    }
    true
}
