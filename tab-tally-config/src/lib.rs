//! Preferences for the tab-tally tab counter.
//!
//! This crate provides:
//!
//! - The typed [`Config`] with defaults and validation
//! - YAML persistence with atomic writes and legacy-key migration
//! - [`PreferenceStore`]: flat key/value get/set with change notification
//! - [`watcher::PreferencesWatcher`]: hot reload of the preferences file

pub mod config;
pub mod defaults;
mod error;
pub mod migrate;
mod persistence;
pub mod store;
mod types;
#[cfg(feature = "watcher")]
pub mod watcher;

pub use config::{Config, MAX_ICON_DIMENSION};
pub use error::{ConfigError, Result};
pub use store::{PreferenceChange, PreferenceStore};
pub use types::{DisplayMode, IconColor, Scope};
