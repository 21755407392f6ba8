//! tab-tally: a live tab count for the browser toolbar.
//!
//! This crate ties the workspace together:
//!
//! - [`tab_counter`]: per-window tab bookkeeping and count updates
//! - [`presenter`]: badge text or glyph-fitted icons on the host surface
//! - [`capabilities`]: what the host browser lets us address
//! - [`app`]: the event loop over tab events and preference changes
//! - [`logging`]: file logger behind the `log` facade
//!
//! An embedder calls [`logging::init`] once, builds a [`TallyApp`] with its
//! [`IconSurface`], and feeds it [`AppEvent`]s.

pub mod app;
pub mod capabilities;
pub mod logging;
pub mod presenter;
pub mod tab_counter;

pub use app::{AppEvent, TallyApp, forward_preferences};
pub use capabilities::{BrowserInfo, Capabilities};
pub use presenter::{FitterFactory, FitterSettings, IconSurface, Presenter, system_fitters};
pub use tab_counter::{CountTuple, CountUpdate, ScopeKey, TabCounter, TabEvent, TabId, TabInfo, WindowId};

// Re-export the member crates for embedders.
pub use tab_tally_config as config;
pub use tab_tally_fonts as fonts;
pub use tab_tally_render as render;
