//! Pushes counts to the host's toolbar indicator.
//!
//! Badge mode writes the counts as badge text. Icon mode renders them with
//! the current [`GlyphFitter`]. The fitter is rebuilt only when its inputs
//! change, and the new one replaces the old with a single atomic swap.
//!
//! Window and tab indicators override the global one on the host, so the
//! presenter remembers every key it wrote. A scope or display mode switch
//! resets all of them before the new counts go out.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tab_tally_config::{Config, DisplayMode, IconColor};
use tab_tally_render::{DEFAULT_CHARSET, GlyphFitter, RenderError};

use crate::capabilities::Capabilities;
use crate::tab_counter::{CountUpdate, ScopeKey};

/// The host's toolbar indicator.
pub trait IconSurface: Send + Sync {
    /// Badge text for `key`; an empty string clears it.
    fn set_badge_text(&self, key: ScopeKey, text: &str) -> anyhow::Result<()>;

    fn set_badge_background(&self, color: IconColor) -> anyhow::Result<()>;

    /// Replace the icon for `key` with `icon`.
    fn set_icon(&self, key: ScopeKey, icon: &RgbaImage) -> anyhow::Result<()>;

    /// Drop the badge text and icon set for `key`. Windows and tabs fall
    /// back to the global indicator, the global one to the default icon.
    fn reset(&self, key: ScopeKey) -> anyhow::Result<()>;
}

/// Inputs a [`GlyphFitter`] is built from. Any change means a new fitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitterSettings {
    pub charset: String,
    pub font: String,
    pub dimension: u32,
}

impl FitterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            font: config.icon_font.clone(),
            dimension: config.icon_dimension,
        }
    }
}

/// Builds fitters; swapped out in tests to avoid system fonts.
pub type FitterFactory =
    Box<dyn Fn(&FitterSettings) -> Result<GlyphFitter, RenderError> + Send + Sync>;

/// Factory resolving fonts against the installed system fonts.
pub fn system_fitters() -> FitterFactory {
    Box::new(|settings: &FitterSettings| {
        GlyphFitter::new(
            settings.charset.as_str(),
            settings.font.as_str(),
            settings.dimension,
            settings.dimension,
        )
    })
}

/// Presentation settings derived from the preferences.
#[derive(Debug, Clone, PartialEq)]
struct Appearance {
    mode: DisplayMode,
    badge_bg: IconColor,
    color: Rgba<u8>,
    margin: f32,
    fitter: FitterSettings,
}

impl Appearance {
    fn from_config(config: &Config) -> Self {
        Self {
            mode: config.display_mode,
            badge_bg: config.badge_bg,
            color: Rgba(config.icon_color.to_rgba()),
            margin: config.icon_margin_fraction(),
            fitter: FitterSettings::from_config(config),
        }
    }
}

pub struct Presenter {
    surface: Arc<dyn IconSurface>,
    factory: FitterFactory,
    capabilities: Capabilities,
    appearance: ArcSwapOption<Appearance>,
    fitter: ArcSwapOption<GlyphFitter>,
    /// Settings the current fitter was built from, even if building failed.
    fitter_settings: ArcSwapOption<FitterSettings>,
    /// Indicators written since the last reset.
    presented: Mutex<BTreeSet<ScopeKey>>,
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter")
            .field("appearance", &self.appearance.load_full())
            .field("fitter", &self.fitter.load_full())
            .field("presented", &*self.presented.lock())
            .finish_non_exhaustive()
    }
}

impl Presenter {
    /// Presenter with no appearance yet; call [`configure`](Self::configure)
    /// before presenting.
    pub fn new(surface: Arc<dyn IconSurface>, factory: FitterFactory) -> Self {
        Self {
            surface,
            factory,
            capabilities: Capabilities::default(),
            appearance: ArcSwapOption::empty(),
            fitter: ArcSwapOption::empty(),
            fitter_settings: ArcSwapOption::empty(),
            presented: Mutex::new(BTreeSet::new()),
        }
    }

    /// Host capabilities; decides how tab indicators are reset.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Apply preferences. Returns whether the display mode changed.
    pub fn configure(&self, config: &Config) -> bool {
        let next = Appearance::from_config(config);
        let previous = self.appearance.swap(Some(Arc::new(next.clone())));
        self.apply_appearance(previous.as_deref(), &next)
    }

    /// Reset every indicator presented so far, then apply `config` as if
    /// nothing had been shown yet. Used when the scope or display mode
    /// changes.
    pub fn reconfigure(&self, config: &Config) {
        self.clear_presented();
        let next = Appearance::from_config(config);
        self.appearance.store(Some(Arc::new(next.clone())));
        self.apply_appearance(None, &next);
    }

    fn apply_appearance(&self, previous: Option<&Appearance>, next: &Appearance) -> bool {
        let mode_changed = previous.is_none_or(|p| p.mode != next.mode);

        match next.mode {
            DisplayMode::Badge => {
                let bg_changed = previous.is_some_and(|p| p.badge_bg != next.badge_bg);
                if mode_changed || bg_changed {
                    self.report(
                        "set badge background",
                        self.surface.set_badge_background(next.badge_bg),
                    );
                }
            }
            DisplayMode::Icon => {
                let rebuilt = self.ensure_fitter(&next.fitter);
                if mode_changed {
                    self.report(
                        "clear badge text",
                        self.surface.set_badge_text(ScopeKey::Global, ""),
                    );
                }
                if mode_changed || rebuilt {
                    // Keeps the default icon from flashing on tabs not yet drawn.
                    let blank = RgbaImage::new(next.fitter.dimension, next.fitter.dimension);
                    let result = self.surface.set_icon(ScopeKey::Global, &blank);
                    if result.is_ok() {
                        self.presented.lock().insert(ScopeKey::Global);
                    }
                    self.report("set transparent icon", result);
                }
            }
        }
        if mode_changed {
            log::info!("Display mode: {:?}", next.mode);
        }
        mode_changed
    }

    /// Reset every key written under the current appearance.
    ///
    /// Tab indicators on hosts that cannot reset a single tab are blanked
    /// instead: empty badge text, or a transparent icon in icon mode.
    fn clear_presented(&self) {
        let keys = std::mem::take(&mut *self.presented.lock());
        if keys.is_empty() {
            return;
        }
        log::debug!("Resetting {} presented indicator(s)", keys.len());
        let appearance = self.appearance.load_full();
        for key in keys {
            let result = match (key, appearance.as_deref()) {
                (ScopeKey::Tab(_), Some(appearance)) if !self.capabilities.supports_tab_reset => {
                    match appearance.mode {
                        DisplayMode::Badge => self.surface.set_badge_text(key, ""),
                        DisplayMode::Icon => {
                            let size = appearance.fitter.dimension;
                            self.surface.set_icon(key, &RgbaImage::new(size, size))
                        }
                    }
                }
                _ => self.surface.reset(key),
            };
            self.report(&format!("reset {key:?}"), result);
        }
    }

    /// Stop tracking `key`, e.g. once its tab or window is gone.
    pub fn forget(&self, key: ScopeKey) {
        self.presented.lock().remove(&key);
    }

    /// Indicators written since the last reset.
    pub fn presented_keys(&self) -> Vec<ScopeKey> {
        self.presented.lock().iter().copied().collect()
    }

    /// Rebuild the fitter if `settings` differ from the current ones.
    /// Returns whether a rebuild was attempted.
    fn ensure_fitter(&self, settings: &FitterSettings) -> bool {
        if self.fitter_settings.load().as_deref() == Some(settings) {
            return false;
        }
        self.fitter_settings.store(Some(Arc::new(settings.clone())));
        match (self.factory)(settings) {
            Ok(fitter) => {
                log::info!(
                    "Icon fitter ready: {}px, font '{}', {:?}",
                    settings.dimension,
                    settings.font,
                    fitter.strategy()
                );
                self.fitter.store(Some(Arc::new(fitter)));
            }
            Err(e) => {
                log::warn!("Failed to build icon fitter for '{}': {}", settings.font, e);
                self.fitter.store(None);
            }
        }
        true
    }

    /// Push `update` to the surface. Failures are logged, never returned.
    pub fn present(&self, update: &CountUpdate) {
        if let Err(e) = self.try_present(update) {
            log::warn!("Failed to present counts for {:?}: {:#}", update.key, e);
        }
    }

    fn try_present(&self, update: &CountUpdate) -> anyhow::Result<()> {
        let appearance = self
            .appearance
            .load_full()
            .context("presenter has not been configured")?;
        self.show(&appearance, update)?;
        self.presented.lock().insert(update.key);
        Ok(())
    }

    fn show(&self, appearance: &Appearance, update: &CountUpdate) -> anyhow::Result<()> {
        match appearance.mode {
            DisplayMode::Badge => self
                .surface
                .set_badge_text(update.key, &update.counts.badge_text()),
            DisplayMode::Icon => {
                let fitter = self.fitter.load_full().context("no icon fitter available")?;
                let lines = update.counts.lines();
                let icon = fitter
                    .draw(lines.as_slice(), appearance.margin, appearance.color)
                    .with_context(|| format!("drawing {lines:?}"))?;
                self.surface.set_icon(update.key, &icon)
            }
        }
    }

    pub fn present_all(&self, updates: &[CountUpdate]) {
        for update in updates {
            self.present(update);
        }
    }

    /// Current fitter, if icon mode has built one.
    pub fn fitter(&self) -> Option<Arc<GlyphFitter>> {
        self.fitter.load_full()
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.appearance.load_full().map(|a| a.mode)
    }

    fn report(&self, action: &str, result: anyhow::Result<()>) {
        if let Err(e) = result {
            log::warn!("Failed to {}: {:#}", action, e);
        }
    }
}
