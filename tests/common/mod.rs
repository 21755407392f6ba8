//! Shared integration test helpers for tab-tally.
//!
//! ```ignore
//! mod common;
//! use common::{RecordingSurface, block_factory};
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use image::RgbaImage;
use parking_lot::Mutex;
use tab_tally::config::IconColor;
use tab_tally::render::GlyphFitter;
use tab_tally::render::testing::BlockRenderer;
use tab_tally::{FitterFactory, FitterSettings, IconSurface, ScopeKey};

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    BadgeText { key: ScopeKey, text: String },
    BadgeBackground(IconColor),
    Icon { key: ScopeKey, image: RgbaImage },
    Reset(ScopeKey),
}

/// Surface that records every call, optionally failing them all.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    failing: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    pub fn take_calls(&self) -> Vec<SurfaceCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Keys and images of recorded icon calls.
    pub fn icons(&self) -> Vec<(ScopeKey, RgbaImage)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Icon { key, image } => Some((key, image)),
                _ => None,
            })
            .collect()
    }

    /// Keys and texts of recorded badge text calls.
    pub fn badges(&self) -> Vec<(ScopeKey, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::BadgeText { key, text } => Some((key, text)),
                _ => None,
            })
            .collect()
    }

    /// Keys of recorded reset calls.
    pub fn resets(&self) -> Vec<ScopeKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Reset(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SurfaceCall) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("surface unavailable");
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl IconSurface for RecordingSurface {
    fn set_badge_text(&self, key: ScopeKey, text: &str) -> anyhow::Result<()> {
        self.record(SurfaceCall::BadgeText {
            key,
            text: text.to_string(),
        })
    }

    fn set_badge_background(&self, color: IconColor) -> anyhow::Result<()> {
        self.record(SurfaceCall::BadgeBackground(color))
    }

    fn set_icon(&self, key: ScopeKey, icon: &RgbaImage) -> anyhow::Result<()> {
        self.record(SurfaceCall::Icon {
            key,
            image: icon.clone(),
        })
    }

    fn reset(&self, key: ScopeKey) -> anyhow::Result<()> {
        self.record(SurfaceCall::Reset(key))
    }
}

/// Factory building fitters over `renderer`, counting how often it runs.
pub fn block_factory(renderer: Arc<BlockRenderer>) -> (FitterFactory, Arc<AtomicUsize>) {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let factory: FitterFactory = Box::new(move |settings: &FitterSettings| {
        counter.fetch_add(1, Ordering::SeqCst);
        GlyphFitter::with_renderer(
            settings.charset.clone(),
            settings.font.clone(),
            settings.dimension,
            settings.dimension,
            renderer.clone(),
        )
    });
    (factory, builds)
}

/// Whether any pixel of `image` has ink.
pub fn has_ink(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p[3] != 0)
}
