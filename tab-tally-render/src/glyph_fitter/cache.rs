//! Bounded cache of fit results keyed by quantized line height.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use super::FitConfig;

/// Fit results kept per fitter. Icons use at most a handful of distinct
/// line heights, one per line count.
pub const FIT_CACHE_CAPACITY: usize = 16;

/// Line heights are fitted and cached at 1/1000 px resolution.
const KEY_SCALE: f64 = 1000.0;

/// A line height rounded to 1/1000 px, so float jitter in the layout
/// arithmetic maps to the same cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHeightKey(i64);

impl LineHeightKey {
    pub fn quantize(line_height: f32) -> Self {
        Self((line_height as f64 * KEY_SCALE).round() as i64)
    }

    /// The quantized line height in pixels.
    pub fn line_height(self) -> f32 {
        (self.0 as f64 / KEY_SCALE) as f32
    }
}

pub(crate) struct FitCache {
    entries: Mutex<LruCache<LineHeightKey, FitConfig>>,
}

impl FitCache {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached config for `key`, or the result of `fit` stored under it.
    ///
    /// The lock is held while fitting, so concurrent callers for the same
    /// height fit once. Errors are returned without being cached.
    pub(crate) fn get_or_fit<E>(
        &self,
        key: LineHeightKey,
        fit: impl FnOnce() -> Result<FitConfig, E>,
    ) -> Result<FitConfig, E> {
        let mut entries = self.entries.lock();
        if let Some(config) = entries.get(&key) {
            return Ok(*config);
        }
        let config = fit()?;
        entries.put(key, config);
        Ok(config)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
