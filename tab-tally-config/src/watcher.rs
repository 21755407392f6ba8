//! Preferences file watcher.
//!
//! Edits made to `preferences.yaml` outside the running process (by hand,
//! or by another instance) are picked up here and fed back into a
//! [`PreferenceStore`], which then notifies its subscribers like any other
//! change. Bursts of events from editors that save in several steps are
//! debounced.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::store::PreferenceStore;

/// Poll interval used when the native backend is unavailable.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The watched preferences file changed on disk.
#[derive(Debug, Clone)]
pub struct PreferencesReloadEvent {
    pub path: PathBuf,
}

/// Filters raw notify events down to debounced reload events for one file.
#[derive(Clone)]
struct ReloadFilter {
    file_name: OsString,
    path: PathBuf,
    debounce: Duration,
    last_sent: Arc<Mutex<Option<Instant>>>,
    tx: Sender<PreferencesReloadEvent>,
}

impl ReloadFilter {
    fn handle(&self, result: std::result::Result<Event, notify::Error>) {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Preferences watcher error: {}", e);
                return;
            }
        };
        // Create covers editors that save by rename.
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        if !event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
        {
            return;
        }

        let now = Instant::now();
        {
            let mut last = self.last_sent.lock();
            if (*last).is_some_and(|t| now.duration_since(t) < self.debounce) {
                log::trace!("Debouncing preferences reload");
                return;
            }
            *last = Some(now);
        }

        log::info!("Preferences file changed: {}", self.path.display());
        if let Err(e) = self.tx.send(PreferencesReloadEvent {
            path: self.path.clone(),
        }) {
            log::error!("Failed to send preferences reload event: {}", e);
        }
    }
}

/// Watches the preferences file and reports changes.
pub struct PreferencesWatcher {
    /// Kept alive for as long as watching should continue.
    _watcher: Box<dyn Watcher + Send>,
    events: Receiver<PreferencesReloadEvent>,
    path: PathBuf,
}

impl std::fmt::Debug for PreferencesWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesWatcher")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PreferencesWatcher {
    /// Start watching `path`. The file must already exist.
    ///
    /// Uses the platform's native backend and falls back to polling when it
    /// cannot be initialised (containers, network filesystems).
    pub fn new(path: &Path, debounce_ms: u64) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Preferences file not found: {}", path.display()),
            )));
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let (file_name, parent) = match (canonical.file_name(), canonical.parent()) {
            (Some(name), Some(parent)) => (name.to_os_string(), parent.to_path_buf()),
            _ => {
                return Err(ConfigError::Validation(format!(
                    "Preferences path has no file name or parent: {}",
                    canonical.display()
                )));
            }
        };

        let (tx, rx) = channel();
        let filter = ReloadFilter {
            file_name,
            path: canonical.clone(),
            debounce: Duration::from_millis(debounce_ms),
            last_sent: Arc::new(Mutex::new(None)),
            tx,
        };

        let mut watcher = Self::create_watcher(filter)?;
        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
        log::info!("Watching preferences at {}", canonical.display());

        Ok(Self {
            _watcher: watcher,
            events: rx,
            path: canonical,
        })
    }

    fn create_watcher(filter: ReloadFilter) -> Result<Box<dyn Watcher + Send>> {
        let native_filter = filter.clone();
        match notify::recommended_watcher(move |res: notify::Result<Event>| {
            native_filter.handle(res)
        }) {
            Ok(w) => {
                log::debug!("Preferences watcher: native backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Preferences watcher: native backend unavailable ({}); polling instead",
                    e
                );
                let poll = PollWatcher::new(
                    move |res: notify::Result<Event>| filter.handle(res),
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
                Ok(Box::new(poll))
            }
        }
    }

    /// Path being watched (canonicalised).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next pending reload event, without blocking.
    pub fn try_recv(&self) -> Option<PreferencesReloadEvent> {
        self.events.try_recv().ok()
    }

    /// Drain pending events and, if there were any, reload the file into
    /// `store`. Returns whether the store changed.
    ///
    /// A file that fails to parse is logged and ignored; the store keeps its
    /// last good state.
    pub fn apply_pending(&self, store: &PreferenceStore) -> bool {
        let mut pending = false;
        while self.try_recv().is_some() {
            pending = true;
        }
        if !pending {
            return false;
        }
        let reloaded = std::fs::read_to_string(&self.path)
            .map_err(ConfigError::from)
            .and_then(|contents| Config::from_yaml(&contents));
        match reloaded {
            Ok((config, _)) => match store.replace(config) {
                Ok(changed) => changed,
                Err(e) => {
                    log::warn!("Reloaded preferences rejected: {}", e);
                    false
                }
            },
            Err(e) => {
                log::warn!("Failed to reload preferences: {}", e);
                false
            }
        }
    }
}
