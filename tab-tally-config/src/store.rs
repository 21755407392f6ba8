//! Flat key/value preference store with change notification.
//!
//! The store holds one validated [`Config`]. Writes go through the flat
//! key names (`iconFont`, `iconMargin`, ...) so callers can forward form
//! values without knowing the struct layout. Every accepted change is
//! broadcast to all live subscribers.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Notification sent to subscribers after a successful change.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceChange {
    /// Keys whose values actually changed.
    pub changed_keys: Vec<&'static str>,
    /// Full config after the change.
    pub config: Config,
}

impl PreferenceChange {
    pub fn touches(&self, key: &str) -> bool {
        self.changed_keys.iter().any(|k| *k == key)
    }
}

/// Shared preference store.
pub struct PreferenceStore {
    config: RwLock<Config>,
    subscribers: Mutex<Vec<Sender<PreferenceChange>>>,
    /// File the store persists to after each change, if any.
    path: Option<PathBuf>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("config", &*self.config.read())
            .field("subscribers", &self.subscribers.lock().len())
            .field("path", &self.path)
            .finish()
    }
}

impl PreferenceStore {
    /// In-memory store seeded with `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            subscribers: Mutex::new(Vec::new()),
            path: None,
        }
    }

    /// Store backed by the YAML file at `path`; loads it (or creates it with
    /// defaults) and saves after every accepted change.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self {
            config: RwLock::new(config),
            subscribers: Mutex::new(Vec::new()),
            path: Some(path),
        })
    }

    /// Snapshot of the current preferences.
    pub fn get(&self) -> Config {
        self.config.read().clone()
    }

    /// Current value of one key, or `None` if the key is unknown.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        let config = self.config.read();
        match serde_json::to_value(&*config) {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    /// Set a single key. Returns whether the value changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool> {
        self.set_many([(key, value.into())])
    }

    /// Set several keys at once; either all are applied or none.
    pub fn set_many<'a, I>(&self, pairs: I) -> Result<bool>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let current = self.get();
        let mut map = match serde_json::to_value(&current) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(source) => {
                return Err(ConfigError::InvalidValue {
                    key: String::new(),
                    source,
                });
            }
        };
        for (key, value) in pairs {
            if !Config::KEYS.contains(&key) {
                return Err(ConfigError::UnknownKey(key.to_string()));
            }
            // Convert each key on its own first so the error names it.
            let mut single = Map::new();
            single.insert(key.to_string(), value.clone());
            serde_json::from_value::<Config>(Value::Object(single)).map_err(|source| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    source,
                }
            })?;
            map.insert(key.to_string(), value);
        }
        let updated: Config =
            serde_json::from_value(Value::Object(map)).map_err(|source| {
                ConfigError::InvalidValue {
                    key: String::new(),
                    source,
                }
            })?;
        self.replace(updated)
    }

    /// Replace the whole config. Returns whether anything changed.
    pub fn replace(&self, updated: Config) -> Result<bool> {
        updated.validate()?;
        let changed_keys = {
            let mut config = self.config.write();
            let changed_keys = config.diff_keys(&updated);
            if changed_keys.is_empty() {
                return Ok(false);
            }
            *config = updated.clone();
            changed_keys
        };

        if let Some(path) = &self.path
            && let Err(e) = updated.save_to(path)
        {
            log::warn!("Failed to persist preferences to {:?}: {}", path, e);
        }

        log::info!("Preferences changed: {}", changed_keys.join(", "));
        self.notify(PreferenceChange {
            changed_keys,
            config: updated,
        });
        Ok(true)
    }

    /// Register for change notifications. Dropping the receiver
    /// unsubscribes on the next change.
    pub fn subscribe(&self) -> Receiver<PreferenceChange> {
        let (tx, rx) = channel();
        self.subscribers.lock().push(tx);
        rx
    }

    fn notify(&self, change: PreferenceChange) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
        log::debug!("Notified {} preference subscriber(s)", subscribers.len());
    }
}
