//! Event loop wiring tab events and preference changes to the presenter.

use std::sync::Arc;
use std::thread::JoinHandle;

use tab_tally_config::{PreferenceChange, PreferenceStore};
use tokio::sync::mpsc;

use crate::capabilities::Capabilities;
use crate::presenter::{FitterFactory, IconSurface, Presenter, system_fitters};
use crate::tab_counter::{ScopeKey, TabCounter, TabEvent, TabInfo};

/// Preference keys that only affect how counts are drawn.
const APPEARANCE_KEYS: &[&str] = &["badgeBg", "iconDimension", "iconFont", "iconColor", "iconMargin"];

/// Input to [`TallyApp`].
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Initial host tab query result; replaces all tab state.
    Seed(Vec<TabInfo>),
    Tab(TabEvent),
    PreferencesChanged(PreferenceChange),
}

/// Tab counter, presenter and preferences tied together.
#[derive(Debug)]
pub struct TallyApp {
    store: Arc<PreferenceStore>,
    counter: TabCounter,
    presenter: Presenter,
    capabilities: Capabilities,
}

impl TallyApp {
    /// App drawing icons with the installed system fonts.
    pub fn new(
        store: Arc<PreferenceStore>,
        surface: Arc<dyn IconSurface>,
        capabilities: Capabilities,
    ) -> Self {
        Self::with_factory(store, surface, capabilities, system_fitters())
    }

    pub fn with_factory(
        store: Arc<PreferenceStore>,
        surface: Arc<dyn IconSurface>,
        capabilities: Capabilities,
        factory: FitterFactory,
    ) -> Self {
        let config = store.get();
        let presenter = Presenter::new(surface, factory).with_capabilities(capabilities);
        presenter.configure(&config);
        Self {
            counter: TabCounter::new(config.scope, capabilities),
            store,
            presenter,
            capabilities,
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Seed(tabs) => {
                let updates = self.counter.seed(&tabs);
                self.presenter.present_all(&updates);
            }
            AppEvent::Tab(event) => {
                match event {
                    TabEvent::Removed { tab, .. } => self.presenter.forget(ScopeKey::Tab(tab)),
                    TabEvent::WindowRemoved { window } => {
                        self.presenter.forget(ScopeKey::Window(window))
                    }
                    _ => {}
                }
                let updates = self.counter.apply(event);
                self.presenter.present_all(&updates);
            }
            AppEvent::PreferencesChanged(change) => self.apply_preferences(&change),
        }
    }

    fn apply_preferences(&mut self, change: &PreferenceChange) {
        let config = &change.config;
        if change.touches("scope") || change.touches("displayMode") {
            log::info!("Resetting presentation: {}", change.changed_keys.join(", "));
            self.counter.set_scope(config.scope);
            self.presenter.reconfigure(config);
        } else if APPEARANCE_KEYS.iter().any(|key| change.touches(key)) {
            self.presenter.configure(config);
        } else {
            return;
        }
        let updates = self.counter.snapshot();
        self.presenter.present_all(&updates);
    }

    /// Process events until every sender is dropped.
    pub async fn run(&mut self, mut events: mpsc::Receiver<AppEvent>) {
        log::info!("Tab counter running");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        log::info!("Event channel closed, tab counter stopping");
    }

    pub fn counter(&self) -> &TabCounter {
        &self.counter
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.store
    }
}

/// Forward `store` change notifications into the app's channel from a
/// background thread. The thread ends once the store or the channel is
/// dropped.
pub fn forward_preferences(
    store: &PreferenceStore,
    sender: mpsc::Sender<AppEvent>,
) -> anyhow::Result<JoinHandle<()>> {
    let changes = store.subscribe();
    let handle = std::thread::Builder::new()
        .name("tab-tally-preferences".into())
        .spawn(move || {
            while let Ok(change) = changes.recv() {
                if sender
                    .blocking_send(AppEvent::PreferencesChanged(change))
                    .is_err()
                {
                    log::debug!("App channel closed, stopping preference forwarding");
                    break;
                }
            }
        })?;
    Ok(handle)
}
