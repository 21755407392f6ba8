//! Tab bookkeeping and count updates.
//!
//! [`TabCounter`] mirrors the host's tabs per window from [`TabEvent`]s and
//! reports which indicators need new counts after each event. Where an
//! update goes depends on the scope and on whether the host accepts window
//! ids; see [`ScopeKey`].

use std::collections::{BTreeMap, BTreeSet};

use tab_tally_config::Scope;

use crate::capabilities::Capabilities;

pub type TabId = u64;
pub type WindowId = u64;

/// One tab as reported by the initial host query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub window: WindowId,
    pub active: bool,
}

/// Tab lifecycle notifications from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created {
        tab: TabId,
        window: WindowId,
        active: bool,
    },
    Removed {
        tab: TabId,
        window: WindowId,
    },
    Activated {
        tab: TabId,
        window: WindowId,
    },
    /// Tab moved into `window`.
    Attached {
        tab: TabId,
        window: WindowId,
    },
    /// Tab moved out of `window`.
    Detached {
        tab: TabId,
        window: WindowId,
    },
    WindowRemoved {
        window: WindowId,
    },
}

/// Which indicator a count belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKey {
    /// The browser-wide indicator.
    Global,
    /// One window's indicator.
    Window(WindowId),
    /// One tab's indicator, used for per-window counts on hosts without
    /// window ids. Only the active tab of a window is kept current.
    Tab(TabId),
}

/// Counts shown by one indicator, top line first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTuple(Vec<usize>);

impl CountTuple {
    pub fn single(count: usize) -> Self {
        Self(vec![count])
    }

    /// Window count over the grand total.
    pub fn pair(in_window: usize, total: usize) -> Self {
        Self(vec![in_window, total])
    }

    pub fn counts(&self) -> &[usize] {
        &self.0
    }

    /// One string per icon line.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(usize::to_string).collect()
    }

    /// Counts joined for a badge (`"3/15"`).
    pub fn badge_text(&self) -> String {
        self.lines().join("/")
    }
}

/// New counts for one indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUpdate {
    pub key: ScopeKey,
    pub counts: CountTuple,
}

#[derive(Debug, Default)]
struct WindowTabs {
    tabs: BTreeSet<TabId>,
    active: Option<TabId>,
}

/// Tabs per window and the updates their changes produce.
#[derive(Debug)]
pub struct TabCounter {
    scope: Scope,
    window_ids: bool,
    windows: BTreeMap<WindowId, WindowTabs>,
    /// Detached tabs not yet attached elsewhere. They still count.
    in_transit: BTreeSet<TabId>,
    /// Total last reported, used to skip no-op global refreshes.
    last_total: Option<usize>,
}

impl TabCounter {
    pub fn new(scope: Scope, capabilities: Capabilities) -> Self {
        Self {
            scope,
            window_ids: capabilities.supports_window_id,
            windows: BTreeMap::new(),
            in_transit: BTreeSet::new(),
            last_total: None,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Switch scope, keeping the tab state. Callers follow up with
    /// [`snapshot`](Self::snapshot).
    pub fn set_scope(&mut self, scope: Scope) {
        if self.scope != scope {
            log::info!("Counting scope {:?} -> {:?}", self.scope, scope);
            self.scope = scope;
            self.last_total = None;
        }
    }

    /// Replace all state with the result of a host tab query.
    pub fn seed(&mut self, tabs: &[TabInfo]) -> Vec<CountUpdate> {
        self.windows.clear();
        self.in_transit.clear();
        for tab in tabs {
            self.insert(tab.id, tab.window, tab.active);
        }
        log::info!(
            "Seeded {} tab(s) in {} window(s)",
            tabs.len(),
            self.windows.len()
        );
        self.snapshot()
    }

    /// Updates for every indicator the current scope shows.
    pub fn snapshot(&mut self) -> Vec<CountUpdate> {
        let total = self.total();
        self.last_total = Some(total);
        match self.scope {
            Scope::Global => vec![CountUpdate {
                key: ScopeKey::Global,
                counts: CountTuple::single(total),
            }],
            Scope::Window | Scope::Both => {
                let windows: Vec<WindowId> = self.windows.keys().copied().collect();
                windows
                    .into_iter()
                    .filter_map(|window| self.window_update(window, total))
                    .collect()
            }
        }
    }

    /// Apply `event` and return the indicators that need new counts.
    pub fn apply(&mut self, event: TabEvent) -> Vec<CountUpdate> {
        log::trace!("Tab event: {:?}", event);
        let touched: Vec<WindowId> = match event {
            TabEvent::Created { tab, window, active } => {
                self.insert(tab, window, active);
                vec![window]
            }
            TabEvent::Removed { tab, window } => {
                self.remove(tab, window);
                vec![window]
            }
            TabEvent::Activated { tab, window } => {
                let entry = self.windows.entry(window).or_default();
                entry.tabs.insert(tab);
                entry.active = Some(tab);
                vec![window]
            }
            TabEvent::Attached { tab, window } => {
                self.insert(tab, window, false);
                vec![window]
            }
            TabEvent::Detached { tab, window } => {
                self.remove(tab, window);
                self.in_transit.insert(tab);
                vec![window]
            }
            TabEvent::WindowRemoved { window } => {
                self.windows.remove(&window);
                Vec::new()
            }
        };
        self.updates_for(&touched)
    }

    /// Tabs across all windows, including tabs being moved.
    pub fn total(&self) -> usize {
        self.windows.values().map(|w| w.tabs.len()).sum::<usize>() + self.in_transit.len()
    }

    /// Tabs in `window`, 0 if unknown.
    pub fn window_count(&self, window: WindowId) -> usize {
        self.windows.get(&window).map_or(0, |w| w.tabs.len())
    }

    pub fn window_count_all(&self) -> usize {
        self.windows.len()
    }

    pub fn active_tab(&self, window: WindowId) -> Option<TabId> {
        self.windows.get(&window).and_then(|w| w.active)
    }

    fn insert(&mut self, tab: TabId, window: WindowId, active: bool) {
        // A tab lives in one window at a time.
        self.in_transit.remove(&tab);
        for (id, other) in self.windows.iter_mut() {
            if *id != window && other.tabs.remove(&tab) && other.active == Some(tab) {
                other.active = None;
            }
        }
        let entry = self.windows.entry(window).or_default();
        entry.tabs.insert(tab);
        if active {
            entry.active = Some(tab);
        }
    }

    fn remove(&mut self, tab: TabId, window: WindowId) {
        self.in_transit.remove(&tab);
        let Some(entry) = self.windows.get_mut(&window) else {
            return;
        };
        entry.tabs.remove(&tab);
        if entry.active == Some(tab) {
            entry.active = None;
        }
        if entry.tabs.is_empty() {
            self.windows.remove(&window);
        }
    }

    fn updates_for(&mut self, touched: &[WindowId]) -> Vec<CountUpdate> {
        let total = self.total();
        let total_changed = self.last_total != Some(total);
        self.last_total = Some(total);

        match self.scope {
            Scope::Global => {
                if !total_changed {
                    return Vec::new();
                }
                vec![CountUpdate {
                    key: ScopeKey::Global,
                    counts: CountTuple::single(total),
                }]
            }
            Scope::Window => touched
                .iter()
                .filter_map(|&window| self.window_update(window, total))
                .collect(),
            // Every window shows the total, so a changed total refreshes all.
            Scope::Both if total_changed => {
                let windows: Vec<WindowId> = self.windows.keys().copied().collect();
                windows
                    .into_iter()
                    .filter_map(|window| self.window_update(window, total))
                    .collect()
            }
            Scope::Both => touched
                .iter()
                .filter_map(|&window| self.window_update(window, total))
                .collect(),
        }
    }

    fn window_update(&self, window: WindowId, total: usize) -> Option<CountUpdate> {
        let entry = self.windows.get(&window)?;
        let key = if self.window_ids {
            ScopeKey::Window(window)
        } else {
            // Without window ids only a tab can be addressed.
            ScopeKey::Tab(entry.active?)
        };
        let in_window = entry.tabs.len();
        let counts = match self.scope {
            Scope::Both => CountTuple::pair(in_window, total),
            Scope::Global | Scope::Window => CountTuple::single(in_window),
        };
        Some(CountUpdate { key, counts })
    }
}
