//! End-to-end flow: tab events and preference changes through TallyApp.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{RecordingSurface, SurfaceCall, block_factory, has_ink};
use tab_tally::config::{Config, DisplayMode, IconColor, PreferenceStore, Scope};
use tab_tally::render::testing::BlockRenderer;
use tab_tally::{AppEvent, Capabilities, ScopeKey, TabEvent, TabInfo, TallyApp, forward_preferences};
use tokio::sync::mpsc;

fn windowed() -> Capabilities {
    Capabilities {
        supports_window_id: true,
        supports_tab_reset: true,
    }
}

/// Host addressing tabs only, optionally able to reset one.
fn tabs_only(supports_tab_reset: bool) -> Capabilities {
    Capabilities {
        supports_window_id: false,
        supports_tab_reset,
    }
}

fn seed() -> Vec<TabInfo> {
    vec![
        TabInfo { id: 1, window: 1, active: true },
        TabInfo { id: 2, window: 1, active: false },
        TabInfo { id: 3, window: 2, active: true },
    ]
}

fn app(config: Config) -> (TallyApp, Arc<PreferenceStore>, Arc<RecordingSurface>) {
    app_with(config, windowed())
}

fn app_with(
    config: Config,
    capabilities: Capabilities,
) -> (TallyApp, Arc<PreferenceStore>, Arc<RecordingSurface>) {
    let store = Arc::new(PreferenceStore::new(config));
    let surface = RecordingSurface::new();
    let (factory, _) = block_factory(Arc::new(BlockRenderer::new()));
    let app = TallyApp::with_factory(store.clone(), surface.clone(), capabilities, factory);
    (app, store, surface)
}

fn badge_config() -> Config {
    Config::default().with_display_mode(DisplayMode::Badge)
}

/// Last badge text per key, in call order.
fn last_badges(surface: &RecordingSurface) -> BTreeMap<ScopeKey, String> {
    let mut last = BTreeMap::new();
    for call in surface.calls() {
        match call {
            SurfaceCall::BadgeText { key, text } => {
                last.insert(key, text);
            }
            SurfaceCall::Reset(key) => {
                last.remove(&key);
            }
            _ => {}
        }
    }
    last
}

#[tokio::test]
async fn test_run_processes_events_until_channel_closes() {
    let (mut app, _, surface) = app(Config::default());
    surface.take_calls();
    let (tx, rx) = mpsc::channel(16);

    tx.send(AppEvent::Seed(seed())).await.unwrap();
    tx.send(AppEvent::Tab(TabEvent::Created { tab: 4, window: 2, active: false }))
        .await
        .unwrap();
    drop(tx);
    app.run(rx).await;

    let keys: Vec<ScopeKey> = surface.icons().into_iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        vec![ScopeKey::Window(1), ScopeKey::Window(2), ScopeKey::Window(2)]
    );
    assert!(surface.icons().iter().all(|(_, icon)| has_ink(icon)));
    assert_eq!(app.counter().window_count(2), 2);
}

#[test]
fn test_badge_mode_switch_resets_presentation() {
    let (mut app, store, surface) = app(Config::default());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("displayMode", "badge").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));

    // Glyph icons drawn in icon mode are dropped before the badges go out.
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Reset(ScopeKey::Global),
            SurfaceCall::Reset(ScopeKey::Window(1)),
            SurfaceCall::Reset(ScopeKey::Window(2)),
            SurfaceCall::BadgeBackground(IconColor::rgb(0x21, 0x21, 0x21)),
            SurfaceCall::BadgeText { key: ScopeKey::Window(1), text: "2".into() },
            SurfaceCall::BadgeText { key: ScopeKey::Window(2), text: "1".into() },
        ]
    );
    assert!(surface.icons().is_empty());
}

#[test]
fn test_icon_mode_switch_resets_window_badges() {
    let (mut app, store, surface) = app(badge_config());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("displayMode", "icon").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));

    assert_eq!(
        surface.resets(),
        vec![ScopeKey::Window(1), ScopeKey::Window(2)]
    );
    let keys: Vec<ScopeKey> = surface.icons().into_iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        vec![ScopeKey::Global, ScopeKey::Window(1), ScopeKey::Window(2)]
    );
    assert!(last_badges(&surface).values().all(String::is_empty));
}

#[test]
fn test_global_scope_drops_window_counts() {
    let (mut app, store, surface) = app(badge_config());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));

    store.set("scope", "global").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));

    let expected: BTreeMap<ScopeKey, String> = [(ScopeKey::Global, "3".to_string())].into();
    assert_eq!(last_badges(&surface), expected);
    assert_eq!(app.presenter().presented_keys(), vec![ScopeKey::Global]);
}

#[test]
fn test_tab_badges_blanked_without_tab_reset() {
    let (mut app, store, surface) = app_with(badge_config(), tabs_only(false));
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("scope", "global").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));

    assert!(surface.resets().is_empty());
    assert_eq!(
        surface.badges(),
        vec![
            (ScopeKey::Tab(1), String::new()),
            (ScopeKey::Tab(3), String::new()),
            (ScopeKey::Global, "3".to_string()),
        ]
    );
}

#[test]
fn test_tab_badges_reset_when_supported() {
    let (mut app, store, surface) = app_with(badge_config(), tabs_only(true));
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("scope", "global").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));

    assert_eq!(surface.resets(), vec![ScopeKey::Tab(1), ScopeKey::Tab(3)]);
    assert_eq!(surface.badges(), vec![(ScopeKey::Global, "3".to_string())]);
}

#[test]
fn test_closed_windows_are_not_reset() {
    let (mut app, store, surface) = app(badge_config());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    app.handle(AppEvent::Tab(TabEvent::Removed { tab: 3, window: 2 }));
    app.handle(AppEvent::Tab(TabEvent::WindowRemoved { window: 2 }));
    surface.take_calls();

    store.set("scope", "global").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));
    assert_eq!(surface.resets(), vec![ScopeKey::Window(1)]);
}

#[test]
fn test_scope_change_re_emits_snapshot() {
    let (mut app, store, surface) = app(badge_config());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("scope", "global").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));
    assert_eq!(app.counter().scope(), Scope::Global);
    assert_eq!(surface.badges(), vec![(ScopeKey::Global, "3".to_string())]);

    surface.take_calls();
    store.set("scope", "both").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));
    assert_eq!(
        surface.badges(),
        vec![
            (ScopeKey::Window(1), "2/3".to_string()),
            (ScopeKey::Window(2), "1/3".to_string()),
        ]
    );
}

#[test]
fn test_icon_setting_change_redraws() {
    let (mut app, store, surface) = app(Config::default());
    let changes = store.subscribe();
    app.handle(AppEvent::Seed(seed()));
    surface.take_calls();

    store.set("iconMargin", "10").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));
    assert_eq!(surface.icons().len(), 2);
    assert_eq!(app.presenter().fitter().unwrap().cached_configs(), 2);
}

#[tokio::test]
async fn test_forwarded_preferences_reach_the_app() {
    let (mut app, store, surface) = app(Config::default());
    app.handle(AppEvent::Seed(seed()));
    let (tx, mut rx) = mpsc::channel(4);
    let _forwarder = forward_preferences(&store, tx).unwrap();

    store.set("iconColor", "#ff0000").unwrap();
    let event = rx.recv().await.expect("forwarded change");
    assert!(matches!(
        &event,
        AppEvent::PreferencesChanged(change) if change.touches("iconColor")
    ));

    surface.take_calls();
    app.handle(event);
    let icons = surface.icons();
    assert_eq!(icons.len(), 2);
    assert!(icons[0].1.pixels().any(|p| p.0 == [255, 0, 0, 255]));
}

#[test]
fn test_file_backed_preferences_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("preferences.yaml");

    let store = Arc::new(PreferenceStore::open(&path).unwrap());
    let surface = RecordingSurface::new();
    let (factory, _) = block_factory(Arc::new(BlockRenderer::new()));
    let mut app = TallyApp::with_factory(store.clone(), surface, windowed(), factory);
    let changes = store.subscribe();
    store.set("scope", "both").unwrap();
    app.handle(AppEvent::PreferencesChanged(changes.try_recv().unwrap()));
    assert_eq!(app.counter().scope(), Scope::Both);

    let reopened = PreferenceStore::open(&path).unwrap();
    assert_eq!(reopened.get().scope, Scope::Both);
}
