use super::*;
use crate::kernel::services::ports::settings::DEFAULT_DB_FILE_NAME;
use crate::kernel::test_support::{FakeHost, MemoryStore};
use std::time::Duration;

fn engine_with(store: &MemoryStore, t0: Instant) -> Engine {
    Engine::new(Settings::default(), Box::new(store.clone()), t0)
}

fn open(engine: &mut Engine, host: &mut FakeHost, now: Instant) -> DispatchResult {
    let mut result = engine.dispatch(Action::FileOpen, &*host, now);
    let settle = engine.settings().settle_delay();
    result.merge(engine.tick(&*host, now + settle));
    result.merge(engine.tick(&*host, now + settle + Duration::from_millis(10)));
    for effect in &result.effects {
        effect.apply(host);
    }
    result
}

#[test]
fn new_engine_loads_store_and_starts_clean() {
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":3.0}}"#);
    let engine = engine_with(&store, Instant::now());

    assert_eq!(engine.cache().len(), 1);
    assert_eq!(engine.shadow(), engine.cache());
    assert!(!engine.is_stopped());
}

#[test]
fn open_restores_saved_scroll() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"notes/a.md":{"scroll":12.5}}"#);
    let mut engine = engine_with(&store, t0);
    let mut host = FakeHost::showing("notes/a.md");

    let result = open(&mut engine, &mut host, t0);

    assert_eq!(
        result.effects,
        vec![Effect::SetScroll {
            path: "notes/a.md".to_string(),
            scroll: 12.5,
        }]
    );
    assert_eq!(host.applied, vec![("notes/a.md".to_string(), 12.5)]);
}

#[test]
fn zero_delay_restore_advances_during_dispatch() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":1.0}}"#);
    let settings = Settings {
        delay_after_file_opening: 0,
        ..Settings::default()
    };
    let mut engine = Engine::new(settings, Box::new(store.clone()), t0);
    let host = FakeHost::showing("a.md");

    let result = engine.dispatch(Action::LayoutReady, &host, t0);

    assert!(result.effects.is_empty());
    assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_millis(10)));
}

#[test]
fn scroll_change_is_recorded_after_debounce() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"notes/a.md":{"scroll":12.5}}"#);
    let mut engine = engine_with(&store, t0);
    let mut host = FakeHost::showing("notes/a.md");
    open(&mut engine, &mut host, t0);

    let t1 = t0 + Duration::from_secs(1);
    host.scroll = Some(40.0);
    engine.dispatch(Action::Scroll, &host, t1);
    engine.dispatch(Action::Wheel, &host, t1 + Duration::from_millis(20));

    assert!(!engine.tick(&host, t1 + Duration::from_millis(50)).state_changed);
    let result = engine.tick(&host, t1 + Duration::from_millis(70));

    assert!(result.state_changed);
    assert_eq!(
        engine.cache().get("notes/a.md").and_then(|s| s.scroll),
        Some(40.0)
    );
}

#[test]
fn first_evaluation_without_saved_state_only_adopts_baseline() {
    let t0 = Instant::now();
    let store = MemoryStore::default();
    let mut engine = engine_with(&store, t0);
    let mut host = FakeHost::showing("fresh.md");
    engine.dispatch(Action::FileOpen, &host, t0);

    host.scroll = Some(30.0);
    engine.dispatch(Action::Key("PageDown".to_string()), &host, t0);
    assert!(!engine.tick(&host, t0 + Duration::from_millis(10)).state_changed);
    assert!(engine.cache().is_empty());

    host.scroll = Some(60.0);
    engine.dispatch(Action::Key("PageDown".to_string()), &host, t0 + Duration::from_millis(20));
    assert!(engine.tick(&host, t0 + Duration::from_millis(30)).state_changed);
    assert_eq!(engine.cache().get("fresh.md").and_then(|s| s.scroll), Some(60.0));
}

#[test]
fn periodic_flush_writes_changes() {
    let t0 = Instant::now();
    let store = MemoryStore::default();
    let mut engine = engine_with(&store, t0);
    let mut host = FakeHost::showing("a.md");
    engine.dispatch(Action::FileOpen, &host, t0);
    engine.dispatch(Action::Scroll, &host, t0);
    engine.tick(&host, t0 + Duration::from_millis(50));
    host.scroll = Some(8.0);
    engine.dispatch(Action::Scroll, &host, t0 + Duration::from_millis(100));
    engine.tick(&host, t0 + Duration::from_millis(150));

    engine.tick(&host, t0 + Duration::from_millis(4999));
    assert_eq!(store.writes(), 0);
    engine.tick(&host, t0 + Duration::from_secs(5));

    assert_eq!(store.file(DEFAULT_DB_FILE_NAME).as_deref(), Some(r#"{"a.md":{"scroll":8.0}}"#));
    engine.tick(&host, t0 + Duration::from_secs(10));
    assert_eq!(store.writes(), 1);
}

#[test]
fn rename_and_delete_report_cache_changes() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":1.0}}"#);
    let mut engine = engine_with(&store, t0);
    let host = FakeHost::default();

    let renamed = engine.dispatch(
        Action::Rename {
            from: "a.md".to_string(),
            to: "b.md".to_string(),
        },
        &host,
        t0,
    );
    assert!(renamed.state_changed);
    assert!(engine.cache().contains("b.md"));

    let untracked = engine.dispatch(
        Action::Delete {
            path: "zzz.md".to_string(),
        },
        &host,
        t0,
    );
    assert!(!untracked.state_changed);

    let deleted = engine.dispatch(
        Action::Delete {
            path: "b.md".to_string(),
        },
        &host,
        t0,
    );
    assert!(deleted.state_changed);
    assert!(engine.cache().is_empty());
}

#[test]
fn quit_flushes_and_stops_everything() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":1.0}}"#);
    let mut engine = engine_with(&store, t0);
    let host = FakeHost::default();
    engine.dispatch(
        Action::Delete {
            path: "a.md".to_string(),
        },
        &host,
        t0,
    );

    engine.dispatch(Action::Quit, &host, t0);

    assert!(engine.is_stopped());
    assert_eq!(engine.next_deadline(), None);
    assert_eq!(store.file(DEFAULT_DB_FILE_NAME).as_deref(), Some("{}"));

    let after = engine.dispatch(Action::Scroll, &host, t0);
    assert!(after.effects.is_empty());
    assert_eq!(engine.shutdown(), FlushOutcome::Clean);
    assert_eq!(store.writes(), 1);
}

#[test]
fn quit_during_restore_drops_it() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":1.0}}"#);
    let mut engine = engine_with(&store, t0);
    let host = FakeHost::showing("a.md");
    engine.dispatch(Action::FileOpen, &host, t0);

    engine.dispatch(Action::Quit, &host, t0 + Duration::from_millis(10));
    let result = engine.tick(&host, t0 + Duration::from_secs(1));

    assert!(result.effects.is_empty());
    assert!(engine.coordinator().pending().is_none());
    assert!(!engine.lifecycle().loading);
}

#[test]
fn next_deadline_is_earliest_timer() {
    let t0 = Instant::now();
    let store = MemoryStore::default();
    let mut engine = engine_with(&store, t0);
    let host = FakeHost::showing("a.md");

    assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_secs(5)));
    engine.dispatch(Action::Scroll, &host, t0);
    assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_millis(50)));
}

#[test]
fn settings_update_adjusts_timers() {
    let t0 = Instant::now();
    let store = MemoryStore::default();
    let mut engine = engine_with(&store, t0);

    let t1 = t0 + Duration::from_secs(1);
    engine.update_settings(
        Settings {
            delay_after_file_opening: 250,
            save_timer: 8000,
            ..Settings::default()
        },
        t1,
    );

    assert_eq!(
        engine.coordinator().settle_delay(),
        Duration::from_millis(250)
    );
    assert_eq!(engine.next_deadline(), Some(t1 + Duration::from_secs(8)));
}

#[test]
fn settings_update_clamps_out_of_range_values() {
    let t0 = Instant::now();
    let mut engine = engine_with(&MemoryStore::default(), t0);

    engine.update_settings(
        Settings {
            db_file_name: "  ".to_string(),
            delay_after_file_opening: 5000,
            save_timer: 10,
        },
        t0,
    );

    assert_eq!(
        engine.settings(),
        &Settings {
            delay_after_file_opening: 300,
            ..Settings::default()
        }
    );
}

#[test]
fn new_db_file_receives_full_cache() {
    let t0 = Instant::now();
    let store = MemoryStore::with_file(DEFAULT_DB_FILE_NAME, r#"{"a.md":{"scroll":1.0}}"#);
    let mut engine = engine_with(&store, t0);

    engine.update_settings(
        Settings {
            db_file_name: "elsewhere.json".to_string(),
            ..Settings::default()
        },
        t0,
    );
    assert!(engine.shadow().is_empty());

    assert_eq!(engine.flush(), FlushOutcome::Written { entries: 1 });
    assert_eq!(
        store.file("elsewhere.json").as_deref(),
        Some(r#"{"a.md":{"scroll":1.0}}"#)
    );
}
