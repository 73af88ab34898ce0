use super::*;
use crate::kernel::services::ports::{Settings, StateStore};

fn args(list: &[&str]) -> impl Iterator<Item = String> {
    list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
}

fn engine_in(root: &Path) -> Engine {
    let store = LocalStateStore::new(root);
    store.mkdir(Path::new(".scrollmark")).unwrap();
    store
        .write(
            Path::new(".scrollmark/scroll-positions.json"),
            br#"{"a.md":{"scroll":12.5}}"#,
        )
        .unwrap();
    Engine::new(Settings::default(), Box::new(store), Instant::now())
}

#[test]
fn options_parse_root_and_watch_flag() {
    assert_eq!(
        DriverOptions::from_args(args(&["--watch", "/vault"])),
        Ok(Some(DriverOptions {
            vault_root: PathBuf::from("/vault"),
            watch: true,
        }))
    );
    assert_eq!(
        DriverOptions::from_args(args(&["/vault"])).map(|o| o.map(|o| o.watch)),
        Ok(Some(false))
    );
}

#[test]
fn options_help_skips_remaining_args() {
    assert_eq!(DriverOptions::from_args(args(&["-h", "--bogus"])), Ok(None));
    assert_eq!(DriverOptions::from_args(args(&["/vault", "--help"])), Ok(None));
}

#[test]
fn options_reject_bad_input() {
    assert!(DriverOptions::from_args(args(&[])).is_err());
    assert!(DriverOptions::from_args(args(&["a", "b"])).is_err());
    assert!(DriverOptions::from_args(args(&["--watch", "--watch", "a"])).is_err());
}

#[test]
fn vault_rename_moves_entry_and_view() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(dir.path());
    let mut workspace = HeadlessWorkspace::new();
    handle_host_event(
        &mut engine,
        &mut workspace,
        &HostEvent::Open {
            path: "a.md".to_string(),
            view: None,
        },
    );

    handle_vault_change(
        &mut engine,
        &mut workspace,
        VaultChange::Renamed {
            from: "a.md".to_string(),
            to: "b.md".to_string(),
        },
    );

    assert!(engine.cache().contains("b.md"));
    assert_eq!(workspace.document_in("view-1"), Some("b.md"));
    assert_eq!(engine.lifecycle().last_loaded_path.as_deref(), Some("b.md"));
}

#[test]
fn vault_delete_drops_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(dir.path());
    let mut workspace = HeadlessWorkspace::new();

    handle_vault_change(
        &mut engine,
        &mut workspace,
        VaultChange::Deleted {
            path: "a.md".to_string(),
        },
    );

    assert!(engine.cache().is_empty());
}

#[test]
fn quit_event_stops_engine() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(dir.path());
    let mut workspace = HeadlessWorkspace::new();

    handle_host_event(&mut engine, &mut workspace, &HostEvent::Quit);

    assert!(engine.is_stopped());
}

#[test]
fn settings_reload_on_change_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(dir.path());
    let path = ensure_settings_file(dir.path()).unwrap();
    let mut last = modified_time(&path);

    poll_settings(&mut engine, dir.path(), &path, &mut last);
    assert_eq!(engine.settings(), &Settings::default());

    std::fs::write(&path, r#"{"delayAfterFileOpening": 250}"#).unwrap();
    let mut stale = None;
    poll_settings(&mut engine, dir.path(), &path, &mut stale);

    assert_eq!(engine.settings().delay_after_file_opening, 250);
    assert!(stale.is_some());
}

#[test]
fn malformed_settings_keep_current_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(dir.path());
    let path = ensure_settings_file(dir.path()).unwrap();

    std::fs::write(&path, r#"{"delayAfterFileOpening": 250}"#).unwrap();
    let mut last = None;
    poll_settings(&mut engine, dir.path(), &path, &mut last);

    std::fs::write(&path, "{ broken").unwrap();
    let mut last = None;
    poll_settings(&mut engine, dir.path(), &path, &mut last);

    assert_eq!(engine.settings().delay_after_file_opening, 250);
}

#[tokio::test]
async fn run_rejects_missing_vault() {
    let dir = tempfile::tempdir().unwrap();
    let options = DriverOptions {
        vault_root: dir.path().join("missing"),
        watch: false,
    };

    let err = run(options).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
