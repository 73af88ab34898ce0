use super::*;

#[test]
fn settings_path_lives_in_vault_config_dir() {
    let path = get_settings_path(Path::new("/vault"));
    assert_eq!(path, PathBuf::from("/vault/.scrollmark/settings.json"));
}

#[test]
fn ensure_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();

    let path = ensure_settings_file(dir.path()).unwrap();
    assert!(path.is_file());
    assert_eq!(load_settings(dir.path()), Some(Settings::default()));

    std::fs::write(&path, r#"{"saveTimer": 7000}"#).unwrap();
    ensure_settings_file(dir.path()).unwrap();
    assert_eq!(load_settings(dir.path()).map(|s| s.save_timer), Some(7000));
}

#[test]
fn load_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load_settings(dir.path()), None);
}

#[test]
fn load_malformed_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = ensure_settings_file(dir.path()).unwrap();
    std::fs::write(&path, "{ nope").unwrap();

    assert_eq!(load_settings(dir.path()), None);
}

#[test]
fn load_normalizes_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = ensure_settings_file(dir.path()).unwrap();
    std::fs::write(
        &path,
        r#"{"dbFileName": "", "delayAfterFileOpening": 999, "saveTimer": 100}"#,
    )
    .unwrap();

    assert_eq!(
        load_settings(dir.path()),
        Some(Settings {
            delay_after_file_opening: 300,
            ..Settings::default()
        })
    );
}
