use std::fs;

use bevy_levelkit::{
    DirectoryLevelRepository, LevelEditorSettings, LevelLocation, LevelRepository, LevelStore,
};

#[test]
fn test_directory_repository_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let levels_dir = dir.path().join("levels");
    let mut store = LevelStore::new(DirectoryLevelRepository::new(&levels_dir));
    assert!(store.load_all().is_empty());

    let mut level = store.create(1, 3, 2).unwrap();
    assert!(levels_dir.join("Level_1.level").is_file());

    level.set_cell(1, 2, 'C');
    store.apply_changes(Some(&level));
    let copy = store.duplicate(Some(&level)).unwrap();
    assert!(levels_dir.join("Level_1_Copy.level").is_file());

    // A fresh repository over the same directory sees everything that was written.
    let reopened = LevelStore::new(DirectoryLevelRepository::new(&levels_dir));
    assert_eq!(reopened.load_all(), vec![level.clone(), copy]);

    assert!(store.delete(&level));
    assert!(!levels_dir.join("Level_1.level").exists());
}

#[test]
fn test_directory_repository_scans_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LevelStore::new(DirectoryLevelRepository::new(dir.path()));
    store.create(1, 2, 2).unwrap();

    let nested = dir.path().join("chapter2");
    fs::create_dir_all(&nested).unwrap();
    fs::copy(dir.path().join("Level_1.level"), nested.join("Boss.level")).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a level").unwrap();
    fs::write(dir.path().join("broken.level"), [0xff, 0xfe]).unwrap();

    let locations = store.repository().find_all().unwrap();
    assert_eq!(
        locations,
        vec![
            LevelLocation::new("Level_1.level"),
            LevelLocation::new("broken.level"),
            LevelLocation::new("chapter2/Boss.level"),
        ]
    );
    // The undecodable file is listed but skipped when loading.
    let loaded: Vec<_> = store
        .load_all()
        .into_iter()
        .map(|level| level.location().unwrap().clone())
        .collect();
    assert_eq!(
        loaded,
        vec![
            LevelLocation::new("Level_1.level"),
            LevelLocation::new("chapter2/Boss.level"),
        ]
    );
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("settings.json");
    assert_eq!(
        LevelEditorSettings::load_or_default(&path),
        LevelEditorSettings::default()
    );

    let mut settings = LevelEditorSettings::default();
    settings.grid_size = 2.5;
    settings.show_grid = false;
    settings.brush_size = 4;
    settings.save(&path).unwrap();
    assert_eq!(LevelEditorSettings::load(&path).unwrap(), settings);
}

#[test]
fn test_settings_tolerate_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    fs::write(&path, "{ nope").unwrap();
    assert_eq!(
        LevelEditorSettings::load_or_default(&path),
        LevelEditorSettings::default()
    );

    // Missing fields fall back to defaults and out-of-range values are clamped.
    fs::write(&path, r#"{"brush_size": 100, "camera_speed": 0.0}"#).unwrap();
    let settings = LevelEditorSettings::load(&path).unwrap();
    assert_eq!(settings.brush_size, 10);
    assert_eq!(settings.camera_speed, 1.0);
    assert_eq!(settings.grid_size, 1.0);
}
