use bevy_levelkit::{
    InMemoryLevelRepository, LevelColor, LevelLocation, LevelRecord, LevelRepository, LevelStore,
    LevelStoreError, ValidationError,
};

fn store_with_levels(ids: &[u32]) -> LevelStore {
    let mut store = LevelStore::new(InMemoryLevelRepository::new());
    for &id in ids {
        store.create(id, 4, 3).unwrap();
    }
    store
}

#[test]
fn test_next_free_id() {
    assert_eq!(store_with_levels(&[]).next_free_id(), 1);
    assert_eq!(store_with_levels(&[3, 7, 1]).next_free_id(), 8);
}

#[test]
fn test_create_blank_level() {
    let mut store = store_with_levels(&[]);
    let level = store.create(5, 3, 2).unwrap();
    assert_eq!(level.id, 5);
    assert_eq!(level.width, 3);
    assert_eq!(level.height, 2);
    assert_eq!(level.background_color, LevelColor::WHITE);
    assert_eq!(level.layout, vec!["...".to_owned(), "...".to_owned()]);
    assert_eq!(level.location(), Some(&LevelLocation::new("Level_5.level")));
    assert!(LevelStore::validate(Some(&level)).is_ok());
}

#[test]
fn test_load_all_is_sorted_and_matches_created() {
    let mut store = store_with_levels(&[]);
    let second = store.create(2, 5, 5).unwrap();
    let first = store.create(1, 6, 4).unwrap();
    assert_eq!(store.load_all(), vec![first, second]);
}

#[test]
fn test_create_fails_on_taken_id() {
    let mut store = store_with_levels(&[2]);
    assert!(matches!(
        store.create(2, 8, 8),
        Err(LevelStoreError::IdTaken(2))
    ));
    assert_eq!(store.load_all().len(), 1);
    assert_eq!(store.find_by_id(2).unwrap().width, 4);
}

#[test]
fn test_create_overwriting_replaces_in_place() {
    let mut store = store_with_levels(&[2]);
    let original = store.find_by_id(2).unwrap();
    let replaced = store.create_overwriting(2, 8, 8).unwrap();
    assert_eq!(replaced.location(), original.location());
    let levels = store.load_all();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].width, 8);
}

#[test]
fn test_validate() {
    let mut level = LevelRecord::new_blank(1, 3, 3);
    assert!(LevelStore::validate(Some(&level)).is_ok());
    assert!(matches!(
        LevelStore::validate(None),
        Err(ValidationError::Absent)
    ));

    level.layout[2] = "..".to_owned();
    assert!(matches!(
        LevelStore::validate(Some(&level)),
        Err(ValidationError::RowLengthMismatch(2))
    ));
    assert_eq!(
        LevelStore::validate(Some(&level)).unwrap_err().to_string(),
        "row 2 length mismatch"
    );

    level.layout.pop();
    assert!(matches!(
        LevelStore::validate(Some(&level)),
        Err(ValidationError::LayoutLengthMismatch)
    ));

    level.width = 0;
    assert!(matches!(
        LevelStore::validate(Some(&level)),
        Err(ValidationError::NonPositiveDimensions)
    ));
}

#[test]
fn test_duplicate_is_independent() {
    let mut store = store_with_levels(&[1]);
    let mut source = store.find_by_id(1).unwrap();
    source.set_cell(0, 0, '#');
    store.apply_changes(Some(&source));

    let mut copy = store.duplicate(Some(&source)).unwrap();
    assert!(copy.same_contents(&source));
    assert_eq!(copy.location(), Some(&LevelLocation::new("Level_1_Copy.level")));

    copy.set_cell(0, 0, 'P');
    store.apply_changes(Some(&copy));
    assert_eq!(store.find_at(source.location().unwrap()).unwrap().cell(0, 0), Some('#'));
    assert_eq!(store.find_at(copy.location().unwrap()).unwrap().cell(0, 0), Some('P'));

    let second_copy = store.duplicate(Some(&source)).unwrap();
    assert_eq!(
        second_copy.location(),
        Some(&LevelLocation::new("Level_1_Copy 1.level"))
    );
    assert_eq!(store.load_all().len(), 3);
}

#[test]
fn test_duplicate_needs_stored_source() {
    let mut store = store_with_levels(&[]);
    assert!(store.duplicate(None).is_none());
    assert!(store.duplicate(Some(&LevelRecord::new_blank(1, 2, 2))).is_none());
    assert!(store.load_all().is_empty());
}

#[test]
fn test_delete() {
    let mut store = store_with_levels(&[1, 2]);
    let before = store.repository().find_all().unwrap();

    assert!(!store.delete(&LevelRecord::new_blank(1, 4, 3)));
    assert_eq!(store.repository().find_all().unwrap(), before);

    let level = store.find_by_id(1).unwrap();
    assert!(store.delete(&level));
    assert!(!store.delete(&level));
    let remaining: Vec<u32> = store.load_all().iter().map(|level| level.id).collect();
    assert_eq!(remaining, [2]);
}

#[test]
fn test_apply_changes_persists_edits() {
    let mut store = store_with_levels(&[1]);
    let mut level = store.find_by_id(1).unwrap();
    level.background_color = LevelColor::rgb(0.0, 0.0, 0.0);
    level.set_cell(2, 3, 'E');
    assert!(store.apply_changes(Some(&level)));
    assert_eq!(store.find_by_id(1).unwrap(), level);

    // Unstored records and `None` are ignored.
    assert!(!store.apply_changes(Some(&LevelRecord::new_blank(9, 1, 1))));
    assert!(!store.apply_changes(None));
    assert_eq!(store.load_all().len(), 1);
}

#[test]
fn test_unreadable_levels_are_skipped() {
    let mut repository = InMemoryLevelRepository::new();
    repository.insert_raw(LevelLocation::new("broken.level"), "{ not a level");
    repository.insert_raw(
        LevelLocation::new("future.level"),
        r#"[{"format_version": 99}, {}]"#,
    );
    let mut store = LevelStore::new(repository);
    store.create(1, 2, 2).unwrap();
    let ids: Vec<u32> = store.load_all().iter().map(|level| level.id).collect();
    assert_eq!(ids, [1]);
    assert_eq!(store.next_free_id(), 2);
}

#[test]
fn test_deleted_level_cannot_be_duplicated() {
    let mut store = store_with_levels(&[]);
    let level = store.create(1, 3, 3).unwrap();
    assert!(store.delete(&level));

    assert!(store.duplicate(Some(&level)).is_none());
    assert!(store.load_all().is_empty());
}

#[test]
fn test_stale_copy_does_not_resurrect_deleted_level() {
    let mut store = store_with_levels(&[]);
    let mut level = store.create(1, 3, 3).unwrap();
    assert!(store.delete(&level));

    level.set_cell(0, 0, '#');
    assert!(!store.apply_changes(Some(&level)));
    assert!(store.load_all().is_empty());
    assert!(store.find_at(&LevelLocation::new("Level_1.level")).is_none());
}
