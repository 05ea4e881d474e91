use bevy_levelkit::{
    CreationForm, FormPhase, InMemoryLevelRepository, LevelEditorSession, LevelStore,
    SessionError, TileKind,
};

fn empty_store() -> LevelStore {
    LevelStore::new(InMemoryLevelRepository::new())
}

#[test]
fn test_create_with_auto_number() {
    let mut store = empty_store();
    let mut session = LevelEditorSession::new();
    session.open_form();

    let level = session
        .create_from_form(Some(&mut store), |_| panic!("nothing to overwrite"))
        .unwrap();
    assert_eq!(level.id, 1);
    assert_eq!((level.width, level.height), (10, 10));
    assert_eq!(level.layout, vec![".".repeat(10); 10]);
    assert!(session.is_selected(&level));
    assert_eq!(
        session.phase(),
        &FormPhase::Submitted(level.location().unwrap().clone())
    );

    let next = session
        .create_from_form(Some(&mut store), |_| panic!("nothing to overwrite"))
        .unwrap();
    assert_eq!(next.id, 2);
    assert_eq!(store.load_all().len(), 2);
}

#[test]
fn test_declined_overwrite_changes_nothing() {
    let mut store = empty_store();
    store.create(3, 4, 4).unwrap();
    let before = store.load_all();

    let mut session = LevelEditorSession::new();
    {
        let form = session.form_mut();
        form.auto_number = false;
        form.level_number = 3;
        form.width = 20;
    }
    let form_before = session.form().clone();

    let mut asked = None;
    let result = session.create_from_form(Some(&mut store), |id| {
        asked = Some(id);
        false
    });
    assert!(matches!(result, Err(SessionError::Declined(3))));
    assert_eq!(asked, Some(3));
    assert_eq!(store.load_all(), before);
    assert_eq!(session.form(), &form_before);
    assert_eq!(session.phase(), &FormPhase::Editing);
    assert!(session.selected_location().is_none());
}

#[test]
fn test_confirmed_overwrite_replaces_level() {
    let mut store = empty_store();
    let existing = store.create(3, 4, 4).unwrap();

    let mut session = LevelEditorSession::new();
    {
        let form = session.form_mut();
        form.auto_number = false;
        form.level_number = 3;
    }
    let level = session.create_from_form(Some(&mut store), |_| true).unwrap();
    assert_eq!(level.location(), existing.location());
    let levels = store.load_all();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].width, 10);
}

#[test]
fn test_pending_overwrite() {
    let mut store = empty_store();
    store.create(1, 4, 4).unwrap();

    let mut session = LevelEditorSession::new();
    session.form_mut().auto_number = false;
    assert!(matches!(
        session.request_create(Some(&mut store)),
        Err(SessionError::Declined(1))
    ));
    assert_eq!(session.pending_overwrite(), Some(1));

    session.decline_pending();
    assert_eq!(session.pending_overwrite(), None);
    assert!(session.confirm_pending(Some(&mut store)).is_none());

    session.request_create(Some(&mut store)).unwrap_err();
    let level = session
        .confirm_pending(Some(&mut store))
        .unwrap()
        .unwrap();
    assert_eq!(level.width, 10);
    assert_eq!(session.pending_overwrite(), None);
}

#[test]
fn test_missing_store() {
    let mut session = LevelEditorSession::new();
    assert!(matches!(
        session.create_from_form(None, |_| true),
        Err(SessionError::StoreUnavailable)
    ));
}

#[test]
fn test_invalid_dimensions() {
    let mut store = empty_store();
    let mut session = LevelEditorSession::new();
    session.form_mut().height = 0;
    assert!(matches!(
        session.create_from_form(Some(&mut store), |_| true),
        Err(SessionError::InvalidDimensions)
    ));
    assert!(store.load_all().is_empty());
}

#[test]
fn test_selection_follows_store() {
    let mut store = empty_store();
    let mut session = LevelEditorSession::new();
    let level = store.create(1, 2, 2).unwrap();

    session.select(&level);
    assert_eq!(session.selected(&store), Some(level.clone()));

    assert!(store.delete(&level));
    assert_eq!(session.selected(&store), None);
    assert!(session.selected_location().is_none());
}

#[test]
fn test_cancel_keeps_values_and_reset_restores_defaults() {
    let mut session = LevelEditorSession::new();
    session.form_mut().width = 42;
    session.cancel();
    assert_eq!(session.phase(), &FormPhase::Idle);
    assert_eq!(session.form().width, 42);

    session.reset();
    assert_eq!(session.phase(), &FormPhase::Idle);
    assert_eq!(session.form(), &CreationForm::default());
}

#[test]
fn test_paint_cell_uses_active_tile() {
    let mut store = empty_store();
    let mut level = store.create(1, 3, 3).unwrap();
    let mut session = LevelEditorSession::new();
    assert_eq!(session.active_tile(), TileKind::Wall);

    assert!(session.paint_cell(&mut level, 1, 1));
    session.set_active_tile(TileKind::Player);
    assert!(session.paint_cell(&mut level, 0, 2));
    assert!(!session.paint_cell(&mut level, 3, 0));
    assert_eq!(level.layout, vec!["..P", ".#.", "..."]);

    // Painting only touches the in-memory copy.
    assert_eq!(store.find_by_id(1).unwrap().cell(1, 1), Some('.'));
}

#[test]
fn test_confirm_pending_checks_the_asked_level() {
    let mut store = empty_store();
    store.create(1, 4, 4).unwrap();
    store.create(2, 4, 4).unwrap();

    let mut session = LevelEditorSession::new();
    session.form_mut().auto_number = false;
    session.request_create(Some(&mut store)).unwrap_err();
    assert_eq!(session.pending_overwrite(), Some(1));

    // The number is changed while the question is still shown.
    session.form_mut().level_number = 2;
    assert!(matches!(
        session.confirm_pending(Some(&mut store)),
        Some(Err(SessionError::ConfirmationStale {
            confirmed: 1,
            resolved: 2,
        }))
    ));
    assert_eq!(session.pending_overwrite(), None);
    let widths: Vec<i32> = store.load_all().iter().map(|level| level.width).collect();
    assert_eq!(widths, [4, 4]);
}
