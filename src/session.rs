use bevy::prelude::*;

use crate::errors::SessionError;
use crate::level_record::{LevelLocation, LevelRecord, TileKind};
use crate::level_store::LevelStore;

pub const DEFAULT_FORM_DIMENSION: i32 = 10;

/// Where the "create new level" form is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Editing,
    /// A level was created at the given location.
    Submitted(LevelLocation),
}

/// Field values of the "create new level" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationForm {
    pub level_number: u32,
    pub width: i32,
    pub height: i32,
    pub auto_number: bool,
}

impl Default for CreationForm {
    fn default() -> Self {
        Self {
            level_number: 1,
            width: DEFAULT_FORM_DIMENSION,
            height: DEFAULT_FORM_DIMENSION,
            auto_number: true,
        }
    }
}

/// Transient editor state: the creation form, the selected level and the tile being painted.
///
/// The selection is kept as a [`LevelLocation`] and resolved against the store every time it
/// is read, so deleting the selected level from outside the session cannot leave it dangling.
#[derive(Resource, Debug)]
pub struct LevelEditorSession {
    form: CreationForm,
    phase: FormPhase,
    selected: Option<LevelLocation>,
    pending_overwrite: Option<u32>,
    active_tile: TileKind,
}

impl Default for LevelEditorSession {
    fn default() -> Self {
        Self {
            form: Default::default(),
            phase: Default::default(),
            selected: None,
            pending_overwrite: None,
            active_tile: TileKind::Wall,
        }
    }
}

impl LevelEditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tile symbol written by [`paint_cell`](Self::paint_cell).
    pub fn active_tile(&self) -> TileKind {
        self.active_tile
    }

    pub fn set_active_tile(&mut self, tile: TileKind) {
        self.active_tile = tile;
    }

    /// Write the active tile into a layout cell of an in-memory record. The edit is persisted
    /// only once the record goes through [`LevelStore::apply_changes`].
    pub fn paint_cell(&self, record: &mut LevelRecord, row: usize, col: usize) -> bool {
        record.set_cell(row, col, self.active_tile.symbol())
    }

    pub fn form(&self) -> &CreationForm {
        &self.form
    }

    /// Mutable access to the form fields. Moves the form into [`FormPhase::Editing`].
    pub fn form_mut(&mut self) -> &mut CreationForm {
        self.phase = FormPhase::Editing;
        &mut self.form
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn open_form(&mut self) {
        self.phase = FormPhase::Editing;
    }

    /// Close the form. The typed values are kept for the next time it is opened.
    pub fn cancel(&mut self) {
        self.phase = FormPhase::Idle;
        self.pending_overwrite = None;
    }

    /// Back to [`FormPhase::Idle`] with the default field values.
    pub fn reset(&mut self) {
        self.form = CreationForm::default();
        self.phase = FormPhase::Idle;
        self.pending_overwrite = None;
    }

    /// Create a level from the form fields.
    ///
    /// When a level with the resolved number already exists, `confirm` is called with that
    /// number; returning `false` aborts without touching the store or the form.
    pub fn create_from_form(
        &mut self,
        store: Option<&mut LevelStore>,
        confirm: impl FnOnce(u32) -> bool,
    ) -> Result<LevelRecord, SessionError> {
        let store = store.ok_or(SessionError::StoreUnavailable)?;
        let CreationForm { width, height, .. } = self.form;
        if width <= 0 || height <= 0 {
            warn!("Width and height must be greater than 0, got {}x{}", width, height);
            return Err(SessionError::InvalidDimensions);
        }

        let id = Self::resolve_id(&self.form, store);

        if store.load_all().iter().any(|record| record.id == id) && !confirm(id) {
            return Err(SessionError::Declined(id));
        }

        let record = store.create_overwriting(id, width, height)?;
        info!("Created new level: Level {} ({}x{})", id, width, height);
        if let Some(location) = record.location() {
            self.selected = Some(location.clone());
            self.phase = FormPhase::Submitted(location.clone());
        }
        self.pending_overwrite = None;
        Ok(record)
    }

    /// [`create_from_form`](Self::create_from_form) for UIs that cannot block on a question.
    ///
    /// A clash with an existing level is recorded as [`pending_overwrite`](Self::pending_overwrite)
    /// and reported as [`SessionError::Declined`]; answer it with
    /// [`confirm_pending`](Self::confirm_pending) or [`decline_pending`](Self::decline_pending).
    pub fn request_create(
        &mut self,
        store: Option<&mut LevelStore>,
    ) -> Result<LevelRecord, SessionError> {
        let mut clash = None;
        let result = self.create_from_form(store, |id| {
            clash = Some(id);
            false
        });
        self.pending_overwrite = clash;
        result
    }

    /// The level number waiting for an overwrite answer, if any.
    pub fn pending_overwrite(&self) -> Option<u32> {
        self.pending_overwrite
    }

    /// Answer "yes" to the pending overwrite question.
    ///
    /// If the form fields changed since the question was asked and now resolve to another level
    /// number, nothing is created and the question is dropped.
    pub fn confirm_pending(
        &mut self,
        store: Option<&mut LevelStore>,
    ) -> Option<Result<LevelRecord, SessionError>> {
        let confirmed = self.pending_overwrite?;
        let Some(store) = store else {
            return Some(Err(SessionError::StoreUnavailable));
        };
        let resolved = Self::resolve_id(&self.form, store);
        if resolved != confirmed {
            warn!(
                "Overwrite of level {} was confirmed, but the form now resolves to level {}",
                confirmed, resolved
            );
            self.pending_overwrite = None;
            return Some(Err(SessionError::ConfirmationStale {
                confirmed,
                resolved,
            }));
        }
        Some(self.create_from_form(Some(store), |id| id == confirmed))
    }

    fn resolve_id(form: &CreationForm, store: &LevelStore) -> u32 {
        if form.auto_number {
            store.next_free_id()
        } else {
            form.level_number
        }
    }

    pub fn decline_pending(&mut self) {
        self.pending_overwrite = None;
    }

    pub fn select(&mut self, record: &LevelRecord) {
        self.selected = record.location().cloned();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_location(&self) -> Option<&LevelLocation> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, record: &LevelRecord) -> bool {
        self.selected.is_some() && self.selected.as_ref() == record.location()
    }

    /// Resolve the selection against the store, clearing it if the level is gone.
    pub fn selected(&mut self, store: &LevelStore) -> Option<LevelRecord> {
        let location = self.selected.as_ref()?;
        let record = store.find_at(location);
        if record.is_none() {
            debug!("Selected level at {} is gone, clearing selection", location);
            self.selected = None;
        }
        record
    }
}
