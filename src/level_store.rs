use bevy::prelude::*;

use crate::errors::{LevelStoreError, ValidationError};
use crate::level_record::{LevelLocation, LevelRecord};
use crate::repository::LevelRepository;

/// Enumerates, creates, deletes, duplicates, validates and persists [`LevelRecord`]s.
///
/// The store owns the binding between a record and its [`LevelLocation`]. Every write flushes
/// the repository before returning, so the on-disk state always matches what the editor shows.
#[derive(Resource)]
pub struct LevelStore {
    repository: Box<dyn LevelRepository>,
}

impl LevelStore {
    pub fn new(repository: impl LevelRepository) -> Self {
        Self {
            repository: Box::new(repository),
        }
    }

    pub fn repository(&self) -> &dyn LevelRepository {
        self.repository.as_ref()
    }

    /// All readable records, sorted by level number.
    ///
    /// Entries that fail to load are skipped (and logged) instead of failing the whole listing.
    pub fn load_all(&self) -> Vec<LevelRecord> {
        let locations = match self.repository.find_all() {
            Ok(locations) => locations,
            Err(err) => {
                error!("Cannot list levels: {}", err);
                return Vec::new();
            }
        };
        let mut records: Vec<LevelRecord> = locations
            .iter()
            .filter_map(|location| match self.repository.load_at(location) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping level at {}: {}", location, err);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.location.cmp(&b.location)));
        records
    }

    pub fn find_by_id(&self, id: u32) -> Option<LevelRecord> {
        self.load_all().into_iter().find(|record| record.id == id)
    }

    pub fn find_at(&self, location: &LevelLocation) -> Option<LevelRecord> {
        self.repository.load_at(location).ok()
    }

    /// Create and persist a blank level.
    ///
    /// The caller is responsible for passing positive dimensions. Fails with
    /// [`LevelStoreError::IdTaken`] when a level with the same number already exists - use
    /// [`create_overwriting`](Self::create_overwriting) to replace it instead.
    pub fn create(&mut self, id: u32, width: i32, height: i32) -> Result<LevelRecord, LevelStoreError> {
        if self.find_by_id(id).is_some() {
            return Err(LevelStoreError::IdTaken(id));
        }
        let location = self
            .repository
            .generate_unique_location(&LevelLocation::for_level_number(id));
        self.store_blank(id, width, height, location)
    }

    /// Like [`create`](Self::create), but replaces an existing level with the same number (the
    /// first one, in location order) in place.
    pub fn create_overwriting(
        &mut self,
        id: u32,
        width: i32,
        height: i32,
    ) -> Result<LevelRecord, LevelStoreError> {
        let existing = self
            .load_all()
            .into_iter()
            .filter(|record| record.id == id)
            .filter_map(|record| record.location)
            .min();
        let location = match existing {
            Some(location) => {
                info!("Overwriting level {} at {}", id, location);
                location
            }
            None => self
                .repository
                .generate_unique_location(&LevelLocation::for_level_number(id)),
        };
        self.store_blank(id, width, height, location)
    }

    fn store_blank(
        &mut self,
        id: u32,
        width: i32,
        height: i32,
        location: LevelLocation,
    ) -> Result<LevelRecord, LevelStoreError> {
        let mut record = LevelRecord::new_blank(id, width, height);
        self.repository.save(&record, &location)?;
        self.repository.flush()?;
        record.location = Some(location);
        Ok(record)
    }

    /// Remove a record from the repository.
    ///
    /// Returns `false` - and leaves the repository alone - when the record has no location or
    /// nothing is stored there.
    pub fn delete(&mut self, record: &LevelRecord) -> bool {
        let Some(location) = record.location.as_ref() else {
            return false;
        };
        let deleted = match self.repository.delete(location) {
            Ok(deleted) => deleted,
            Err(err) => {
                error!("Cannot delete level at {}: {}", location, err);
                return false;
            }
        };
        if deleted {
            if let Err(err) = self.repository.flush() {
                error!("Cannot flush after deleting {}: {}", location, err);
            }
        }
        deleted
    }

    /// Store a deep copy of `source` next to it, under `<stem>_Copy`.
    ///
    /// The copy keeps the source's level number; resolving the clash is up to the caller.
    /// Returns `None` when the source is not stored, or no longer loads from its location.
    pub fn duplicate(&mut self, source: Option<&LevelRecord>) -> Option<LevelRecord> {
        let source = source?;
        let source_location = source.location.as_ref()?;
        if let Err(err) = self.repository.load_at(source_location) {
            warn!("Cannot duplicate level at {}: {}", source_location, err);
            return None;
        }
        let preferred = source_location.with_stem(&format!("{}_Copy", source_location.stem()));
        let location = self.repository.generate_unique_location(&preferred);

        let mut duplicate = source.clone();
        duplicate.location = None;
        let persisted = self
            .repository
            .save(&duplicate, &location)
            .and_then(|()| self.repository.flush());
        if let Err(err) = persisted {
            error!("Cannot duplicate level at {}: {}", source_location, err);
            return None;
        }
        duplicate.location = Some(location);
        Some(duplicate)
    }

    /// Persist the in-memory edits of a record. Returns `true` when they were written.
    ///
    /// Does nothing for `None`, for unstored records, and for records whose location no longer
    /// loads. A deleted level is never brought back by a stale copy.
    pub fn apply_changes(&mut self, record: Option<&LevelRecord>) -> bool {
        let Some(record) = record else {
            return false;
        };
        let Some(location) = record.location.as_ref() else {
            warn!("Level {} has no location, not saving it", record.id);
            return false;
        };
        if let Err(err) = self.repository.load_at(location) {
            warn!("Not saving level {} at {}: {}", record.id, location, err);
            return false;
        }
        self.repository.mark_dirty(record, location);
        match self.repository.flush() {
            Ok(()) => true,
            Err(err) => {
                error!("Cannot save level {} at {}: {}", record.id, location, err);
                false
            }
        }
    }

    /// One past the highest level number, or `1` for an empty store.
    ///
    /// Nothing is reserved - two callers that ask before either creates will get the same
    /// number.
    pub fn next_free_id(&self) -> u32 {
        self.load_all()
            .iter()
            .map(|record| record.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Check that the layout matches the declared dimensions. Purely advisory.
    pub fn validate(record: Option<&LevelRecord>) -> Result<(), ValidationError> {
        let record = record.ok_or(ValidationError::Absent)?;
        if record.width <= 0 || record.height <= 0 {
            return Err(ValidationError::NonPositiveDimensions);
        }
        if record.layout.len() != record.height as usize {
            return Err(ValidationError::LayoutLengthMismatch);
        }
        if let Some(row) = record
            .layout
            .iter()
            .position(|line| line.chars().count() != record.width as usize)
        {
            return Err(ValidationError::RowLengthMismatch(row));
        }
        Ok(())
    }
}
