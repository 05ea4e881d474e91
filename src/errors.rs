use crate::level_record::LevelLocation;

/// Failures of a [`LevelRepository`](crate::LevelRepository).
#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("unsupported level format version {0}")]
    UnsupportedFormatVersion(u64),
    #[error("no level stored at {0}")]
    NotFound(LevelLocation),
}

/// Failures of the [`LevelStore`](crate::LevelStore) write operations.
#[derive(thiserror::Error, Debug)]
pub enum LevelStoreError {
    #[error("level {0} already exists")]
    IdTaken(u32),
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Why [`LevelStore::validate`](crate::LevelStore::validate) rejected a record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record is absent")]
    Absent,
    #[error("dimensions must be positive")]
    NonPositiveDimensions,
    #[error("layout length mismatch")]
    LayoutLengthMismatch,
    #[error("row {0} length mismatch")]
    RowLengthMismatch(usize),
}

/// Why [`LevelEditorSession::create_from_form`](crate::LevelEditorSession::create_from_form)
/// did not create a level.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("store unavailable")]
    StoreUnavailable,
    #[error("invalid dimensions")]
    InvalidDimensions,
    #[error("creating level {0} was declined")]
    Declined(u32),
    #[error("overwrite was confirmed for level {confirmed}, but the form now resolves to level {resolved}")]
    ConfirmationStale { confirmed: u32, resolved: u32 },
    #[error("{0}")]
    Store(#[from] LevelStoreError),
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),
}
