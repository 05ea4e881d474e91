use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::RepositoryError;
use crate::level_record::{LEVEL_FILE_EXTENSION, LevelColor, LevelLocation, LevelRecord};

/// The level file format version written by this crate.
pub const LEVEL_FORMAT_VERSION: u64 = 1;

/// A persistent store of level records, one record per [`LevelLocation`].
///
/// Writes are staged: [`save`](Self::save) and [`mark_dirty`](Self::mark_dirty) make the new
/// contents visible to [`find_all`](Self::find_all) and [`load_at`](Self::load_at) right away,
/// but only [`flush`](Self::flush) commits them to the backing storage.
pub trait LevelRepository: 'static + Send + Sync {
    /// All locations holding a level, in a deterministic order.
    fn find_all(&self) -> Result<Vec<LevelLocation>, RepositoryError>;

    /// Load the record at `location`. The returned record is bound to `location`.
    fn load_at(&self, location: &LevelLocation) -> Result<LevelRecord, RepositoryError>;

    fn save(&mut self, record: &LevelRecord, location: &LevelLocation)
    -> Result<(), RepositoryError>;

    /// Remove the level at `location`. Returns `false` if there was nothing there.
    fn delete(&mut self, location: &LevelLocation) -> Result<bool, RepositoryError>;

    /// `preferred` if it is free, otherwise `preferred` with ` 1`, ` 2`, ... appended to the
    /// stem.
    fn generate_unique_location(&self, preferred: &LevelLocation) -> LevelLocation;

    /// Stage in-memory edits of a record for the next [`flush`](Self::flush).
    fn mark_dirty(&mut self, record: &LevelRecord, location: &LevelLocation);

    fn flush(&mut self) -> Result<(), RepositoryError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelFileHeader {
    format_version: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelFileBody {
    id: u32,
    width: i32,
    height: i32,
    background_color: LevelColor,
    layout: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelFile(LevelFileHeader, LevelFileBody);

/// Serialize a record to the level file format: `[{"format_version": 1}, {...}]`.
pub fn encode_level(record: &LevelRecord) -> Result<String, RepositoryError> {
    let file = LevelFile(
        LevelFileHeader {
            format_version: LEVEL_FORMAT_VERSION,
        },
        LevelFileBody {
            id: record.id,
            width: record.width,
            height: record.height,
            background_color: record.background_color,
            layout: record.layout.clone(),
        },
    );
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Parse a level file and bind the resulting record to `location`.
pub fn decode_level(json: &str, location: &LevelLocation) -> Result<LevelRecord, RepositoryError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let format_version = value
        .pointer("/0/format_version")
        .and_then(|version| version.as_u64())
        .unwrap_or(0);
    if format_version != LEVEL_FORMAT_VERSION {
        return Err(RepositoryError::UnsupportedFormatVersion(format_version));
    }
    let LevelFile(_, body) = serde_json::from_value(value)?;
    Ok(LevelRecord {
        id: body.id,
        width: body.width,
        height: body.height,
        background_color: body.background_color,
        layout: body.layout,
        location: Some(location.clone()),
    })
}

fn unique_location(
    preferred: &LevelLocation,
    is_taken: impl Fn(&LevelLocation) -> bool,
) -> LevelLocation {
    if !is_taken(preferred) {
        return preferred.clone();
    }
    let stem = preferred.stem();
    (1..)
        .map(|suffix| preferred.with_stem(&format!("{stem} {suffix}")))
        .find(|candidate| !is_taken(candidate))
        .expect("the suffix range is unbounded")
}

/// A repository that keeps the encoded level files in memory.
///
/// Useful for tests and for scratch sessions that should never touch the disk. The "committed"
/// state is only updated by [`flush`](LevelRepository::flush), so tests can observe exactly what
/// a real backend would have written.
#[derive(Default, Debug)]
pub struct InMemoryLevelRepository {
    committed: BTreeMap<LevelLocation, String>,
    staged: BTreeMap<LevelLocation, String>,
    flush_count: usize,
}

impl InMemoryLevelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw file contents at a location, bypassing encoding. Lets tests plant corrupt files.
    pub fn insert_raw(&mut self, location: LevelLocation, contents: impl Into<String>) {
        self.committed.insert(location, contents.into());
    }

    /// The committed (flushed) contents at a location.
    pub fn committed(&self, location: &LevelLocation) -> Option<&str> {
        self.committed.get(location).map(String::as_str)
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    fn contains(&self, location: &LevelLocation) -> bool {
        self.staged.contains_key(location) || self.committed.contains_key(location)
    }
}

impl LevelRepository for InMemoryLevelRepository {
    fn find_all(&self) -> Result<Vec<LevelLocation>, RepositoryError> {
        let mut locations: Vec<LevelLocation> = self
            .committed
            .keys()
            .chain(self.staged.keys())
            .cloned()
            .collect();
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    fn load_at(&self, location: &LevelLocation) -> Result<LevelRecord, RepositoryError> {
        let contents = self
            .staged
            .get(location)
            .or_else(|| self.committed.get(location))
            .ok_or_else(|| RepositoryError::NotFound(location.clone()))?;
        decode_level(contents, location)
    }

    fn save(
        &mut self,
        record: &LevelRecord,
        location: &LevelLocation,
    ) -> Result<(), RepositoryError> {
        let contents = encode_level(record)?;
        self.staged.insert(location.clone(), contents);
        Ok(())
    }

    fn delete(&mut self, location: &LevelLocation) -> Result<bool, RepositoryError> {
        let was_staged = self.staged.remove(location).is_some();
        let was_committed = self.committed.remove(location).is_some();
        Ok(was_staged || was_committed)
    }

    fn generate_unique_location(&self, preferred: &LevelLocation) -> LevelLocation {
        unique_location(preferred, |location| self.contains(location))
    }

    fn mark_dirty(&mut self, record: &LevelRecord, location: &LevelLocation) {
        if let Err(err) = self.save(record, location) {
            error!("Cannot stage {}: {}", location, err);
        }
    }

    fn flush(&mut self) -> Result<(), RepositoryError> {
        self.committed.append(&mut self.staged);
        self.flush_count += 1;
        Ok(())
    }
}

/// A repository backed by a directory of `.level` files.
///
/// Locations are paths relative to the levels directory; subdirectories are scanned too.
pub struct DirectoryLevelRepository {
    root: PathBuf,
    staged: BTreeMap<LevelLocation, String>,
}

impl DirectoryLevelRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: Default::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, location: &LevelLocation) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(location.as_str().split('/').filter(|part| !part.is_empty()));
        path
    }

    fn contains(&self, location: &LevelLocation) -> bool {
        self.staged.contains_key(location) || self.path_of(location).is_file()
    }

    fn list_level_files(&self) -> io::Result<Vec<LevelLocation>> {
        let mut result = Vec::new();
        if !self.root.is_dir() {
            return Ok(result);
        }
        let mut directories_to_scan = vec![self.root.clone()];
        while let Some(directory) = directories_to_scan.pop() {
            for entry in fs::read_dir(&directory)? {
                let path = entry?.path();
                if path.is_dir() {
                    directories_to_scan.push(path);
                    continue;
                }
                if path.extension().and_then(|ext| ext.to_str()) != Some(LEVEL_FILE_EXTENSION) {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let parts: Vec<_> = relative
                    .components()
                    .filter_map(|component| component.as_os_str().to_str())
                    .collect();
                result.push(LevelLocation::new(parts.join("/")));
            }
        }
        Ok(result)
    }
}

impl LevelRepository for DirectoryLevelRepository {
    fn find_all(&self) -> Result<Vec<LevelLocation>, RepositoryError> {
        let mut locations = self.list_level_files()?;
        locations.extend(self.staged.keys().cloned());
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    fn load_at(&self, location: &LevelLocation) -> Result<LevelRecord, RepositoryError> {
        if let Some(contents) = self.staged.get(location) {
            return decode_level(contents, location);
        }
        let bytes = match fs::read(self.path_of(location)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(location.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        let json = std::str::from_utf8(&bytes)?;
        decode_level(json, location)
    }

    fn save(
        &mut self,
        record: &LevelRecord,
        location: &LevelLocation,
    ) -> Result<(), RepositoryError> {
        let contents = encode_level(record)?;
        self.staged.insert(location.clone(), contents);
        Ok(())
    }

    fn delete(&mut self, location: &LevelLocation) -> Result<bool, RepositoryError> {
        let was_staged = self.staged.remove(location).is_some();
        match fs::remove_file(self.path_of(location)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(was_staged),
            Err(err) => Err(err.into()),
        }
    }

    fn generate_unique_location(&self, preferred: &LevelLocation) -> LevelLocation {
        unique_location(preferred, |location| self.contains(location))
    }

    fn mark_dirty(&mut self, record: &LevelRecord, location: &LevelLocation) {
        if let Err(err) = self.save(record, location) {
            error!("Cannot stage {}: {}", location, err);
        }
    }

    fn flush(&mut self) -> Result<(), RepositoryError> {
        while let Some((location, contents)) = self.staged.pop_first() {
            let path = self.path_of(&location);
            let written = match path.parent() {
                Some(parent) => fs::create_dir_all(parent),
                None => Ok(()),
            }
            .and_then(|()| fs::write(&path, contents.as_bytes()));
            if let Err(err) = written {
                // Keep it staged so the next flush retries it.
                self.staged.insert(location, contents);
                return Err(err.into());
            }
            debug!("Wrote {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saves_are_staged_until_flush() {
        let mut repository = InMemoryLevelRepository::new();
        let location = LevelLocation::for_level_number(1);
        repository
            .save(&LevelRecord::new_blank(1, 2, 2), &location)
            .unwrap();
        assert!(repository.has_staged_changes());
        assert!(repository.committed(&location).is_none());
        assert_eq!(repository.load_at(&location).unwrap().id, 1);

        repository.flush().unwrap();
        assert!(!repository.has_staged_changes());
        assert!(repository.committed(&location).is_some());
        assert_eq!(repository.flush_count(), 1);
    }

    #[test]
    fn test_unique_location_appends_suffix() {
        let mut repository = InMemoryLevelRepository::new();
        let preferred = LevelLocation::new("chapter1/Level_1.level");
        repository.insert_raw(preferred.clone(), "");
        repository.insert_raw(LevelLocation::new("chapter1/Level_1 1.level"), "");
        assert_eq!(
            repository.generate_unique_location(&preferred),
            LevelLocation::new("chapter1/Level_1 2.level"),
        );
    }

    #[test]
    fn test_level_file_format() {
        let mut record = LevelRecord::new_blank(4, 2, 1);
        record.set_cell(0, 1, '#');
        let encoded: serde_json::Value =
            serde_json::from_str(&encode_level(&record).unwrap()).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!([
                {
                    "format_version": 1,
                },
                {
                    "id": 4,
                    "width": 2,
                    "height": 1,
                    "background_color": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0},
                    "layout": [".#"],
                },
            ])
        );
    }

    #[test]
    fn test_rejects_unknown_format_version() {
        let location = LevelLocation::for_level_number(1);
        let json = r#"[{"format_version": 2}, {}]"#;
        assert!(matches!(
            decode_level(json, &location),
            Err(RepositoryError::UnsupportedFormatVersion(2))
        ));
        assert!(matches!(
            decode_level("not json", &location),
            Err(RepositoryError::SerdeJson(_))
        ));
    }

    #[test]
    fn test_failed_flush_keeps_writes_staged() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("levels");
        fs::write(&root, "a file, not a directory").unwrap();

        let mut repository = DirectoryLevelRepository::new(&root);
        let location = LevelLocation::for_level_number(1);
        repository
            .save(&LevelRecord::new_blank(1, 2, 2), &location)
            .unwrap();
        assert!(repository.flush().is_err());
        assert!(repository.flush().is_err());
        assert_eq!(repository.load_at(&location).unwrap().id, 1);

        fs::remove_file(&root).unwrap();
        repository.flush().unwrap();
        assert!(root.join("Level_1.level").is_file());
    }
}
