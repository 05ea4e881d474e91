use std::fs;
use std::io;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;
use crate::level_record::LevelColor;

/// Preferences of the level editor tools.
///
/// Inserted as a resource by [`LevelKitPlugin`](crate::LevelKitPlugin) after being loaded from
/// the configured settings file, and written back when the settings panel saves or the app
/// exits.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelEditorSettings {
    pub grid_size: f32,
    pub show_grid: bool,
    pub grid_color: LevelColor,
    pub enable_snapping: bool,
    pub snap_distance: f32,
    pub brush_size: u32,
    pub enable_brush_preview: bool,
    pub show_gizmos: bool,
    pub camera_speed: f32,
}

impl Default for LevelEditorSettings {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            show_grid: true,
            grid_color: LevelColor::rgba(0.5, 0.5, 0.5, 0.3),
            enable_snapping: true,
            snap_distance: 0.5,
            brush_size: 1,
            enable_brush_preview: true,
            show_gizmos: true,
            camera_speed: 5.0,
        }
    }
}

impl LevelEditorSettings {
    pub const GRID_SIZE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=10.0;
    pub const SNAP_DISTANCE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=5.0;
    pub const BRUSH_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
    pub const CAMERA_SPEED_RANGE: std::ops::RangeInclusive<f32> = 1.0..=20.0;

    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    /// Read settings from `path`. A missing file yields the defaults; so does a malformed one,
    /// with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(err) => {
                warn!(
                    "Cannot read level editor settings from {}: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.clamp_to_ranges();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn clamp_to_ranges(&mut self) {
        fn clamp(value: f32, range: &std::ops::RangeInclusive<f32>, default: f32) -> f32 {
            if value.is_nan() {
                default
            } else {
                value.clamp(*range.start(), *range.end())
            }
        }
        let defaults = Self::default();
        self.grid_size = clamp(self.grid_size, &Self::GRID_SIZE_RANGE, defaults.grid_size);
        self.snap_distance = clamp(
            self.snap_distance,
            &Self::SNAP_DISTANCE_RANGE,
            defaults.snap_distance,
        );
        self.camera_speed = clamp(
            self.camera_speed,
            &Self::CAMERA_SPEED_RANGE,
            defaults.camera_speed,
        );
        self.brush_size = self
            .brush_size
            .clamp(*Self::BRUSH_SIZE_RANGE.start(), *Self::BRUSH_SIZE_RANGE.end());
    }
}
