//! # bevy-levelkit - a tile level editor for Bevy
//!
//! Levels are rectangular grids of tile symbols (`#` wall, `P` player, `E` enemy, ...) with a
//! background color. They are stored as `.level` JSON files and edited through an egui window:
//!
//! * The **Levels** tab lists the levels, creates new ones, and edits the selected one.
//! * The **Tiles** tab picks the symbol painted into the layout.
//! * The **Brushes** tab is a pair of scratch grids for trying out color combinations.
//! * The **Settings** tab edits [`LevelEditorSettings`], which are persisted between runs.
//! * The **Console** tab shows the log, when [`console_layer_factory`] is installed.
//!
//! ```no_run
//! # use bevy::prelude::*;
//! # use bevy_levelkit::LevelKitPlugin;
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(LevelKitPlugin {
//!         levels_directory: "assets/levels".into(),
//!         settings_path: Some("level_editor_settings.json".into()),
//!     })
//!     .run();
//! ```
//!
//! The non-UI parts are usable on their own. [`LevelStore`] works over any
//! [`LevelRepository`], and [`LevelEditorSession`] drives level creation and selection:
//!
//! ```
//! # use bevy_levelkit::{InMemoryLevelRepository, LevelEditorSession, LevelStore};
//! let mut store = LevelStore::new(InMemoryLevelRepository::new());
//! let mut session = LevelEditorSession::new();
//! let level = session.create_from_form(Some(&mut store), |_| false).unwrap();
//! assert_eq!(level.id, 1);
//! assert_eq!(level.layout, vec![".".repeat(10); 10]);
//! ```

mod brush_grid;
mod brush_panel;
mod console;
mod editor_panels;
mod editor_window;
mod errors;
mod level_preview;
mod level_record;
mod level_store;
mod levels_panel;
mod repository;
mod session;
mod settings;
mod settings_panel;
mod tiles_panel;

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

pub use bevy_egui;

pub use self::brush_grid::{BrushCell, BrushGrid, BrushGridSide, DEFAULT_BRUSH_CELL_COLOR};
pub use self::console::{
    ConsoleFilters, LevelKitConsoleLayer, LevelKitLogHistory, LogLine, LogSeverity,
    console_layer_factory,
};
pub use self::editor_panels::{EditorPanelKind, EditorPanels};
pub use self::errors::{
    LevelStoreError, RepositoryError, SessionError, SettingsError, ValidationError,
};
pub use self::level_record::{
    LEVEL_FILE_EXTENSION, LevelColor, LevelLocation, LevelRecord, TileKind, tile_color,
};
pub use self::level_store::LevelStore;
pub use self::repository::{
    DirectoryLevelRepository, InMemoryLevelRepository, LEVEL_FORMAT_VERSION, LevelRepository,
    decode_level, encode_level,
};
pub use self::session::{CreationForm, DEFAULT_FORM_DIMENSION, FormPhase, LevelEditorSession};
pub use self::settings::LevelEditorSettings;

pub mod prelude {
    pub use crate::{
        LevelColor, LevelEditorSession, LevelEditorSettings, LevelKitPlugin, LevelLocation,
        LevelRecord, LevelRepository, LevelStore, TileKind,
    };
}

/// Add the level editor window to the app.
///
/// Inserts [`LevelStore`] (backed by a [`DirectoryLevelRepository`] over
/// `levels_directory`), [`LevelEditorSession`], [`LevelEditorSettings`] and [`EditorPanels`].
/// A [`LevelStore`] inserted before this plugin is kept, which is how other repositories are
/// plugged in.
pub struct LevelKitPlugin {
    pub levels_directory: PathBuf,
    /// Where the editor settings are loaded from at startup and saved to on exit. `None` keeps
    /// them in memory only.
    pub settings_path: Option<PathBuf>,
}

impl Default for LevelKitPlugin {
    fn default() -> Self {
        Self {
            levels_directory: PathBuf::from("assets").join("levels"),
            settings_path: Some(PathBuf::from("level_editor_settings.json")),
        }
    }
}

/// The file the editor settings are persisted to, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelEditorSettingsPath(pub Option<PathBuf>);

impl Plugin for LevelKitPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }

        if !app.world().contains_resource::<LevelStore>() {
            app.insert_resource(LevelStore::new(DirectoryLevelRepository::new(
                self.levels_directory.clone(),
            )));
        }

        let settings = match &self.settings_path {
            Some(path) => LevelEditorSettings::load_or_default(path),
            None => LevelEditorSettings::default(),
        };
        app.insert_resource(settings);
        app.insert_resource(LevelEditorSettingsPath(self.settings_path.clone()));
        app.init_resource::<LevelEditorSession>();
        app.init_resource::<EditorPanels>();

        app.add_systems(EguiPrimaryContextPass, editor_window::level_editor_window);
        app.add_systems(Last, editor_window::save_settings_on_exit);
    }
}
