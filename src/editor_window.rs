use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::console::LevelKitLogHistory;
use crate::editor_panels::{EditorPanels, PanelContext};
use crate::level_store::LevelStore;
use crate::session::LevelEditorSession;
use crate::settings::LevelEditorSettings;
use crate::LevelEditorSettingsPath;

#[allow(clippy::too_many_arguments)]
pub(crate) fn level_editor_window(
    mut contexts: EguiContexts,
    mut panels: ResMut<EditorPanels>,
    mut session: ResMut<LevelEditorSession>,
    mut store: Option<ResMut<LevelStore>>,
    mut settings: ResMut<LevelEditorSettings>,
    settings_path: Res<LevelEditorSettingsPath>,
    mut log_history: Option<ResMut<LevelKitLogHistory>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let mut panel_ctx = PanelContext {
        store: store.as_deref_mut(),
        session: &mut session,
        settings: &mut settings,
        settings_path: settings_path.0.as_deref(),
        log_history: log_history.as_deref_mut(),
    };
    egui::Window::new("Level Editor")
        .default_width(600.0)
        .show(ctx, |ui| {
            panels.show(ui, &mut panel_ctx);
        });
}

/// Persist the settings and close the shown panel when the app exits.
pub(crate) fn save_settings_on_exit(
    mut exit_reader: MessageReader<AppExit>,
    mut panels: ResMut<EditorPanels>,
    settings: Res<LevelEditorSettings>,
    settings_path: Res<LevelEditorSettingsPath>,
) {
    if exit_reader.read().last().is_none() {
        return;
    }
    panels.deactivate_all();
    let Some(path) = settings_path.0.as_deref() else {
        return;
    };
    match settings.save(path) {
        Ok(()) => debug!("Saved level editor settings to {}", path.display()),
        Err(err) => error!("Failed to save settings to {}: {}", path.display(), err),
    }
}
