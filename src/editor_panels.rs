use std::path::Path;

use bevy::prelude::*;
use bevy_egui::egui;

use crate::brush_panel::BrushPanel;
use crate::console::{ConsoleFilters, LevelKitLogHistory, console_ui};
use crate::level_store::LevelStore;
use crate::levels_panel::LevelsPanel;
use crate::session::LevelEditorSession;
use crate::settings::LevelEditorSettings;
use crate::settings_panel::SettingsPanel;
use crate::tiles_panel::TilesPanel;

/// The tabs of the level editor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditorPanelKind {
    #[default]
    Levels,
    Tiles,
    Brushes,
    Settings,
    Console,
}

impl EditorPanelKind {
    pub const ALL: [EditorPanelKind; 5] = [
        EditorPanelKind::Levels,
        EditorPanelKind::Tiles,
        EditorPanelKind::Brushes,
        EditorPanelKind::Settings,
        EditorPanelKind::Console,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Levels => "Levels",
            Self::Tiles => "Tiles",
            Self::Brushes => "Brushes",
            Self::Settings => "Settings",
            Self::Console => "Console",
        }
    }
}

/// Everything a panel may read or change while it is rendered.
pub(crate) struct PanelContext<'a> {
    pub(crate) store: Option<&'a mut LevelStore>,
    pub(crate) session: &'a mut LevelEditorSession,
    pub(crate) settings: &'a mut LevelEditorSettings,
    pub(crate) settings_path: Option<&'a Path>,
    pub(crate) log_history: Option<&'a mut LevelKitLogHistory>,
}

/// The contract every tab of the editor window implements.
pub(crate) trait EditorPanel {
    /// Called when the panel's tab becomes the active one.
    fn activate(&mut self, _ctx: &mut PanelContext) {}

    /// Called when another tab replaces this one.
    fn deactivate(&mut self) {}

    fn render(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext);
}

#[derive(Default)]
pub(crate) struct ConsolePanel {
    filters: ConsoleFilters,
}

impl EditorPanel for ConsolePanel {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext) {
        console_ui(ui, &mut self.filters, ctx.log_history.as_deref_mut());
    }
}

/// State of all the panels of the level editor window, and which one is shown.
#[derive(Resource)]
pub struct EditorPanels {
    active: EditorPanelKind,
    activated: bool,
    levels: LevelsPanel,
    tiles: TilesPanel,
    brushes: BrushPanel,
    settings: SettingsPanel,
    console: ConsolePanel,
}

impl Default for EditorPanels {
    fn default() -> Self {
        Self {
            active: EditorPanelKind::default(),
            activated: false,
            levels: Default::default(),
            tiles: Default::default(),
            brushes: Default::default(),
            settings: Default::default(),
            console: Default::default(),
        }
    }
}

impl EditorPanels {
    pub fn active(&self) -> EditorPanelKind {
        self.active
    }

    fn panel_mut(&mut self, kind: EditorPanelKind) -> &mut dyn EditorPanel {
        match kind {
            EditorPanelKind::Levels => &mut self.levels,
            EditorPanelKind::Tiles => &mut self.tiles,
            EditorPanelKind::Brushes => &mut self.brushes,
            EditorPanelKind::Settings => &mut self.settings,
            EditorPanelKind::Console => &mut self.console,
        }
    }

    /// Switch tabs, running the deactivate/activate hooks. Selecting the active tab is a no-op.
    pub(crate) fn switch_to(&mut self, kind: EditorPanelKind, ctx: &mut PanelContext) {
        if self.activated && kind == self.active {
            return;
        }
        if self.activated {
            self.panel_mut(self.active).deactivate();
        }
        self.active = kind;
        self.activated = true;
        self.panel_mut(kind).activate(ctx);
    }

    /// Draw the tab bar and the active panel.
    pub(crate) fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext) {
        if !self.activated {
            self.switch_to(self.active, ctx);
        }

        let mut requested = self.active;
        ui.horizontal(|ui| {
            for kind in EditorPanelKind::ALL {
                if ui.selectable_label(requested == kind, kind.name()).clicked() {
                    requested = kind;
                }
            }
        });
        self.switch_to(requested, ctx);

        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("levelkit_panel_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.panel_mut(self.active).render(ui, ctx);
            });
    }

    /// Run the deactivate hook of the shown panel, e.g. when the window is torn down.
    pub(crate) fn deactivate_all(&mut self) {
        if self.activated {
            self.panel_mut(self.active).deactivate();
            self.activated = false;
        }
    }
}
