use bevy_egui::egui;

use crate::editor_panels::{EditorPanel, PanelContext};
use crate::level_preview::{PREVIEW_CELL_SIZE, legend};

/// Pick the tile painted into layouts by clicking in the Levels panel.
#[derive(Default)]
pub(crate) struct TilesPanel;

impl EditorPanel for TilesPanel {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext) {
        ui.heading("Tiles");
        ui.label("Click a tile to make it the active brush for the layout preview.");
        ui.add_space(10.0);

        let active = ctx.session.active_tile();
        if let Some(kind) = legend(ui, Some(active)) {
            ctx.session.set_active_tile(kind);
        }

        ui.add_space(10.0);
        let active = ctx.session.active_tile();
        ui.horizontal(|ui| {
            ui.label("Active tile:");
            let (rect, _) =
                ui.allocate_exact_size(egui::Vec2::splat(PREVIEW_CELL_SIZE), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, active.color());
            ui.label(format!("{} ('{}')", active.label(), active.symbol()));
        });
    }
}
