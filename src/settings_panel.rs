use bevy::prelude::*;
use bevy_egui::egui;

use crate::editor_panels::{EditorPanel, PanelContext};
use crate::settings::LevelEditorSettings;

#[derive(Default)]
pub(crate) struct SettingsPanel {
    confirming_reset: bool,
    status: Option<String>,
}

fn grid_group(ui: &mut egui::Ui, settings: &mut LevelEditorSettings) {
    ui.label(egui::RichText::new("Grid Settings").strong());
    ui.add(
        egui::Slider::new(&mut settings.grid_size, LevelEditorSettings::GRID_SIZE_RANGE)
            .text("Grid Size"),
    );
    ui.checkbox(&mut settings.show_grid, "Show Grid");
    ui.horizontal(|ui| {
        ui.label("Grid Color");
        let color = &mut settings.grid_color;
        let mut rgba = [color.r, color.g, color.b, color.a];
        if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
            [color.r, color.g, color.b, color.a] = rgba;
        }
    });
}

fn snapping_group(ui: &mut egui::Ui, settings: &mut LevelEditorSettings) {
    ui.label(egui::RichText::new("Snapping").strong());
    ui.checkbox(&mut settings.enable_snapping, "Enable Snapping");
    ui.add_enabled(
        settings.enable_snapping,
        egui::Slider::new(
            &mut settings.snap_distance,
            LevelEditorSettings::SNAP_DISTANCE_RANGE,
        )
        .text("Snap Distance"),
    );
}

fn brush_group(ui: &mut egui::Ui, settings: &mut LevelEditorSettings) {
    ui.label(egui::RichText::new("Brush Settings").strong());
    ui.add(
        egui::Slider::new(&mut settings.brush_size, LevelEditorSettings::BRUSH_SIZE_RANGE)
            .text("Brush Size"),
    );
    ui.checkbox(&mut settings.enable_brush_preview, "Show Brush Preview");
}

fn view_group(ui: &mut egui::Ui, settings: &mut LevelEditorSettings) {
    ui.label(egui::RichText::new("View Settings").strong());
    ui.checkbox(&mut settings.show_gizmos, "Show Gizmos");
    ui.add(
        egui::Slider::new(
            &mut settings.camera_speed,
            LevelEditorSettings::CAMERA_SPEED_RANGE,
        )
        .text("Camera Speed"),
    );
}

impl EditorPanel for SettingsPanel {
    fn deactivate(&mut self) {
        self.confirming_reset = false;
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext) {
        ui.heading("Settings");
        ui.add_space(10.0);

        let settings = &mut *ctx.settings;
        grid_group(ui, settings);
        ui.add_space(10.0);
        snapping_group(ui, settings);
        ui.add_space(10.0);
        brush_group(ui, settings);
        ui.add_space(10.0);
        view_group(ui, settings);
        ui.add_space(20.0);

        if self.confirming_reset {
            ui.label("Are you sure you want to reset all settings to defaults?");
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    settings.reset_to_defaults();
                    self.confirming_reset = false;
                    self.status = Some("Settings reset to defaults.".to_owned());
                }
                if ui.button("No").clicked() {
                    self.confirming_reset = false;
                }
            });
        }

        ui.horizontal(|ui| {
            if ui.button("Reset to Defaults").clicked() {
                self.confirming_reset = true;
            }
            let save_button = egui::Button::new("Save Settings");
            let Some(path) = ctx.settings_path else {
                ui.add_enabled(false, save_button)
                    .on_disabled_hover_text("No settings file is configured");
                return;
            };
            if ui.add(save_button).clicked() {
                self.status = Some(match settings.save(path) {
                    Ok(()) => {
                        info!("Saved level editor settings to {}", path.display());
                        "Settings saved.".to_owned()
                    }
                    Err(err) => {
                        error!("Failed to save settings to {}: {}", path.display(), err);
                        format!("Failed to save settings: {err}")
                    }
                });
            }
        });

        if let Some(status) = &self.status {
            ui.label(status);
        }
    }
}
