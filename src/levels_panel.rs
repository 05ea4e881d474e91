use bevy::prelude::*;
use bevy_egui::egui;

use crate::editor_panels::{EditorPanel, PanelContext};
use crate::errors::SessionError;
use crate::level_preview::{compact_preview, layout_grid, legend};
use crate::level_record::{LevelLocation, LevelRecord};
use crate::level_store::LevelStore;
use crate::session::{FormPhase, LevelEditorSession};
use crate::settings::LevelEditorSettings;

const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(70, 170, 90);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 70, 70);
const FORM_DIMENSION_RANGE: std::ops::RangeInclusive<i32> = 5..=50;

struct Status {
    message: String,
    is_error: bool,
}

/// Browse, create, edit, duplicate and delete levels.
pub(crate) struct LevelsPanel {
    levels: Vec<LevelRecord>,
    /// Working copy of the selected level, with edits not yet applied.
    editing: Option<LevelRecord>,
    has_unsaved_edits: bool,
    pending_delete: Option<LevelRecord>,
    show_level_list: bool,
    show_level_details: bool,
    status: Option<Status>,
}

impl Default for LevelsPanel {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            editing: None,
            has_unsaved_edits: false,
            pending_delete: None,
            show_level_list: true,
            show_level_details: true,
            status: None,
        }
    }
}

impl LevelsPanel {
    fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.status = Some(Status {
            message,
            is_error: false,
        });
    }

    fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.status = Some(Status {
            message,
            is_error: true,
        });
    }

    fn refresh(&mut self, store: &LevelStore, session: &mut LevelEditorSession) {
        self.levels = store.load_all();
        self.sync_selection(store, session, true);
    }

    /// Keep the working copy in step with the session's selection.
    fn sync_selection(
        &mut self,
        store: &LevelStore,
        session: &mut LevelEditorSession,
        force_reload: bool,
    ) {
        let editing_location = self.editing.as_ref().and_then(|record| record.location());
        if !force_reload && session.selected_location() == editing_location {
            return;
        }
        if force_reload && self.has_unsaved_edits && session.selected_location() == editing_location
        {
            // Keep the edits, but drop them if the level disappeared underneath.
            if session.selected(store).is_none() {
                self.editing = None;
                self.has_unsaved_edits = false;
            }
            return;
        }
        self.editing = session.selected(store);
        self.has_unsaved_edits = false;
    }

    fn select(&mut self, record: &LevelRecord, session: &mut LevelEditorSession) {
        session.select(record);
        self.editing = Some(record.clone());
        self.has_unsaved_edits = false;
    }

    fn toolbar(
        &mut self,
        ui: &mut egui::Ui,
        store: &LevelStore,
        session: &mut LevelEditorSession,
    ) {
        ui.horizontal(|ui| {
            if ui.button("Refresh").clicked() {
                self.refresh(store, session);
            }
            if ui.button("Create New").clicked() {
                if matches!(session.phase(), FormPhase::Editing) {
                    session.cancel();
                } else {
                    session.open_form();
                }
            }
            ui.separator();
            ui.label(format!("Total: {}", self.levels.len()));
        });
    }

    fn creation_form(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut LevelStore,
        session: &mut LevelEditorSession,
    ) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label(egui::RichText::new("Create New Level").strong());

            let form = session.form_mut();
            ui.checkbox(&mut form.auto_number, "Auto Level Number");
            ui.horizontal(|ui| {
                ui.label("Level Number:");
                ui.add_enabled(
                    !form.auto_number,
                    egui::DragValue::new(&mut form.level_number).range(1..=u32::MAX),
                );
            });
            if form.auto_number {
                ui.label("Level number will be set automatically to the next available number.");
            }
            ui.add_space(5.0);
            ui.add(egui::Slider::new(&mut form.width, FORM_DIMENSION_RANGE).text("Width"));
            ui.add(egui::Slider::new(&mut form.height, FORM_DIMENSION_RANGE).text("Height"));
            ui.label(format!(
                "Grid Size: {} x {} = {} cells",
                form.width,
                form.height,
                form.width * form.height
            ));
            ui.add_space(5.0);

            if let Some(id) = session.pending_overwrite() {
                ui.label(format!(
                    "Level {id} already exists. Do you want to replace it with a blank level?"
                ));
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        if let Some(result) = session.confirm_pending(Some(&mut *store)) {
                            self.finish_creation(result, store, session);
                        }
                    }
                    if ui.button("No").clicked() {
                        session.decline_pending();
                    }
                });
                return;
            }

            ui.horizontal(|ui| {
                let create = egui::Button::new("Create").fill(SUCCESS_COLOR);
                if ui.add(create).clicked() {
                    let result = session.request_create(Some(&mut *store));
                    self.finish_creation(result, store, session);
                }
                if ui.button("Cancel").clicked() {
                    session.cancel();
                }
            });
        });
    }

    fn finish_creation(
        &mut self,
        result: Result<LevelRecord, SessionError>,
        store: &LevelStore,
        session: &mut LevelEditorSession,
    ) {
        match result {
            Ok(record) => {
                self.levels = store.load_all();
                self.select(&record, session);
                session.reset();
                self.report(format!("Level {} created successfully!", record.id));
            }
            // The question is shown by the form on the next frame.
            Err(SessionError::Declined(_)) if session.pending_overwrite().is_some() => {}
            Err(SessionError::InvalidDimensions) => {
                self.report_error("Width and Height must be greater than 0!");
            }
            Err(err) => self.report_error(format!("Cannot create level: {err}")),
        }
    }

    fn level_list(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut LevelStore,
        session: &mut LevelEditorSession,
    ) {
        let response = egui::CollapsingHeader::new("Level List")
            .default_open(self.show_level_list)
            .show(ui, |ui| {
                if self.levels.is_empty() {
                    ui.label("No levels found");
                    if ui.button("Create First Level").clicked() {
                        session.open_form();
                    }
                    return;
                }

                let mut clicked_select = None;
                let mut clicked_apply = None;
                let mut clicked_delete = None;
                egui::ScrollArea::vertical()
                    .id_salt("levelkit_level_list")
                    .max_height(400.0)
                    .show(ui, |ui| {
                        for (index, record) in self.levels.iter().enumerate() {
                            ui.horizontal(|ui| {
                                compact_preview(ui, record, egui::vec2(36.0, 36.0));
                                let caption = format!("Level {}", record.id);
                                if ui
                                    .selectable_label(session.is_selected(record), caption)
                                    .on_hover_text(
                                        record.location().map_or("", LevelLocation::as_str),
                                    )
                                    .clicked()
                                {
                                    clicked_select = Some(index);
                                }
                                if ui.small_button("▶").on_hover_text("Apply").clicked() {
                                    clicked_apply = Some(index);
                                }
                                if ui.small_button("×").on_hover_text("Delete").clicked() {
                                    clicked_delete = Some(index);
                                }
                            });
                        }
                    });

                if let Some(index) = clicked_select {
                    let record = self.levels[index].clone();
                    self.select(&record, session);
                }
                if let Some(index) = clicked_apply {
                    let record = self.levels[index].clone();
                    self.apply(store, &record, "applied");
                }
                if let Some(index) = clicked_delete {
                    self.pending_delete = Some(self.levels[index].clone());
                }
            });
        self.show_level_list = response.fully_open();
    }

    /// Apply the working copy when `record` is the selected level, `record` itself otherwise.
    fn apply(&mut self, store: &mut LevelStore, record: &LevelRecord, done: &str) {
        let to_apply = match &self.editing {
            Some(editing) if editing.location() == record.location() => editing.clone(),
            _ => record.clone(),
        };
        let persisted = store.apply_changes(Some(&to_apply));
        self.levels = store.load_all();
        if !persisted {
            self.report_error(format!(
                "Level {} could not be saved. It may have been deleted.",
                to_apply.id
            ));
            return;
        }
        if self.editing.as_ref().map(LevelRecord::location) == Some(to_apply.location()) {
            self.has_unsaved_edits = false;
        }
        self.report(format!("Level {} {done} successfully!", to_apply.id));
    }

    fn delete_confirmation(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut LevelStore,
        session: &mut LevelEditorSession,
    ) {
        let Some(record) = self.pending_delete.clone() else {
            return;
        };
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label(format!(
                "Are you sure you want to delete Level {}?\nThis action cannot be undone.",
                record.id
            ));
            ui.horizontal(|ui| {
                if ui.add(egui::Button::new("Delete").fill(ERROR_COLOR)).clicked() {
                    self.pending_delete = None;
                    if store.delete(&record) {
                        if session.is_selected(&record) {
                            session.clear_selection();
                        }
                        self.refresh(store, session);
                        self.report(format!("Deleted Level {}", record.id));
                    } else {
                        self.report_error("Failed to delete level.");
                    }
                }
                if ui.button("Cancel").clicked() {
                    self.pending_delete = None;
                }
            });
        });
    }

    fn level_details(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut LevelStore,
        session: &mut LevelEditorSession,
        settings: &LevelEditorSettings,
    ) {
        let response = egui::CollapsingHeader::new("Level Details")
            .default_open(self.show_level_details)
            .show(ui, |ui| {
                let Some(mut record) = self.editing.take() else {
                    ui.label("Select a level to view details");
                    return;
                };

                information_section(ui, &record, self.has_unsaved_edits);
                ui.add_space(10.0);

                if properties_section(ui, &mut record) {
                    self.has_unsaved_edits = true;
                }
                ui.add_space(10.0);

                egui::CollapsingHeader::new("Layout Preview")
                    .default_open(true)
                    .show(ui, |ui| {
                        if let Some((row, col)) = layout_grid(ui, &record, settings)
                            && session.paint_cell(&mut record, row, col)
                        {
                            self.has_unsaved_edits = true;
                        }
                        ui.add_space(5.0);
                        if let Some(kind) = legend(ui, Some(session.active_tile())) {
                            session.set_active_tile(kind);
                        }
                    });
                ui.add_space(10.0);

                self.editing = Some(record);
                self.actions_section(ui, store, session);
            });
        self.show_level_details = response.fully_open();
    }

    fn actions_section(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut LevelStore,
        session: &mut LevelEditorSession,
    ) {
        let Some(record) = self.editing.clone() else {
            return;
        };
        ui.label(egui::RichText::new("Actions").strong());
        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new("Apply Level").fill(SUCCESS_COLOR))
                .clicked()
            {
                self.apply(store, &record, "applied");
            }
            if ui.button("Duplicate").clicked() {
                match store.duplicate(Some(&record)) {
                    Some(duplicate) => {
                        self.levels = store.load_all();
                        self.select(&duplicate, session);
                        self.report(format!("Duplicated Level {}", record.id));
                    }
                    None => self.report_error("Failed to duplicate level."),
                }
            }
            if ui
                .add(egui::Button::new("Delete").fill(ERROR_COLOR))
                .clicked()
            {
                self.pending_delete = Some(record.clone());
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Save Changes").clicked() {
                self.apply(store, &record, "saved");
            }
            if ui
                .add_enabled(self.has_unsaved_edits, egui::Button::new("Revert"))
                .clicked()
            {
                self.editing = session.selected(store);
                self.has_unsaved_edits = false;
            }
        });
    }
}

fn information_section(ui: &mut egui::Ui, record: &LevelRecord, has_unsaved_edits: bool) {
    ui.label(egui::RichText::new("Level Information").strong());
    egui::Grid::new("levelkit_level_information")
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Location:");
            ui.label(record.location().map_or("-", LevelLocation::as_str));
            ui.end_row();
            ui.label("Dimensions:");
            ui.label(format!("{} x {}", record.width, record.height));
            ui.end_row();
            ui.label("Layout Size:");
            ui.label(format!("{} rows", record.layout.len()));
            ui.end_row();
        });
    match LevelStore::validate(Some(record)) {
        Ok(()) => {
            ui.colored_label(SUCCESS_COLOR, "✓ Level data is valid");
        }
        Err(err) => {
            ui.colored_label(ERROR_COLOR, format!("⚠ Validation Error: {err}"));
        }
    }
    if has_unsaved_edits {
        ui.label(egui::RichText::new("Unsaved changes").italics());
    }
}

/// Returns `true` if any field changed.
fn properties_section(ui: &mut egui::Ui, record: &mut LevelRecord) -> bool {
    ui.label(egui::RichText::new("Properties").strong());
    let mut changed = false;
    egui::Grid::new("levelkit_level_properties")
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Level Number:");
            changed |= ui.add(egui::DragValue::new(&mut record.id)).changed();
            ui.end_row();
            ui.label("Width:");
            changed |= ui.add(egui::DragValue::new(&mut record.width)).changed();
            ui.end_row();
            ui.label("Height:");
            changed |= ui.add(egui::DragValue::new(&mut record.height)).changed();
            ui.end_row();
            ui.label("Background Color:");
            let color = &mut record.background_color;
            let mut rgba = [color.r, color.g, color.b, color.a];
            if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
                [color.r, color.g, color.b, color.a] = rgba;
                changed = true;
            }
            ui.end_row();
        });
    changed
}

impl EditorPanel for LevelsPanel {
    fn activate(&mut self, ctx: &mut PanelContext) {
        if let Some(store) = ctx.store.as_deref() {
            self.refresh(store, ctx.session);
        }
    }

    fn deactivate(&mut self) {
        self.pending_delete = None;
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &mut PanelContext) {
        ui.heading("Levels");
        ui.label("Manage all the levels of the project.");
        ui.add_space(10.0);

        let PanelContext {
            store,
            session,
            settings,
            ..
        } = ctx;
        let Some(store) = store.as_deref_mut() else {
            ui.colored_label(ERROR_COLOR, "No level store is available.");
            return;
        };

        self.sync_selection(store, session, false);

        self.toolbar(ui, store, session);
        if matches!(session.phase(), FormPhase::Editing) {
            self.creation_form(ui, store, session);
        }
        if let Some(status) = &self.status {
            let color = if status.is_error {
                ERROR_COLOR
            } else {
                SUCCESS_COLOR
            };
            ui.colored_label(color, &status.message);
        }
        self.delete_confirmation(ui, store, session);
        ui.add_space(5.0);

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(250.0);
                self.level_list(ui, store, session);
            });
            ui.separator();
            ui.vertical(|ui| {
                self.level_details(ui, store, session, settings);
            });
        });
    }
}
