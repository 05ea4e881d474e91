use bevy_egui::egui;

use crate::brush_grid::{BrushGrid, BrushGridSide};
use crate::editor_panels::{EditorPanel, PanelContext};
use crate::level_record::{LevelColor, TileKind};

const DEFAULT_CELL_SIZE: u32 = 30;
const MIN_CELL_SIZE: u32 = 10;
const GRID_SPACING: f32 = 20.0;
const PALETTE_BUTTON_SIZE: f32 = 30.0;
const HOVER_HIGHLIGHT: f32 = 0.2;

pub(crate) struct BrushPanel {
    grid: BrushGrid,
    cell_size: u32,
    texture_input: String,
}

impl Default for BrushPanel {
    fn default() -> Self {
        let mut grid = BrushGrid::default();
        grid.palette = TileKind::ALL
            .iter()
            .filter(|kind| **kind != TileKind::Empty)
            .map(TileKind::color)
            .collect();
        Self {
            grid,
            cell_size: DEFAULT_CELL_SIZE,
            texture_input: String::new(),
        }
    }
}

impl BrushPanel {
    fn size_controls(&mut self, ui: &mut egui::Ui) {
        let mut rows = self.grid.rows();
        let mut columns = self.grid.columns();
        ui.horizontal(|ui| {
            ui.label("X (Rows)");
            ui.add(egui::DragValue::new(&mut rows).range(1..=64));
            ui.label("Y (Columns)");
            ui.add(egui::DragValue::new(&mut columns).range(1..=64));
        });
        if rows != self.grid.rows() || columns != self.grid.columns() {
            self.grid.resize(rows, columns);
        }
        ui.horizontal(|ui| {
            ui.label("Cell Size");
            ui.add(egui::DragValue::new(&mut self.cell_size).range(MIN_CELL_SIZE..=100));
        });
    }

    fn paint_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Current Texture");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.texture_input).hint_text("asset path"),
            );
            if response.changed() {
                let path = self.texture_input.trim();
                self.grid.current_texture = (!path.is_empty()).then(|| path.to_owned());
            }
        });
        ui.horizontal(|ui| {
            ui.label("Current Color");
            let color = &mut self.grid.current_color;
            let mut rgba = [color.r, color.g, color.b, color.a];
            if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
                [color.r, color.g, color.b, color.a] = rgba;
            }
            if ui.button("Add to Palette").clicked() {
                let current = self.grid.current_color;
                if !self.grid.palette.iter().any(|c| self.grid.is_current_color(c)) {
                    self.grid.palette.push(current);
                }
            }
        });
    }

    fn palette_buttons(&mut self, ui: &mut egui::Ui) {
        if self.grid.palette.is_empty() {
            ui.label("The color palette is empty.");
            return;
        }
        let mut picked = None;
        let mut removed = None;
        ui.horizontal_wrapped(|ui| {
            ui.label("Color Palette:");
            for (index, color) in self.grid.palette.iter().enumerate() {
                let button = egui::Button::new("")
                    .fill(*color)
                    .selected(self.grid.is_current_color(color))
                    .min_size(egui::Vec2::splat(PALETTE_BUTTON_SIZE));
                let response = ui
                    .add(button)
                    .on_hover_text(format!("#{} (right click to remove)", color.to_hex()));
                if response.clicked() {
                    picked = Some(*color);
                } else if response.secondary_clicked() {
                    removed = Some(index);
                }
            }
        });
        if let Some(color) = picked {
            self.grid.current_color = color;
        }
        if let Some(index) = removed {
            self.grid.palette.remove(index);
        }
    }

    fn grids(&mut self, ui: &mut egui::Ui) {
        let cell_size = self.cell_size as f32;
        let grid_size = egui::vec2(
            self.grid.columns() as f32 * cell_size,
            self.grid.rows() as f32 * cell_size,
        );
        ui.horizontal_top(|ui| {
            for side in BrushGridSide::BOTH {
                ui.vertical(|ui| {
                    ui.label(side.label());
                    self.grid_ui(ui, side, grid_size, cell_size);
                });
                ui.add_space(GRID_SPACING);
            }
        });
    }

    fn grid_ui(
        &mut self,
        ui: &mut egui::Ui,
        side: BrushGridSide,
        size: egui::Vec2,
        cell_size: f32,
    ) {
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let hovered_cell = response.hover_pos().and_then(|pos| {
            let offset = pos - rect.min;
            let row = (offset.y / cell_size).floor();
            let col = (offset.x / cell_size).floor();
            (row >= 0.0 && col >= 0.0).then_some((row as usize, col as usize))
        });

        let painter = ui.painter_at(rect);
        let border = egui::Stroke::new(1.0, egui::Color32::BLACK);
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.columns() {
                let Some(cell) = self.grid.cell(side, row, col) else {
                    continue;
                };
                let cell_rect = egui::Rect::from_min_size(
                    rect.min + egui::vec2(col as f32, row as f32) * cell_size,
                    egui::Vec2::splat(cell_size),
                );
                let mut color = cell.color;
                if hovered_cell == Some((row, col)) && cell.texture.is_none() {
                    color = color.lerp(&LevelColor::WHITE, HOVER_HIGHLIGHT);
                }
                painter.rect_filled(cell_rect, 0.0, color);
                if cell.texture.is_some() {
                    painter.text(
                        cell_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "T",
                        egui::FontId::monospace(cell_size * 0.5),
                        egui::Color32::BLACK,
                    );
                }
                painter.rect_stroke(cell_rect, 0.0, border, egui::StrokeKind::Inside);
            }
        }

        if let Some((row, col)) = hovered_cell {
            if response.clicked() {
                self.grid.paint(side, row, col);
            } else if response.secondary_clicked() {
                self.grid.erase(side, row, col);
            }
        }
    }
}

impl EditorPanel for BrushPanel {
    fn render(&mut self, ui: &mut egui::Ui, _ctx: &mut PanelContext) {
        ui.heading("Brushes");
        ui.label("Left click paints a cell, right click erases it.");
        ui.add_space(10.0);
        self.size_controls(ui);
        ui.add_space(10.0);
        self.paint_controls(ui);
        ui.add_space(10.0);
        self.palette_buttons(ui);
        ui.add_space(20.0);
        self.grids(ui);
    }
}
