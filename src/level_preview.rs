use bevy_egui::egui;

use crate::level_record::{LevelRecord, TileKind, tile_color};
use crate::settings::LevelEditorSettings;

pub(crate) const PREVIEW_CELL_SIZE: f32 = 20.0;
const MIN_COMPACT_CELL_SIZE: f32 = 2.0;

/// Draw the layout of a record as a grid of colored, labeled cells.
///
/// Returns the `(row, col)` of the cell that was clicked this frame, if any.
pub(crate) fn layout_grid(
    ui: &mut egui::Ui,
    record: &LevelRecord,
    settings: &LevelEditorSettings,
) -> Option<(usize, usize)> {
    let rows = record.layout.len();
    let columns = record
        .layout
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    if rows == 0 || columns == 0 {
        ui.label("No layout data");
        return None;
    }

    let size = egui::vec2(
        columns as f32 * PREVIEW_CELL_SIZE,
        rows as f32 * PREVIEW_CELL_SIZE,
    );
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from(record.background_color));

    let grid_stroke = egui::Stroke::new(1.0, egui::Color32::from(settings.grid_color));
    for (row, line) in record.layout.iter().enumerate() {
        for (col, symbol) in line.chars().enumerate() {
            let cell_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(col as f32, row as f32) * PREVIEW_CELL_SIZE,
                egui::Vec2::splat(PREVIEW_CELL_SIZE),
            );
            painter.rect_filled(cell_rect.shrink(1.0), 2.0, tile_color(symbol));
            if settings.show_grid {
                painter.rect_stroke(cell_rect, 0.0, grid_stroke, egui::StrokeKind::Inside);
            }
            painter.text(
                cell_rect.center(),
                egui::Align2::CENTER_CENTER,
                symbol,
                egui::FontId::monospace(10.0),
                egui::Color32::BLACK,
            );
        }
    }

    if !response.clicked() {
        return None;
    }
    let position = response.interact_pointer_pos()? - rect.min;
    let row = (position.y / PREVIEW_CELL_SIZE).floor();
    let col = (position.x / PREVIEW_CELL_SIZE).floor();
    if row < 0.0 || col < 0.0 {
        return None;
    }
    Some((row as usize, col as usize))
}

/// A thumbnail of the layout fitted into `max_size`. Empty tiles are not drawn.
pub(crate) fn compact_preview(ui: &mut egui::Ui, record: &LevelRecord, max_size: egui::Vec2) {
    if record.width <= 0 || record.height <= 0 {
        return;
    }
    let cell_size = (max_size.x / record.width as f32)
        .min(max_size.y / record.height as f32)
        .max(MIN_COMPACT_CELL_SIZE);
    let size = egui::vec2(
        record.width as f32 * cell_size,
        record.height as f32 * cell_size,
    );
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from(record.background_color));
    for (row, line) in record.layout.iter().enumerate() {
        for (col, symbol) in line.chars().enumerate() {
            if symbol == TileKind::Empty.symbol() {
                continue;
            }
            let cell_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(col as f32, row as f32) * cell_size,
                egui::Vec2::splat(cell_size),
            );
            painter.rect_filled(cell_rect, 0.0, tile_color(symbol));
        }
    }
}

/// One swatch per tile kind. Clicking a swatch returns its kind.
pub(crate) fn legend(ui: &mut egui::Ui, highlighted: Option<TileKind>) -> Option<TileKind> {
    let mut clicked = None;
    ui.label(egui::RichText::new("Legend:").strong());
    for kind in TileKind::ALL {
        ui.horizontal(|ui| {
            let swatch = egui::Button::new(
                egui::RichText::new(kind.symbol().to_string())
                    .monospace()
                    .color(egui::Color32::BLACK),
            )
            .fill(kind.color())
            .selected(highlighted == Some(kind))
            .min_size(egui::Vec2::splat(PREVIEW_CELL_SIZE));
            if ui.add(swatch).clicked() {
                clicked = Some(kind);
            }
            ui.label(format!("= {}", kind.label()));
        });
    }
    clicked
}
