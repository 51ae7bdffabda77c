use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use tune_stats::dashboard::payload::TableData;

const ROW_HEIGHT: f32 = 18.0;

/// Virtualized grid over the table payload: only visible rows are laid out.
pub fn data_table(ui: &mut Ui, salt: &str, data: &TableData) {
    ui.push_id(salt, |ui: &mut Ui| {
        let mut table = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(400.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
        for column in &data.columns {
            let width = if column.numeric { 90.0 } else { 200.0 };
            table = table.column(Column::initial(width).at_least(40.0).clip(true));
        }

        table
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for column in &data.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.header.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, data.rows.len(), |mut row| {
                    let cells = &data.rows[row.index()];
                    for (column, value) in data.columns.iter().zip(cells) {
                        row.col(|ui: &mut Ui| {
                            ui.label(column.display(value));
                        });
                    }
                });
            });
    });
}
