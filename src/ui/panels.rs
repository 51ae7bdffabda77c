use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use tune_stats::data::filter::{FilterControls, ALL_SENTINEL};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Refreshes the dashboard when any input changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (genres, artists) = match &state.dashboard {
        Some(dash) => (
            dash.dataset().unique_genres(),
            dash.dataset().unique_artists.iter().cloned().collect::<Vec<_>>(),
        ),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let before = state.filters.clone();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, "Select Genres", &genres, &mut state.filters.genres);
            multi_select(ui, "Select Artists", &artists, &mut state.filters.artists);
            ui.separator();
            range_inputs(ui, &mut state.filters);
            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.filters = FilterControls::default();
            }
        });

    if state.filters != before {
        log::debug!("Filter controls changed: {:?}", state.filters);
        state.refresh_all();
    }
    if let Some(label) = state.count_label() {
        ui.separator();
        ui.label(label);
    }
}

/// Checkbox list with an `all` entry; choosing any value clears `all`,
/// clearing every value restores it.
fn multi_select(ui: &mut Ui, title: &str, options: &[String], selected: &mut Vec<String>) {
    let all = selected.iter().any(|s| s == ALL_SENTINEL);
    let header = if all {
        format!("{title}  (all)")
    } else {
        format!("{title}  ({}/{})", selected.len(), options.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let mut all_checked = all;
            if ui.checkbox(&mut all_checked, "All").changed() && all_checked {
                *selected = vec![ALL_SENTINEL.to_string()];
            }
            ScrollArea::vertical()
                .id_salt(format!("{title}_options"))
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    for option in options {
                        let mut checked = !all && selected.contains(option);
                        if ui.checkbox(&mut checked, option.as_str()).changed() {
                            selected.retain(|s| s != ALL_SENTINEL && s != option);
                            if checked {
                                selected.push(option.clone());
                            }
                            if selected.is_empty() {
                                selected.push(ALL_SENTINEL.to_string());
                            }
                        }
                    }
                });
        });
}

fn range_inputs(ui: &mut Ui, filters: &mut FilterControls) {
    for (bounds, input) in filters.ranges_mut() {
        ui.label(RichText::new(bounds.label).strong());
        ui.horizontal(|ui: &mut Ui| {
            ui.add(
                egui::DragValue::new(&mut input.min)
                    .range(bounds.min..=bounds.max)
                    .speed(bounds.step),
            );
            ui.label("to");
            ui.add(
                egui::DragValue::new(&mut input.max)
                    .range(bounds.min..=bounds.max)
                    .speed(bounds.step),
            );
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(dash), Some(source)) = (&state.dashboard, &state.source) {
            ui.label(format!(
                "{}: {} tracks loaded, {} visible",
                source.display(),
                dash.dataset().len(),
                state.filtered_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_or_report(&path);
    }
}
