use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FilterSelection;
use crate::data::model::CategoricalColumn;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and global filters
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    for page in Page::ALL {
        ui.radio_value(&mut state.page, page, page.label());
    }
    ui.separator();

    ui.heading("Global Filters");

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in FilterSelection::COLUMNS {
                let all_values = dataset.distinct_values(column);
                let n_selected = state.selection.values(column).map_or(0, |s| s.len());
                let header_text = format!(
                    "Select {}  ({n_selected}/{})",
                    column.label(),
                    all_values.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(column);
                            }
                        });

                        for value in all_values {
                            let mut checked = state
                                .selection
                                .values(column)
                                .is_some_and(|s| s.contains(value));
                            let mut text = RichText::new(value);
                            if column == CategoricalColumn::Species {
                                if let Some(cm) = &state.color_map {
                                    text = text.color(cm.color_for(value));
                                }
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(column, value);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, backend_label: &str) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!("{} penguins loaded, {} visible", ds.len(), view.len()));
        }

        ui.separator();
        ui.label(backend_label);

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
        .set_title("Open penguins data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path.to_string_lossy());
    }
}
