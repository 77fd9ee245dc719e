use eframe::egui::{self, Ui};

use crate::data::model::{CategoricalColumn, MeasurementColumn};
use crate::data::summary::column_mean;
use crate::state::{AppState, Page};
use crate::ui::charts::ChartBackend;
use crate::ui::table::{self, format_mean};

// ---------------------------------------------------------------------------
// Central panel – one page at a time
// ---------------------------------------------------------------------------

/// Render the selected page in the central panel.
pub fn central_page(ui: &mut Ui, state: &AppState, backend: &dyn ChartBackend) {
    dashboard_header(ui);

    if state.page == Page::Dictionary {
        data_dictionary(ui);
        return;
    }

    let (Some(view), Some(colors)) = (&state.view, &state.color_map) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No dataset loaded  (File → Open…)");
        });
        return;
    };

    match state.page {
        Page::Overview => {
            ui.heading("📌 Dataset Overview");
            table::records_table(ui, view);
            ui.add_space(8.0);
            ui.columns(3, |cols: &mut [Ui]| {
                metric(&mut cols[0], "Total Penguins", view.len().to_string());
                metric(
                    &mut cols[1],
                    "Avg Bill Length (mm)",
                    format_mean(column_mean(view, MeasurementColumn::BillLength)),
                );
                metric(
                    &mut cols[2],
                    "Avg Flipper Length (mm)",
                    format_mean(column_mean(view, MeasurementColumn::FlipperLength)),
                );
            });
        }
        Page::Scatter => {
            ui.heading("📈 Scatter Plot Analysis");
            backend.scatter(ui, view, colors);
            ui.label("Insight: Different species show clear clustering patterns.");
        }
        Page::Distribution => {
            ui.heading("📊 Distribution Analysis");
            backend.histogram(ui, view, colors);
        }
        Page::Summary => {
            ui.heading("🧠 Summary Insights");
            if let Some(summary) = state.species_summary() {
                backend.summary_bars(ui, &summary, colors);
                ui.add_space(8.0);
                table::summary_table(ui, "species_summary", &summary);
            }
        }
        Page::Dictionary => {}
    }
}

/// Title and intro line shown above every page.
fn dashboard_header(ui: &mut Ui) {
    ui.heading(egui::RichText::new("📊 Mini Data Dashboard (Public Dataset)").size(24.0));
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label("This dashboard uses a ");
        ui.strong("public dataset");
        ui.label(" and demonstrates ");
        ui.strong("multi-page navigation");
        ui.label(" with different plots.");
    });
    ui.separator();
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(egui::RichText::new(value).size(28.0).strong());
    });
}

fn data_dictionary(ui: &mut Ui) {
    ui.heading("📖 Data Dictionary");
    ui.label("Columns of the Palmer penguins dataset.");
    let rows: Vec<Vec<String>> = CategoricalColumn::ALL
        .iter()
        .map(|c| vec![c.name().to_string(), "text".to_string(), c.description().to_string()])
        .chain(MeasurementColumn::ALL.iter().map(|m| {
            vec![m.name().to_string(), "number".to_string(), m.description().to_string()]
        }))
        .collect();
    table::text_table(ui, "dictionary", &["Column", "Type", "Description"], &rows);
}
