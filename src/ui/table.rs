use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalColumn, MeasurementColumn};
use crate::data::summary::Summary;

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 360.0;

/// Two decimals, or a dash for an absent mean.
pub fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"))
}

fn format_cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v}"))
}

// ---------------------------------------------------------------------------
// Raw filtered rows
// ---------------------------------------------------------------------------

/// Every row of the view with its original row number.
pub fn records_table(ui: &mut Ui, view: &FilteredView) {
    let dataset = view.dataset();
    ui.push_id("records_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(70.0), 7)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for name in [CategoricalColumn::Species.name(), CategoricalColumn::Island.name()]
                    .into_iter()
                    .chain(MeasurementColumn::ALL.iter().map(|m| m.name()))
                    .chain([CategoricalColumn::Sex.name()])
                {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, view.len(), |mut row| {
                    let idx = view.indices()[row.index()];
                    let Some(r) = dataset.record(idx) else {
                        return;
                    };
                    row.col(|ui: &mut Ui| {
                        ui.label(idx.to_string());
                    });
                    for column in [CategoricalColumn::Species, CategoricalColumn::Island] {
                        row.col(|ui: &mut Ui| {
                            ui.label(r.category(column).unwrap_or_default());
                        });
                    }
                    for column in MeasurementColumn::ALL {
                        row.col(|ui: &mut Ui| {
                            ui.label(format_cell(r.measurement(column)));
                        });
                    }
                    row.col(|ui: &mut Ui| {
                        ui.label(r.category(CategoricalColumn::Sex).unwrap_or_default());
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Summaries and generic text tables
// ---------------------------------------------------------------------------

/// Header and cells for a summary: group, count, then one mean per measurement.
pub fn summary_rows(summary: &Summary) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec![summary.group_by.label().to_string(), "Count".to_string()];
    headers.extend(
        summary
            .measurements
            .iter()
            .map(|m| format!("Avg {}", m.label())),
    );

    let rows = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.group.clone(), row.count.to_string()];
            cells.extend(row.means.iter().map(|m| format_mean(*m)));
            cells
        })
        .collect();
    (headers, rows)
}

pub fn summary_table(ui: &mut Ui, id_salt: &str, summary: &Summary) {
    if summary.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }
    let (headers, rows) = summary_rows(summary);
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    text_table(ui, id_salt, &headers, &rows);
}

pub fn text_table(ui: &mut Ui, id_salt: &str, headers: &[&str], rows: &[Vec<String>]) {
    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(80.0), headers.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    for cell in &rows[row.index()] {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.as_str());
                        });
                    }
                });
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::summary::SummaryRow;

    #[test]
    fn test_format_mean() {
        assert_eq!(format_mean(Some(43.921929)), "43.92");
        assert_eq!(format_mean(None), "–");
        assert_eq!(format_cell(None), "");
        assert_eq!(format_cell(Some(39.1)), "39.1");
    }

    #[test]
    fn test_summary_rows() {
        let summary = Summary {
            group_by: CategoricalColumn::Species,
            measurements: vec![MeasurementColumn::BodyMass, MeasurementColumn::BillLength],
            rows: vec![SummaryRow {
                group: "Adelie".to_string(),
                count: 151,
                means: vec![Some(3700.662), None],
            }],
        };
        let (headers, rows) = summary_rows(&summary);

        assert_eq!(
            headers,
            vec!["Species", "Count", "Avg Body Mass (g)", "Avg Bill Length (mm)"]
        );
        assert_eq!(rows, vec![vec!["Adelie", "151", "3700.66", "–"]]);
    }
}
