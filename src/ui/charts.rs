use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot, Points};

use crate::color::ColorMap;
use crate::data::filter::FilteredView;
use crate::data::model::{CategoricalColumn, MeasurementColumn};
use crate::data::summary::{Histogram, Summary, histogram, summarize_by};
use crate::ui::table;

const HISTOGRAM_BINS: usize = 20;
const CHART_HEIGHT: f32 = 380.0;

// ---------------------------------------------------------------------------
// Backend contract
// ---------------------------------------------------------------------------

/// Draws the chart slot of each page from pipeline output only.
pub trait ChartBackend {
    fn label(&self) -> &'static str;

    /// Bill length vs flipper length, coloured by species, sized by body mass.
    fn scatter(&self, ui: &mut Ui, view: &FilteredView, colors: &ColorMap);

    /// Body-mass distribution by species.
    fn histogram(&self, ui: &mut Ui, view: &FilteredView, colors: &ColorMap);

    /// Average body mass per species.
    fn summary_bars(&self, ui: &mut Ui, summary: &Summary, colors: &ColorMap);
}

/// Which backend the dashboard renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartStyle {
    /// Zoomable, draggable plots.
    Interactive,
    /// Same plots with interaction disabled.
    Static,
    /// No charts; every chart slot shows its numbers as a table.
    None,
}

impl ChartStyle {
    pub fn backend(self) -> Box<dyn ChartBackend> {
        match self {
            ChartStyle::Interactive => Box::new(PlotBackend { interactive: true }),
            ChartStyle::Static => Box::new(PlotBackend { interactive: false }),
            ChartStyle::None => Box::new(TableBackend),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub species: String,
    pub x: f64,
    pub y: f64,
    pub radius: f32,
}

/// Points with both coordinates present. Radius scales with body mass
/// between 2 and 7 px; rows without a mass get the smallest radius.
pub fn scatter_points(view: &FilteredView) -> Vec<ScatterPoint> {
    let masses = view
        .records()
        .filter_map(|r| r.measurement(MeasurementColumn::BodyMass));
    let (min, max) = masses.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
        (lo.min(m), hi.max(m))
    });
    let range = max - min;

    view.records()
        .filter_map(|r| {
            let species = r.category(CategoricalColumn::Species)?;
            let x = r.measurement(MeasurementColumn::BillLength)?;
            let y = r.measurement(MeasurementColumn::FlipperLength)?;
            let scale = match r.measurement(MeasurementColumn::BodyMass) {
                Some(m) if range > f64::EPSILON => (m - min) / range,
                Some(_) => 0.5,
                None => 0.0,
            };
            Some(ScatterPoint {
                species: species.to_string(),
                x,
                y,
                radius: 2.0 + 5.0 * scale as f32,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plot backend (interactive and static)
// ---------------------------------------------------------------------------

pub struct PlotBackend {
    pub interactive: bool,
}

impl PlotBackend {
    fn plot(&self, id: &str, x_label: &str, y_label: &str) -> Plot<'_> {
        Plot::new(id.to_string())
            .legend(Legend::default())
            .height(CHART_HEIGHT)
            .x_axis_label(x_label.to_string())
            .y_axis_label(y_label.to_string())
            .allow_boxed_zoom(self.interactive)
            .allow_drag(self.interactive)
            .allow_scroll(self.interactive)
            .allow_zoom(self.interactive)
            .allow_double_click_reset(self.interactive)
    }
}

impl ChartBackend for PlotBackend {
    fn label(&self) -> &'static str {
        if self.interactive {
            "Interactive charts"
        } else {
            "Static charts"
        }
    }

    fn scatter(&self, ui: &mut Ui, view: &FilteredView, colors: &ColorMap) {
        ui.strong("Bill Length vs Flipper Length");
        let points = scatter_points(view);
        self.plot(
            "scatter_plot",
            MeasurementColumn::BillLength.label(),
            MeasurementColumn::FlipperLength.label(),
        )
        .show(ui, |plot_ui| {
            // Same name → one legend entry per species.
            for p in &points {
                plot_ui.points(
                    Points::new(vec![[p.x, p.y]])
                        .name(&p.species)
                        .color(colors.color_for(&p.species))
                        .radius(p.radius),
                );
            }
        });
    }

    fn histogram(&self, ui: &mut Ui, view: &FilteredView, colors: &ColorMap) {
        ui.strong("Body Mass Distribution by Species");
        let Some(hist) = histogram(
            view,
            MeasurementColumn::BodyMass,
            CategoricalColumn::Species,
            HISTOGRAM_BINS,
        ) else {
            ui.label("No body mass values in the current selection.");
            return;
        };
        self.plot("histogram_plot", MeasurementColumn::BodyMass.label(), "Count")
            .show(ui, |plot_ui| {
                for (species, counts) in &hist.counts {
                    let color = colors.color_for(species).gamma_multiply(0.6);
                    let bars = counts
                        .iter()
                        .enumerate()
                        .map(|(i, &n)| Bar::new(hist.bin_center(i), n as f64).width(hist.bin_width))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(species).color(color));
                }
            });
    }

    fn summary_bars(&self, ui: &mut Ui, summary: &Summary, colors: &ColorMap) {
        ui.strong("Average Body Mass by Species");
        self.plot("summary_plot", "Species", "Average Body Mass (g)")
            .show(ui, |plot_ui| {
                for (i, row) in summary.rows.iter().enumerate() {
                    let Some(mean) = summary.mean(row, MeasurementColumn::BodyMass) else {
                        continue;
                    };
                    let bar = Bar::new(i as f64, mean).width(0.6).name(&row.group);
                    plot_ui.bar_chart(
                        BarChart::new(vec![bar])
                            .name(&row.group)
                            .color(colors.color_for(&row.group)),
                    );
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Table backend (no charts)
// ---------------------------------------------------------------------------

pub struct TableBackend;

impl ChartBackend for TableBackend {
    fn label(&self) -> &'static str {
        "Tables only"
    }

    fn scatter(&self, ui: &mut Ui, view: &FilteredView, _colors: &ColorMap) {
        ui.strong("Bill and flipper length by species");
        let summary = summarize_by(
            view,
            CategoricalColumn::Species,
            &[MeasurementColumn::BillLength, MeasurementColumn::FlipperLength],
        );
        table::summary_table(ui, "scatter_table", &summary);
    }

    fn histogram(&self, ui: &mut Ui, view: &FilteredView, _colors: &ColorMap) {
        ui.strong("Body Mass Distribution by Species");
        match histogram(
            view,
            MeasurementColumn::BodyMass,
            CategoricalColumn::Species,
            HISTOGRAM_BINS,
        ) {
            Some(hist) => {
                let (headers, rows) = histogram_rows(&hist);
                let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
                table::text_table(ui, "histogram_table", &headers, &rows);
            }
            None => {
                ui.label("No body mass values in the current selection.");
            }
        }
    }

    fn summary_bars(&self, ui: &mut Ui, summary: &Summary, _colors: &ColorMap) {
        ui.strong("Average Body Mass by Species");
        let rows: Vec<Vec<String>> = summary
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.group.clone(),
                    table::format_mean(summary.mean(row, MeasurementColumn::BodyMass)),
                ]
            })
            .collect();
        table::text_table(ui, "summary_bars_table", &["Species", "Average Body Mass (g)"], &rows);
    }
}

/// One row per bin: range label, then a count per species.
pub fn histogram_rows(hist: &Histogram) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec![hist.measurement.label().to_string()];
    headers.extend(hist.counts.keys().cloned());

    let rows = (0..hist.bin_count())
        .map(|i| {
            let lo = hist.start + i as f64 * hist.bin_width;
            let hi = lo + hist.bin_width;
            let mut row = vec![format!("{lo:.0} – {hi:.0}")];
            row.extend(hist.counts.values().map(|c| c[i].to_string()));
            row
        })
        .collect();
    (headers, rows)
}
