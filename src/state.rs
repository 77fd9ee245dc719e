use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterSelection, FilteredView, filter};
use crate::data::model::{CategoricalColumn, Dataset, MeasurementColumn};
use crate::data::summary::{Summary, summarize_by};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Scatter,
    Distribution,
    Summary,
    Dictionary,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Scatter,
        Page::Distribution,
        Page::Summary,
        Page::Dictionary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Scatter => "Scatter Analysis",
            Page::Distribution => "Distribution Analysis",
            Page::Summary => "Summary Insights",
            Page::Dictionary => "Data Dictionary",
        }
    }
}

/// Measurements averaged on the Summary Insights page, in column order.
pub const SUMMARY_MEASUREMENTS: [MeasurementColumn; 3] = [
    MeasurementColumn::BodyMass,
    MeasurementColumn::BillLength,
    MeasurementColumn::FlipperLength,
];

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: DatasetCache,

    /// Identifier of the source currently shown.
    pub source: String,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Global species / island selection.
    pub selection: FilterSelection,

    /// Rows passing the current selection (cached).
    pub view: Option<FilteredView>,

    /// Species → colour, shared by every chart.
    pub color_map: Option<ColorMap>,

    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(cache: DatasetCache) -> Self {
        Self {
            cache,
            source: String::new(),
            dataset: None,
            selection: FilterSelection::default(),
            view: None,
            color_map: None,
            page: Page::Overview,
            status_message: None,
        }
    }

    /// Load `source_id` through the cache and show it. On failure the
    /// previous dataset stays on screen and the error goes to the status line.
    pub fn load(&mut self, source_id: &str) {
        match self.cache.load(source_id) {
            Ok(dataset) => {
                self.source = source_id.to_string();
                self.set_dataset(dataset);
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a dataset, select every value and rebuild colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.color_map = Some(ColorMap::new(
            dataset.distinct_values(CategoricalColumn::Species),
        ));
        self.view = Some(FilteredView::full(Arc::clone(&dataset)));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `view` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = Some(filter(ds, &self.selection));
        }
    }

    /// Toggle a single value in a filter column.
    pub fn toggle_filter_value(&mut self, column: CategoricalColumn, value: &str) {
        let Some(selected) = self.selection.values_mut(column) else {
            return;
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a filter column.
    pub fn select_all(&mut self, column: CategoricalColumn) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let all_vals = ds.distinct_values(column).clone();
        if let Some(selected) = self.selection.values_mut(column) {
            *selected = all_vals;
            self.refilter();
        }
    }

    /// Deselect all values in a filter column.
    pub fn select_none(&mut self, column: CategoricalColumn) {
        if let Some(selected) = self.selection.values_mut(column) {
            selected.clear();
            self.refilter();
        }
    }

    /// Per-species means for the Summary Insights page.
    pub fn species_summary(&self) -> Option<Summary> {
        let view = self.view.as_ref()?;
        Some(summarize_by(view, CategoricalColumn::Species, &SUMMARY_MEASUREMENTS))
    }
}
