use std::collections::BTreeSet;
use std::sync::Arc;

use super::model::{CategoricalColumn, Dataset, Record};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per filter column
// ---------------------------------------------------------------------------

/// Selected species and islands. An empty set hides every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub species: BTreeSet<String>,
    pub islands: BTreeSet<String>,
}

impl FilterSelection {
    /// The columns the dashboard exposes as global filters.
    pub const COLUMNS: [CategoricalColumn; 2] =
        [CategoricalColumn::Species, CategoricalColumn::Island];

    /// Every distinct value selected (i.e., show everything).
    pub fn all(dataset: &Dataset) -> Self {
        FilterSelection {
            species: dataset.distinct_values(CategoricalColumn::Species).clone(),
            islands: dataset.distinct_values(CategoricalColumn::Island).clone(),
        }
    }

    pub fn values(&self, column: CategoricalColumn) -> Option<&BTreeSet<String>> {
        match column {
            CategoricalColumn::Species => Some(&self.species),
            CategoricalColumn::Island => Some(&self.islands),
            CategoricalColumn::Sex => None,
        }
    }

    pub fn values_mut(&mut self, column: CategoricalColumn) -> Option<&mut BTreeSet<String>> {
        match column {
            CategoricalColumn::Species => Some(&mut self.species),
            CategoricalColumn::Island => Some(&mut self.islands),
            CategoricalColumn::Sex => None,
        }
    }

    /// A record passes when both its species and island are selected.
    /// Rows missing either value never pass; unknown selected values
    /// simply match nothing.
    pub fn matches(&self, record: &Record) -> bool {
        let selected = |set: &BTreeSet<String>, value: Option<&str>| {
            value.is_some_and(|v| set.contains(v))
        };
        selected(&self.species, record.category(CategoricalColumn::Species))
            && selected(&self.islands, record.category(CategoricalColumn::Island))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a shared dataset that passed a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
}

impl FilteredView {
    /// A view over every row.
    pub fn full(dataset: Arc<Dataset>) -> Self {
        let indices = (0..dataset.len()).collect();
        FilteredView { dataset, indices }
    }

    /// Narrow this view further; filtering twice by the same selection is a no-op.
    pub fn filter(&self, selection: &FilterSelection) -> FilteredView {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| {
                self.dataset
                    .record(i)
                    .is_some_and(|record| selection.matches(record))
            })
            .collect();
        FilteredView {
            dataset: Arc::clone(&self.dataset),
            indices,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Row indices into the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.indices.iter().filter_map(|&i| self.dataset.record(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows of `dataset` that pass `selection`.
pub fn filter(dataset: &Arc<Dataset>, selection: &FilterSelection) -> FilteredView {
    FilteredView::full(Arc::clone(dataset)).filter(selection)
}
