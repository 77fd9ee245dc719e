use std::collections::BTreeMap;

use super::PipelineError;
use super::filter::FilteredView;
use super::model::{CategoricalColumn, MeasurementColumn};

// ---------------------------------------------------------------------------
// Group-by mean
// ---------------------------------------------------------------------------

/// Per-group statistics for one value of the group column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub group: String,
    /// Records in the group, missing measurements included.
    pub count: usize,
    /// Means aligned with [`Summary::measurements`]; `None` when the group
    /// has no present value for that measurement.
    pub means: Vec<Option<f64>>,
}

/// Result of a group-by over a filtered view, rows sorted by group value.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub group_by: CategoricalColumn,
    pub measurements: Vec<MeasurementColumn>,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Mean of `measurement` for `row`, if it was requested and is defined.
    pub fn mean(&self, row: &SummaryRow, measurement: MeasurementColumn) -> Option<f64> {
        let slot = self.measurements.iter().position(|m| *m == measurement)?;
        row.means.get(slot).copied().flatten()
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct Accumulator {
    count: usize,
    sums: Vec<(f64, usize)>,
}

/// Group the view by a categorical column and average each measurement,
/// ignoring missing values. Rows whose group value is missing are dropped.
pub fn summarize_by(
    view: &FilteredView,
    group_by: CategoricalColumn,
    measurements: &[MeasurementColumn],
) -> Summary {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in view.records() {
        let Some(key) = record.category(group_by) else {
            continue;
        };
        let acc = groups.entry(key).or_insert_with(|| Accumulator {
            count: 0,
            sums: vec![(0.0, 0); measurements.len()],
        });
        acc.count += 1;
        for (slot, &m) in acc.sums.iter_mut().zip(measurements) {
            if let Some(v) = record.measurement(m) {
                slot.0 += v;
                slot.1 += 1;
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(group, acc)| SummaryRow {
            group: group.to_string(),
            count: acc.count,
            means: acc
                .sums
                .into_iter()
                .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                .collect(),
        })
        .collect();

    Summary {
        group_by,
        measurements: measurements.to_vec(),
        rows,
    }
}

/// Name-based entry point; unknown or mistyped column names are a
/// configuration error.
pub fn summarize(
    view: &FilteredView,
    group_by: &str,
    measurements: &[&str],
) -> Result<Summary, PipelineError> {
    let group_by: CategoricalColumn = group_by.parse()?;
    let measurements = measurements
        .iter()
        .map(|name| name.parse::<MeasurementColumn>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summarize_by(view, group_by, &measurements))
}

/// Mean of one measurement over the whole view, ignoring missing values.
pub fn column_mean(view: &FilteredView, measurement: MeasurementColumn) -> Option<f64> {
    let (sum, n) = view
        .records()
        .filter_map(|r| r.measurement(measurement))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins shared by every group.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub measurement: MeasurementColumn,
    /// Lower edge of the first bin.
    pub start: f64,
    pub bin_width: f64,
    /// Group value → count per bin.
    pub counts: BTreeMap<String, Vec<usize>>,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.values().next().map_or(0, Vec::len)
    }

    /// Centre of bin `i` on the measurement axis.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }
}

/// Bin `measurement` over the view's observed range, split by `group_by`.
/// Returns `None` when the view has no present value to bin.
pub fn histogram(
    view: &FilteredView,
    measurement: MeasurementColumn,
    group_by: CategoricalColumn,
    bins: usize,
) -> Option<Histogram> {
    let values: Vec<(&str, f64)> = view
        .records()
        .filter_map(|r| Some((r.category(group_by)?, r.measurement(measurement)?)))
        .collect();
    if values.is_empty() || bins == 0 {
        return None;
    }

    let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let (bins, bin_width) = if range.abs() < f64::EPSILON {
        (1, 1.0)
    } else {
        (bins, range / bins as f64)
    };

    let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (group, v) in values {
        let bin = (((v - min) / bin_width) as usize).min(bins - 1);
        counts
            .entry(group.to_string())
            .or_insert_with(|| vec![0; bins])[bin] += 1;
    }

    Some(Histogram {
        measurement,
        start: min,
        bin_width,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSelection, filter};
    use crate::data::model::tests::record;
    use crate::data::model::Dataset;
    use std::sync::Arc;

    fn view_of(records: Vec<crate::data::model::Record>) -> FilteredView {
        FilteredView::full(Arc::new(Dataset::from_records(records)))
    }

    #[test]
    fn test_mean_ignores_missing_values() {
        let view = view_of(vec![
            record("A", "X", Some(10.0)),
            record("A", "X", None),
            record("A", "X", Some(20.0)),
        ]);
        let summary =
            summarize_by(&view, CategoricalColumn::Species, &[MeasurementColumn::BodyMass]);

        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].count, 3);
        assert_eq!(summary.rows[0].means, vec![Some(15.0)]);
    }

    #[test]
    fn test_all_missing_mean_is_absent_not_zero() {
        let view = view_of(vec![record("A", "X", None), record("B", "X", Some(0.0))]);
        let summary =
            summarize_by(&view, CategoricalColumn::Species, &[MeasurementColumn::BodyMass]);

        assert_eq!(summary.rows[0].means, vec![None]);
        assert_eq!(summary.rows[1].means, vec![Some(0.0)]);
        assert_eq!(summary.mean(&summary.rows[0], MeasurementColumn::BodyMass), None);
        assert_eq!(summary.mean(&summary.rows[1], MeasurementColumn::BodyMass), Some(0.0));
    }

    #[test]
    fn test_one_row_per_group_sorted_and_counts_add_up() {
        let view = view_of(vec![
            record("Gentoo", "Biscoe", Some(5000.0)),
            record("Adelie", "Dream", Some(3700.0)),
            record("Chinstrap", "Dream", Some(3600.0)),
            record("Adelie", "Biscoe", Some(3900.0)),
        ]);
        let summary = summarize_by(
            &view,
            CategoricalColumn::Species,
            &[MeasurementColumn::BodyMass, MeasurementColumn::BillLength],
        );

        let groups: Vec<&str> = summary.rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["Adelie", "Chinstrap", "Gentoo"]);
        assert_eq!(summary.total_count(), view.len());
        assert_eq!(summary.rows[0].means, vec![Some(3800.0), Some(40.0)]);
    }

    #[test]
    fn test_empty_view_summarizes_to_nothing() {
        let ds = Arc::new(Dataset::from_records(vec![
            record("A", "Y", Some(1.0)),
            record("C", "X", Some(2.0)),
        ]));
        let selection = FilterSelection {
            species: ["A", "B"].iter().map(|s| s.to_string()).collect(),
            islands: ["X"].iter().map(|s| s.to_string()).collect(),
        };
        let view = filter(&ds, &selection);
        let summary = summarize(&view, "species", &["body_mass_g"]).unwrap();

        assert!(view.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_summarize_by_name() {
        let view = view_of(vec![record("A", "X", Some(2.0)), record("A", "Y", Some(4.0))]);
        let summary = summarize(&view, "island", &["body_mass_g", "flipper_length_mm"]).unwrap();

        assert_eq!(summary.group_by, CategoricalColumn::Island);
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[1].means, vec![Some(4.0), Some(190.0)]);
    }

    #[test]
    fn test_summarize_unknown_attribute_is_configuration_error() {
        let view = view_of(vec![record("A", "X", Some(2.0))]);

        let err = summarize(&view, "colony", &["body_mass_g"]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));

        let err = summarize(&view, "species", &["body_mass_g", "wingspan"]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));

        let err = summarize(&view, "body_mass_g", &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_column_mean() {
        let view = view_of(vec![
            record("A", "X", Some(10.0)),
            record("B", "X", None),
            record("C", "X", Some(20.0)),
        ]);
        assert_eq!(column_mean(&view, MeasurementColumn::BodyMass), Some(15.0));
        assert_eq!(column_mean(&view_of(vec![]), MeasurementColumn::BodyMass), None);
    }

    #[test]
    fn test_histogram_counts_every_present_value() {
        let view = view_of(vec![
            record("A", "X", Some(3000.0)),
            record("A", "X", Some(3500.0)),
            record("B", "X", Some(4000.0)),
            record("B", "X", None),
            record("B", "X", Some(5000.0)),
        ]);
        let hist =
            histogram(&view, MeasurementColumn::BodyMass, CategoricalColumn::Species, 4).unwrap();

        assert_eq!(hist.bin_count(), 4);
        assert_eq!(hist.bin_width, 500.0);
        assert_eq!(hist.counts["A"], vec![1, 1, 0, 0]);
        assert_eq!(hist.counts["B"], vec![0, 0, 1, 1]);
        let total: usize = hist.counts.values().flatten().sum();
        assert_eq!(total, 4);
        assert_eq!(hist.bin_center(0), 3250.0);
    }

    #[test]
    fn test_histogram_degenerate_inputs() {
        let empty = view_of(vec![]);
        assert!(
            histogram(&empty, MeasurementColumn::BodyMass, CategoricalColumn::Species, 10).is_none()
        );

        let flat = view_of(vec![record("A", "X", Some(42.0)), record("A", "X", Some(42.0))]);
        let hist =
            histogram(&flat, MeasurementColumn::BodyMass, CategoricalColumn::Species, 10).unwrap();
        assert_eq!(hist.counts["A"], vec![2]);
    }
}
