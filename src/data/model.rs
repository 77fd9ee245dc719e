use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::PipelineError;

// ---------------------------------------------------------------------------
// Column catalogue
// ---------------------------------------------------------------------------

/// A categorical column of the penguins schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalColumn {
    Species,
    Island,
    Sex,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [Self::Species, Self::Island, Self::Sex];

    /// Header name in the source CSV.
    pub fn name(self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Island => "island",
            Self::Sex => "sex",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Species => "Species",
            Self::Island => "Island",
            Self::Sex => "Sex",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Species => "Penguin species: Adelie, Chinstrap or Gentoo.",
            Self::Island => "Island in the Palmer Archipelago where the bird was observed.",
            Self::Sex => "Sex of the bird, where it could be determined.",
        }
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric measurement column of the penguins schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeasurementColumn {
    BillLength,
    BillDepth,
    FlipperLength,
    BodyMass,
}

impl MeasurementColumn {
    pub const ALL: [MeasurementColumn; 4] = [
        Self::BillLength,
        Self::BillDepth,
        Self::FlipperLength,
        Self::BodyMass,
    ];

    /// Header name in the source CSV.
    pub fn name(self) -> &'static str {
        match self {
            Self::BillLength => "bill_length_mm",
            Self::BillDepth => "bill_depth_mm",
            Self::FlipperLength => "flipper_length_mm",
            Self::BodyMass => "body_mass_g",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BillLength => "Bill Length (mm)",
            Self::BillDepth => "Bill Depth (mm)",
            Self::FlipperLength => "Flipper Length (mm)",
            Self::BodyMass => "Body Mass (g)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::BillLength => "Length of the culmen (upper ridge of the bill), in millimetres.",
            Self::BillDepth => "Depth of the culmen, in millimetres.",
            Self::FlipperLength => "Length of the flipper, in millimetres.",
            Self::BodyMass => "Body mass, in grams.",
        }
    }
}

impl fmt::Display for MeasurementColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoricalColumn {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| unknown_column(s, "categorical"))
    }
}

impl FromStr for MeasurementColumn {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| unknown_column(s, "numeric"))
    }
}

fn unknown_column(name: &str, kind: &str) -> PipelineError {
    let known = CategoricalColumn::ALL
        .iter()
        .map(|c| c.name())
        .chain(MeasurementColumn::ALL.iter().map(|c| c.name()));
    if known.clone().any(|k| k == name) {
        PipelineError::Configuration(format!("column '{name}' is not {kind}"))
    } else {
        let known: Vec<&str> = known.collect();
        PipelineError::Configuration(format!(
            "unknown column '{name}' (schema: {})",
            known.join(", ")
        ))
    }
}

/// Every column a source must provide, in canonical order.
pub fn required_columns() -> Vec<&'static str> {
    vec![
        CategoricalColumn::Species.name(),
        CategoricalColumn::Island.name(),
        MeasurementColumn::BillLength.name(),
        MeasurementColumn::BillDepth.name(),
        MeasurementColumn::FlipperLength.name(),
        MeasurementColumn::BodyMass.name(),
        CategoricalColumn::Sex.name(),
    ]
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One observed penguin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub species: Option<String>,
    pub island: Option<String>,
    pub bill_length_mm: Option<f64>,
    pub bill_depth_mm: Option<f64>,
    pub flipper_length_mm: Option<f64>,
    pub body_mass_g: Option<f64>,
    pub sex: Option<String>,
}

impl Record {
    pub fn category(&self, column: CategoricalColumn) -> Option<&str> {
        match column {
            CategoricalColumn::Species => self.species.as_deref(),
            CategoricalColumn::Island => self.island.as_deref(),
            CategoricalColumn::Sex => self.sex.as_deref(),
        }
    }

    pub fn measurement(&self, column: MeasurementColumn) -> Option<f64> {
        match column {
            MeasurementColumn::BillLength => self.bill_length_mm,
            MeasurementColumn::BillDepth => self.bill_depth_mm,
            MeasurementColumn::FlipperLength => self.flipper_length_mm,
            MeasurementColumn::BodyMass => self.body_mass_g,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// Sorted non-missing distinct values, indexed like `CategoricalColumn::ALL`.
    distinct: [BTreeSet<String>; 3],
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let distinct = CategoricalColumn::ALL.map(|column| {
            records
                .iter()
                .filter_map(|r| r.category(column))
                .map(str::to_owned)
                .collect()
        });
        Dataset { records, distinct }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Sorted, non-missing distinct values of a categorical column.
    pub fn distinct_values(&self, column: CategoricalColumn) -> &BTreeSet<String> {
        let slot = match column {
            CategoricalColumn::Species => 0,
            CategoricalColumn::Island => 1,
            CategoricalColumn::Sex => 2,
        };
        &self.distinct[slot]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
