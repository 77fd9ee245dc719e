use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{CategoricalColumn, Dataset, MeasurementColumn, Record, required_columns};

/// Published location of the Palmer penguins table.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/penguins.csv";

/// Cell texts read as a missing value (pandas' default NA markers).
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Source identifiers
// ---------------------------------------------------------------------------

/// Where a dataset comes from, parsed from its identifier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Source {
    pub fn parse(id: &str) -> Self {
        let trimmed = id.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Remote(trimmed.to_string())
        } else {
            Source::Local(PathBuf::from(trimmed))
        }
    }

    /// Format by extension; anything that is not `.json` is read as CSV.
    pub fn format(&self) -> Format {
        let path = match self {
            Source::Remote(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url.as_str());
                PathBuf::from(without_query.rsplit('/').next().unwrap_or(""))
            }
            Source::Local(path) => path.clone(),
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Format::Json,
            _ => Format::Csv,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch and parse a dataset. Remote sources are fetched with `timeout`.
pub fn load_source(source: &Source, timeout: Duration) -> Result<Dataset> {
    match (source, source.format()) {
        (Source::Remote(url), format) => {
            let body = fetch_remote(url, timeout)?;
            match format {
                Format::Csv => parse_csv(body.as_bytes()),
                Format::Json => parse_json(&body),
            }
        }
        (Source::Local(path), Format::Csv) => load_csv_file(path),
        (Source::Local(path), Format::Json) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_json(&text)
        }
    }
}

fn fetch_remote(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("fetching {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;
    resp.text().context("reading response body")
}

fn load_csv_file(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    parse_csv(file)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSV layout: header row with at least the penguins columns, in any order.
/// Extra columns are ignored.
pub fn parse_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| format!("'{name}'"))
        .collect();
    if !missing.is_empty() {
        bail!("CSV missing column(s) {}", missing.join(", "));
    }

    let column_index = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing column(s) '{name}'"))
    };
    let categorical: Vec<(CategoricalColumn, usize)> = CategoricalColumn::ALL
        .into_iter()
        .map(|c| column_index(c.name()).map(|idx| (c, idx)))
        .collect::<Result<_>>()?;
    let numeric: Vec<(MeasurementColumn, usize)> = MeasurementColumn::ALL
        .into_iter()
        .map(|c| column_index(c.name()).map(|idx| (c, idx)))
        .collect::<Result<_>>()?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = row_no as u64 + 2;
        let row = result.with_context(|| format!("CSV line {fallback_line}"))?;
        let line = row.position().map_or(fallback_line, |p| p.line());
        let mut record = Record {
            species: None,
            island: None,
            bill_length_mm: None,
            bill_depth_mm: None,
            flipper_length_mm: None,
            body_mass_g: None,
            sex: None,
        };

        for &(column, idx) in &categorical {
            let value = parse_category(row.get(idx).unwrap_or(""));
            match column {
                CategoricalColumn::Species => record.species = value,
                CategoricalColumn::Island => record.island = value,
                CategoricalColumn::Sex => record.sex = value,
            }
        }
        for &(column, idx) in &numeric {
            let value = parse_measurement(row.get(idx).unwrap_or(""), line, column)?;
            match column {
                MeasurementColumn::BillLength => record.bill_length_mm = value,
                MeasurementColumn::BillDepth => record.bill_depth_mm = value,
                MeasurementColumn::FlipperLength => record.flipper_length_mm = value,
                MeasurementColumn::BodyMass => record.body_mass_g = value,
            }
        }

        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn is_missing(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

fn parse_category(s: &str) -> Option<String> {
    let s = s.trim();
    if is_missing(s) {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_measurement(s: &str, line: u64, column: MeasurementColumn) -> Result<Option<f64>> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(None);
    }
    let value = s
        .parse::<f64>()
        .with_context(|| format!("Line {line}, {column}: '{s}' is not a number"))?;
    Ok(Some(value).filter(|v| !v.is_nan()))
}

// ---------------------------------------------------------------------------
// JSON parser
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "species": "Adelie", "island": "Torgersen", "bill_length_mm": 39.1,
///     "bill_depth_mm": 18.7, "flipper_length_mm": 181.0,
///     "body_mass_g": 3750.0, "sex": "Male" },
///   ...
/// ]
/// ```
pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for name in required_columns() {
            if !obj.contains_key(name) {
                bail!("Row {i}: missing '{name}' field");
            }
        }
        let mut record: Record = serde_json::from_value(row.clone())
            .with_context(|| format!("Row {i}: unexpected field type"))?;
        // Same missing markers as the CSV path.
        for slot in [&mut record.species, &mut record.island, &mut record.sex] {
            *slot = slot.take().and_then(|s| parse_category(&s));
        }
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PENGUINS_HEAD: &str = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex
Adelie,Torgersen,39.1,18.7,181.0,3750.0,Male
Adelie,Torgersen,,,,,
Gentoo,Biscoe,46.1,13.2,211.0,4500.0,Female
Chinstrap,Dream,NA,17.9,192.0,3500.0,Female
";

    #[test]
    fn test_parse_csv_reads_rows_and_missing_values() {
        let ds = parse_csv(PENGUINS_HEAD.as_bytes()).unwrap();

        assert_eq!(ds.len(), 4);
        let first = &ds.records()[0];
        assert_eq!(first.species.as_deref(), Some("Adelie"));
        assert_eq!(first.body_mass_g, Some(3750.0));
        assert_eq!(first.sex.as_deref(), Some("Male"));

        let blank = &ds.records()[1];
        assert_eq!(blank.bill_length_mm, None);
        assert_eq!(blank.sex, None);
        assert_eq!(ds.records()[3].bill_length_mm, None);
        assert_eq!(ds.records()[3].bill_depth_mm, Some(17.9));
    }

    #[test]
    fn test_parse_csv_ignores_extra_columns_and_order() {
        let csv = "rowid,sex,island,species,body_mass_g,flipper_length_mm,bill_depth_mm,\
                   bill_length_mm,year\n\
                   1,Female,Dream,Adelie,3400,190,18.4,36.8,2008\n";
        let ds = parse_csv(csv.as_bytes()).unwrap();

        let r = &ds.records()[0];
        assert_eq!(r.island.as_deref(), Some("Dream"));
        assert_eq!(r.bill_length_mm, Some(36.8));
        assert_eq!(r.body_mass_g, Some(3400.0));
    }

    #[test]
    fn test_parse_csv_missing_column_fails() {
        let csv = "species,island,bill_length_mm\nAdelie,Dream,40.0\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV missing column(s) 'bill_depth_mm', 'flipper_length_mm', 'body_mass_g', 'sex'"
        );
    }

    #[test]
    fn test_parse_csv_non_numeric_measurement_fails() {
        let csv = "species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex\n\
                   Adelie,Dream,long,18.0,190,3400,Male\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("'long' is not a number"));
        assert!(msg.contains("Line 2, bill_length_mm"));
    }

    #[test]
    fn test_parse_json_records() {
        let json = r#"[
            {"species": "Adelie", "island": "Dream", "bill_length_mm": 37.2,
             "bill_depth_mm": 18.1, "flipper_length_mm": 178.0,
             "body_mass_g": 3900.0, "sex": null}
        ]"#;
        let ds = parse_json(json).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].sex, None);
        assert_eq!(ds.records()[0].flipper_length_mm, Some(178.0));
    }

    #[test]
    fn test_parse_json_missing_markers_match_csv() {
        let json = r#"[
            {"species": "Adelie", "island": "Dream", "bill_length_mm": 37.2,
             "bill_depth_mm": 18.1, "flipper_length_mm": 178.0,
             "body_mass_g": 3900.0, "sex": "Female"},
            {"species": "", "island": "NA", "bill_length_mm": null,
             "bill_depth_mm": null, "flipper_length_mm": null,
             "body_mass_g": null, "sex": "NaN"}
        ]"#;
        let csv = "species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex\n\
                   Adelie,Dream,37.2,18.1,178.0,3900.0,Female\n\
                   ,NA,,,,,NaN\n";
        let from_json = parse_json(json).unwrap();
        let from_csv = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(from_json.records(), from_csv.records());
        let blank = &from_json.records()[1];
        assert_eq!(blank.species, None);
        assert_eq!(blank.island, None);
        assert_eq!(blank.sex, None);
        for column in CategoricalColumn::ALL {
            assert!(from_json.distinct_values(column).iter().all(|v| !v.is_empty()));
        }
        let species: Vec<&String> =
            from_json.distinct_values(CategoricalColumn::Species).iter().collect();
        assert_eq!(species, vec!["Adelie"]);
    }

    #[test]
    fn test_parse_json_missing_field_fails() {
        let json = r#"[{"species": "Adelie", "island": "Dream"}]"#;
        let err = parse_json(json).unwrap_err();
        assert!(err.to_string().contains("missing 'bill_length_mm' field"));
    }

    #[test]
    fn test_source_parse_and_format() {
        assert_eq!(Source::parse(DEFAULT_SOURCE).format(), Format::Csv);
        assert!(matches!(Source::parse(DEFAULT_SOURCE), Source::Remote(_)));
        assert_eq!(
            Source::parse("https://example.org/penguins.json?raw=1").format(),
            Format::Json
        );
        assert_eq!(
            Source::parse("data/penguins.JSON"),
            Source::Local(PathBuf::from("data/penguins.JSON"))
        );
        assert_eq!(Source::parse("data/penguins.JSON").format(), Format::Json);
        assert_eq!(Source::parse("penguins").format(), Format::Csv);
    }

    #[test]
    fn test_load_source_local_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(PENGUINS_HEAD.as_bytes()).unwrap();

        let source = Source::Local(file.path().to_path_buf());
        let ds = load_source(&source, Duration::from_secs(1)).unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_load_source_missing_file_fails() {
        let source = Source::parse("/definitely/not/here/penguins.csv");
        let err = load_source(&source, Duration::from_secs(1)).unwrap_err();
        assert!(format!("{err:#}").contains("opening"));
    }
}
