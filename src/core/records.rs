//! Quality test records - loading, selection and value extraction
//!
//! Records are the collaborator-side input to the analysis stages: one row per
//! tested batch with a free-form set of numeric test items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::core::series::LabeledSeries;

/// Columns of a records CSV that are not test items
const FIXED_COLUMNS: [&str; 4] = ["product_code", "batch_number", "production_line", "test_date"];

/// Date format used in record files and batch labels
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One tested batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub product_code: String,

    pub batch_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_line: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_date: Option<NaiveDate>,

    /// Test item -> measured value (null when not measured)
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl QualityRecord {
    pub fn new(product_code: impl Into<String>, batch_number: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            batch_number: batch_number.into(),
            production_line: None,
            test_date: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.test_date = Some(date);
        self
    }

    pub fn with_value(mut self, item: impl Into<String>, value: Option<f64>) -> Self {
        self.values.insert(item.into(), value);
        self
    }

    /// Measured value for a test item
    pub fn value(&self, test_item: &str) -> Option<f64> {
        self.values.get(test_item).copied().flatten()
    }

    /// Chart label for this batch
    ///
    /// Batch numbers start with an 8-digit date, so their first eight
    /// characters are used when available. Otherwise the test date as
    /// `YYYYMMDD`, or `00000000` when there is none.
    pub fn batch_label(&self) -> String {
        if self.batch_number.chars().count() >= 8 {
            return self.batch_number.chars().take(8).collect();
        }
        match self.test_date {
            Some(date) => date.format("%Y%m%d").to_string(),
            None => "00000000".to_string(),
        }
    }
}

/// Product families with a fixed catalog of numeric test items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    DryFilm,
    Adhesive,
}

const DRY_FILM_ITEMS: &[&str] = &[
    "solid_content",
    "viscosity",
    "acid_value",
    "moisture",
    "residual_monomer",
    "weight_avg_molecular_weight",
    "pdi",
    "color",
];

const ADHESIVE_ITEMS: &[&str] = &[
    "solid_content",
    "viscosity",
    "acid_value",
    "moisture",
    "residual_monomer",
    "weight_avg_molecular_weight",
    "pdi",
    "color",
    "initial_tack",
    "peel_strength",
    "high_temperature_holding",
    "room_temperature_holding",
    "constant_load_peel",
];

impl ProductType {
    pub fn all() -> [ProductType; 2] {
        [ProductType::DryFilm, ProductType::Adhesive]
    }

    /// Numeric test items recorded for this product family
    pub fn test_items(&self) -> &'static [&'static str] {
        match self {
            ProductType::DryFilm => DRY_FILM_ITEMS,
            ProductType::Adhesive => ADHESIVE_ITEMS,
        }
    }

    pub fn supports(&self, test_item: &str) -> bool {
        self.test_items().contains(&test_item)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::DryFilm => write!(f, "dryfilm"),
            ProductType::Adhesive => write!(f, "adhesive"),
        }
    }
}

/// Build the value extractor for a test item
///
/// With a product type, items outside its catalog extract nothing, giving an
/// all-gap series.
pub fn item_extractor(
    product_type: Option<ProductType>,
    test_item: &str,
) -> impl Fn(&QualityRecord) -> Option<f64> + '_ {
    let known = product_type.map_or(true, |pt| pt.supports(test_item));
    if !known {
        tracing::debug!(test_item, "test item not in the product type catalog");
    }
    move |record: &QualityRecord| {
        if known {
            record.value(test_item)
        } else {
            None
        }
    }
}

/// Record selection: exact product/line match and inclusive date window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub product_code: Option<String>,
    pub production_line: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordQuery {
    pub fn matches(&self, record: &QualityRecord) -> bool {
        if let Some(ref code) = self.product_code {
            if &record.product_code != code {
                return false;
            }
        }
        if let Some(ref line) = self.production_line {
            if record.production_line.as_ref() != Some(line) {
                return false;
            }
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(date) = record.test_date else {
                return false;
            };
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }
        true
    }

    /// Matching records ordered by (test date, batch number)
    pub fn select<'a>(&self, records: &'a [QualityRecord]) -> Vec<&'a QualityRecord> {
        let mut selected: Vec<&QualityRecord> =
            records.iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| {
            a.test_date
                .cmp(&b.test_date)
                .then_with(|| a.batch_number.cmp(&b.batch_number))
        });
        selected
    }

    /// Labeled series of one test item over the selected records
    pub fn series(
        &self,
        records: &[QualityRecord],
        product_type: Option<ProductType>,
        test_item: &str,
    ) -> LabeledSeries {
        let selected = self.select(records);
        let extractor = item_extractor(product_type, test_item);
        LabeledSeries::extract(&selected, |r| r.batch_label(), |r| extractor(*r))
    }
}

/// Errors raised while reading measurement input
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid records YAML: {message}")]
    Yaml { message: String },

    #[error("Invalid records CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Records CSV is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("Invalid date '{value}' on line {line} (expected YYYY-MM-DD)")]
    InvalidDate { line: u64, value: String },

    #[error("Invalid number '{value}' for '{column}' on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Unsupported records file type: {path} (expected .yaml, .yml or .csv)")]
    UnsupportedFormat { path: String },
}

/// Load records from a `.yaml`/`.yml` list or a `.csv` file
pub fn load_records(path: &Path) -> Result<Vec<QualityRecord>, RecordsError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let records = match ext.as_deref() {
        Some("yaml") | Some("yml") => parse_yaml(&std::fs::read_to_string(path)?)?,
        Some("csv") => parse_csv(std::fs::File::open(path)?)?,
        _ => {
            return Err(RecordsError::UnsupportedFormat {
                path: path.display().to_string(),
            })
        }
    };

    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}

pub fn parse_yaml(contents: &str) -> Result<Vec<QualityRecord>, RecordsError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yml::from_str(contents).map_err(|e| RecordsError::Yaml {
        message: e.to_string(),
    })
}

/// Parse a records CSV; every non-fixed column is a test item
pub fn parse_csv<R: Read>(input: R) -> Result<Vec<QualityRecord>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers = reader.headers()?.clone();

    let column = |name: &'static str| headers.iter().position(|h| h == name);
    let product_col = column("product_code").ok_or(RecordsError::MissingColumn {
        column: "product_code",
    })?;
    let batch_col = column("batch_number").ok_or(RecordsError::MissingColumn {
        column: "batch_number",
    })?;
    let line_col = column("production_line");
    let date_col = column("test_date");

    let item_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !FIXED_COLUMNS.contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let optional = |idx: Option<usize>| {
            idx.map(cell)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let test_date = match optional(date_col) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| {
                RecordsError::InvalidDate {
                    line,
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let mut values = BTreeMap::new();
        for (idx, name) in &item_cols {
            let raw = cell(*idx);
            let value = parse_value(raw).ok_or_else(|| RecordsError::InvalidValue {
                line,
                column: name.clone(),
                value: raw.to_string(),
            })?;
            values.insert(name.clone(), value);
        }

        records.push(QualityRecord {
            product_code: cell(product_col).to_string(),
            batch_number: cell(batch_col).to_string(),
            production_line: optional(line_col),
            test_date,
            values,
        });
    }
    Ok(records)
}

/// Parse one measurement cell: blank, `null` or `-` is a gap
///
/// Returns `None` when the text is not a number.
pub fn parse_value(raw: &str) -> Option<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" || raw.eq_ignore_ascii_case("null") {
        return Some(None);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
}

/// Parse newline-separated values, one measurement per line
pub fn parse_values(text: &str) -> Result<Vec<Option<f64>>, RecordsError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            parse_value(l).ok_or_else(|| RecordsError::InvalidValue {
                line: i as u64 + 1,
                column: "value".to_string(),
                value: l.trim().to_string(),
            })
        })
        .collect()
}
