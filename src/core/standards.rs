//! Product standards - specification limits per product and test item
//!
//! Limits are keyed by (product code, test item, standard type). The standard
//! type is an opaque selector; `internal_control` and `external_control` are
//! the conventional values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Selector distinguishing control bands for the same product and item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardType(String);

impl StandardType {
    pub const INTERNAL_CONTROL: &'static str = "internal_control";
    pub const EXTERNAL_CONTROL: &'static str = "external_control";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn internal_control() -> Self {
        Self::new(Self::INTERNAL_CONTROL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StandardType {
    fn default() -> Self {
        Self::internal_control()
    }
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StandardType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Limits stored for one (product, item, standard type)
///
/// Any field may be unset in the stored record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationLimits {
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub target_value: Option<f64>,
}

/// A row of the standards table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStandard {
    pub product_code: String,
    pub test_item: String,
    #[serde(default)]
    pub standard_type: StandardType,
    #[serde(default)]
    pub lower_limit: Option<f64>,
    #[serde(default)]
    pub upper_limit: Option<f64>,
    #[serde(default)]
    pub target_value: Option<f64>,
}

impl ProductStandard {
    pub fn limits(&self) -> SpecificationLimits {
        SpecificationLimits {
            lower_limit: self.lower_limit,
            upper_limit: self.upper_limit,
            target_value: self.target_value,
        }
    }
}

/// Read-only source of specification limits
///
/// Implementations must return at most one record per key. Returning `None`
/// means "no standard", which is not an error.
pub trait StandardsProvider {
    fn find(
        &self,
        product_code: &str,
        test_item: &str,
        standard_type: &StandardType,
    ) -> Option<SpecificationLimits>;
}

/// Provider with no standards at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStandards;

impl StandardsProvider for NoStandards {
    fn find(&self, _: &str, _: &str, _: &StandardType) -> Option<SpecificationLimits> {
        None
    }
}

/// Where resolved limits came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSource {
    /// A matching standard record
    Standard,
    /// Lookup key incomplete or no record; limits null, target defaulted
    Fallback,
}

/// Limits ready for capability analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLimits {
    pub usl: Option<f64>,
    pub lsl: Option<f64>,
    pub target: Option<f64>,
    pub source: LimitSource,
}

/// Resolve USL/LSL/target for a product and test item
///
/// When either key part is missing, or no record matches, the limits are
/// null and the target is `default_target`. A matching record keeps its null
/// limits as null; only a null target falls back to `default_target`.
pub fn resolve_limits<P>(
    provider: &P,
    product_code: Option<&str>,
    test_item: Option<&str>,
    standard_type: &StandardType,
    default_target: f64,
) -> ResolvedLimits
where
    P: StandardsProvider + ?Sized,
{
    let fallback = ResolvedLimits {
        usl: None,
        lsl: None,
        target: Some(default_target),
        source: LimitSource::Fallback,
    };

    let (Some(product), Some(item)) = (
        product_code.filter(|s| !s.is_empty()),
        test_item.filter(|s| !s.is_empty()),
    ) else {
        return fallback;
    };

    match provider.find(product, item, standard_type) {
        Some(limits) => ResolvedLimits {
            usl: limits.upper_limit,
            lsl: limits.lower_limit,
            target: limits.target_value.or(Some(default_target)),
            source: LimitSource::Standard,
        },
        None => {
            tracing::debug!(
                product,
                test_item = item,
                standard_type = %standard_type,
                "no standard found, falling back to observed mean as target"
            );
            fallback
        }
    }
}

/// Errors raised while building a standards table
#[derive(Debug, Error)]
pub enum StandardsError {
    #[error("Failed to read standards file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid standards YAML: {message}")]
    Yaml { message: String },

    #[error("Invalid standards CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported standards file type: {path} (expected .yaml, .yml or .csv)")]
    UnsupportedFormat { path: String },

    #[error(
        "Duplicate standard for product '{product_code}', item '{test_item}', type '{standard_type}'"
    )]
    Duplicate {
        product_code: String,
        test_item: String,
        standard_type: String,
    },
}

type StandardKey = (String, String, StandardType);

/// In-memory standards table enforcing one record per key
#[derive(Debug, Clone, Default)]
pub struct StandardsTable {
    entries: BTreeMap<StandardKey, SpecificationLimits>,
}

impl StandardsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate keys
    pub fn from_standards(
        standards: impl IntoIterator<Item = ProductStandard>,
    ) -> Result<Self, StandardsError> {
        let mut table = Self::new();
        for standard in standards {
            table.insert(standard)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, standard: ProductStandard) -> Result<(), StandardsError> {
        let limits = standard.limits();
        let key = (
            standard.product_code,
            standard.test_item,
            standard.standard_type,
        );
        if self.entries.contains_key(&key) {
            let (product_code, test_item, standard_type) = key;
            return Err(StandardsError::Duplicate {
                product_code,
                test_item,
                standard_type: standard_type.to_string(),
            });
        }
        self.entries.insert(key, limits);
        Ok(())
    }

    /// Load from a `.yaml`/`.yml` list or a `.csv` file with a header row
    pub fn load(path: &Path) -> Result<Self, StandardsError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let standards: Vec<ProductStandard> = match ext.as_deref() {
            Some("yaml") | Some("yml") => {
                let contents = std::fs::read_to_string(path)?;
                Self::parse_yaml(&contents)?
            }
            Some("csv") => {
                let mut reader = csv::Reader::from_path(path)?;
                reader
                    .deserialize::<CsvStandard>()
                    .map(|row| row.map(ProductStandard::from))
                    .collect::<Result<_, _>>()?
            }
            _ => {
                return Err(StandardsError::UnsupportedFormat {
                    path: path.display().to_string(),
                })
            }
        };

        tracing::debug!(path = %path.display(), count = standards.len(), "loaded standards");
        Self::from_standards(standards)
    }

    fn parse_yaml(contents: &str) -> Result<Vec<ProductStandard>, StandardsError> {
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yml::from_str(contents).map_err(|e| StandardsError::Yaml {
            message: e.to_string(),
        })
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, StandardsError> {
        Self::from_standards(Self::parse_yaml(contents)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All rows in (product, item, type) order
    pub fn standards(&self) -> impl Iterator<Item = ProductStandard> + '_ {
        self.entries
            .iter()
            .map(|((product_code, test_item, standard_type), limits)| ProductStandard {
                product_code: product_code.clone(),
                test_item: test_item.clone(),
                standard_type: standard_type.clone(),
                lower_limit: limits.lower_limit,
                upper_limit: limits.upper_limit,
                target_value: limits.target_value,
            })
    }
}

impl StandardsProvider for StandardsTable {
    fn find(
        &self,
        product_code: &str,
        test_item: &str,
        standard_type: &StandardType,
    ) -> Option<SpecificationLimits> {
        self.entries
            .get(&(
                product_code.to_string(),
                test_item.to_string(),
                standard_type.clone(),
            ))
            .copied()
    }
}

/// CSV row; blank limit cells deserialize to `None`
#[derive(Debug, Deserialize)]
struct CsvStandard {
    product_code: String,
    test_item: String,
    #[serde(default)]
    standard_type: Option<String>,
    #[serde(default)]
    lower_limit: Option<f64>,
    #[serde(default)]
    upper_limit: Option<f64>,
    #[serde(default)]
    target_value: Option<f64>,
}

impl From<CsvStandard> for ProductStandard {
    fn from(row: CsvStandard) -> Self {
        ProductStandard {
            product_code: row.product_code,
            test_item: row.test_item,
            standard_type: row
                .standard_type
                .filter(|s| !s.trim().is_empty())
                .map(StandardType::new)
                .unwrap_or_default(),
            lower_limit: row.lower_limit,
            upper_limit: row.upper_limit,
            target_value: row.target_value,
        }
    }
}
