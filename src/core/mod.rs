//! Core module - records, series, standards and configuration

pub mod config;
pub mod records;
pub mod series;
pub mod standards;

pub use config::{Config, ConfigError};
pub use records::{
    item_extractor, load_records, parse_values, ProductType, QualityRecord, RecordQuery,
    RecordsError,
};
pub use series::{LabeledSeries, MeasurementSeries};
pub use standards::{
    resolve_limits, LimitSource, NoStandards, ProductStandard, ResolvedLimits,
    SpecificationLimits, StandardType, StandardsError, StandardsProvider, StandardsTable,
};
