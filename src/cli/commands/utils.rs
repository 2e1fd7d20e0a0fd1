//! Shared utilities for CLI commands

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::read_stdin_if_piped;
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat, SelectionArgs};
use crate::core::records::{load_records, parse_values, QualityRecord};
use crate::core::series::{LabeledSeries, MeasurementSeries};
use crate::core::standards::{StandardType, StandardsTable};
use crate::core::Config;

/// Inputs every analysis command needs, with CLI flags applied over config
pub struct AnalysisContext {
    pub records_path: Option<PathBuf>,
    pub standards: StandardsTable,
    pub standard_type: StandardType,
    pub format: OutputFormat,
}

impl AnalysisContext {
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();

        let standards = match global.standards.as_ref().or(config.standards.as_ref()) {
            Some(path) => StandardsTable::load(path)
                .map_err(|e| miette::miette!("{}: {}", path.display(), e))?,
            None => {
                tracing::info!("no standards file configured, limits will be null");
                StandardsTable::new()
            }
        };

        let standard_type = global
            .standard_type
            .as_deref()
            .map(StandardType::from)
            .unwrap_or_else(|| config.standard_type());

        let records_path = global.records.clone().or_else(|| config.records.clone());
        let format = effective_format(global.output, &config);

        Ok(Self {
            records_path,
            standards,
            standard_type,
            format,
        })
    }

    /// Load every record from the configured records file
    pub fn records(&self) -> Result<Vec<QualityRecord>> {
        let path = self.records_path.as_ref().ok_or_else(|| {
            miette::miette!("No records file. Pass --records FILE or set `records` in config")
        })?;
        let records =
            load_records(path).map_err(|e| miette::miette!("{}: {}", path.display(), e))?;
        tracing::info!(path = %path.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    /// The series to analyze: a test item from the records file, or values
    /// piped on stdin when no records file is configured
    pub fn series(&self, selection: &SelectionArgs, item: Option<&str>) -> Result<LabeledSeries> {
        if self.records_path.is_some() {
            let item = item.ok_or_else(|| {
                miette::miette!("--item is required when reading from a records file")
            })?;
            let records = self.records()?;
            let labeled = selection
                .query()
                .series(&records, selection.product_type(), item);
            tracing::info!(
                test_item = item,
                points = labeled.len(),
                present = labeled.series.present_count(),
                "extracted series"
            );
            return Ok(labeled);
        }

        match read_stdin_if_piped().map_err(|e| miette::miette!("Failed to read stdin: {}", e))? {
            Some(text) => {
                let values = parse_values(&text).map_err(|e| miette::miette!("stdin: {}", e))?;
                Ok(LabeledSeries::numbered(MeasurementSeries::from(values)))
            }
            None => Err(miette::miette!(
                "No input. Pass --records FILE or pipe values on stdin, one per line"
            )),
        }
    }
}
