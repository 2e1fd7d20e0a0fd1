//! Output formatting utilities

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io;

use crate::cli::OutputFormat;
use crate::core::Config;

/// Determine the effective output format based on context
///
/// An explicit `--output` wins; `auto` falls back to the configured default
/// format, then to human-readable output.
pub fn effective_format(format: OutputFormat, config: &Config) -> OutputFormat {
    match format {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .unwrap_or(OutputFormat::Auto),
        other => other,
    }
}

/// Print `value` as JSON or YAML
///
/// Returns `false` for formats that are not serializations, leaving the
/// caller to render them.
pub fn print_serialized<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Write rows as CSV with a header taken from the row type
pub fn print_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer.serialize(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_format_wins() {
        let config = Config {
            default_format: Some("yaml".into()),
            ..Default::default()
        };
        assert_eq!(
            effective_format(OutputFormat::Json, &config),
            OutputFormat::Json
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, &config),
            OutputFormat::Yaml
        );
    }

    #[test]
    fn test_unknown_config_format_is_auto() {
        let config = Config {
            default_format: Some("xml".into()),
            ..Default::default()
        };
        assert_eq!(
            effective_format(OutputFormat::Auto, &config),
            OutputFormat::Auto
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, &Config::default()),
            OutputFormat::Auto
        );
    }
}
