//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use std::io::{self, IsTerminal, Read};

/// Round a value for display, keeping enough decimals for the data's scale
///
/// The number of decimals follows the magnitude of `reference` (typically the
/// spread of the data), so 0.0123 and 12345.6 both print sensibly.
pub fn smart_round(value: f64, reference: f64) -> String {
    let reference = reference.abs();
    let decimals = if reference == 0.0 || !reference.is_finite() {
        4
    } else {
        (3 - reference.log10().floor() as i32).clamp(0, 8) as usize
    };
    format!("{:.*}", decimals, value)
}

/// Format an optional value, `-` when absent
pub fn format_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read all of stdin if it is piped (Unix philosophy support)
///
/// Returns `None` if stdin is a terminal, enabling pipelines like:
/// ```bash
/// cut -d, -f5 batches.csv | qcspc stats
/// ```
pub fn read_stdin_if_piped() -> io::Result<Option<String>> {
    let stdin = io::stdin();

    // Only read from stdin if it's piped (not a terminal)
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut text = String::new();
    stdin.lock().read_to_string(&mut text)?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
