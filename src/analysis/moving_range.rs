//! Moving-range stage - successive differences and the MR chart limit

use serde::{Deserialize, Serialize};

use crate::analysis::distribution;

/// D4 factor for a moving range of two consecutive observations
///
/// UCL_MR = D4 · MR-bar. Fixed control-chart coefficient for n = 2.
pub const D4_MR: f64 = 3.267;

/// Summary of the valid moving ranges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingRangeStatistics {
    /// Mean of the non-null moving ranges
    pub mr_average: f64,

    /// Upper control limit of the MR chart
    pub ucl_mr: f64,
}

/// Per-index moving ranges and their statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingRangeResult {
    /// Same length as the input; index 0 is always null
    pub moving_ranges: Vec<Option<f64>>,

    pub statistics: MovingRangeStatistics,
}

/// Compute moving ranges over an ordered series with gaps
///
/// `mr[i] = |v[i] - v[i-1]|` when both neighbours are present; a gap on either
/// side leaves `mr[i]` null so later positions keep their alignment.
pub fn moving_range(values: &[Option<f64>]) -> MovingRangeResult {
    let mut moving_ranges = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;

    for &current in values {
        let range = match (previous, current) {
            (Some(prev), Some(cur)) => Some((cur - prev).abs()),
            _ => None,
        };
        moving_ranges.push(range);
        previous = current;
    }

    let valid: Vec<f64> = moving_ranges.iter().flatten().copied().collect();
    let statistics = match distribution::mean(&valid) {
        Some(mr_average) => MovingRangeStatistics {
            mr_average,
            ucl_mr: D4_MR * mr_average,
        },
        None => {
            tracing::debug!(
                points = values.len(),
                "no consecutive value pairs, moving-range statistics are zero"
            );
            MovingRangeStatistics::default()
        }
    };

    MovingRangeResult {
        moving_ranges,
        statistics,
    }
}

/// Moving-range chart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingRangeChart {
    pub labels: Vec<String>,
    pub data_values: Vec<Option<f64>>,
    pub moving_ranges: Vec<Option<f64>>,
    pub statistics: MovingRangeStatistics,
}

impl MovingRangeChart {
    /// Compute moving ranges for `data_values`; labels pass through untouched
    pub fn new(labels: Vec<String>, data_values: Vec<Option<f64>>) -> Self {
        let MovingRangeResult {
            moving_ranges,
            statistics,
        } = moving_range(&data_values);
        Self {
            labels,
            data_values,
            moving_ranges,
            statistics,
        }
    }
}
