//! Basic statistics stage - average, population sigma and sigma bands

use serde::{Deserialize, Serialize};

use crate::analysis::distribution::{self, VarianceKind};

/// Reference bands at average ± k·σ for k = 1..5
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SigmaLines {
    pub plus_1sigma: f64,
    pub minus_1sigma: f64,
    pub plus_2sigma: f64,
    pub minus_2sigma: f64,
    pub plus_3sigma: f64,
    pub minus_3sigma: f64,
    pub plus_4sigma: f64,
    pub minus_4sigma: f64,
    pub plus_5sigma: f64,
    pub minus_5sigma: f64,
}

impl SigmaLines {
    /// Build the ten bands around `average`
    pub fn around(average: f64, std_dev: f64) -> Self {
        let band = |k: f64| (average + k * std_dev, average - k * std_dev);
        let (plus_1sigma, minus_1sigma) = band(1.0);
        let (plus_2sigma, minus_2sigma) = band(2.0);
        let (plus_3sigma, minus_3sigma) = band(3.0);
        let (plus_4sigma, minus_4sigma) = band(4.0);
        let (plus_5sigma, minus_5sigma) = band(5.0);
        Self {
            plus_1sigma,
            minus_1sigma,
            plus_2sigma,
            minus_2sigma,
            plus_3sigma,
            minus_3sigma,
            plus_4sigma,
            minus_4sigma,
            plus_5sigma,
            minus_5sigma,
        }
    }

    /// `(plus, minus)` pair for k = 1..=5
    pub fn band(&self, k: u8) -> Option<(f64, f64)> {
        match k {
            1 => Some((self.plus_1sigma, self.minus_1sigma)),
            2 => Some((self.plus_2sigma, self.minus_2sigma)),
            3 => Some((self.plus_3sigma, self.minus_3sigma)),
            4 => Some((self.plus_4sigma, self.minus_4sigma)),
            5 => Some((self.plus_5sigma, self.minus_5sigma)),
            _ => None,
        }
    }

    /// Bands as `(name, value)` pairs in display order
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("plus_1sigma", self.plus_1sigma),
            ("minus_1sigma", self.minus_1sigma),
            ("plus_2sigma", self.plus_2sigma),
            ("minus_2sigma", self.minus_2sigma),
            ("plus_3sigma", self.plus_3sigma),
            ("minus_3sigma", self.minus_3sigma),
            ("plus_4sigma", self.plus_4sigma),
            ("minus_4sigma", self.minus_4sigma),
            ("plus_5sigma", self.plus_5sigma),
            ("minus_5sigma", self.minus_5sigma),
        ]
    }
}

/// Control-chart statistics for a raw value series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStatistics {
    /// Arithmetic mean of the non-null values
    pub average: f64,

    /// Population standard deviation (divisor N)
    pub std_dev: f64,

    /// average ± k·std_dev
    #[serde(rename = "std_dev_lines")]
    pub sigma_lines: SigmaLines,
}

/// Compute average, population σ and sigma bands, skipping gaps
///
/// A series with no values yields all zeros.
pub fn basic_statistics(values: &[Option<f64>]) -> BasicStatistics {
    let valid: Vec<f64> = values.iter().flatten().copied().collect();

    let Some(average) = distribution::mean(&valid) else {
        tracing::debug!("basic statistics requested for a series with no values");
        return BasicStatistics::default();
    };
    let std_dev = distribution::std_dev(&valid, average, VarianceKind::Population);

    BasicStatistics {
        average,
        std_dev,
        sigma_lines: SigmaLines::around(average, std_dev),
    }
}

/// Trend chart payload: labels and raw values with their statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendChart {
    pub labels: Vec<String>,
    pub data: Vec<Option<f64>>,
    pub statistics: BasicStatistics,
}

impl TrendChart {
    /// Compute statistics for `data`; labels pass through untouched
    pub fn new(labels: Vec<String>, data: Vec<Option<f64>>) -> Self {
        let statistics = basic_statistics(&data);
        Self {
            labels,
            data,
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_population_sigma() {
        let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(Some)
            .collect();
        let stats = basic_statistics(&values);

        assert!((stats.average - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert!((stats.sigma_lines.plus_3sigma - 11.0).abs() < 1e-12);
        assert!((stats.sigma_lines.minus_5sigma - (-5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_band_width_is_two_k_sigma() {
        let values = vec![Some(10.1), None, Some(9.7), Some(10.4), Some(10.0), None];
        let stats = basic_statistics(&values);

        for k in 1..=5u8 {
            let (plus, minus) = stats.sigma_lines.band(k).unwrap();
            let expected = 2.0 * k as f64 * stats.std_dev;
            assert!(
                ((plus - minus) - expected).abs() < 1e-9,
                "k={} width={} expected={}",
                k,
                plus - minus,
                expected
            );
        }
        assert!(stats.sigma_lines.band(6).is_none());
    }

    #[test]
    fn test_gaps_are_skipped() {
        let with_gaps = basic_statistics(&[Some(1.0), None, Some(3.0), None]);
        let without = basic_statistics(&[Some(1.0), Some(3.0)]);
        assert_eq!(with_gaps, without);
        assert!((with_gaps.average - 2.0).abs() < 1e-12);
        assert!((with_gaps.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_all_null_are_zero() {
        for series in [vec![], vec![None, None, None]] {
            let stats = basic_statistics(&series);
            assert_eq!(stats.average, 0.0);
            assert_eq!(stats.std_dev, 0.0);
            assert!(stats.sigma_lines.entries().iter().all(|(_, v)| *v == 0.0));
        }
    }

    #[test]
    fn test_single_value_has_zero_sigma() {
        let stats = basic_statistics(&[Some(42.0)]);
        assert_eq!(stats.average, 42.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.sigma_lines.plus_5sigma, 42.0);
    }

    #[test]
    fn test_entries_cover_all_ten_bands() {
        let lines = SigmaLines::around(0.0, 1.0);
        let names: Vec<&str> = lines.entries().iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"plus_4sigma"));
        assert!(names.contains(&"minus_2sigma"));
    }

    #[test]
    fn test_trend_chart_keeps_labels_and_gaps() {
        let chart = TrendChart::new(
            vec!["20240101".into(), "20240102".into()],
            vec![Some(1.5), None],
        );
        assert_eq!(chart.labels.len(), 2);
        assert_eq!(chart.data[1], None);
        assert_eq!(chart.statistics.average, 1.5);
    }
}
