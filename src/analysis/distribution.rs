//! Numeric building blocks shared by the analysis stages
//!
//! Means, variances, evenly spaced samples, the Gaussian density and
//! density-normalised histogram binning.

use std::f64::consts::PI;

/// Divisor used when turning a sum of squared deviations into a variance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceKind {
    /// Divide by N (control-chart statistics)
    Population,
    /// Divide by N - 1 (capability statistics)
    Sample,
}

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation around `mean` with the requested divisor
///
/// Returns 0.0 when the divisor would be zero (empty input, or a single
/// value with the sample formula).
pub fn std_dev(values: &[f64], mean: f64, kind: VarianceKind) -> f64 {
    let n = values.len();
    let divisor = match kind {
        VarianceKind::Population => n,
        VarianceKind::Sample => n.saturating_sub(1),
    };
    if divisor == 0 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / divisor as f64).sqrt()
}

/// Smallest and largest value, or `None` for an empty slice
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().cloned().reduce(f64::min)?;
    let max = values.iter().cloned().reduce(f64::max)?;
    Some((min, max))
}

/// `num` evenly spaced samples over the closed interval `[start, stop]`
///
/// The last sample is pinned to `stop` so the interval end is hit exactly.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            out[num - 1] = stop;
            out
        }
    }
}

/// Gaussian probability density at `x`
///
/// f(x) = exp(-(x-μ)²/(2σ²)) / (σ·√(2π))
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * PI).sqrt())
}

/// Equal-width histogram normalised to a probability density
#[derive(Debug, Clone, PartialEq)]
pub struct DensityHistogram {
    /// Bin edges (length = bins + 1)
    pub edges: Vec<f64>,
    /// Raw counts per bin
    pub counts: Vec<usize>,
    /// Density heights per bin; Σ density·width == 1
    pub densities: Vec<f64>,
}

/// Bin `values` into `bins` equal-width bins over their range
///
/// All bins are half-open except the last, which also holds the maximum.
/// A zero-width range is widened to `[v - 0.5, v + 0.5]` so every value still
/// lands in a bin of positive width. Returns `None` for empty input or zero
/// bins.
pub fn density_histogram(values: &[f64], bins: usize) -> Option<DensityHistogram> {
    if bins == 0 {
        return None;
    }
    let (mut lo, mut hi) = min_max(values)?;
    if hi - lo <= 0.0 {
        lo -= 0.5;
        hi += 0.5;
    }

    let edges = linspace(lo, hi, bins + 1);
    let span = hi - lo;

    let mut counts = vec![0_usize; bins];
    for &x in values {
        let mut idx = ((((x - lo) / span) * bins as f64).floor() as usize).min(bins - 1);
        // The scaled index can be off by one at an interior edge; the
        // returned edges decide
        if idx > 0 && x < edges[idx] {
            idx -= 1;
        } else if idx != bins - 1 && x >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    let densities = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&count, edge)| count as f64 / (total * (edge[1] - edge[0])))
        .collect();

    Some(DensityHistogram {
        edges,
        counts,
        densities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_none() {
        assert!(mean(&[]).is_none());
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_std_dev_divisors() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&data).unwrap();
        assert!((std_dev(&data, m, VarianceKind::Population) - 2.0).abs() < 1e-12);
        // Σ(x-μ)² = 32, 32/7
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((std_dev(&data, m, VarianceKind::Sample) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_single_sample_is_zero() {
        assert_eq!(std_dev(&[4.2], 4.2, VarianceKind::Sample), 0.0);
        assert_eq!(std_dev(&[], 0.0, VarianceKind::Population), 0.0);
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-1.0, 1.0, 5);
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }

    #[test]
    fn test_normal_pdf_peak() {
        // Peak of the standard normal is 1/√(2π) ≈ 0.39894
        let peak = normal_pdf(0.0, 0.0, 1.0);
        assert!((peak - 0.398_942_280_4).abs() < 1e-9);
        assert!((normal_pdf(1.0, 0.0, 1.0) - normal_pdf(-1.0, 0.0, 1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_density_histogram_integrates_to_one() {
        let data = [1.0, 2.0, 2.5, 3.0, 3.1, 3.2, 4.0, 7.5, 8.0, 9.9];
        let hist = density_histogram(&data, 4).unwrap();
        assert_eq!(hist.edges.len(), 5);
        assert_eq!(hist.counts.iter().sum::<usize>(), data.len());

        let area: f64 = hist
            .densities
            .iter()
            .zip(hist.edges.windows(2))
            .map(|(d, e)| d * (e[1] - e[0]))
            .sum();
        assert!((area - 1.0).abs() < 1e-12, "area = {}", area);
    }

    #[test]
    fn test_density_histogram_max_lands_in_last_bin() {
        let hist = density_histogram(&[0.0, 1.0, 2.0], 2).unwrap();
        assert_eq!(hist.counts, vec![1, 2]);
    }

    /// Count each value by the returned edges: half-open, last bin closed
    fn counts_by_edges(values: &[f64], edges: &[f64]) -> Vec<usize> {
        let bins = edges.len() - 1;
        (0..bins)
            .map(|i| {
                values
                    .iter()
                    .filter(|&&x| {
                        x >= edges[i] && (x < edges[i + 1] || (i == bins - 1 && x <= edges[i + 1]))
                    })
                    .count()
            })
            .collect()
    }

    #[test]
    fn test_density_histogram_edge_aligned_values() {
        let hist = density_histogram(&[1.1, 1.2, 1.3, 1.4], 3).unwrap();
        assert_eq!(hist.counts, counts_by_edges(&[1.1, 1.2, 1.3, 1.4], &hist.edges));
        assert_eq!(hist.counts.iter().sum::<usize>(), 4);

        // Readings at 0.1 resolution, every value on an edge
        let data = [1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 1.5];
        let hist = density_histogram(&data, 10).unwrap();
        assert_eq!(hist.counts, counts_by_edges(&data, &hist.edges));
        assert_eq!(hist.counts.iter().sum::<usize>(), data.len());
        assert!(hist.counts[..5].iter().all(|&c| c == 1), "{:?}", hist.counts);
    }

    #[test]
    fn test_density_histogram_constant_values() {
        let hist = density_histogram(&[5.0, 5.0, 5.0], 3).unwrap();
        assert!((hist.edges[0] - 4.5).abs() < 1e-12);
        assert!((hist.edges[3] - 5.5).abs() < 1e-12);
        assert_eq!(hist.counts, vec![0, 3, 0]);
        assert!(hist.densities.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn test_density_histogram_rejects_empty() {
        assert!(density_histogram(&[], 3).is_none());
        assert!(density_histogram(&[1.0], 0).is_none());
    }
}
