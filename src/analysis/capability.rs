//! Capability analysis stage - Cp/Cpk, histogram and fitted normal curve
//!
//! Statistics here use the sample standard deviation (divisor N-1), unlike
//! the control-chart stages which use the population formula.

use serde::{Deserialize, Serialize};

use crate::analysis::distribution::{self, VarianceKind};
use crate::core::standards::{resolve_limits, StandardType, StandardsProvider};

/// Upper bound on histogram bins; fewer samples mean fewer bins
pub const MAX_HISTOGRAM_BINS: usize = 10;

/// Number of x samples on the fitted normal curve
pub const NORMAL_CURVE_POINTS: usize = 100;

/// Density histogram of the measured values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Density height per bin (Σ height·width = 1)
    pub values: Vec<f64>,

    /// Bin edges, one more than `values`
    pub bins: Vec<f64>,
}

/// Normal curve fitted with the sample mean and standard deviation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Capability statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityStatistics {
    pub mean: f64,

    /// Sample standard deviation (divisor N-1)
    pub std_dev: f64,

    pub usl: Option<f64>,
    pub lsl: Option<f64>,
    pub target: Option<f64>,

    /// Cp = (USL - LSL) / (6σ)
    pub cp: Option<f64>,

    /// Cpk = min(USL-μ, μ-LSL) / (3σ)
    pub cpk: Option<f64>,

    pub sample_size: usize,
}

impl CapabilityStatistics {
    fn insufficient(sample_size: usize) -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            usl: None,
            lsl: None,
            target: Some(0.0),
            cp: None,
            cpk: None,
            sample_size,
        }
    }
}

/// Full capability analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResult {
    pub histogram: Histogram,
    pub normal_distribution: NormalCurve,
    pub statistics: CapabilityStatistics,
}

impl CapabilityResult {
    /// Result for fewer than two values
    pub fn insufficient(sample_size: usize) -> Self {
        Self {
            histogram: Histogram::default(),
            normal_distribution: NormalCurve::default(),
            statistics: CapabilityStatistics::insufficient(sample_size),
        }
    }

    /// True when there were too few values to analyze
    pub fn is_insufficient(&self) -> bool {
        self.statistics.sample_size < 2
    }
}

/// Which specification limits to look up for the series
#[derive(Debug, Clone, Default)]
pub struct CapabilityRequest<'a> {
    pub product_code: Option<&'a str>,
    pub test_item: Option<&'a str>,
    pub standard_type: StandardType,
}

impl<'a> CapabilityRequest<'a> {
    pub fn new(product_code: Option<&'a str>, test_item: Option<&'a str>) -> Self {
        Self {
            product_code,
            test_item,
            standard_type: StandardType::default(),
        }
    }

    pub fn with_standard_type(mut self, standard_type: StandardType) -> Self {
        self.standard_type = standard_type;
        self
    }
}

/// Cp and Cpk from mean, σ and both specification limits
///
/// Both indices are `None` when either limit is missing or σ ≤ 0. Cpk takes
/// the worse of the two one-sided indices.
pub fn process_capability(
    mean: f64,
    std_dev: f64,
    usl: Option<f64>,
    lsl: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    let (Some(usl), Some(lsl)) = (usl, lsl) else {
        return (None, None);
    };
    if std_dev <= 0.0 || !std_dev.is_finite() {
        return (None, None);
    }

    let cp = (usl - lsl) / (6.0 * std_dev);
    let cpu = (usl - mean) / (3.0 * std_dev);
    let cpl = (mean - lsl) / (3.0 * std_dev);
    (Some(cp), Some(cpu.min(cpl)))
}

/// Run capability analysis over non-null values
///
/// Callers drop gaps before calling. Fewer than two values yield
/// [`CapabilityResult::insufficient`].
pub fn capability_analysis<P>(
    values: &[f64],
    request: &CapabilityRequest<'_>,
    standards: &P,
) -> CapabilityResult
where
    P: StandardsProvider + ?Sized,
{
    let sample_size = values.len();
    if sample_size < 2 {
        tracing::debug!(sample_size, "too few values for capability analysis");
        return CapabilityResult::insufficient(sample_size);
    }
    let (Some(mean), Some((min, max))) = (distribution::mean(values), distribution::min_max(values))
    else {
        return CapabilityResult::insufficient(sample_size);
    };

    let std_dev = distribution::std_dev(values, mean, VarianceKind::Sample);

    let limits = resolve_limits(
        standards,
        request.product_code,
        request.test_item,
        &request.standard_type,
        mean,
    );
    let (cp, cpk) = process_capability(mean, std_dev, limits.usl, limits.lsl);

    CapabilityResult {
        histogram: histogram(values),
        normal_distribution: normal_curve(mean, std_dev, min, max),
        statistics: CapabilityStatistics {
            mean,
            std_dev,
            usl: limits.usl,
            lsl: limits.lsl,
            target: limits.target,
            cp,
            cpk,
            sample_size,
        },
    }
}

fn histogram(values: &[f64]) -> Histogram {
    let bins = MAX_HISTOGRAM_BINS.min(values.len());
    match distribution::density_histogram(values, bins) {
        Some(h) => Histogram {
            values: h.densities,
            bins: h.edges,
        },
        None => Histogram::default(),
    }
}

/// Curve over `[min - 3σ, max + 3σ]` so both observed extremes are covered
fn normal_curve(mean: f64, std_dev: f64, min: f64, max: f64) -> NormalCurve {
    // A zero-spread process has no density to draw
    if std_dev <= 0.0 {
        return NormalCurve::default();
    }
    let x = distribution::linspace(
        min - 3.0 * std_dev,
        max + 3.0 * std_dev,
        NORMAL_CURVE_POINTS,
    );
    let y = x
        .iter()
        .map(|&xi| distribution::normal_pdf(xi, mean, std_dev))
        .collect();
    NormalCurve { x, y }
}
