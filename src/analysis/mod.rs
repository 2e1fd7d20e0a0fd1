//! Statistical process control analysis
//!
//! Three independent, pure stages over in-memory series:
//!
//! - [`basic`] - average, population σ and ±1..5σ bands
//! - [`moving_range`] - successive differences and the MR chart UCL
//! - [`capability`] - sample statistics, Cp/Cpk, histogram, normal curve
//!
//! None of them fail: insufficient data produces a zero/null shaped result.

pub mod basic;
pub mod capability;
pub mod distribution;
pub mod moving_range;
pub mod report;

pub use basic::{basic_statistics, BasicStatistics, SigmaLines, TrendChart};
pub use capability::{
    capability_analysis, process_capability, CapabilityRequest, CapabilityResult,
    CapabilityStatistics, Histogram, NormalCurve, MAX_HISTOGRAM_BINS, NORMAL_CURVE_POINTS,
};
pub use moving_range::{
    moving_range, MovingRangeChart, MovingRangeResult, MovingRangeStatistics, D4_MR,
};
pub use report::{analyze_items, measured_items, ItemReport};
