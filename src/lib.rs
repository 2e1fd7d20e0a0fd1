//! QCSPC: Quality-control statistical process control toolkit
//!
//! Control-chart statistics, moving ranges and process capability for batch
//! test records, with specification limits taken from a standards table.

pub mod analysis;
pub mod cli;
pub mod core;
