//! CLI command implementations

pub mod cap;
pub mod completions;
pub mod items;
pub mod mr;
pub mod report;
pub mod standards;
pub mod stats;
pub mod utils;
