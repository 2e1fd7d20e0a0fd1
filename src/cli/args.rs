//! Command-line argument definitions

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::cap::CapArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::items::ItemsArgs;
use crate::cli::commands::mr::MrArgs;
use crate::cli::commands::report::ReportArgs;
use crate::cli::commands::stats::StatsArgs;
use crate::cli::commands::standards::StdCommands;
use crate::core::records::{ProductType, RecordQuery};

#[derive(Parser, Debug)]
#[command(
    name = "qcspc",
    version,
    about = "Quality-control SPC toolkit - control charts, moving ranges and Cp/Cpk for batch test records",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Test records file (.yaml, .yml or .csv)
    #[arg(long, short = 'r', global = true)]
    pub records: Option<PathBuf>,

    /// Product standards file (.yaml, .yml or .csv)
    #[arg(long, short = 's', global = true)]
    pub standards: Option<PathBuf>,

    /// Standard type used for limit lookup (default: internal_control)
    #[arg(long, global = true)]
    pub standard_type: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Average, standard deviation and ±1..5σ lines for a test item
    Stats(StatsArgs),

    /// Moving ranges and the MR chart upper control limit
    Mr(MrArgs),

    /// Process capability (Cp/Cpk), histogram and normal curve
    Cap(CapArgs),

    /// Summary of every stage for several test items of a product
    Report(ReportArgs),

    /// Inspect the product standards table
    #[command(subcommand)]
    Std(StdCommands),

    /// List the test items recorded per product type
    Items(ItemsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Auto,
    Json,
    Yaml,
    Csv,
    /// Boxed table
    Table,
}

/// CLI-friendly product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliProductType {
    #[value(name = "dryfilm")]
    DryFilm,
    Adhesive,
}

impl From<CliProductType> for ProductType {
    fn from(value: CliProductType) -> Self {
        match value {
            CliProductType::DryFilm => ProductType::DryFilm,
            CliProductType::Adhesive => ProductType::Adhesive,
        }
    }
}

/// Which records to analyze
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Product code to select
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Production line to select
    #[arg(long, short = 'l')]
    pub line: Option<String>,

    /// Product type; restricts test items to its catalog
    #[arg(long, short = 't', value_enum)]
    pub product_type: Option<CliProductType>,

    /// First test date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last test date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl SelectionArgs {
    pub fn query(&self) -> RecordQuery {
        RecordQuery {
            product_code: self.product.clone(),
            production_line: self.line.clone(),
            start_date: self.from,
            end_date: self.to,
        }
    }

    pub fn product_type(&self) -> Option<ProductType> {
        self.product_type.map(ProductType::from)
    }
}
