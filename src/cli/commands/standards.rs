//! `qcspc std` command - product standards inspection

use clap::{Args, Subcommand};
use console::style;
use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::commands::utils::AnalysisContext;
use crate::cli::helpers::format_opt;
use crate::cli::output::{print_csv, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::standards::ProductStandard;

#[derive(Subcommand, Debug)]
pub enum StdCommands {
    /// List standards, optionally filtered
    List(ListArgs),

    /// Show every standard type for one product and test item
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only this product code
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Only this test item
    #[arg(long, short = 'i')]
    pub item: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Product code
    pub product: String,

    /// Test item
    pub item: String,
}

#[derive(Tabled)]
struct StandardRow {
    #[tabled(rename = "Product")]
    product_code: String,
    #[tabled(rename = "Item")]
    test_item: String,
    #[tabled(rename = "Type")]
    standard_type: String,
    #[tabled(rename = "LSL")]
    lower_limit: String,
    #[tabled(rename = "Target")]
    target_value: String,
    #[tabled(rename = "USL")]
    upper_limit: String,
}

impl From<&ProductStandard> for StandardRow {
    fn from(standard: &ProductStandard) -> Self {
        Self {
            product_code: standard.product_code.clone(),
            test_item: standard.test_item.clone(),
            standard_type: standard.standard_type.to_string(),
            lower_limit: format_opt(standard.lower_limit, 4),
            target_value: format_opt(standard.target_value, 4),
            upper_limit: format_opt(standard.upper_limit, 4),
        }
    }
}

pub fn run(cmd: StdCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StdCommands::List(args) => run_list(args, global),
        StdCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let standards: Vec<ProductStandard> = ctx
        .standards
        .standards()
        .filter(|s| args.product.as_ref().map_or(true, |p| &s.product_code == p))
        .filter(|s| args.item.as_ref().map_or(true, |i| &s.test_item == i))
        .collect();
    print_standards(&standards, ctx.format)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let standards: Vec<ProductStandard> = ctx
        .standards
        .standards()
        .filter(|s| s.product_code == args.product && s.test_item == args.item)
        .collect();
    if standards.is_empty() {
        return Err(miette::miette!(
            "No standard for product '{}' item '{}'",
            args.product,
            args.item
        ));
    }
    print_standards(&standards, ctx.format)
}

fn print_standards(standards: &[ProductStandard], format: OutputFormat) -> Result<()> {
    if print_serialized(&standards, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Csv => print_csv(standards),
        _ => {
            if standards.is_empty() {
                println!("{}", style("No standards found.").dim());
                return Ok(());
            }
            let rows: Vec<StandardRow> = standards.iter().map(StandardRow::from).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            if format == OutputFormat::Auto {
                println!("{} standard(s)", style(standards.len()).cyan());
            }
            Ok(())
        }
    }
}
