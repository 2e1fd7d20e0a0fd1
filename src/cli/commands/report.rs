//! `qcspc report` command - every analysis stage for several test items

use clap::Args;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::{analyze_items, measured_items, ItemReport};
use crate::cli::commands::utils::AnalysisContext;
use crate::cli::helpers::{format_opt, smart_round, truncate_str};
use crate::cli::output::{print_csv, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat, SelectionArgs};

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Test items to include (comma-separated); defaults to the product
    /// type's catalog, or every item measured in the selection
    #[arg(long, value_delimiter = ',')]
    pub items: Vec<String>,
}

/// Flat row for CSV export
#[derive(Serialize)]
struct ReportCsvRow<'a> {
    test_item: &'a str,
    points: usize,
    sample_size: usize,
    average: f64,
    std_dev: f64,
    mr_average: f64,
    ucl_mr: f64,
    lsl: Option<f64>,
    usl: Option<f64>,
    cp: Option<f64>,
    cpk: Option<f64>,
}

impl<'a> From<&'a ItemReport> for ReportCsvRow<'a> {
    fn from(report: &'a ItemReport) -> Self {
        Self {
            test_item: &report.test_item,
            points: report.points,
            sample_size: report.capability.sample_size,
            average: report.basic.average,
            std_dev: report.basic.std_dev,
            mr_average: report.moving_range.mr_average,
            ucl_mr: report.moving_range.ucl_mr,
            lsl: report.capability.lsl,
            usl: report.capability.usl,
            cp: report.capability.cp,
            cpk: report.capability.cpk,
        }
    }
}

#[derive(Tabled)]
struct ReportTableRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "N")]
    n: String,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "σ")]
    std_dev: String,
    #[tabled(rename = "MR-bar")]
    mr_average: String,
    #[tabled(rename = "UCL")]
    ucl_mr: String,
    #[tabled(rename = "LSL")]
    lsl: String,
    #[tabled(rename = "USL")]
    usl: String,
    #[tabled(rename = "Cp")]
    cp: String,
    #[tabled(rename = "Cpk")]
    cpk: String,
}

impl From<&ItemReport> for ReportTableRow {
    fn from(report: &ItemReport) -> Self {
        let reference = report.basic.std_dev;
        let fmt = |v: Option<f64>| match v {
            Some(v) => smart_round(v, reference),
            None => "-".to_string(),
        };
        Self {
            item: truncate_str(&report.test_item, 28),
            n: format!("{}/{}", report.capability.sample_size, report.points),
            average: fmt(Some(report.basic.average)),
            std_dev: fmt(Some(report.basic.std_dev)),
            mr_average: fmt(Some(report.moving_range.mr_average)),
            ucl_mr: fmt(Some(report.moving_range.ucl_mr)),
            lsl: fmt(report.capability.lsl),
            usl: fmt(report.capability.usl),
            cp: format_opt(report.capability.cp, 3),
            cpk: format_opt(report.capability.cpk, 3),
        }
    }
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let records = ctx.records()?;
    let query = args.selection.query();
    let product_type = args.selection.product_type();

    let items: Vec<String> = if !args.items.is_empty() {
        args.items.clone()
    } else if let Some(pt) = product_type {
        pt.test_items().iter().map(|s| s.to_string()).collect()
    } else {
        measured_items(&records, &query)
    };

    if items.is_empty() {
        return Err(miette::miette!(
            "No test items to report. The selection matched no measured values"
        ));
    }

    let reports = analyze_items(
        &records,
        &query,
        product_type,
        &items,
        &ctx.standard_type,
        &ctx.standards,
    );

    if print_serialized(&reports, ctx.format)? {
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Csv => print_csv(reports.iter().map(ReportCsvRow::from)),
        _ => {
            if ctx.format == OutputFormat::Auto {
                let product = args.selection.product.as_deref().unwrap_or("all products");
                println!(
                    "{} {} ({}, {} records selected)",
                    style("Report:").bold(),
                    style(product).cyan(),
                    ctx.standard_type,
                    reports.first().map_or(0, |r| r.points)
                );
            }
            let rows: Vec<ReportTableRow> = reports.iter().map(ReportTableRow::from).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            Ok(())
        }
    }
}
