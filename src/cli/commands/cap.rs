//! `qcspc cap` command - process capability analysis

use clap::Args;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::{capability_analysis, CapabilityRequest, CapabilityStatistics};
use crate::cli::commands::utils::AnalysisContext;
use crate::cli::helpers::{format_opt, smart_round};
use crate::cli::output::{print_csv, print_serialized};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat, SelectionArgs};

#[derive(Args, Debug)]
pub struct CapArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Test item to analyze (also the standards lookup key)
    #[arg(long, short = 'i')]
    pub item: Option<String>,

    /// Show the density histogram with LSL/USL markers
    #[arg(long)]
    pub histogram: bool,

    /// Plot the fitted normal curve
    #[arg(long)]
    pub curve: bool,
}

#[derive(Serialize)]
struct CurvePoint {
    x: f64,
    y: f64,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Statistic")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Color a capability index: ≥1.33 capable, ≥1.0 marginal, otherwise not
fn styled_index(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 1.33 => style(format!("{:.3}", v)).green().to_string(),
        Some(v) if v >= 1.0 => style(format!("{:.3}", v)).yellow().to_string(),
        Some(v) => style(format!("{:.3}", v)).red().to_string(),
        None => style("-").dim().to_string(),
    }
}

fn stat_rows(stats: &CapabilityStatistics) -> Vec<StatRow> {
    let fmt = |v: Option<f64>| match v {
        Some(v) => smart_round(v, stats.std_dev),
        None => "-".to_string(),
    };
    vec![
        StatRow {
            name: "sample_size",
            value: stats.sample_size.to_string(),
        },
        StatRow {
            name: "mean",
            value: fmt(Some(stats.mean)),
        },
        StatRow {
            name: "std_dev",
            value: fmt(Some(stats.std_dev)),
        },
        StatRow {
            name: "lsl",
            value: fmt(stats.lsl),
        },
        StatRow {
            name: "usl",
            value: fmt(stats.usl),
        },
        StatRow {
            name: "target",
            value: fmt(stats.target),
        },
        StatRow {
            name: "cp",
            value: format_opt(stats.cp, 3),
        },
        StatRow {
            name: "cpk",
            value: format_opt(stats.cpk, 3),
        },
    ]
}

pub fn run(args: CapArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let labeled = ctx.series(&args.selection, args.item.as_deref())?;

    let request = CapabilityRequest::new(args.selection.product.as_deref(), args.item.as_deref())
        .with_standard_type(ctx.standard_type.clone());
    let result = capability_analysis(&labeled.series.present(), &request, &ctx.standards);

    if print_serialized(&result, ctx.format)? {
        return Ok(());
    }

    let stats = &result.statistics;
    match ctx.format {
        OutputFormat::Csv => print_csv(
            result
                .normal_distribution
                .x
                .iter()
                .zip(&result.normal_distribution.y)
                .map(|(&x, &y)| CurvePoint { x, y }),
        ),
        OutputFormat::Table => {
            println!("{}", Table::new(stat_rows(stats)).with(Style::rounded()));
            Ok(())
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Item").bold(),
                style(args.item.as_deref().unwrap_or("values")).cyan()
            );
            if let Some(product) = args.selection.product.as_deref() {
                println!(
                    "{}: {} ({})",
                    style("Product").bold(),
                    product,
                    ctx.standard_type
                );
            }
            println!("{}", style("─".repeat(60)).dim());

            if result.is_insufficient() {
                println!(
                    "{} need at least 2 values for capability analysis, got {}",
                    style("!").yellow().bold(),
                    stats.sample_size
                );
                return Ok(());
            }

            let fmt = |v: Option<f64>| match v {
                Some(v) => smart_round(v, stats.std_dev),
                None => "-".to_string(),
            };
            println!("{}: {}", style("Sample size").bold(), stats.sample_size);
            println!("{}: {}", style("Mean").bold(), fmt(Some(stats.mean)));
            println!("{}: {}", style("Std Dev (s)").bold(), fmt(Some(stats.std_dev)));
            println!(
                "{}: {}  {}: {}  {}: {}",
                style("LSL").bold(),
                fmt(stats.lsl),
                style("Target").bold(),
                fmt(stats.target),
                style("USL").bold(),
                fmt(stats.usl)
            );
            println!();
            println!(
                "{}: {}   {}: {}",
                style("Cp").bold(),
                styled_index(stats.cp),
                style("Cpk").bold(),
                styled_index(stats.cpk)
            );
            if stats.cp.is_none() {
                println!(
                    "{}",
                    style("  (Cp/Cpk need both spec limits and a non-zero spread)").dim()
                );
            }

            if args.histogram {
                println!();
                println!("{}", style("Histogram (density):").bold());
                println!("{}", viz::render_histogram(&result.histogram, stats.lsl, stats.usl));
            }

            if args.curve {
                println!();
                println!("{}", style("Normal distribution:").bold());
                println!(
                    "{}",
                    viz::render_normal_curve(
                        &result.normal_distribution,
                        stats.lsl,
                        stats.usl,
                        viz::PLOT_WIDTH,
                        viz::PLOT_HEIGHT
                    )
                );
            }

            if let (Some(lsl), Some(usl)) = (stats.lsl, stats.usl) {
                if let (Some(&min), Some(&max)) =
                    (result.histogram.bins.first(), result.histogram.bins.last())
                {
                    println!();
                    println!("{}", viz::render_range_bar(min, max, lsl, usl));
                }
            }
            Ok(())
        }
    }
}
