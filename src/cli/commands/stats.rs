//! `qcspc stats` command - trend chart statistics

use clap::Args;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::TrendChart;
use crate::cli::commands::utils::AnalysisContext;
use crate::cli::helpers::{smart_round, truncate_str};
use crate::cli::output::{print_csv, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat, SelectionArgs};

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Test item to analyze
    #[arg(long, short = 'i')]
    pub item: Option<String>,
}

#[derive(Serialize)]
struct PointRow<'a> {
    label: &'a str,
    value: Option<f64>,
}

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "Line")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let (labels, data) = ctx.series(&args.selection, args.item.as_deref())?.into_parts();
    let chart = TrendChart::new(labels, data);

    if print_serialized(&chart, ctx.format)? {
        return Ok(());
    }

    let stats = &chart.statistics;
    match ctx.format {
        OutputFormat::Csv => print_csv(chart.labels.iter().zip(&chart.data).map(|(label, value)| {
            PointRow {
                label,
                value: *value,
            }
        })),
        OutputFormat::Table => {
            let mut rows = vec![
                BandRow {
                    name: "average".to_string(),
                    value: smart_round(stats.average, stats.std_dev),
                },
                BandRow {
                    name: "std_dev".to_string(),
                    value: smart_round(stats.std_dev, stats.std_dev),
                },
            ];
            rows.extend(stats.sigma_lines.entries().iter().map(|(name, value)| BandRow {
                name: name.to_string(),
                value: smart_round(*value, stats.std_dev),
            }));
            println!("{}", Table::new(rows).with(Style::rounded()));
            Ok(())
        }
        _ => {
            let present = chart.data.iter().flatten().count();
            let title = args.item.as_deref().unwrap_or("values");

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Item").bold(),
                style(truncate_str(title, 40)).cyan()
            );
            println!(
                "{}: {} ({} missing)",
                style("Points").bold(),
                chart.data.len(),
                chart.data.len() - present
            );
            println!("{}", style("─".repeat(60)).dim());

            if present == 0 {
                println!("{}", style("No values to analyze").yellow());
                return Ok(());
            }

            let fmt = |v: f64| smart_round(v, stats.std_dev);
            println!("{}: {}", style("Average").bold(), fmt(stats.average));
            println!("{}: {}", style("Std Dev (σ)").bold(), fmt(stats.std_dev));
            println!();
            for k in 1..=5u8 {
                if let Some((plus, minus)) = stats.sigma_lines.band(k) {
                    println!("  ±{}σ   {:>14}  {:>14}", k, fmt(plus), fmt(minus));
                }
            }

            // Points outside the ±3σ band, the usual out-of-control signal
            if let Some((upper, lower)) = stats.sigma_lines.band(3) {
                let outside: Vec<String> = chart
                    .labels
                    .iter()
                    .zip(&chart.data)
                    .filter_map(|(label, value)| match value {
                        Some(v) if *v > upper || *v < lower => {
                            Some(format!("{} ({})", label, fmt(*v)))
                        }
                        _ => None,
                    })
                    .collect();
                println!();
                if outside.is_empty() {
                    println!("{}", style("All points within ±3σ").green());
                } else {
                    println!(
                        "{} {} point(s) beyond ±3σ: {}",
                        style("!").red().bold(),
                        outside.len(),
                        outside.join(", ")
                    );
                }
            }
            Ok(())
        }
    }
}
