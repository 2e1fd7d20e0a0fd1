//! `qcspc mr` command - moving ranges and the MR chart control limit

use clap::Args;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::MovingRangeChart;
use crate::cli::commands::utils::AnalysisContext;
use crate::cli::helpers::{format_opt, smart_round};
use crate::cli::output::{print_csv, print_serialized};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat, SelectionArgs};

#[derive(Args, Debug)]
pub struct MrArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Test item to analyze
    #[arg(long, short = 'i')]
    pub item: Option<String>,

    /// Draw the moving-range chart in the terminal
    #[arg(long)]
    pub chart: bool,
}

#[derive(Serialize)]
struct RangeRow<'a> {
    label: &'a str,
    value: Option<f64>,
    moving_range: Option<f64>,
}

#[derive(Tabled)]
struct RangeCells {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "MR")]
    moving_range: String,
}

pub fn run(args: MrArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AnalysisContext::load(global)?;
    let (labels, data) = ctx.series(&args.selection, args.item.as_deref())?.into_parts();
    let chart = MovingRangeChart::new(labels, data);

    if print_serialized(&chart, ctx.format)? {
        return Ok(());
    }

    let rows = chart
        .labels
        .iter()
        .zip(&chart.data_values)
        .zip(&chart.moving_ranges)
        .map(|((label, value), moving_range)| RangeRow {
            label,
            value: *value,
            moving_range: *moving_range,
        });

    let stats = chart.statistics;
    match ctx.format {
        OutputFormat::Csv => print_csv(rows),
        OutputFormat::Table => {
            let cells = rows.map(|row| RangeCells {
                label: row.label.to_string(),
                value: format_opt(row.value, 4),
                moving_range: format_opt(row.moving_range, 4),
            });
            println!("{}", Table::new(cells).with(Style::rounded()));
            println!(
                "MR-bar = {}   UCL = {}",
                smart_round(stats.mr_average, stats.mr_average),
                smart_round(stats.ucl_mr, stats.mr_average)
            );
            Ok(())
        }
        _ => {
            let fmt = |v: f64| smart_round(v, stats.mr_average);
            let valid = chart.moving_ranges.iter().flatten().count();

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Item").bold(),
                style(args.item.as_deref().unwrap_or("values")).cyan()
            );
            println!(
                "{}: {} points, {} valid moving ranges",
                style("Series").bold(),
                chart.data_values.len(),
                valid
            );
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("MR-bar").bold(), fmt(stats.mr_average));
            println!("{}: {}", style("UCL (D4·MR-bar)").bold(), fmt(stats.ucl_mr));

            let above: Vec<String> = chart
                .labels
                .iter()
                .zip(&chart.moving_ranges)
                .filter_map(|(label, mr)| match mr {
                    Some(r) if *r > stats.ucl_mr => Some(format!("{} ({})", label, fmt(*r))),
                    _ => None,
                })
                .collect();
            println!();
            if valid == 0 {
                println!("{}", style("No consecutive value pairs").yellow());
            } else if above.is_empty() {
                println!("{}", style("All moving ranges within UCL").green());
            } else {
                println!(
                    "{} {} range(s) above UCL: {}",
                    style("!").red().bold(),
                    above.len(),
                    above.join(", ")
                );
            }

            if args.chart {
                println!();
                println!(
                    "{}",
                    viz::render_moving_range_chart(
                        &chart.moving_ranges,
                        stats.ucl_mr,
                        viz::PLOT_WIDTH,
                        viz::PLOT_HEIGHT
                    )
                );
            }
            Ok(())
        }
    }
}
