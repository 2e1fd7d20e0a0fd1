//! `qcspc items` command - test-item catalogs per product type

use clap::Args;
use console::style;
use miette::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::output::{effective_format, print_csv, print_serialized};
use crate::cli::{CliProductType, GlobalOpts, OutputFormat};
use crate::core::records::ProductType;
use crate::core::Config;

#[derive(Args, Debug)]
pub struct ItemsArgs {
    /// Only this product type
    #[arg(long, short = 't', value_enum)]
    pub product_type: Option<CliProductType>,
}

#[derive(Serialize)]
struct ItemRow {
    product_type: String,
    test_item: &'static str,
}

pub fn run(args: ItemsArgs, global: &GlobalOpts) -> Result<()> {
    let format = effective_format(global.output, &Config::load());
    let types: Vec<ProductType> = match args.product_type {
        Some(pt) => vec![pt.into()],
        None => ProductType::all().to_vec(),
    };

    let catalog: BTreeMap<String, &'static [&'static str]> = types
        .iter()
        .map(|pt| (pt.to_string(), pt.test_items()))
        .collect();

    if print_serialized(&catalog, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv => print_csv(types.iter().flat_map(|pt| {
            pt.test_items().iter().map(move |item| ItemRow {
                product_type: pt.to_string(),
                test_item: *item,
            })
        })),
        _ => {
            for pt in &types {
                println!(
                    "{} ({} items)",
                    style(pt.to_string()).bold(),
                    pt.test_items().len()
                );
                for item in pt.test_items() {
                    println!("  {}", item);
                }
            }
            Ok(())
        }
    }
}
