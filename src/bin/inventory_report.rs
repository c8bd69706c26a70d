use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use inventory_browser::{logging, AppConfig, FilterSelection, InventorySession, RecordInput};

/// Print the inventory dashboard for a selection, or add a record to the dataset.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Block types to include (repeatable). All types when omitted.
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Block shapes to include (repeatable). All shapes when omitted.
    #[arg(long = "shape", value_name = "SHAPE")]
    shapes: Vec<String>,

    /// Block colors to include (repeatable). All colors when omitted.
    #[arg(long = "color", value_name = "COLOR")]
    colors: Vec<String>,

    /// Append a record instead of printing the dashboard.
    #[arg(
        long,
        num_args = 6,
        allow_hyphen_values = true,
        value_names = ["TYPE", "SHAPE", "DIMS", "COLOR", "AVAILABLE", "SOLD"]
    )]
    add: Option<Vec<String>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::from_env(),
    };
    logging::init(&config.log_level).map_err(|e| anyhow!(e))?;

    let mut session = InventorySession::from_config(&config)
        .with_context(|| format!("opening dataset {}", config.dataset_path.display()))?;

    if let Some(values) = args.add {
        let input = parse_record(&values)?;
        let outcome = session.add_record(input)?;
        println!("{}", outcome.user_message());
        if !outcome.is_durable() {
            error!(outcome = %outcome.user_message(), "Record was not written");
            std::process::exit(1);
        }
        return Ok(());
    }

    let options = session.options();
    let selection = FilterSelection::new(
        or_all(args.types, options.types),
        or_all(args.shapes, options.shapes),
        or_all(args.colors, options.colors),
    );
    let view = session.view(&selection);
    info!(rows = view.filtered.len(), groups = view.grouped.len(), "Dashboard computed");

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn or_all(chosen: Vec<String>, available: Vec<String>) -> Vec<String> {
    if chosen.is_empty() {
        available
    } else {
        chosen
    }
}

fn parse_record(values: &[String]) -> Result<RecordInput> {
    let [block_type, block_shape, dimensions, block_color, available, sold] = values else {
        bail!("--add takes exactly six values");
    };
    let available_quantity: i64 = available
        .parse()
        .with_context(|| format!("available quantity {:?} is not a whole number", available))?;
    let sold_out: i64 = sold
        .parse()
        .with_context(|| format!("sold out {:?} is not a whole number", sold))?;

    Ok(RecordInput::new(
        block_type.as_str(),
        block_shape.as_str(),
        dimensions.as_str(),
        block_color.as_str(),
        available_quantity,
        sold_out,
    ))
}
