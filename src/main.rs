use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use smartshuffle_core::{FeatureRecord, Item, ItemId};
use smartshuffle_session::{CapabilityProfile, ChartData, SessionConfig, ShuffleSession, Warning};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Order items so that neighbours have similar features
#[derive(Parser, Debug)]
#[command(name = "smartshuffle")]
#[command(about = "Similarity-preserving ordering of feature-described items", long_about = None)]
struct Args {
    /// JSON file with the items and their feature records
    input: PathBuf,

    /// JSON session configuration (schema, embedding, tour)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Client capability: constrained or full
    #[arg(long, default_value = "full")]
    profile: CapabilityProfile,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct Input {
    items: Vec<InputItem>,
}

#[derive(Debug, Deserialize)]
struct InputItem {
    id: ItemId,
    name: String,
    features: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Output {
    order: Vec<usize>,
    shuffled: Vec<String>,
    cost: u64,
    length: f64,
    warnings: Vec<Warning>,
    chart: ChartData,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting smartshuffle v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("loading config {:?}", path))?,
        None => SessionConfig::default(),
    };

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading input {:?}", args.input))?;
    let input: Input = serde_json::from_str(&raw).context("parsing input")?;
    info!("Loaded {} items from {:?}", input.items.len(), args.input);

    let mut items = Vec::with_capacity(input.items.len());
    let mut records = Vec::with_capacity(input.items.len());
    for entry in input.items {
        records.push(
            FeatureRecord::from_json(&entry.features)
                .with_context(|| format!("features of item {}", entry.id))?,
        );
        items.push(Item::new(entry.id, entry.name));
    }

    let session = ShuffleSession::new(items, &records, config)?;
    let tour = session.get_tour()?;
    let chart = session.get_chart_data(args.profile)?;

    let output = Output {
        order: tour.order().to_vec(),
        shuffled: session.shuffled_items()?.into_iter().map(|i| i.name).collect(),
        cost: tour.cost(),
        length: tour.length(),
        warnings: session.warnings(),
        chart,
    };
    info!("Total distance: {}", output.cost);

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
