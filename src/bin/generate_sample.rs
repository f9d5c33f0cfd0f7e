//! Sample data generator for the dashboard
//!
//! Writes an orders CSV and a geolocation CSV in the published column
//! layout, so the dashboard can run offline.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --orders <N>         Order rows to generate (default: 5000)
//!   --customers <N>      Distinct customers (default: 3000)
//!   --start <DATE>       First purchase day (default: 2017-01-01)
//!   --days <N>           Days covered by purchases (default: 365)
//!   --seed <N>           Random seed for reproducibility (optional)
//!   --output-dir <PATH>  Output directory (default: data)

use anyhow::{Context, Result};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use shop_dashboard::config::init_tracing;
use shop_dashboard::filter::parse_date;
use shop_dashboard::sample::{generate, SampleConfig, MAX_DAYS};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate synthetic order and geolocation CSVs")]
struct Args {
    /// Order rows to generate
    #[arg(long, default_value = "5000")]
    orders: usize,

    /// Distinct customers the orders are spread over
    #[arg(long, default_value = "3000")]
    customers: usize,

    /// First purchase day (YYYY-MM-DD)
    #[arg(long, default_value = "2017-01-01")]
    start: String,

    /// Days covered by purchase timestamps
    #[arg(long, default_value = "365", value_parser = clap::value_parser!(i64).range(1..=MAX_DAYS))]
    days: i64,

    /// Share of orders left without a review score (0.0 - 1.0)
    #[arg(long, default_value = "0.01")]
    missing_review_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving orders.csv and geolocation.csv
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = SampleConfig {
        orders: args.orders,
        customers: args.customers,
        start: parse_date(&args.start)?,
        days: args.days,
        missing_review_rate: args.missing_review_rate,
    };

    println!("Sample Data Generator");
    println!("{}", "━".repeat(66));
    println!("Orders:           {}", config.orders);
    println!("Customers:        {}", config.customers);
    println!("Purchases from:   {} (+{} days)", config.start, config.days);
    println!("Missing reviews:  {:.1}%", config.missing_review_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let data = generate(&config, &mut rng)?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    let orders_path = args.output_dir.join("orders.csv");
    let geo_path = args.output_dir.join("geolocation.csv");

    write_csv(&orders_path, &data.orders)?;
    info!("Wrote {} orders to {}", data.orders.len(), orders_path.display());
    write_csv(&geo_path, &data.geolocation)?;
    info!("Wrote {} locations to {}", data.geolocation.len(), geo_path.display());

    println!("{}", "━".repeat(66));
    println!("Run the dashboard with:");
    println!(
        "  dashboard --orders {} --geolocation {}",
        orders_path.display(),
        geo_path.display()
    );

    Ok(())
}
