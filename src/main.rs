//! Dashboard server for the DICODING Shop order dataset
//!
//! Loads both datasets once at startup, then serves the HTML dashboard and
//! the JSON API. Every request recomputes its views from the selected range.
//!
//! Usage:
//!   ./target/release/dashboard [options]
//!
//! Options:
//!   --port PORT           Port to listen on (default: 8080)
//!   --orders SRC          Orders CSV, URL or path
//!   --geolocation SRC     Geolocation CSV, URL or path
//!   --basemap SRC         Base map image, URL or path
//!
//! Endpoints:
//!   GET /                       - HTML dashboard (?start=YYYY-MM-DD&end=YYYY-MM-DD)
//!   GET /map.svg                - Customer density map
//!   GET /api/v1/health          - Health check
//!   GET /api/v1/range           - Dataset date span
//!   GET /api/v1/views           - Every panel's data
//!   GET /api/v1/daily-orders    - Orders and revenue per day
//!   GET /api/v1/spend           - Spend per day and top customers
//!   GET /api/v1/products        - Category rankings (?limit=N)
//!   GET /api/v1/reviews         - Review score distribution
//!   GET /api/v1/states          - Customers by state
//!   GET /api/v1/status          - Order status distribution
//!   GET /api/v1/geo             - Density grid cells

use anyhow::{Context, Result};
use clap::Parser;
use shop_dashboard::api::{self, DashboardService};
use shop_dashboard::config::{default_logo_url, init_tracing, DataArgs, DEFAULT_BASEMAP};
use shop_dashboard::geo::BrazilMapPlotter;
use shop_dashboard::loader::{load_base_map, load_dataset, DataSource};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Serve the e-commerce order analytics dashboard")]
struct Args {
    #[command(flatten)]
    data: DataArgs,

    /// Base map image (URL or path)
    #[arg(long, env = "DASHBOARD_BASEMAP", default_value = DEFAULT_BASEMAP)]
    basemap: String,

    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "DASHBOARD_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Above this many customers the map draws density cells instead of dots
    #[arg(long, default_value = "5000")]
    max_scatter_points: usize,

    /// Hide the sidebar logo
    #[arg(long)]
    no_logo: bool,
}

fn print_banner(addr: &SocketAddr, orders: usize, customers: usize) {
    println!("============================================================");
    println!("           DICODING SHOP ANALYTICS DASHBOARD");
    println!("============================================================");
    println!();
    println!("  Dashboard: http://{}/", addr);
    println!("  API:       http://{}/api/v1/", addr);
    println!("  Orders:    {}", orders);
    println!("  Customers: {} located", customers);
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let client = reqwest::Client::new();

    // Either dataset failing to load is fatal
    let dataset = load_dataset(
        &client,
        &args.data.orders_source(),
        &args.data.geolocation_source(),
    )
    .await?;

    // The base map only feeds one panel
    let base_map = load_base_map(&client, &DataSource::parse(&args.basemap))
        .await
        .map_err(|e| format!("{:#}", e));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid listen address")?;
    print_banner(&addr, dataset.orders.len(), dataset.locations.len());

    let plotter = BrazilMapPlotter {
        max_scatter_points: args.max_scatter_points,
        ..Default::default()
    };
    let logo = (!args.no_logo).then(default_logo_url);
    let service = Arc::new(
        DashboardService::new(dataset, base_map)
            .with_plotter(plotter)
            .with_logo(logo),
    );

    let app = api::router(service);
    info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
