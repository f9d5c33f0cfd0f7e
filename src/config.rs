//! Command-line and environment configuration shared by the binaries

use clap::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::loader::DataSource;

const DATA_BASE_URL: &str = "https://raw.githubusercontent.com/mmelinn/E-Commerce-Data-Analysis-Project-on-macOs---DICODING/refs/heads/main/dashboard";

pub const DEFAULT_ORDERS: &str = "https://raw.githubusercontent.com/mmelinn/E-Commerce-Data-Analysis-Project-on-macOs---DICODING/refs/heads/main/dashboard/df.csv";
pub const DEFAULT_GEOLOCATION: &str = "https://raw.githubusercontent.com/mmelinn/E-Commerce-Data-Analysis-Project-on-macOs---DICODING/refs/heads/main/dashboard/geolocation.csv";
pub const DEFAULT_BASEMAP: &str =
    "https://i.pinimg.com/originals/3a/0c/e1/3a0ce18b3c842748c255bc0aa445ad41.jpg";

/// Where the two datasets come from: `http(s)://` URLs or local paths
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Orders CSV (URL or path)
    #[arg(long, env = "DASHBOARD_ORDERS", default_value = DEFAULT_ORDERS)]
    pub orders: String,

    /// Customer geolocation CSV (URL or path)
    #[arg(long, env = "DASHBOARD_GEOLOCATION", default_value = DEFAULT_GEOLOCATION)]
    pub geolocation: String,
}

impl DataArgs {
    pub fn orders_source(&self) -> DataSource {
        DataSource::parse(&self.orders)
    }

    pub fn geolocation_source(&self) -> DataSource {
        DataSource::parse(&self.geolocation)
    }
}

pub fn default_logo_url() -> String {
    format!("{}/logoDICODINGShop.png", DATA_BASE_URL)
}

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();
}
