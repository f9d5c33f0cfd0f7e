//! Dataset loading: fetch, parse, sort, deduplicate.
//!
//! Sources are either HTTP(S) URLs or local file paths. Loading produces an
//! owned, immutable `Dataset` that the server shares behind an `Arc`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::filter::DateRange;
use crate::models::{CsvGeoRecord, CsvOrderRecord, CustomerLocation, Order};

/// Row errors logged individually before going quiet
const MAX_LOGGED_ERRORS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Row-level outcome of parsing one file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadStats {
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Order and geolocation tables as loaded at startup
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Sorted by approval timestamp; rows without one come last
    pub orders: Vec<Order>,
    /// One entry per unique customer
    pub locations: Vec<CustomerLocation>,
}

impl Dataset {
    pub fn new(mut orders: Vec<Order>, locations: Vec<CustomerLocation>) -> Self {
        // None sorts first for Option, so key on (is_none, ts) to push them last
        orders.sort_by_key(|o| (o.approved_at.is_none(), o.approved_at));
        Self {
            orders,
            locations: dedup_customers(locations),
        }
    }

    /// First and last approval day in the data
    pub fn approval_span(&self) -> Option<DateRange> {
        let mut dates = self.orders.iter().filter_map(|o| o.approved_date());
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d: NaiveDate| (lo.min(d), hi.max(d)));
        Some(DateRange { start: min, end: max })
    }
}

/// Keep the first row seen for each customer
pub fn dedup_customers(locations: Vec<CustomerLocation>) -> Vec<CustomerLocation> {
    let mut seen: HashSet<String> = HashSet::new();
    locations
        .into_iter()
        .filter(|loc| seen.insert(loc.customer_unique_id.clone()))
        .collect()
}

pub fn parse_orders<R: Read>(reader: R) -> Result<(Vec<Order>, LoadStats)> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let mut stats = LoadStats::default();
    let mut orders = Vec::new();

    for (i, row) in reader.deserialize::<CsvOrderRecord>().enumerate() {
        stats.rows += 1;
        match row.map_err(anyhow::Error::from).and_then(|r| r.to_order()) {
            Ok(order) => {
                orders.push(order);
                stats.loaded += 1;
            }
            Err(e) => {
                if stats.skipped < MAX_LOGGED_ERRORS {
                    warn!("Skipping order row {}: {:#}", i + 1, e);
                }
                stats.skipped += 1;
            }
        }
    }

    Ok((orders, stats))
}

pub fn parse_locations<R: Read>(reader: R) -> Result<(Vec<CustomerLocation>, LoadStats)> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let mut stats = LoadStats::default();
    let mut locations = Vec::new();

    for (i, row) in reader.deserialize::<CsvGeoRecord>().enumerate() {
        stats.rows += 1;
        match row.map_err(anyhow::Error::from).and_then(|r| r.to_location()) {
            Ok(Some(location)) => {
                locations.push(location);
                stats.loaded += 1;
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                if stats.skipped < MAX_LOGGED_ERRORS {
                    warn!("Skipping geolocation row {}: {:#}", i + 1, e);
                }
                stats.skipped += 1;
            }
        }
    }

    Ok((locations, stats))
}

/// Read the raw bytes behind a source
pub async fn fetch(client: &reqwest::Client, source: &DataSource) -> Result<Vec<u8>> {
    match source {
        DataSource::Url(url) => {
            debug!("GET {}", url);
            let response = client
                .get(url)
                .send()
                .await
                .with_context(|| format!("request to {} failed", url))?
                .error_for_status()
                .with_context(|| format!("{} returned an error status", url))?;
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        }
        DataSource::Path(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Raw base map image bytes served back to the browser
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

fn guess_content_type(source: &DataSource) -> &'static str {
    let name = source.to_string().to_ascii_lowercase();
    if name.ends_with(".png") {
        "image/png"
    } else if name.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "image/jpeg"
    }
}

pub async fn load_base_map(client: &reqwest::Client, source: &DataSource) -> Result<BaseMapImage> {
    info!("Loading base map from {}", source);
    let bytes = fetch(client, source).await.context("loading base map")?;
    if bytes.is_empty() {
        anyhow::bail!("base map at {} is empty", source);
    }
    Ok(BaseMapImage {
        bytes,
        content_type: guess_content_type(source),
    })
}

/// Load both tables; any fetch or read failure is returned to the caller
pub async fn load_dataset(
    client: &reqwest::Client,
    orders_source: &DataSource,
    geo_source: &DataSource,
) -> Result<Dataset> {
    info!("Loading orders from {}", orders_source);
    let raw = fetch(client, orders_source).await.context("loading orders")?;
    let (orders, order_stats) = parse_orders(raw.as_slice())?;
    info!(
        "Parsed {} order rows ({} skipped)",
        order_stats.loaded, order_stats.skipped
    );

    info!("Loading geolocation from {}", geo_source);
    let raw = fetch(client, geo_source).await.context("loading geolocation")?;
    let (locations, geo_stats) = parse_locations(raw.as_slice())?;
    info!(
        "Parsed {} geolocation rows ({} skipped)",
        geo_stats.loaded, geo_stats.skipped
    );

    let dataset = Dataset::new(orders, locations);
    info!(
        "Dataset ready: {} orders, {} unique customers located",
        dataset.orders.len(),
        dataset.locations.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS_CSV: &str = "\
order_id,customer_id,customer_unique_id,order_status,order_approved_at,price,freight_value,review_score,product_category_name_english,customer_state,payment_value
o2,c2,u2,delivered,2018-01-03 10:00:00,20.0,0.0,4.0,toys,RJ,20.0
o1,c1,u1,delivered,2018-01-01 09:00:00,10.0,2.0,5.0,bed_bath_table,SP,12.0
o3,c3,u3,canceled,,5.0,1.0,,toys,SP,6.0
o4,c4,u4,delivered,not-a-date,1.0,1.0,1,toys,MG,2.0
";

    const GEO_CSV: &str = "\
customer_unique_id,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state
u1,-23.55,-46.63,sao paulo,SP
u1,-23.56,-46.64,sao paulo,SP
u2,-22.90,-43.17,rio de janeiro,RJ
u3,,,,
";

    #[test]
    fn test_parse_orders_skips_bad_rows() {
        let (orders, stats) = parse_orders(ORDERS_CSV.as_bytes()).unwrap();
        assert_eq!(stats, LoadStats { rows: 4, loaded: 3, skipped: 1 });
        assert_eq!(orders[0].order_id.as_deref(), Some("o2"));
        assert_eq!(orders[2].approved_at, None);
    }

    #[test]
    fn test_dataset_sorts_and_spans() {
        let (orders, _) = parse_orders(ORDERS_CSV.as_bytes()).unwrap();
        let dataset = Dataset::new(orders, Vec::new());
        let ids: Vec<_> = dataset.orders.iter().map(|o| o.order_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["o1", "o2", "o3"]);

        let span = dataset.approval_span().unwrap();
        assert_eq!(span.start, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(span.end, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());
    }

    #[test]
    fn test_locations_deduplicated() {
        let (locations, stats) = parse_locations(GEO_CSV.as_bytes()).unwrap();
        assert_eq!(stats.skipped, 1);
        let dataset = Dataset::new(Vec::new(), locations);
        assert_eq!(dataset.locations.len(), 2);
        assert_eq!(dataset.locations[0].lat, -23.55);
        assert!(dataset.approval_span().is_none());
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.com/df.csv"),
            DataSource::Url("https://example.com/df.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/df.csv"),
            DataSource::Path(PathBuf::from("data/df.csv"))
        );
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(guess_content_type(&DataSource::parse("https://x/map.jpg")), "image/jpeg");
        assert_eq!(guess_content_type(&DataSource::parse("assets/Map.PNG")), "image/png");
    }

    #[tokio::test]
    async fn test_missing_base_map_is_error() {
        let client = reqwest::Client::new();
        let missing = DataSource::Path(PathBuf::from("does/not/exist.jpg"));
        assert!(load_base_map(&client, &missing).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let client = reqwest::Client::new();
        let missing = DataSource::Path(PathBuf::from("does/not/exist.csv"));
        assert!(load_dataset(&client, &missing, &missing).await.is_err());
    }
}
