use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layouts accepted in the order export, tried in order
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw order line item from CSV ingestion.
///
/// Every column is optional so partial exports still load; extra columns
/// (payment, seller, dimensions, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CsvOrderRecord {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_unique_id: String,
    #[serde(default)]
    pub order_status: String,
    #[serde(default)]
    pub order_purchase_timestamp: String,
    #[serde(default)]
    pub order_approved_at: String,
    #[serde(default)]
    pub order_delivered_carrier_date: String,
    #[serde(default)]
    pub order_delivered_customer_date: String,
    #[serde(default)]
    pub order_estimated_delivery_date: String,
    #[serde(default)]
    pub shipping_limit_date: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_category_name_english: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub freight_value: String,
    #[serde(default)]
    pub review_score: String,
    #[serde(default)]
    pub customer_city: String,
    #[serde(default)]
    pub customer_state: String,
}

/// Raw customer geolocation row from CSV ingestion
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CsvGeoRecord {
    #[serde(default)]
    pub customer_unique_id: String,
    #[serde(default)]
    pub geolocation_lat: String,
    #[serde(default)]
    pub geolocation_lng: String,
    #[serde(default)]
    pub geolocation_city: String,
    #[serde(default)]
    pub geolocation_state: String,
}

/// Order line item, one row per purchased product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_unique_id: Option<String>,
    pub order_status: Option<String>,
    pub purchased_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub delivered_carrier_at: Option<NaiveDateTime>,
    pub delivered_customer_at: Option<NaiveDateTime>,
    pub estimated_delivery_at: Option<NaiveDateTime>,
    pub shipping_limit_at: Option<NaiveDateTime>,
    pub product_id: Option<String>,
    pub product_category: Option<String>,
    pub price: f64,
    pub freight_value: f64,
    pub review_score: Option<u8>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
}

impl Order {
    /// Amount the customer paid for this line: item price plus shipping
    pub fn spend(&self) -> f64 {
        self.price + self.freight_value
    }

    /// Calendar date the order was approved
    pub fn approved_date(&self) -> Option<NaiveDate> {
        self.approved_at.map(|ts| ts.date())
    }

    /// Customer identity used for per-customer grouping
    pub fn customer_key(&self) -> Option<&str> {
        self.customer_unique_id
            .as_deref()
            .or(self.customer_id.as_deref())
    }
}

/// Customer coordinate, one per unique customer after deduplication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerLocation {
    pub customer_unique_id: String,
    pub lat: f64,
    pub lng: f64,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl CsvOrderRecord {
    pub fn to_order(&self) -> anyhow::Result<Order> {
        Ok(Order {
            order_id: non_empty(&self.order_id),
            customer_id: non_empty(&self.customer_id),
            customer_unique_id: non_empty(&self.customer_unique_id),
            order_status: non_empty(&self.order_status),
            purchased_at: parse_timestamp(&self.order_purchase_timestamp)
                .context("order_purchase_timestamp")?,
            approved_at: parse_timestamp(&self.order_approved_at).context("order_approved_at")?,
            delivered_carrier_at: parse_timestamp(&self.order_delivered_carrier_date)
                .context("order_delivered_carrier_date")?,
            delivered_customer_at: parse_timestamp(&self.order_delivered_customer_date)
                .context("order_delivered_customer_date")?,
            estimated_delivery_at: parse_timestamp(&self.order_estimated_delivery_date)
                .context("order_estimated_delivery_date")?,
            shipping_limit_at: parse_timestamp(&self.shipping_limit_date)
                .context("shipping_limit_date")?,
            product_id: non_empty(&self.product_id),
            product_category: non_empty(&self.product_category_name_english),
            price: parse_amount(&self.price).context("price")?,
            freight_value: parse_amount(&self.freight_value).context("freight_value")?,
            review_score: parse_score(&self.review_score).context("review_score")?,
            customer_city: non_empty(&self.customer_city),
            customer_state: non_empty(&self.customer_state),
        })
    }
}

impl CsvGeoRecord {
    /// Returns `Ok(None)` for rows without an identity or coordinates
    pub fn to_location(&self) -> anyhow::Result<Option<CustomerLocation>> {
        let Some(customer_unique_id) = non_empty(&self.customer_unique_id) else {
            return Ok(None);
        };
        let lat = parse_optional_f64(&self.geolocation_lat).context("geolocation_lat")?;
        let lng = parse_optional_f64(&self.geolocation_lng).context("geolocation_lng")?;

        Ok(match (lat, lng) {
            (Some(lat), Some(lng)) => Some(CustomerLocation {
                customer_unique_id,
                lat,
                lng,
                city: non_empty(&self.geolocation_city),
                state: non_empty(&self.geolocation_state),
            }),
            _ => None,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a timestamp cell; empty cells (and pandas' `NaT`) are `None`
pub fn parse_timestamp(s: &str) -> anyhow::Result<Option<NaiveDateTime>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nat") {
        return Ok(None);
    }
    // Fractional seconds appear in some re-exported files
    let s = s.split('.').next().unwrap_or(s);

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Some(ts));
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| anyhow!("invalid timestamp '{}'", s))
}

fn parse_optional_f64(s: &str) -> anyhow::Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = s.parse().with_context(|| format!("invalid number '{}'", s))?;
    Ok(Some(value))
}

/// Missing amounts count as zero, matching a sum that skips NaN
fn parse_amount(s: &str) -> anyhow::Result<f64> {
    Ok(parse_optional_f64(s)?.unwrap_or(0.0))
}

/// Scores are exported as `5` or, when the column holds NaN elsewhere, `5.0`
fn parse_score(s: &str) -> anyhow::Result<Option<u8>> {
    match parse_optional_f64(s)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && (1.0..=5.0).contains(&v) => Ok(Some(v as u8)),
        Some(v) => Err(anyhow!("review score out of range: {}", v)),
    }
}
