//! Synthetic order data in the published CSV layout
//!
//! Generates orders and customer coordinates with controlled random
//! variation. States are drawn with rough population weights and customers
//! are scattered around the state capital, so maps and rankings look
//! plausible without the real dataset.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

use crate::models::{CsvGeoRecord, CsvOrderRecord};

/// (state, capital latitude, capital longitude, weight)
const STATES: [(&str, f64, f64, u32); 12] = [
    ("SP", -23.55, -46.63, 42),
    ("RJ", -22.91, -43.17, 13),
    ("MG", -19.92, -43.94, 12),
    ("RS", -30.03, -51.23, 6),
    ("PR", -25.43, -49.27, 5),
    ("SC", -27.60, -48.55, 4),
    ("BA", -12.97, -38.50, 3),
    ("DF", -15.79, -47.88, 2),
    ("GO", -16.68, -49.25, 2),
    ("ES", -20.32, -40.34, 2),
    ("PE", -8.05, -34.90, 2),
    ("CE", -3.73, -38.52, 1),
];

const CATEGORIES: [(&str, u32); 10] = [
    ("bed_bath_table", 11),
    ("health_beauty", 10),
    ("sports_leisure", 9),
    ("furniture_decor", 8),
    ("computers_accessories", 7),
    ("housewares", 6),
    ("watches_gifts", 5),
    ("telephony", 4),
    ("toys", 3),
    ("security_and_services", 1),
];

const STATUSES: [(&str, u32); 5] = [
    ("delivered", 90),
    ("shipped", 4),
    ("canceled", 2),
    ("invoiced", 2),
    ("processing", 2),
];

/// Review scores 1..=5, skewed towards 5
const SCORE_WEIGHTS: [u32; 5] = [10, 3, 8, 19, 57];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub orders: usize,
    pub customers: usize,
    pub start: NaiveDate,
    pub days: i64,
    /// Share of orders without a review score
    pub missing_review_rate: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            orders: 5_000,
            customers: 3_000,
            start: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default(),
            days: 365,
            missing_review_rate: 0.01,
        }
    }
}

pub struct SampleData {
    pub orders: Vec<CsvOrderRecord>,
    pub geolocation: Vec<CsvGeoRecord>,
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Longest purchase window accepted, about a century
pub const MAX_DAYS: i64 = 36_500;

fn shift(ts: NaiveDateTime, by: Duration) -> anyhow::Result<NaiveDateTime> {
    ts.checked_add_signed(by)
        .ok_or_else(|| anyhow::anyhow!("timestamp {} + {} is out of range", ts, by))
}

fn random_id(rng: &mut impl Rng) -> String {
    format!("{:032x}", rng.gen::<u128>())
}

pub fn generate(config: &SampleConfig, rng: &mut impl Rng) -> anyhow::Result<SampleData> {
    anyhow::ensure!(
        (1..=MAX_DAYS).contains(&config.days),
        "days must be between 1 and {}, got {}",
        MAX_DAYS,
        config.days
    );
    let state_index = WeightedIndex::new(STATES.iter().map(|s| s.3))?;
    let category_index = WeightedIndex::new(CATEGORIES.iter().map(|c| c.1))?;
    let status_index = WeightedIndex::new(STATUSES.iter().map(|s| s.1))?;
    let score_index = WeightedIndex::new(SCORE_WEIGHTS)?;

    // Customers first: identity, home state, coordinates near the capital
    let customers: Vec<(String, usize, f64, f64)> = (0..config.customers.max(1))
        .map(|_| {
            let s = state_index.sample(rng);
            let (_, lat, lng, _) = STATES[s];
            (
                random_id(rng),
                s,
                lat + rng.gen_range(-1.5..=1.5),
                lng + rng.gen_range(-1.5..=1.5),
            )
        })
        .collect();

    let mut geolocation = Vec::with_capacity(customers.len());
    for (id, s, lat, lng) in &customers {
        geolocation.push(CsvGeoRecord {
            customer_unique_id: id.clone(),
            geolocation_lat: format!("{:.6}", lat),
            geolocation_lng: format!("{:.6}", lng),
            geolocation_city: String::new(),
            geolocation_state: STATES[*s].0.to_string(),
        });
    }

    let start = config.start.and_hms_opt(0, 0, 0).unwrap_or_default();
    let mut orders = Vec::with_capacity(config.orders);
    for _ in 0..config.orders {
        let (customer, s, _, _) = &customers[rng.gen_range(0..customers.len())];
        let purchased = shift(
            start,
            Duration::days(rng.gen_range(0..config.days)) + Duration::seconds(rng.gen_range(0..86_400)),
        )?;
        let approved = shift(purchased, Duration::minutes(rng.gen_range(5..600)))?;
        let carrier = shift(approved, Duration::days(rng.gen_range(1..5)))?;
        let delivered = shift(carrier, Duration::days(rng.gen_range(2..20)))?;
        let estimated = shift(purchased, Duration::days(rng.gen_range(15..35)))?;
        let shipping_limit = shift(approved, Duration::days(6))?;

        let price: f64 = rng.gen_range(5.0..500.0);
        let freight: f64 = rng.gen_range(0.0..60.0);
        let review_score = if rng.gen_bool(config.missing_review_rate.clamp(0.0, 1.0)) {
            String::new()
        } else {
            format!("{}.0", score_index.sample(rng) + 1)
        };

        orders.push(CsvOrderRecord {
            order_id: random_id(rng),
            customer_id: random_id(rng),
            customer_unique_id: customer.clone(),
            order_status: STATUSES[status_index.sample(rng)].0.to_string(),
            order_purchase_timestamp: format_datetime(&purchased),
            order_approved_at: format_datetime(&approved),
            order_delivered_carrier_date: format_datetime(&carrier),
            order_delivered_customer_date: format_datetime(&delivered),
            order_estimated_delivery_date: format_datetime(&estimated),
            shipping_limit_date: format_datetime(&shipping_limit),
            product_id: random_id(rng),
            product_category_name_english: CATEGORIES[category_index.sample(rng)].0.to_string(),
            price: format!("{:.2}", price),
            freight_value: format!("{:.2}", freight),
            review_score,
            customer_city: String::new(),
            customer_state: STATES[*s].0.to_string(),
        });
    }

    Ok(SampleData { orders, geolocation })
}
