//! Aggregations behind each dashboard panel.
//!
//! `DataAnalyzer` borrows a filtered slice of orders and computes each view
//! on demand. All grouping goes through `BTreeMap`, so results are ordered
//! by key before any count-based sort and repeated runs are identical.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::DateRange;
use crate::models::Order;

// ============================================================================
// Derived Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub order_count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderTotals {
    pub total_orders: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpend {
    pub date: NaiveDate,
    pub order_count: usize,
    pub total_spend: f64,
    pub average_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSpend {
    pub customer: String,
    pub order_count: usize,
    pub total_spend: f64,
    pub average_spend: f64,
}

/// The two spend callouts: overall total and the mean of the daily totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendSummary {
    pub total_spend: f64,
    pub average_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub product_count: usize,
}

/// Per-category line-item counts, most sold first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSales {
    pub categories: Vec<CategorySales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewScores {
    /// Ordered by count descending, then score ascending
    pub distribution: Vec<ScoreCount>,
    pub most_common: Option<u8>,
    pub mean: f64,
    pub reviewed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCount {
    pub state: String,
    pub order_count: usize,
    pub customer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomersByState {
    pub states: Vec<StateCount>,
    pub most_common: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusBreakdown {
    pub distribution: Vec<StatusCount>,
    pub most_common: Option<String>,
}

/// Every panel's data for one selected range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub range: Option<DateRange>,
    pub row_count: usize,
    pub daily_orders: Vec<DailyOrders>,
    pub order_totals: OrderTotals,
    pub daily_spend: Vec<DailySpend>,
    pub spend_summary: SpendSummary,
    pub item_sales: ItemSales,
    pub review_scores: ReviewScores,
    pub customers_by_state: CustomersByState,
    pub order_status: OrderStatusBreakdown,
}

impl ItemSales {
    /// Best sellers, ties in category-name order
    pub fn top(&self, n: usize) -> Vec<CategorySales> {
        self.categories.iter().take(n).cloned().collect()
    }

    /// Least sold categories, fewest first
    pub fn bottom(&self, n: usize) -> Vec<CategorySales> {
        let mut ascending = self.ascending();
        ascending.truncate(n);
        ascending
    }

    pub fn ascending(&self) -> Vec<CategorySales> {
        let mut by_name: Vec<CategorySales> = self.categories.clone();
        by_name.sort_by(|a, b| a.category.cmp(&b.category));
        by_name.sort_by(|a, b| a.product_count.cmp(&b.product_count));
        by_name
    }

    pub fn total_sold(&self) -> usize {
        self.categories.iter().map(|c| c.product_count).sum()
    }

    pub fn mean_sold(&self) -> f64 {
        mean(self.total_sold() as f64, self.categories.len())
    }
}

// ============================================================================
// Analyzer
// ============================================================================

pub struct DataAnalyzer<'a> {
    orders: Vec<&'a Order>,
}

impl<'a> DataAnalyzer<'a> {
    pub fn new(orders: &'a [Order]) -> Self {
        Self {
            orders: orders.iter().collect(),
        }
    }

    /// Wrap an already filtered view (see `filter::filter_orders`)
    pub fn from_filtered(orders: Vec<&'a Order>) -> Self {
        Self { orders }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Order count and revenue per approval day, with empty days zero-filled
    pub fn daily_orders(&self) -> Vec<DailyOrders> {
        let mut by_day: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
        for order in &self.orders {
            if let Some(date) = order.approved_date() {
                let entry = by_day.entry(date).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += order.spend();
            }
        }

        fill_days(&by_day)
            .into_iter()
            .map(|(date, (order_count, revenue))| DailyOrders {
                date,
                order_count,
                revenue,
            })
            .collect()
    }

    pub fn order_totals(&self) -> OrderTotals {
        let daily = self.daily_orders();
        OrderTotals {
            total_orders: daily.iter().map(|d| d.order_count).sum(),
            total_revenue: daily.iter().map(|d| d.revenue).sum(),
        }
    }

    /// Total and mean spend per approval day
    pub fn spend_by_date(&self) -> Vec<DailySpend> {
        self.daily_orders()
            .into_iter()
            .map(|d| DailySpend {
                date: d.date,
                order_count: d.order_count,
                total_spend: d.revenue,
                average_spend: mean(d.revenue, d.order_count),
            })
            .collect()
    }

    /// Total and mean spend per customer, biggest spenders first
    pub fn spend_by_customer(&self) -> Vec<CustomerSpend> {
        let mut by_customer: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for order in &self.orders {
            if let Some(customer) = order.customer_key() {
                let entry = by_customer.entry(customer).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += order.spend();
            }
        }

        let mut spend: Vec<CustomerSpend> = by_customer
            .into_iter()
            .map(|(customer, (order_count, total_spend))| CustomerSpend {
                customer: customer.to_string(),
                order_count,
                total_spend,
                average_spend: mean(total_spend, order_count),
            })
            .collect();
        spend.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
        spend
    }

    pub fn spend_summary(&self) -> SpendSummary {
        let daily = self.spend_by_date();
        let total_spend: f64 = daily.iter().map(|d| d.total_spend).sum();
        SpendSummary {
            total_spend,
            average_spend: mean(total_spend, daily.len()),
        }
    }

    /// Line items sold per product category
    pub fn item_sales(&self) -> ItemSales {
        let counts = count_by(self.orders.iter().map(|o| o.product_category.as_deref()));
        let mut categories: Vec<CategorySales> = counts
            .into_iter()
            .map(|(category, product_count)| CategorySales {
                category: category.to_string(),
                product_count,
            })
            .collect();
        categories.sort_by(|a, b| b.product_count.cmp(&a.product_count));
        ItemSales { categories }
    }

    pub fn review_scores(&self) -> ReviewScores {
        let counts = count_by(self.orders.iter().map(|o| o.review_score));
        let most_common = mode(&counts);
        let reviewed: usize = counts.values().sum();
        let score_sum: f64 = counts
            .iter()
            .map(|(score, count)| *score as f64 * *count as f64)
            .sum();

        let mut distribution: Vec<ScoreCount> = counts
            .into_iter()
            .map(|(score, count)| ScoreCount { score, count })
            .collect();
        distribution.sort_by(|a, b| b.count.cmp(&a.count));

        ReviewScores {
            distribution,
            most_common,
            mean: mean(score_sum, reviewed),
            reviewed,
        }
    }

    /// Orders and distinct customers per customer state
    pub fn customers_by_state(&self) -> CustomersByState {
        let mut by_state: BTreeMap<&str, (usize, BTreeSet<&str>)> = BTreeMap::new();
        for order in &self.orders {
            if let Some(state) = order.customer_state.as_deref() {
                let entry = by_state.entry(state).or_default();
                entry.0 += 1;
                if let Some(customer) = order.customer_key() {
                    entry.1.insert(customer);
                }
            }
        }

        let order_counts: BTreeMap<&str, usize> =
            by_state.iter().map(|(state, (count, _))| (*state, *count)).collect();
        let most_common = mode(&order_counts).map(str::to_string);

        let mut states: Vec<StateCount> = by_state
            .into_iter()
            .map(|(state, (order_count, customers))| StateCount {
                state: state.to_string(),
                order_count,
                customer_count: customers.len(),
            })
            .collect();
        states.sort_by(|a, b| b.order_count.cmp(&a.order_count));

        CustomersByState { states, most_common }
    }

    pub fn order_status(&self) -> OrderStatusBreakdown {
        let counts = count_by(self.orders.iter().map(|o| o.order_status.as_deref()));
        let most_common = mode(&counts).map(str::to_string);

        let mut distribution: Vec<StatusCount> = counts
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.to_string(),
                count,
            })
            .collect();
        distribution.sort_by(|a, b| b.count.cmp(&a.count));

        OrderStatusBreakdown {
            distribution,
            most_common,
        }
    }

    pub fn views(&self, range: Option<DateRange>) -> DashboardViews {
        DashboardViews {
            range,
            row_count: self.len(),
            daily_orders: self.daily_orders(),
            order_totals: self.order_totals(),
            daily_spend: self.spend_by_date(),
            spend_summary: self.spend_summary(),
            item_sales: self.item_sales(),
            review_scores: self.review_scores(),
            customers_by_state: self.customers_by_state(),
            order_status: self.order_status(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn count_by<K: Ord>(values: impl Iterator<Item = Option<K>>) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for value in values.flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Most frequent key; among equal counts the lowest key wins
pub fn mode<K: Ord + Clone>(counts: &BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(&K, usize)> = None;
    for (key, &count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key.clone())
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Expand sparse per-day values into a contiguous day sequence
fn fill_days<V: Clone + Default>(by_day: &BTreeMap<NaiveDate, V>) -> Vec<(NaiveDate, V)> {
    let (Some(first), Some(last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|day| day <= last)
        .map(|day| (day, by_day.get(&day).cloned().unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn order(approved: &str, price: f64, freight: f64) -> Order {
        Order {
            approved_at: Some(
                NaiveDateTime::parse_from_str(&format!("{} 09:00:00", approved), "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
            ),
            price,
            freight_value: freight,
            ..Default::default()
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn with_score(score: u8) -> Order {
        Order {
            review_score: Some(score),
            ..order("2024-01-01", 1.0, 0.0)
        }
    }

    #[test]
    fn test_daily_orders_scenario() {
        let orders = vec![
            order("2024-01-01", 10.0, 2.0),
            order("2024-01-01", 5.0, 1.0),
            order("2024-01-02", 20.0, 0.0),
        ];
        let daily = DataAnalyzer::new(&orders).daily_orders();
        assert_eq!(
            daily,
            vec![
                DailyOrders { date: day("2024-01-01"), order_count: 2, revenue: 18.0 },
                DailyOrders { date: day("2024-01-02"), order_count: 1, revenue: 20.0 },
            ]
        );
    }

    #[test]
    fn test_daily_orders_fills_gaps() {
        let orders = vec![order("2024-01-01", 1.0, 0.0), order("2024-01-04", 2.0, 0.0)];
        let daily = DataAnalyzer::new(&orders).daily_orders();
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[1].order_count, 0);
        assert_eq!(daily[2].revenue, 0.0);
        assert_eq!(daily[3].date, day("2024-01-04"));
    }

    #[test]
    fn test_unapproved_orders_are_skipped_in_daily_view() {
        let orders = vec![order("2024-01-01", 3.0, 0.0), Order { price: 100.0, ..Default::default() }];
        let totals = DataAnalyzer::new(&orders).order_totals();
        assert_eq!(totals.total_orders, 1);
        assert_eq!(totals.total_revenue, 3.0);
    }

    #[test]
    fn test_review_scores_scenario() {
        let orders: Vec<Order> = [5, 5, 4, 3, 5].into_iter().map(with_score).collect();
        let reviews = DataAnalyzer::new(&orders).review_scores();
        assert_eq!(
            reviews.distribution,
            vec![
                ScoreCount { score: 5, count: 3 },
                ScoreCount { score: 3, count: 1 },
                ScoreCount { score: 4, count: 1 },
            ]
        );
        assert_eq!(reviews.most_common, Some(5));
        assert_eq!(reviews.reviewed, 5);
        assert!((reviews.mean - 4.4).abs() < 1e-9);
    }

    #[test]
    fn test_mode_ties_pick_lowest() {
        let orders: Vec<Order> = [4, 2, 4, 2, 5].into_iter().map(with_score).collect();
        assert_eq!(DataAnalyzer::new(&orders).review_scores().most_common, Some(2));

        let mut counts = BTreeMap::new();
        counts.insert("SP", 3);
        counts.insert("MG", 3);
        counts.insert("RJ", 1);
        assert_eq!(mode(&counts), Some("MG"));
    }

    #[test]
    fn test_item_sales_rankings() {
        let mut orders = Vec::new();
        for (category, n) in [("toys", 2), ("bed_bath_table", 3), ("auto", 2), ("garden", 1)] {
            for _ in 0..n {
                orders.push(Order {
                    product_category: Some(category.to_string()),
                    ..Default::default()
                });
            }
        }
        orders.push(Order::default());

        let sales = DataAnalyzer::new(&orders).item_sales();
        let names = |v: Vec<CategorySales>| v.into_iter().map(|c| c.category).collect::<Vec<_>>();
        assert_eq!(names(sales.top(3)), vec!["bed_bath_table", "auto", "toys"]);
        assert_eq!(names(sales.bottom(2)), vec!["garden", "auto"]);
        assert_eq!(sales.total_sold(), 8);
        assert_eq!(sales.mean_sold(), 2.0);
    }

    #[test]
    fn test_customers_by_state() {
        let make = |state: &str, customer: &str| Order {
            customer_state: Some(state.to_string()),
            customer_unique_id: Some(customer.to_string()),
            ..Default::default()
        };
        let orders = vec![
            make("SP", "a"),
            make("SP", "a"),
            make("SP", "b"),
            make("RJ", "c"),
            make("MG", "d"),
            make("MG", "e"),
        ];
        let by_state = DataAnalyzer::new(&orders).customers_by_state();
        assert_eq!(by_state.most_common.as_deref(), Some("SP"));
        assert_eq!(by_state.states[0].order_count, 3);
        assert_eq!(by_state.states[0].customer_count, 2);
        assert_eq!(by_state.states[1].state, "MG");
    }

    #[test]
    fn test_order_status() {
        let make = |status: &str| Order {
            order_status: Some(status.to_string()),
            ..Default::default()
        };
        let orders = vec![make("delivered"), make("shipped"), make("delivered"), make("canceled")];
        let status = DataAnalyzer::new(&orders).order_status();
        assert_eq!(status.most_common.as_deref(), Some("delivered"));
        assert_eq!(status.distribution[0].count, 2);
        assert_eq!(status.distribution[1].status, "canceled");
    }

    #[test]
    fn test_spend_views() {
        let mut a = order("2024-03-01", 10.0, 0.0);
        a.customer_unique_id = Some("alice".into());
        let mut b = order("2024-03-01", 50.0, 0.0);
        b.customer_unique_id = Some("bob".into());
        let mut c = order("2024-03-03", 20.0, 0.0);
        c.customer_unique_id = Some("alice".into());
        let orders = vec![a, b, c];
        let analyzer = DataAnalyzer::new(&orders);

        let daily = analyzer.spend_by_date();
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].average_spend, 30.0);
        assert_eq!(daily[1].average_spend, 0.0);

        let summary = analyzer.spend_summary();
        assert_eq!(summary.total_spend, 80.0);
        assert!((summary.average_spend - 80.0 / 3.0).abs() < 1e-9);

        let customers = analyzer.spend_by_customer();
        assert_eq!(customers[0].customer, "bob");
        assert_eq!(customers[1].customer, "alice");
        assert_eq!(customers[1].average_spend, 15.0);
    }

    #[test]
    fn test_empty_input_is_zero_valued() {
        let orders: Vec<Order> = Vec::new();
        let views = DataAnalyzer::new(&orders).views(None);
        assert!(views.daily_orders.is_empty());
        assert_eq!(views.order_totals, OrderTotals { total_orders: 0, total_revenue: 0.0 });
        assert_eq!(views.spend_summary, SpendSummary { total_spend: 0.0, average_spend: 0.0 });
        assert_eq!(views.item_sales.mean_sold(), 0.0);
        assert_eq!(views.review_scores.most_common, None);
        assert_eq!(views.review_scores.mean, 0.0);
        assert_eq!(views.customers_by_state.most_common, None);
        assert_eq!(views.order_status.most_common, None);
    }

    fn sample_orders(seed: u64) -> Vec<Order> {
        use crate::sample::{generate, SampleConfig};
        use rand::{rngs::StdRng, SeedableRng};

        let config = SampleConfig {
            orders: 800,
            customers: 120,
            days: 60,
            missing_review_rate: 0.1,
            ..Default::default()
        };
        let data = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut orders: Vec<Order> = data.orders.iter().map(|r| r.to_order().unwrap()).collect();
        // A few unapproved rows that must stay out of the daily views
        orders.extend((0..5).map(|_| Order { price: 99.0, ..Default::default() }));
        orders
    }

    #[test]
    fn test_daily_counts_cover_every_approved_row() {
        for seed in [1, 2, 3] {
            let orders = sample_orders(seed);
            let analyzer = DataAnalyzer::new(&orders);
            let approved: Vec<&Order> = orders.iter().filter(|o| o.approved_at.is_some()).collect();

            let totals = analyzer.order_totals();
            assert_eq!(totals.total_orders, approved.len());
            let expected: f64 = approved.iter().map(|o| o.spend()).sum();
            assert!((totals.total_revenue - expected).abs() < 1e-6 * expected.max(1.0));

            let daily = analyzer.daily_orders();
            assert!(daily.windows(2).all(|w| w[0].date.succ_opt() == Some(w[1].date)));
        }
    }

    #[test]
    fn test_modes_have_maximal_frequency() {
        let orders = sample_orders(11);
        let analyzer = DataAnalyzer::new(&orders);

        let reviews = analyzer.review_scores();
        let top = reviews.distribution.iter().map(|s| s.count).max().unwrap();
        let mode_count = reviews
            .distribution
            .iter()
            .find(|s| Some(s.score) == reviews.most_common)
            .map(|s| s.count);
        assert_eq!(mode_count, Some(top));
        assert_eq!(reviews.reviewed, orders.iter().filter(|o| o.review_score.is_some()).count());

        let status = analyzer.order_status();
        assert_eq!(status.most_common.as_deref(), Some(status.distribution[0].status.as_str()));

        let states = analyzer.customers_by_state();
        assert_eq!(states.most_common.as_deref(), Some(states.states[0].state.as_str()));
        assert!(states.states.iter().all(|s| s.customer_count <= s.order_count));
    }

    #[test]
    fn test_views_are_deterministic() {
        let orders = sample_orders(5);
        let range = DateRange::new(day("2017-01-10"), day("2017-02-10")).unwrap();
        let first = DataAnalyzer::from_filtered(crate::filter::filter_orders(&orders, &range)).views(Some(range));
        let second = DataAnalyzer::from_filtered(crate::filter::filter_orders(&orders, &range)).views(Some(range));
        assert_eq!(first, second);
        assert!(first.daily_orders.iter().all(|d| range.contains(d.date)));
    }

    #[test]
    fn test_range_without_orders_is_empty() {
        let orders = sample_orders(9);
        let range = DateRange::new(day("2030-01-01"), day("2030-12-31")).unwrap();
        let views = DataAnalyzer::from_filtered(crate::filter::filter_orders(&orders, &range)).views(Some(range));
        assert_eq!(views.row_count, 0);
        assert!(views.daily_orders.is_empty());
        assert!(views.item_sales.categories.is_empty());
        assert_eq!(views.order_totals.total_revenue, 0.0);
    }
}
