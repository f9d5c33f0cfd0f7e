//! Dashboard Report - the dashboard panels as terminal tables
//!
//! Run: ./target/release/dashboard_report [section] [--start YYYY-MM-DD] [--end YYYY-MM-DD]
//! Sections: all, orders, spend, products, reviews, states, status

use anyhow::Result;
use clap::Parser;
use shop_dashboard::analyzer::{DashboardViews, DataAnalyzer};
use shop_dashboard::config::{init_tracing, DataArgs};
use shop_dashboard::filter::{filter_orders, DateRange, RangeError};
use shop_dashboard::loader::load_dataset;
use shop_dashboard::page::{format_money, RANKING_SIZE};
use shop_dashboard::states::{format_state_label, get_state_name, get_state_region};

#[derive(Parser, Debug)]
#[command(name = "dashboard_report")]
#[command(about = "Print the dashboard aggregates for a date range")]
struct Args {
    /// Section to print
    #[arg(default_value = "all")]
    section: String,

    #[command(flatten)]
    data: DataArgs,

    /// First approval day to include (default: dataset start)
    #[arg(long)]
    start: Option<String>,

    /// Last approval day to include (default: dataset end)
    #[arg(long)]
    end: Option<String>,

    /// Customers listed in the spend section
    #[arg(long, default_value = "10")]
    top_customers: usize,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let client = reqwest::Client::new();
    let dataset = load_dataset(
        &client,
        &args.data.orders_source(),
        &args.data.geolocation_source(),
    )
    .await?;

    let range = match DateRange::from_selection(
        args.start.as_deref(),
        args.end.as_deref(),
        dataset.approval_span(),
    ) {
        Ok(range) => Some(range),
        Err(RangeError::EmptyDataset) => None,
        Err(e) => return Err(e.into()),
    };
    let filtered = match range {
        Some(range) => filter_orders(&dataset.orders, &range),
        None => Vec::new(),
    };
    let analyzer = DataAnalyzer::from_filtered(filtered);
    let views = analyzer.views(range);

    println!("\n{}", "█".repeat(80));
    println!("{}  DICODING SHOP - ORDER ANALYTICS  {}", "█".repeat(22), "█".repeat(23));
    println!("{}", "█".repeat(80));
    match range {
        Some(r) => println!("  Range: {} .. {}  ({} orders)", r.start, r.end, views.row_count),
        None => println!("  Range: (no approved orders)"),
    }

    match args.section.as_str() {
        "all" => {
            print_orders(&views);
            print_spend(&views, &analyzer, args.top_customers);
            print_products(&views);
            print_reviews(&views);
            print_states(&views);
            print_status(&views);
        }
        "orders" => print_orders(&views),
        "spend" => print_spend(&views, &analyzer, args.top_customers),
        "products" => print_products(&views),
        "reviews" => print_reviews(&views),
        "states" => print_states(&views),
        "status" => print_status(&views),
        other => {
            println!("Unknown section: {}", other);
            println!("Available: all, orders, spend, products, reviews, states, status");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn print_orders(views: &DashboardViews) {
    print_section_header("1. DAILY ORDERS");

    println!("  Total Orders:         {:>12}", views.order_totals.total_orders);
    println!("  Total Revenue:        {:>12}", format_money(views.order_totals.total_revenue));

    print_subsection("Busiest Days");
    let mut busiest: Vec<_> = views.daily_orders.iter().filter(|d| d.order_count > 0).collect();
    busiest.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    println!("  {:12} {:>10} {:>14}", "Date", "Orders", "Revenue");
    println!("  {}", "─".repeat(38));
    for day in busiest.iter().take(10) {
        println!("  {:12} {:>10} {:>14.2}", day.date.to_string(), day.order_count, day.revenue);
    }
}

fn print_spend(views: &DashboardViews, analyzer: &DataAnalyzer<'_>, top: usize) {
    print_section_header("2. CUSTOMER SPEND");

    println!("  Total Spending:       {:>12}", format_money(views.spend_summary.total_spend));
    println!("  Average Spending:     {:>12}", format_money(views.spend_summary.average_spend));

    print_subsection(&format!("Top {} Customers", top));
    println!("  {:34} {:>8} {:>12} {:>12}", "Customer", "Items", "Total", "Avg");
    println!("  {}", "─".repeat(70));
    for customer in analyzer.spend_by_customer().iter().take(top) {
        println!(
            "  {:34} {:>8} {:>12.2} {:>12.2}",
            customer.customer, customer.order_count, customer.total_spend, customer.average_spend
        );
    }
}

fn print_products(views: &DashboardViews) {
    print_section_header("3. PRODUCT ORDERS");

    let sales = &views.item_sales;
    println!("  Total Products Sold:  {:>12}", sales.total_sold());
    println!("  Average Per Category: {:>12.2}", sales.mean_sold());

    print_subsection("Top Sold Products");
    for c in sales.top(RANKING_SIZE) {
        println!("  {:40} {:>8}", c.category, c.product_count);
    }

    print_subsection("Least Sold Products");
    for c in sales.bottom(RANKING_SIZE) {
        println!("  {:40} {:>8}", c.category, c.product_count);
    }
}

fn print_reviews(views: &DashboardViews) {
    print_section_header("4. REVIEW SCORES");

    let reviews = &views.review_scores;
    println!("  Average Review Score: {:>12.2}", reviews.mean);
    match reviews.most_common {
        Some(score) => println!("  Most Common Score:    {:>12}", score),
        None => println!("  Most Common Score:    {:>12}", "-"),
    }

    print_subsection("Distribution");
    for s in &reviews.distribution {
        let pct = s.count as f64 / reviews.reviewed as f64 * 100.0;
        println!("  {:>5} {:>10} {:>9.1}%  {}", s.score, s.count, pct, "▇".repeat((pct / 2.0) as usize));
    }
}

fn print_states(views: &DashboardViews) {
    print_section_header("5. CUSTOMER DEMOGRAPHICS");

    let by_state = &views.customers_by_state;
    if let Some(code) = &by_state.most_common {
        println!("  Most Common State:    {}", format_state_label(code));
    }

    print_subsection("Orders by State");
    println!("  {:4} {:22} {:14} {:>8} {:>10}", "UF", "State", "Region", "Orders", "Customers");
    println!("  {}", "─".repeat(62));
    for s in &by_state.states {
        println!(
            "  {:4} {:22} {:14} {:>8} {:>10}",
            s.state,
            get_state_name(&s.state),
            get_state_region(&s.state).unwrap_or("-"),
            s.order_count,
            s.customer_count
        );
    }
}

fn print_status(views: &DashboardViews) {
    print_section_header("6. ORDER STATUS");

    let status = &views.order_status;
    println!("  Most Common Status:   {:>12}", status.most_common.as_deref().unwrap_or("-"));
    print_subsection("Distribution");
    for s in &status.distribution {
        println!("  {:20} {:>10}", s.status, s.count);
    }
}
