//! HTML dashboard assembly.
//!
//! Renders one self-contained page: a sidebar with the date-range form and
//! one section per panel, each with its callouts and an inline SVG chart.

use crate::analyzer::DashboardViews;
use crate::charts::{
    bar_chart, escape_xml, horizontal_bar_chart, line_chart, Point, SECONDARY_COLOR,
    TERTIARY_COLOR,
};
use crate::filter::DateRange;
use crate::states::format_state_label;

pub const TITLE: &str = "DICODING-Shop Data Analysis";
const CAPTION: &str = "© 2024 DICODING Shop - Melinda NS";
const MAP_EXPLANATION: &str = "According to the graph, there are more customers in the southeast and south regions, particularly in capital cities like São Paulo, Rio de Janeiro, and Porto Alegre.";

/// Categories shown in each product ranking chart
pub const RANKING_SIZE: usize = 5;

/// Everything the page needs besides the computed views
pub struct PageContext<'a> {
    /// Full approval span of the dataset, bounds for the date inputs
    pub span: Option<DateRange>,
    /// Rendered geo panel: SVG, or the degraded message
    pub map_panel: &'a str,
    /// Shown above the panels, e.g. when the requested range was rejected
    pub notice: Option<&'a str>,
    pub logo_url: Option<&'a str>,
}

/// Money without decimals, as shown in the callouts
pub fn format_money(value: f64) -> String {
    format!("{:.0}", value)
}

fn callout(label: &str, value: &str) -> String {
    format!(
        r#"<div class="callout"><h4>{}: {}</h4></div>"#,
        escape_xml(label),
        escape_xml(value)
    )
}

fn section(title: &str, callouts: &[String], body: &str) -> String {
    format!(
        r#"<section>
<h2>{}</h2>
<div class="callouts">{}</div>
<div class="charts">{}</div>
</section>"#,
        escape_xml(title),
        callouts.join(""),
        body
    )
}

fn sidebar(ctx: &PageContext<'_>, selected: Option<DateRange>) -> String {
    let fmt = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    let logo = ctx
        .logo_url
        .map(|url| format!(r#"<img class="logo" src="{}" width="200" alt="logo"/>"#, escape_xml(url)))
        .unwrap_or_default();

    format!(
        r#"<aside class="sidebar">
{logo}
<form method="get" action="/">
<label>Select Date Range</label>
<input type="date" name="start" value="{start}" min="{min}" max="{max}"/>
<input type="date" name="end" value="{end}" min="{min}" max="{max}"/>
<button type="submit">Apply</button>
</form>
<p class="brand">DICODING Shop - 2024</p>
</aside>"#,
        logo = logo,
        start = fmt(selected.map(|r| r.start)),
        end = fmt(selected.map(|r| r.end)),
        min = fmt(ctx.span.map(|r| r.start)),
        max = fmt(ctx.span.map(|r| r.end)),
    )
}

fn orders_section(views: &DashboardViews) -> String {
    let points: Vec<Point> = views
        .daily_orders
        .iter()
        .map(|d| Point::new(d.date.format("%Y-%m-%d").to_string(), d.order_count as f64))
        .collect();
    section(
        "Daily Orders Delivered",
        &[
            callout("Total Orders", &views.order_totals.total_orders.to_string()),
            callout("Total Revenue", &format_money(views.order_totals.total_revenue)),
        ],
        &line_chart("Daily Orders Delivered", "Date", "Order Count", &points),
    )
}

fn spend_section(views: &DashboardViews) -> String {
    let points: Vec<Point> = views
        .daily_spend
        .iter()
        .map(|d| Point::new(d.date.format("%Y-%m-%d").to_string(), d.total_spend))
        .collect();
    section(
        "Customer Spend Overview",
        &[
            callout("Total Spending", &format_money(views.spend_summary.total_spend)),
            callout("Average Spending", &format_money(views.spend_summary.average_spend)),
        ],
        &line_chart("Customer Spending Over Time", "Date", "Total Spend", &points),
    )
}

fn products_section(views: &DashboardViews) -> String {
    let sales = &views.item_sales;
    let to_points = |items: Vec<crate::analyzer::CategorySales>| -> Vec<Point> {
        items
            .into_iter()
            .map(|c| Point::new(c.category, c.product_count as f64))
            .collect()
    };
    let charts = format!(
        "{}{}",
        horizontal_bar_chart("Top Sold Products", "Sales Count", &to_points(sales.top(RANKING_SIZE))),
        horizontal_bar_chart("Least Sold Products", "Sales Count", &to_points(sales.bottom(RANKING_SIZE))),
    );
    section(
        "Product Orders",
        &[
            callout("Total Products Sold", &sales.total_sold().to_string()),
            callout("Average Products Sold", &format!("{:.2}", sales.mean_sold())),
        ],
        &charts,
    )
}

fn reviews_section(views: &DashboardViews) -> String {
    let reviews = &views.review_scores;
    let bars: Vec<Point> = reviews
        .distribution
        .iter()
        .map(|s| Point::new(s.score.to_string(), s.count as f64))
        .collect();
    let most_common = reviews
        .most_common
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    section(
        "Review Score Analysis",
        &[
            callout("Average Review Score", &format!("{:.2}", reviews.mean)),
            callout("Most Common Review Score", &most_common),
        ],
        &bar_chart("Customer Review Scores", "Rating", "Count", &bars),
    )
}

fn demographics_section(views: &DashboardViews, map_panel: &str) -> String {
    let by_state = &views.customers_by_state;
    let bars: Vec<Point> = by_state
        .states
        .iter()
        .map(|s| Point::new(s.state.clone(), s.order_count as f64))
        .collect();
    let most_common = by_state
        .most_common
        .as_deref()
        .map(format_state_label)
        .unwrap_or_else(|| "-".to_string());

    let body = format!(
        r#"<div class="tab" id="state">
<h3>State</h3>
{chart}
</div>
<div class="tab" id="geolocation">
<h3>Geolocation</h3>
{map}
<details><summary>See Explanation</summary><p>{explanation}</p></details>
</div>"#,
        chart = bar_chart("Customer Distribution by State", "State", "Number of Customers", &bars),
        map = map_panel,
        explanation = escape_xml(MAP_EXPLANATION),
    );
    section(
        "Customer Demographics",
        &[callout("Most Common State", &most_common)],
        &body,
    )
}

fn status_section(views: &DashboardViews) -> String {
    let status = &views.order_status;
    let bars: Vec<Point> = status
        .distribution
        .iter()
        .map(|s| Point::new(s.status.clone(), s.count as f64))
        .collect();
    section(
        "Order Status",
        &[callout(
            "Most Common Status",
            status.most_common.as_deref().unwrap_or("-"),
        )],
        &bar_chart("Orders by Status", "Status", "Orders", &bars),
    )
}

pub fn render_page(views: &DashboardViews, ctx: &PageContext<'_>) -> String {
    let notice = ctx
        .notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, escape_xml(n)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8"/>
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 0; display: flex; color: {fg}; }}
.sidebar {{ background-color: #f4f4f4; padding: 20px; min-width: 240px; }}
.sidebar input, .sidebar button {{ display: block; margin: 8px 0; }}
.brand {{ text-align: center; color: #30475E; margin-top: 60px; }}
main {{ padding: 20px 40px; flex: 1; }}
h2 {{ text-align: center; color: {accent}; }}
.callouts {{ display: flex; justify-content: space-around; }}
.callout h4 {{ text-align: center; }}
.charts {{ display: flex; flex-wrap: wrap; justify-content: center; gap: 16px; }}
.notice {{ background: #fff3e0; padding: 8px 12px; border-left: 4px solid #F47C20; }}
.map-unavailable {{ padding: 24px; border: 1px dashed {accent}; }}
footer {{ font-size: 12px; color: #888; margin-top: 40px; }}
</style>
</head>
<body>
{sidebar}
<main>
<h1>{title}</h1>
{notice}
{orders}
{spend}
{products}
{reviews}
{demographics}
{status}
<footer>{caption}</footer>
</main>
</body>
</html>"#,
        title = escape_xml(TITLE),
        fg = SECONDARY_COLOR,
        accent = TERTIARY_COLOR,
        sidebar = sidebar(ctx, views.range),
        notice = notice,
        orders = orders_section(views),
        spend = spend_section(views),
        products = products_section(views),
        reviews = reviews_section(views),
        demographics = demographics_section(views, ctx.map_panel),
        status = status_section(views),
        caption = escape_xml(CAPTION),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::DataAnalyzer;
    use crate::models::Order;

    fn ctx<'a>(map_panel: &'a str, notice: Option<&'a str>) -> PageContext<'a> {
        PageContext {
            span: None,
            map_panel,
            notice,
            logo_url: None,
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.56), "1235");
        assert_eq!(format_money(0.0), "0");
    }

    #[test]
    fn test_empty_views_render_all_sections() {
        let orders: Vec<Order> = Vec::new();
        let views = DataAnalyzer::new(&orders).views(None);
        let html = render_page(&views, &ctx("<svg></svg>", Some("Range <rejected>")));

        for heading in [
            "Daily Orders Delivered",
            "Customer Spend Overview",
            "Product Orders",
            "Review Score Analysis",
            "Customer Demographics",
            "Order Status",
        ] {
            assert!(html.contains(&format!("<h2>{}</h2>", heading)), "missing {}", heading);
        }
        assert!(html.contains("Total Orders: 0"));
        assert!(html.contains("Total Revenue: 0"));
        assert!(html.contains("Most Common Review Score: -"));
        assert!(html.contains("Range &lt;rejected&gt;"));
        assert!(html.contains("No data for the selected range"));
    }

    #[test]
    fn test_state_callout_uses_full_name() {
        let orders = vec![Order {
            customer_state: Some("SP".into()),
            ..Default::default()
        }];
        let views = DataAnalyzer::new(&orders).views(None);
        let html = render_page(&views, &ctx("", None));
        assert!(html.contains("Most Common State: SP (São Paulo)"));
    }
}
