//! HTTP handlers for the dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::DashboardService;
use crate::analyzer::{
    CategorySales, CustomerSpend, CustomersByState, DailyOrders, DailySpend, DashboardViews,
    OrderStatusBreakdown, OrderTotals, ReviewScores, SpendSummary,
};
use crate::filter::{DateRange, RangeError};
use crate::geo::DensityGrid;
use crate::page::RANKING_SIZE;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct RangeResponse {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub total_orders: usize,
    pub located_customers: usize,
}

#[derive(Serialize)]
pub struct DailyOrdersResponse {
    pub range: Option<DateRange>,
    pub totals: OrderTotals,
    pub days: Vec<DailyOrders>,
}

#[derive(Serialize)]
pub struct SpendResponse {
    pub range: Option<DateRange>,
    pub summary: SpendSummary,
    pub by_date: Vec<DailySpend>,
    pub top_customers: Vec<CustomerSpend>,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub range: Option<DateRange>,
    pub total_sold: usize,
    pub mean_sold: f64,
    pub top: Vec<CategorySales>,
    pub bottom: Vec<CategorySales>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_range(e: RangeError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() }))
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitedRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

fn views(service: &DashboardService, start: Option<&String>, end: Option<&String>) -> Result<DashboardViews, ApiError> {
    service
        .views_for(start.map(String::as_str), end.map(String::as_str))
        .map_err(bad_range)
}

/// GET /
pub async fn dashboard(State(service): State<AppState>, Query(params): Query<RangeQuery>) -> Html<String> {
    Html(service.render_dashboard(params.start.as_deref(), params.end.as_deref()))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/range
pub async fn get_range(State(service): State<AppState>) -> Json<RangeResponse> {
    let span = service.span();
    Json(RangeResponse {
        min_date: span.map(|r| r.start),
        max_date: span.map(|r| r.end),
        total_orders: service.dataset().orders.len(),
        located_customers: service.dataset().locations.len(),
    })
}

/// GET /api/v1/views
pub async fn get_views(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<DashboardViews>, ApiError> {
    views(&service, params.start.as_ref(), params.end.as_ref()).map(Json)
}

/// GET /api/v1/daily-orders
pub async fn get_daily_orders(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<DailyOrdersResponse>, ApiError> {
    let v = views(&service, params.start.as_ref(), params.end.as_ref())?;
    Ok(Json(DailyOrdersResponse {
        range: v.range,
        totals: v.order_totals,
        days: v.daily_orders,
    }))
}

/// GET /api/v1/spend
pub async fn get_spend(
    State(service): State<AppState>,
    Query(params): Query<LimitedRangeQuery>,
) -> Result<Json<SpendResponse>, ApiError> {
    let limit = params.limit.unwrap_or(10);
    let (range, analyzer) = service
        .select(params.start.as_deref(), params.end.as_deref())
        .map_err(bad_range)?;
    Ok(Json(SpendResponse {
        range,
        summary: analyzer.spend_summary(),
        by_date: analyzer.spend_by_date(),
        top_customers: analyzer.spend_by_customer().into_iter().take(limit).collect(),
    }))
}

/// GET /api/v1/products
pub async fn get_products(
    State(service): State<AppState>,
    Query(params): Query<LimitedRangeQuery>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(RANKING_SIZE);
    let v = views(&service, params.start.as_ref(), params.end.as_ref())?;
    Ok(Json(ProductsResponse {
        range: v.range,
        total_sold: v.item_sales.total_sold(),
        mean_sold: v.item_sales.mean_sold(),
        top: v.item_sales.top(limit),
        bottom: v.item_sales.bottom(limit),
    }))
}

/// GET /api/v1/reviews
pub async fn get_reviews(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<ReviewScores>, ApiError> {
    let v = views(&service, params.start.as_ref(), params.end.as_ref())?;
    Ok(Json(v.review_scores))
}

/// GET /api/v1/states
pub async fn get_states(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<CustomersByState>, ApiError> {
    let v = views(&service, params.start.as_ref(), params.end.as_ref())?;
    Ok(Json(v.customers_by_state))
}

/// GET /api/v1/status
pub async fn get_order_status(
    State(service): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<OrderStatusBreakdown>, ApiError> {
    let v = views(&service, params.start.as_ref(), params.end.as_ref())?;
    Ok(Json(v.order_status))
}

/// GET /api/v1/geo
pub async fn get_geo(State(service): State<AppState>) -> Json<DensityGrid> {
    Json(service.density_grid())
}

/// GET /map.svg
pub async fn get_map(State(service): State<AppState>) -> Response {
    let body = service.render_map();
    let content_type = if body.starts_with("<svg") {
        "image/svg+xml"
    } else {
        "text/html; charset=utf-8"
    };
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /assets/basemap
pub async fn get_base_map(State(service): State<AppState>) -> Response {
    match service.base_map_image() {
        Some(image) => (
            [(header::CONTENT_TYPE, image.content_type)],
            image.bytes.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "base map unavailable".to_string(),
            }),
        )
            .into_response(),
    }
}
