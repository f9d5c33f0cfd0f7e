//! HTTP surface for the dashboard
//!
//! Serves the HTML page plus a JSON API over the same views.

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::{DashboardService, BASEMAP_ROUTE};

pub fn router(service: Arc<DashboardService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::dashboard))
        .route("/map.svg", get(handlers::get_map))
        .route(BASEMAP_ROUTE, get(handlers::get_base_map))
        // Health and metadata
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/range", get(handlers::get_range))
        // Views
        .route("/api/v1/views", get(handlers::get_views))
        .route("/api/v1/daily-orders", get(handlers::get_daily_orders))
        .route("/api/v1/spend", get(handlers::get_spend))
        .route("/api/v1/products", get(handlers::get_products))
        .route("/api/v1/reviews", get(handlers::get_reviews))
        .route("/api/v1/states", get(handlers::get_states))
        .route("/api/v1/status", get(handlers::get_order_status))
        .route("/api/v1/geo", get(handlers::get_geo))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{BaseMapImage, Dataset};
    use crate::models::{CustomerLocation, Order};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDateTime;
    use tower::ServiceExt;

    fn order(ts: &str, category: &str, score: u8) -> Order {
        Order {
            approved_at: Some(NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap()),
            product_category: Some(category.to_string()),
            review_score: Some(score),
            customer_unique_id: Some("c1".into()),
            customer_state: Some("SP".into()),
            order_status: Some("delivered".into()),
            price: 10.0,
            freight_value: 2.5,
            ..Default::default()
        }
    }

    fn app(base_map: Result<BaseMapImage, String>) -> Router {
        let orders = vec![
            order("2018-01-01 08:00:00", "toys", 5),
            order("2018-01-03 08:00:00", "toys", 4),
            order("2018-01-10 08:00:00", "garden", 5),
        ];
        let locations = vec![CustomerLocation {
            customer_unique_id: "c1".into(),
            lat: -23.5,
            lng: -46.6,
            city: None,
            state: Some("SP".into()),
        }];
        router(Arc::new(DashboardService::new(Dataset::new(orders, locations), base_map)))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(Err("offline".into())), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_range_endpoint() {
        let (status, body) = get(app(Err("offline".into())), "/api/v1/range").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["min_date"], "2018-01-01");
        assert_eq!(json["max_date"], "2018-01-10");
        assert_eq!(json["total_orders"], 3);
        assert_eq!(json["located_customers"], 1);
    }

    #[tokio::test]
    async fn test_views_respect_range() {
        let (status, body) = get(
            app(Err("offline".into())),
            "/api/v1/daily-orders?start=2018-01-01&end=2018-01-05",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["totals"]["total_orders"], 2);
        assert_eq!(json["totals"]["total_revenue"], 25.0);
        assert_eq!(json["days"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_range_after_data_is_empty() {
        let (status, body) = get(
            app(Err("offline".into())),
            "/api/v1/views?start=2030-01-01&end=2030-12-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["row_count"], 0);
        assert_eq!(json["order_totals"]["total_orders"], 0);
        assert_eq!(json["range"]["start"], "2030-01-01");
        assert!(json["daily_orders"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inverted_range_is_bad_request() {
        let (status, body) = get(
            app(Err("offline".into())),
            "/api/v1/views?start=2018-01-09&end=2018-01-02",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("after end date"));

        let (status, _) = get(app(Err("offline".into())), "/api/v1/reviews?start=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_spend_endpoint() {
        let (status, body) = get(
            app(Err("offline".into())),
            "/api/v1/spend?start=2018-01-01&end=2018-01-05",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["summary"]["total_spend"], 25.0);
        assert_eq!(json["by_date"].as_array().unwrap().len(), 3);
        assert_eq!(json["top_customers"][0]["customer"], "c1");
        assert_eq!(json["top_customers"][0]["order_count"], 2);
        assert_eq!(json["top_customers"][0]["total_spend"], 25.0);
    }

    #[tokio::test]
    async fn test_products_limit() {
        let (_, body) = get(app(Err("offline".into())), "/api/v1/products?limit=1").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_sold"], 3);
        assert_eq!(json["top"][0]["category"], "toys");
        assert_eq!(json["bottom"][0]["category"], "garden");
        assert_eq!(json["top"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_page_sections() {
        let (status, body) = get(app(Err("offline".into())), "/").await;
        assert_eq!(status, StatusCode::OK);
        for heading in [
            "Daily Orders Delivered",
            "Customer Spend Overview",
            "Product Orders",
            "Review Score Analysis",
            "Customer Demographics",
        ] {
            assert!(body.contains(heading), "missing {}", heading);
        }
    }

    #[tokio::test]
    async fn test_base_map_route() {
        let (status, _) = get(app(Err("offline".into())), BASEMAP_ROUTE).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let image = BaseMapImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            content_type: "image/png",
        };
        let response = app(Ok(image))
            .oneshot(Request::builder().uri(BASEMAP_ROUTE).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_map_svg_and_geo() {
        let image = BaseMapImage {
            bytes: vec![0xff, 0xd8],
            content_type: "image/jpeg",
        };
        let (status, body) = get(app(Ok(image)), "/map.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<svg"));

        let (_, body) = get(app(Err("offline".into())), "/api/v1/geo").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["cells"].as_array().unwrap().len(), 1);
    }
}
