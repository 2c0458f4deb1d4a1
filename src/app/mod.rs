//! 应用层：评论、图片与库存

pub mod photos;
pub mod reviews;
pub mod stock;

use axum::{
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::response::ApiResponse;
use reviews::ReviewService;
use stock::StockLedger;

#[derive(Clone)]
pub struct AppState {
    pub reviews: ReviewService,
    pub stock: Arc<Mutex<StockLedger>>,
}

impl AppState {
    pub fn new(reviews: ReviewService, stock: StockLedger) -> Self {
        Self {
            reviews,
            stock: Arc::new(Mutex::new(stock)),
        }
    }
}

/// API 路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reviews", get(reviews::handler::list_all_reviews))
        .route(
            "/api/reviews/:product_name",
            get(reviews::handler::get_reviews).post(reviews::handler::submit_review),
        )
        .route(
            "/api/reviews/:product_name/:review_id",
            delete(reviews::handler::delete_review),
        )
        .route("/api/stock", get(stock::handler::list_products))
        .route("/api/stock/refresh", post(stock::handler::refresh))
        .route(
            "/api/stock/:product_name",
            get(stock::handler::get_product_stock).put(stock::handler::update_stock_status),
        )
        .route(
            "/api/stock/:product_name/decrease",
            post(stock::handler::decrease_stock),
        )
        .route("/health", get(health_check))
        .with_state(state)
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

async fn health_check() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::success(Health {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
