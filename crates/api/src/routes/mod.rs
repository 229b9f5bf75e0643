//! API routes.

pub mod campaigns;
pub mod customers;
pub mod health;
pub mod orders;
pub mod receipts;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/customers", post(customers::ingest_customers))
        .route("/api/orders", post(orders::ingest_orders))
        .route(
            "/api/campaigns",
            post(campaigns::create_campaign).get(campaigns::list_campaigns),
        )
        .route(
            "/api/campaigns/:campaign_id/logs",
            get(campaigns::campaign_logs),
        )
        .route(
            "/api/communication/receipt",
            post(receipts::delivery_receipt),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
