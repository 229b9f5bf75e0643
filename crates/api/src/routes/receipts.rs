//! Delivery-receipt callback endpoint.
//!
//! External boundary for asynchronous vendor receipts. Updates the matching
//! communication log's receipt status only; campaign aggregates and the
//! campaign state machine are never touched from here.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use store::Store;
use telemetry::metrics;

use crate::response::{ApiError, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub vendor_message_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// POST /api/communication/receipt
pub async fn delivery_receipt(
    State(state): State<AppState>,
    Json(request): Json<ReceiptRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(campaign_id), Some(customer_id), Some(vendor_message_id), Some(status)) = (
        request.campaign_id,
        request.customer_id,
        request.vendor_message_id,
        request.status,
    ) else {
        return Err(ApiError::bad_request("Missing required fields."));
    };

    let updated = state
        .store
        .apply_delivery_receipt(&campaign_id, &customer_id, &vendor_message_id, &status)
        .await?;

    if !updated {
        return Err(ApiError::not_found("Log not found."));
    }

    metrics().receipts_applied.inc();
    info!(
        campaign_id = %campaign_id,
        customer_id = %customer_id,
        status = %status,
        "Delivery receipt applied"
    );

    Ok(Json(MessageResponse::new("Delivery receipt applied.")))
}
