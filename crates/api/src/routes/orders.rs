//! Bulk order ingestion endpoint.
//!
//! Validates the submitted orders field-by-field (the referential check
//! against existing customers happens later, in the order worker), then
//! chunks and enqueues them on the `order` queue.

use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info};
use validator::Validate;

use crm_core::{chunk_records, OrderRecord, RawOrder, INGEST_CHUNK_SIZE};
use queue::{jobs, queues, JobSpec};

use crate::response::{ApiError, MessageResponse};
use crate::state::AppState;

/// POST /api/orders
pub async fn ingest_orders(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let raw: Vec<RawOrder> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid order data provided: {e}")))?;

    // Per-record field validation; failures are reported per index.
    let mut field_errors = serde_json::Map::new();
    for (idx, order) in raw.iter().enumerate() {
        if let Err(errors) = order.validate() {
            let value = serde_json::to_value(&errors).unwrap_or_else(|_| {
                serde_json::Value::String("validation failed".to_string())
            });
            field_errors.insert(idx.to_string(), value);
        }
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation(
            "Invalid order data provided.",
            serde_json::Value::Object(field_errors),
        ));
    }

    let total = raw.len();
    let records: Vec<OrderRecord> = raw.into_iter().map(RawOrder::normalize).collect();

    let chunks = chunk_records(records, INGEST_CHUNK_SIZE);
    let batches = chunks.len();

    let mut specs = Vec::with_capacity(batches);
    for chunk in chunks {
        let payload = serde_json::to_value(chunk).map_err(|e| {
            error!("Failed to serialize order batch: {e}");
            ApiError::internal("Failed to queue orders")
        })?;
        specs.push(JobSpec::new(jobs::PERSIST_ORDER_BATCH, payload));
    }

    state
        .broker
        .enqueue_bulk(queues::ORDER, specs)
        .map_err(|e| {
            error!("Order queue rejected submission: {e}");
            ApiError::service_unavailable("Order processing system is not ready.")
        })?;

    info!(count = total, batches = batches, "Queued order batches");

    Ok(Json(MessageResponse::new(format!(
        "Successfully queued {total} orders in {batches} batches"
    ))))
}
