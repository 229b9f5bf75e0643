//! Bulk customer ingestion endpoint.
//!
//! Accepts a raw JSON array of customer records, assigns ids where absent,
//! chunks the array into fixed-size batches, and enqueues each batch as one
//! job on the `customer` queue. Persistence happens asynchronously in the
//! customer ingestion worker.

use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info};

use crm_core::{chunk_records, CustomerRecord, RawCustomer, INGEST_CHUNK_SIZE};
use queue::{jobs, queues, JobSpec};

use crate::response::{ApiError, MessageResponse};
use crate::state::AppState;

/// POST /api/customers
pub async fn ingest_customers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let raw: Vec<RawCustomer> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid customer data provided: {e}")))?;

    let total = raw.len();
    let records: Vec<CustomerRecord> = raw.into_iter().map(RawCustomer::normalize).collect();

    let chunks = chunk_records(records, INGEST_CHUNK_SIZE);
    let batches = chunks.len();

    let mut specs = Vec::with_capacity(batches);
    for chunk in chunks {
        let payload = serde_json::to_value(chunk).map_err(|e| {
            error!("Failed to serialize customer batch: {e}");
            ApiError::internal("Failed to queue customers")
        })?;
        specs.push(JobSpec::new(jobs::PERSIST_BATCH, payload));
    }

    state
        .broker
        .enqueue_bulk(queues::CUSTOMER, specs)
        .map_err(|e| {
            error!("Customer queue rejected submission: {e}");
            ApiError::service_unavailable("Customer processing system is not ready.")
        })?;

    info!(count = total, batches = batches, "Queued customer batches");

    Ok(Json(MessageResponse::new(format!(
        "Successfully queued {total} customers in {batches} batches"
    ))))
}
