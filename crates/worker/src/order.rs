//! Order ingestion worker.
//!
//! Consumes order batches from the `order` queue. Orders referencing a
//! customer that does not exist at processing time are dropped individually;
//! the rest of the batch still commits. Orders and their flattened items are
//! upserted in one atomic transaction with skip-on-duplicate semantics.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crm_core::{Item, OrderRecord, Result};
use queue::Job;
use store::{ConflictPolicy, Store, StoreTransaction};
use telemetry::metrics;

use crate::supervisor::JobProcessor;

pub struct OrderWorker {
    store: Arc<dyn Store>,
}

impl OrderWorker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn process(&self, job: &Job) -> Result<()> {
        let orders: Vec<OrderRecord> = match serde_json::from_value(job.payload.clone()) {
            Ok(orders) => orders,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Discarding malformed order batch");
                return Ok(());
            }
        };

        if orders.is_empty() {
            warn!(job_id = %job.id, "Received empty order batch");
            return Ok(());
        }

        info!(count = orders.len(), "Processing order batch");

        let mut tx = self.store.begin().await?;

        // Referential check: one query for the distinct customer ids the
        // batch references.
        let distinct_ids: Vec<String> = orders
            .iter()
            .map(|order| order.customer_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let existing = tx.existing_customer_ids(&distinct_ids).await?;

        let total = orders.len();
        let valid: Vec<OrderRecord> = orders
            .into_iter()
            .filter(|order| existing.contains(&order.customer_id))
            .collect();

        let skipped = total - valid.len();
        if skipped > 0 {
            warn!(
                skipped = skipped,
                "Skipping orders with non-existent customer ids"
            );
            metrics().orders_skipped.inc_by(skipped as u64);
        }

        if valid.is_empty() {
            warn!("No valid orders to process after filtering");
            return Ok(());
        }

        let order_rows = valid.iter().map(OrderRecord::order_row).collect();
        tx.insert_orders(order_rows, ConflictPolicy::SkipDuplicates)
            .await?;

        let item_rows: Vec<Item> = valid.iter().flat_map(OrderRecord::item_rows).collect();
        let item_count = item_rows.len();
        if !item_rows.is_empty() {
            tx.insert_items(item_rows, ConflictPolicy::SkipDuplicates)
                .await?;
        }

        tx.commit().await?;

        metrics().order_batches.inc();
        metrics().orders_upserted.inc_by(valid.len() as u64);
        metrics().items_upserted.inc_by(item_count as u64);

        info!(count = valid.len(), "Order batch processed");
        Ok(())
    }
}

#[async_trait]
impl JobProcessor for OrderWorker {
    fn name(&self) -> &'static str {
        "order"
    }

    async fn process(&self, job: &Job) -> Result<()> {
        OrderWorker::process(self, job).await
    }
}
