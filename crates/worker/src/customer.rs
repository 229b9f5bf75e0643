//! Customer ingestion worker.
//!
//! Consumes customer batches from the `customer` queue and persists
//! customers plus their addresses in one atomic transaction. Replayed
//! batches are idempotent: both writes skip on primary-key collision.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crm_core::{Address, Customer, CustomerRecord, Result};
use queue::Job;
use store::{ConflictPolicy, Store, StoreTransaction};
use telemetry::metrics;

use crate::supervisor::JobProcessor;

pub struct CustomerWorker {
    store: Arc<dyn Store>,
}

impl CustomerWorker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn process(&self, job: &Job) -> Result<()> {
        let records: Vec<CustomerRecord> = match serde_json::from_value(job.payload.clone()) {
            Ok(records) => records,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Discarding malformed customer batch");
                return Ok(());
            }
        };

        if records.is_empty() {
            warn!(job_id = %job.id, "Received empty customer batch");
            return Ok(());
        }

        info!(count = records.len(), "Processing customer batch");

        let mut customers: Vec<Customer> = Vec::with_capacity(records.len());
        let mut addresses: Vec<Address> = Vec::new();
        for record in records {
            let (customer, address) = record.into_rows();
            customers.push(customer);
            if let Some(address) = address {
                addresses.push(address);
            }
        }

        let customer_count = customers.len();
        let address_count = addresses.len();

        let mut tx = self.store.begin().await?;
        tx.insert_customers(customers, ConflictPolicy::SkipDuplicates)
            .await?;
        if !addresses.is_empty() {
            tx.insert_addresses(addresses, ConflictPolicy::SkipDuplicates)
                .await?;
        }
        tx.commit().await?;

        metrics().customer_batches.inc();
        metrics().customers_upserted.inc_by(customer_count as u64);
        metrics().addresses_upserted.inc_by(address_count as u64);

        info!(count = customer_count, "Customer batch processed");
        Ok(())
    }
}

#[async_trait]
impl JobProcessor for CustomerWorker {
    fn name(&self) -> &'static str {
        "customer"
    }

    async fn process(&self, job: &Job) -> Result<()> {
        CustomerWorker::process(self, job).await
    }
}
