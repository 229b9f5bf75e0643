//! The store contract consumed by the workers and the HTTP layer.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crm_core::{
    Address, Campaign, CommunicationLog, Customer, CustomerProfile, DeliveryStatus, Item, Order,
    Result, Segment,
};

use crate::conflict::ConflictPolicy;

/// Outcome of one simulated send, written onto the recipient's log row.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
    pub vendor_message_id: String,
}

/// A multi-statement unit of work. Nothing staged through a transaction is
/// visible until `commit`, and a failed commit leaves the store untouched.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn insert_customers(
        &mut self,
        customers: Vec<Customer>,
        policy: ConflictPolicy,
    ) -> Result<()>;

    async fn insert_addresses(
        &mut self,
        addresses: Vec<Address>,
        policy: ConflictPolicy,
    ) -> Result<()>;

    /// Which of the given customer ids exist in committed state.
    async fn existing_customer_ids(&self, ids: &[String]) -> Result<HashSet<String>>;

    async fn insert_orders(&mut self, orders: Vec<Order>, policy: ConflictPolicy) -> Result<()>;

    async fn insert_items(&mut self, items: Vec<Item>, policy: ConflictPolicy) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Generic data access used by the pipeline.
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a transaction for a batch unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    async fn customer(&self, id: &str) -> Result<Option<Customer>>;

    /// Minimal profiles for the given ids; missing ids are silently absent
    /// from the result, which follows the input order.
    async fn customer_profiles(&self, ids: &[String]) -> Result<Vec<CustomerProfile>>;

    async fn campaign(&self, id: &str) -> Result<Option<Campaign>>;

    /// All campaigns, newest first.
    async fn campaigns(&self) -> Result<Vec<Campaign>>;

    async fn segment(&self, id: &str) -> Result<Option<Segment>>;

    async fn insert_segment(&self, segment: Segment) -> Result<()>;

    async fn insert_campaign(&self, campaign: Campaign) -> Result<()>;

    /// Logs for a campaign restricted to the given customer ids.
    async fn communication_logs(
        &self,
        campaign_id: &str,
        customer_ids: &[String],
    ) -> Result<Vec<CommunicationLog>>;

    /// All logs for a campaign.
    async fn campaign_logs(&self, campaign_id: &str) -> Result<Vec<CommunicationLog>>;

    /// Inserts log rows; the (campaign_id, customer_id) pair is the unique
    /// key. Returns how many rows were actually inserted.
    async fn insert_communication_logs(
        &self,
        logs: Vec<CommunicationLog>,
        policy: ConflictPolicy,
    ) -> Result<usize>;

    /// Writes a delivery outcome onto the log row matched by
    /// (campaign_id, customer_id). Returns false when no row matches.
    async fn record_delivery_outcome(
        &self,
        campaign_id: &str,
        customer_id: &str,
        record: DeliveryRecord,
    ) -> Result<bool>;

    /// Atomically sets the campaign's final counters and COMPLETED status.
    async fn complete_campaign(
        &self,
        campaign_id: &str,
        sent_count: u32,
        failed_count: u32,
    ) -> Result<()>;

    /// Applies an externally-sourced delivery receipt to the log row matched
    /// by (campaign_id, customer_id, vendor_message_id). Returns false when
    /// no row matches. Campaign aggregates are never touched.
    async fn apply_delivery_receipt(
        &self,
        campaign_id: &str,
        customer_id: &str,
        vendor_message_id: &str,
        receipt_status: &str,
    ) -> Result<bool>;
}
