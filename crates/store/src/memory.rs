//! In-memory store backend.
//!
//! Implements the full [`Store`] contract over process-local tables. Used by
//! the default runtime wiring and the test suite; a relational backend slots
//! in behind the same traits. Transactions stage writes and apply them in
//! one swap under the write lock, so a batch is all-or-nothing by
//! construction.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crm_core::{
    Address, Campaign, CampaignStatus, CommunicationLog, Customer, CustomerProfile, Error, Item,
    Order, Result, Segment,
};

use crate::conflict::ConflictPolicy;
use crate::interface::{DeliveryRecord, Store, StoreTransaction};

/// Failure injection points for exercising abort paths in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Fail the next item insert inside a transaction.
    InsertItems,
    /// Fail the next transaction commit.
    Commit,
}

#[derive(Debug, Default, Clone)]
struct Tables {
    customers: BTreeMap<String, Customer>,
    /// Keyed by owning customer id (1:1 ownership).
    addresses: BTreeMap<String, Address>,
    orders: BTreeMap<String, Order>,
    items: BTreeMap<String, Item>,
    segments: BTreeMap<String, Segment>,
    campaigns: BTreeMap<String, Campaign>,
    /// Keyed by (campaign_id, customer_id), the per-send-attempt unique key.
    logs: BTreeMap<(String, String), CommunicationLog>,
}

struct Inner {
    tables: RwLock<Tables>,
    fault: Mutex<Option<FaultPoint>>,
}

/// Process-local store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                fault: Mutex::new(None),
            }),
        }
    }

    /// Arms a one-shot failure at the given point.
    pub fn inject_fault(&self, point: FaultPoint) {
        *self.inner.fault.lock() = Some(point);
    }

    fn take_fault(&self, point: FaultPoint) -> bool {
        let mut fault = self.inner.fault.lock();
        if *fault == Some(point) {
            *fault = None;
            true
        } else {
            false
        }
    }

    // Direct inspection helpers for assertions; not part of the Store
    // contract.

    pub fn customer_count(&self) -> usize {
        self.inner.tables.read().customers.len()
    }

    pub fn order_count(&self) -> usize {
        self.inner.tables.read().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.tables.read().items.len()
    }

    pub fn log_count(&self) -> usize {
        self.inner.tables.read().logs.len()
    }

    pub fn address_for_customer(&self, customer_id: &str) -> Option<Address> {
        self.inner.tables.read().addresses.get(customer_id).cloned()
    }

    pub fn orders_for_customer(&self, customer_id: &str) -> Vec<Order> {
        self.inner
            .tables
            .read()
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect()
    }

    pub fn items_for_order(&self, order_id: &str) -> Vec<Item> {
        self.inner
            .tables
            .read()
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One staged batch write.
enum StagedWrite {
    Customers(Vec<Customer>, ConflictPolicy),
    Addresses(Vec<Address>, ConflictPolicy),
    Orders(Vec<Order>, ConflictPolicy),
    Items(Vec<Item>, ConflictPolicy),
}

/// A transaction over the in-memory tables. Writes are staged and applied
/// to a working copy at commit, then swapped in atomically.
pub struct MemoryTransaction {
    store: MemoryStore,
    staged: Vec<StagedWrite>,
}

fn apply<T: Clone>(
    table: &mut BTreeMap<String, T>,
    rows: Vec<(String, T)>,
    policy: ConflictPolicy,
    entity: &'static str,
) -> Result<()> {
    for (key, row) in rows {
        if table.contains_key(&key) {
            match policy {
                ConflictPolicy::SkipDuplicates => continue,
                ConflictPolicy::Error => {
                    return Err(Error::conflict(format!("{entity} {key} already exists")))
                }
            }
        }
        table.insert(key, row);
    }
    Ok(())
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_customers(
        &mut self,
        customers: Vec<Customer>,
        policy: ConflictPolicy,
    ) -> Result<()> {
        self.staged.push(StagedWrite::Customers(customers, policy));
        Ok(())
    }

    async fn insert_addresses(
        &mut self,
        addresses: Vec<Address>,
        policy: ConflictPolicy,
    ) -> Result<()> {
        self.staged.push(StagedWrite::Addresses(addresses, policy));
        Ok(())
    }

    async fn existing_customer_ids(&self, ids: &[String]) -> Result<HashSet<String>> {
        let tables = self.store.inner.tables.read();
        Ok(ids
            .iter()
            .filter(|id| tables.customers.contains_key(*id))
            .cloned()
            .collect())
    }

    async fn insert_orders(&mut self, orders: Vec<Order>, policy: ConflictPolicy) -> Result<()> {
        self.staged.push(StagedWrite::Orders(orders, policy));
        Ok(())
    }

    async fn insert_items(&mut self, items: Vec<Item>, policy: ConflictPolicy) -> Result<()> {
        if self.store.take_fault(FaultPoint::InsertItems) {
            return Err(Error::store("injected item insert failure"));
        }
        self.staged.push(StagedWrite::Items(items, policy));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.store.take_fault(FaultPoint::Commit) {
            return Err(Error::store("injected commit failure"));
        }

        let mut tables = self.store.inner.tables.write();
        let mut working = (*tables).clone();

        for write in self.staged {
            match write {
                StagedWrite::Customers(rows, policy) => apply(
                    &mut working.customers,
                    rows.into_iter().map(|c| (c.id.clone(), c)).collect(),
                    policy,
                    "customer",
                )?,
                StagedWrite::Addresses(rows, policy) => apply(
                    &mut working.addresses,
                    rows.into_iter().map(|a| (a.customer_id.clone(), a)).collect(),
                    policy,
                    "address",
                )?,
                StagedWrite::Orders(rows, policy) => apply(
                    &mut working.orders,
                    rows.into_iter().map(|o| (o.id.clone(), o)).collect(),
                    policy,
                    "order",
                )?,
                StagedWrite::Items(rows, policy) => apply(
                    &mut working.items,
                    rows.into_iter().map(|i| (i.id.clone(), i)).collect(),
                    policy,
                    "item",
                )?,
            }
        }

        *tables = working;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }

    async fn customer(&self, id: &str) -> Result<Option<Customer>> {
        Ok(self.inner.tables.read().customers.get(id).cloned())
    }

    async fn customer_profiles(&self, ids: &[String]) -> Result<Vec<CustomerProfile>> {
        let tables = self.inner.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.customers.get(id))
            .map(|c| CustomerProfile {
                id: c.id.clone(),
                name: c.name.clone(),
                email: c.email.clone(),
            })
            .collect())
    }

    async fn campaign(&self, id: &str) -> Result<Option<Campaign>> {
        Ok(self.inner.tables.read().campaigns.get(id).cloned())
    }

    async fn campaigns(&self) -> Result<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> =
            self.inner.tables.read().campaigns.values().cloned().collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    async fn segment(&self, id: &str) -> Result<Option<Segment>> {
        Ok(self.inner.tables.read().segments.get(id).cloned())
    }

    async fn insert_segment(&self, segment: Segment) -> Result<()> {
        let mut tables = self.inner.tables.write();
        if tables.segments.contains_key(&segment.id) {
            return Err(Error::conflict(format!(
                "segment {} already exists",
                segment.id
            )));
        }
        tables.segments.insert(segment.id.clone(), segment);
        Ok(())
    }

    async fn insert_campaign(&self, campaign: Campaign) -> Result<()> {
        let mut tables = self.inner.tables.write();
        if tables.campaigns.contains_key(&campaign.id) {
            return Err(Error::conflict(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        tables.campaigns.insert(campaign.id.clone(), campaign);
        Ok(())
    }

    async fn communication_logs(
        &self,
        campaign_id: &str,
        customer_ids: &[String],
    ) -> Result<Vec<CommunicationLog>> {
        let tables = self.inner.tables.read();
        Ok(customer_ids
            .iter()
            .filter_map(|customer_id| {
                tables
                    .logs
                    .get(&(campaign_id.to_string(), customer_id.clone()))
            })
            .cloned()
            .collect())
    }

    async fn campaign_logs(&self, campaign_id: &str) -> Result<Vec<CommunicationLog>> {
        Ok(self
            .inner
            .tables
            .read()
            .logs
            .values()
            .filter(|log| log.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn insert_communication_logs(
        &self,
        logs: Vec<CommunicationLog>,
        policy: ConflictPolicy,
    ) -> Result<usize> {
        let mut tables = self.inner.tables.write();
        let mut inserted = 0;
        for log in logs {
            let key = (log.campaign_id.clone(), log.customer_id.clone());
            if tables.logs.contains_key(&key) {
                match policy {
                    ConflictPolicy::SkipDuplicates => continue,
                    ConflictPolicy::Error => {
                        return Err(Error::conflict(format!(
                            "communication log for ({}, {}) already exists",
                            key.0, key.1
                        )))
                    }
                }
            }
            tables.logs.insert(key, log);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn record_delivery_outcome(
        &self,
        campaign_id: &str,
        customer_id: &str,
        record: DeliveryRecord,
    ) -> Result<bool> {
        let mut tables = self.inner.tables.write();
        let key = (campaign_id.to_string(), customer_id.to_string());
        match tables.logs.get_mut(&key) {
            Some(log) => {
                log.status = record.status;
                log.sent_at = Some(record.sent_at);
                log.delivery_receipt_status = Some(record.status.as_str().to_string());
                log.vendor_message_id = Some(record.vendor_message_id);
                log.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_campaign(
        &self,
        campaign_id: &str,
        sent_count: u32,
        failed_count: u32,
    ) -> Result<()> {
        let mut tables = self.inner.tables.write();
        let campaign = tables
            .campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| Error::not_found("campaign", campaign_id))?;
        campaign.sent_count = sent_count;
        campaign.failed_count = failed_count;
        campaign.status = CampaignStatus::Completed;
        Ok(())
    }

    async fn apply_delivery_receipt(
        &self,
        campaign_id: &str,
        customer_id: &str,
        vendor_message_id: &str,
        receipt_status: &str,
    ) -> Result<bool> {
        let mut tables = self.inner.tables.write();
        let key = (campaign_id.to_string(), customer_id.to_string());
        match tables.logs.get_mut(&key) {
            Some(log) if log.vendor_message_id.as_deref() == Some(vendor_message_id) => {
                log.delivery_receipt_status = Some(receipt_status.to_string());
                log.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
