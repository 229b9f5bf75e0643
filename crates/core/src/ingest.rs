//! Ingestion payloads and batch shaping.
//!
//! The HTTP boundary accepts raw customer/order arrays, validates and
//! normalizes them (filling in ids so queue redelivery stays idempotent),
//! and chunks them into fixed-size batches. One chunk becomes one job
//! payload; the workers deserialize the normalized record types back out
//! of the job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::{Address, Customer, Item, Order};

/// Maximum records per enqueued batch. Producers chunk at this bound; the
/// workers never see a larger payload.
pub const INGEST_CHUNK_SIZE: usize = 100;

/// Splits records into batches of at most `size` records, preserving order.
pub fn chunk_records<T>(records: Vec<T>, size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be positive");
    let mut chunks = Vec::with_capacity(records.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(records.len()));
    for record in records {
        current.push(record);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Address fields as they appear nested in a customer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A customer record as submitted by the producer. The id is optional on
/// the wire; normalization assigns one before the record is enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomer {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawCustomer {
    pub fn normalize(self) -> CustomerRecord {
        CustomerRecord {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// A normalized customer record, the unit carried in a customer batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<AddressInput>,
    pub created_at: DateTime<Utc>,
}

impl CustomerRecord {
    /// Splits the record into its customer row and optional address row.
    pub fn into_rows(self) -> (Customer, Option<Address>) {
        let address = self.address.map(|a| Address {
            customer_id: self.id.clone(),
            street: a.street,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        });
        let customer = Customer {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
        };
        (customer, address)
    }
}

/// A line item as submitted in an order payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Product ID is required."))]
    pub product_id: String,
    #[validate(length(min = 1, message = "Item name is required."))]
    pub name: String,
    #[validate(range(min = 1, message = "Item price must be a positive integer."))]
    pub price: i64,
    #[validate(range(min = 1, message = "Item quantity must be a positive integer."))]
    pub quantity: i64,
    #[validate(range(min = 1, message = "Item total must be a positive integer."))]
    pub total: i64,
}

/// An order as submitted by the producer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Customer ID is required."))]
    pub customer_id: String,
    #[validate(
        length(min = 1, message = "Order must contain at least one item."),
        nested
    )]
    pub items: Vec<RawItem>,
    #[validate(range(min = 1, message = "Order total amount must be a positive integer."))]
    pub total_amount: i64,
    #[validate(length(min = 1, message = "Currency is required."))]
    pub currency: String,
    #[validate(length(min = 1, message = "Order status is required."))]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawOrder {
    pub fn normalize(self) -> OrderRecord {
        OrderRecord {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            customer_id: self.customer_id,
            items: self
                .items
                .into_iter()
                .map(|item| ItemRecord {
                    id: item.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    product_id: item.product_id,
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                    total: item.total,
                })
                .collect(),
            total_amount: self.total_amount,
            currency: self.currency,
            status: self.status,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// A normalized line item carried inside an order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub total: i64,
}

/// A normalized order record, the unit carried in an order batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub customer_id: String,
    pub items: Vec<ItemRecord>,
    pub total_amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// The order row with its item list stripped.
    pub fn order_row(&self) -> Order {
        Order {
            id: self.id.clone(),
            customer_id: self.customer_id.clone(),
            total_amount: self.total_amount,
            currency: self.currency.clone(),
            status: self.status.clone(),
            created_at: self.created_at,
        }
    }

    /// The item rows with the owning order id attached.
    pub fn item_rows(&self) -> Vec<Item> {
        self.items
            .iter()
            .map(|item| Item {
                id: item.id.clone(),
                order_id: self.id.clone(),
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                total: item.total,
            })
            .collect()
    }
}
