//! Persistent domain model for the campaign engine.
//!
//! These are the row types the workers read and write through the store
//! interface. Wire format is camelCase to match the ingestion payloads and
//! the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Campaign lifecycle. PROCESSING is set at creation; COMPLETED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Processing,
    Completed,
}

/// Per-recipient delivery state. PENDING transitions to SENT or FAILED,
/// both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
        }
    }
}

/// A customer row. Immutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// An address row, owned exclusively by one customer and created in the
/// same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub customer_id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// An order row, persisted only when its customer exists at processing time.
/// Items are stored separately, keyed by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    /// Integer minor units (e.g. cents).
    pub total_amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A line item row, owned exclusively by one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub total: i64,
}

/// A materialized audience: opaque rule document plus the customer ids the
/// external rule engine resolved from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub name: String,
    /// Opaque to this core; persisted for record keeping only.
    pub rules: serde_json::Value,
    pub audience_user_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A campaign row with aggregate delivery accounting.
///
/// Invariant: `sent_count + failed_count <= audience_size`, with equality
/// once `status` is COMPLETED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub message_template: String,
    pub segment_id: String,
    pub audience_size: u32,
    pub sent_count: u32,
    pub failed_count: u32,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

/// Minimal customer projection fetched for personalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Per-recipient record of one campaign send attempt.
///
/// Unique per (campaign_id, customer_id). Updated in place by the delivery
/// worker and, later, by the external delivery-receipt callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationLog {
    pub id: String,
    pub campaign_id: String,
    pub customer_id: String,
    pub status: DeliveryStatus,
    pub personalized_message: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub vendor_message_id: Option<String>,
    pub delivery_receipt_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommunicationLog {
    /// A fresh PENDING log row for one recipient.
    pub fn pending(
        campaign_id: impl Into<String>,
        customer_id: impl Into<String>,
        personalized_message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id: campaign_id.into(),
            customer_id: customer_id.into(),
            status: DeliveryStatus::Pending,
            personalized_message: personalized_message.into(),
            sent_at: None,
            vendor_message_id: None,
            delivery_receipt_status: None,
            created_at: now,
            updated_at: now,
        }
    }
}
