//! Campaign delivery worker.
//!
//! Drives one campaign per `process-campaign` job: resolve the segment
//! audience, fan out in fixed-size batches, create one PENDING log per
//! recipient, simulate delivery through the channel, record each outcome on
//! the recipient's log row, then finalize the campaign counters and mark it
//! COMPLETED.
//!
//! Processing is idempotent under at-least-once redelivery: log creation
//! skips existing (campaign, customer) rows, recipients whose log already
//! carries a terminal status are not re-sent, and their recorded outcomes
//! are folded into the final counts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crm_core::{
    CommunicationLog, CustomerProfile, DeliveryStatus, MessageTemplate, Result,
};
use queue::{jobs, Job};
use store::{ConflictPolicy, DeliveryRecord, Store};
use telemetry::metrics;

use crate::delivery::DeliveryChannel;
use crate::supervisor::JobProcessor;

/// Campaign delivery configuration.
#[derive(Debug, Clone)]
pub struct CampaignWorkerConfig {
    /// Audience batch size for profile fetch + send fan-out.
    pub send_batch_size: usize,
}

impl Default for CampaignWorkerConfig {
    fn default() -> Self {
        Self { send_batch_size: 50 }
    }
}

/// Synthetic vendor message id for one (campaign, customer) send.
pub fn vendor_message_id(campaign_id: &str, customer_id: &str) -> String {
    format!("msg_{campaign_id}_{customer_id}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessCampaign {
    campaign_id: String,
}

pub struct CampaignWorker {
    store: Arc<dyn Store>,
    channel: Arc<dyn DeliveryChannel>,
    config: CampaignWorkerConfig,
}

impl CampaignWorker {
    pub fn new(
        store: Arc<dyn Store>,
        channel: Arc<dyn DeliveryChannel>,
        config: CampaignWorkerConfig,
    ) -> Self {
        Self {
            store,
            channel,
            config,
        }
    }

    pub async fn process(&self, job: &Job) -> Result<()> {
        if job.name != jobs::PROCESS_CAMPAIGN {
            debug!(job_name = %job.name, "Skipping unrelated job");
            return Ok(());
        }

        let payload: ProcessCampaign = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(_) => {
                warn!(job_id = %job.id, "Received campaign job without campaignId");
                return Ok(());
            }
        };

        info!(campaign_id = %payload.campaign_id, "Processing campaign");

        let Some(campaign) = self.store.campaign(&payload.campaign_id).await? else {
            warn!(campaign_id = %payload.campaign_id, "Campaign not found");
            return Ok(());
        };
        let Some(segment) = self.store.segment(&campaign.segment_id).await? else {
            warn!(campaign_id = %campaign.id, segment_id = %campaign.segment_id, "Segment not found");
            return Ok(());
        };

        let audience = segment.audience_user_ids;
        if audience.is_empty() {
            warn!(campaign_id = %campaign.id, "No customers in segment audience");
            self.store.complete_campaign(&campaign.id, 0, 0).await?;
            metrics().campaigns_completed.inc();
            return Ok(());
        }

        let template = MessageTemplate::new(&campaign.message_template);
        let mut sent_count: u32 = 0;
        let mut failed_count: u32 = 0;

        for batch in audience.chunks(self.config.send_batch_size) {
            let profiles = self.store.customer_profiles(batch).await?;

            // Fold in outcomes a previous delivery attempt already recorded,
            // so redelivered jobs never double-send.
            let existing: HashMap<String, DeliveryStatus> = self
                .store
                .communication_logs(&campaign.id, batch)
                .await?
                .into_iter()
                .map(|log| (log.customer_id, log.status))
                .collect();

            let mut pending_logs: Vec<CommunicationLog> = Vec::new();
            let mut to_send: Vec<CustomerProfile> = Vec::new();
            for profile in profiles {
                match existing.get(&profile.id) {
                    Some(DeliveryStatus::Sent) => sent_count += 1,
                    Some(DeliveryStatus::Failed) => failed_count += 1,
                    Some(DeliveryStatus::Pending) => to_send.push(profile),
                    None => {
                        pending_logs.push(CommunicationLog::pending(
                            &campaign.id,
                            &profile.id,
                            template.render(Some(&profile.name)),
                        ));
                        to_send.push(profile);
                    }
                }
            }

            if !pending_logs.is_empty() {
                self.store
                    .insert_communication_logs(pending_logs, ConflictPolicy::SkipDuplicates)
                    .await?;
            }

            for profile in to_send {
                let message = template.render(Some(&profile.name));
                let status: DeliveryStatus = self.channel.deliver(&profile, &message).await.into();
                match status {
                    DeliveryStatus::Sent => {
                        sent_count += 1;
                        metrics().messages_sent.inc();
                    }
                    _ => {
                        failed_count += 1;
                        metrics().messages_failed.inc();
                    }
                }

                let updated = self
                    .store
                    .record_delivery_outcome(
                        &campaign.id,
                        &profile.id,
                        DeliveryRecord {
                            status,
                            sent_at: Utc::now(),
                            vendor_message_id: vendor_message_id(&campaign.id, &profile.id),
                        },
                    )
                    .await?;
                if !updated {
                    warn!(
                        campaign_id = %campaign.id,
                        customer_id = %profile.id,
                        "No communication log to record outcome on"
                    );
                }
            }
        }

        self.store
            .complete_campaign(&campaign.id, sent_count, failed_count)
            .await?;
        metrics().campaigns_completed.inc();

        info!(
            campaign_id = %campaign.id,
            sent = sent_count,
            failed = failed_count,
            "Campaign completed"
        );
        Ok(())
    }
}

#[async_trait]
impl JobProcessor for CampaignWorker {
    fn name(&self) -> &'static str {
        "campaign"
    }

    async fn process(&self, job: &Job) -> Result<()> {
        CampaignWorker::process(self, job).await
    }
}
