//! Campaign creation and inspection endpoints.
//!
//! Campaign creation persists the segment (opaque rules plus the audience
//! the external rule engine resolved) and the campaign in PROCESSING state,
//! then enqueues exactly one `process-campaign` job. Delivery happens
//! asynchronously in the campaign worker.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crm_core::{Campaign, CampaignStatus, CommunicationLog, Segment};
use queue::{jobs, queues};
use store::Store;

use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[validate(length(min = 3, message = "Campaign name must be at least 3 characters long."))]
    pub campaign_name: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters long."))]
    pub message: String,
    #[validate(length(min = 3, message = "Segment name must be at least 3 characters long."))]
    pub segment_name: String,
    /// Opaque rule document, persisted for record keeping.
    pub segment_rules: serde_json::Value,
    /// Audience resolved externally from the rules.
    #[serde(default)]
    pub audience_user_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCreated {
    pub segment: Segment,
    pub campaign: Campaign,
}

/// POST /api/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<DataResponse<CampaignCreated>>), ApiError> {
    if let Err(errors) = request.validate() {
        let details = serde_json::to_value(&errors)
            .unwrap_or_else(|_| serde_json::Value::String("validation failed".to_string()));
        return Err(ApiError::validation(
            "Invalid campaign and segment data provided.",
            details,
        ));
    }

    let segment = Segment {
        id: Uuid::new_v4().to_string(),
        name: request.segment_name,
        rules: request.segment_rules,
        audience_user_ids: request.audience_user_ids,
        created_at: Utc::now(),
    };
    let audience_size = segment.audience_user_ids.len() as u32;
    state.store.insert_segment(segment.clone()).await?;

    let campaign = Campaign {
        id: Uuid::new_v4().to_string(),
        name: request.campaign_name,
        message_template: request.message,
        segment_id: segment.id.clone(),
        audience_size,
        sent_count: 0,
        failed_count: 0,
        status: CampaignStatus::Processing,
        created_at: Utc::now(),
    };
    state.store.insert_campaign(campaign.clone()).await?;

    state
        .broker
        .enqueue(
            queues::CAMPAIGN,
            jobs::PROCESS_CAMPAIGN,
            serde_json::json!({ "campaignId": campaign.id }),
        )
        .map_err(ApiError::from)?;

    info!(
        campaign_id = %campaign.id,
        audience_size = audience_size,
        "Campaign added to process-campaign queue"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(CampaignCreated { segment, campaign })),
    ))
}

/// One campaign in the listing, with its segment name flattened in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub segment_name: Option<String>,
}

/// GET /api/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<CampaignSummary>>>, ApiError> {
    let campaigns = state.store.campaigns().await?;

    let mut summaries = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let segment_name = state
            .store
            .segment(&campaign.segment_id)
            .await?
            .map(|segment| segment.name);
        summaries.push(CampaignSummary {
            campaign,
            segment_name,
        });
    }

    Ok(Json(DataResponse::new(summaries)))
}

/// GET /api/campaigns/:campaign_id/logs
pub async fn campaign_logs(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<DataResponse<Vec<CommunicationLog>>>, ApiError> {
    if state.store.campaign(&campaign_id).await?.is_none() {
        return Err(ApiError::not_found("Campaign not found."));
    }

    let logs = state.store.campaign_logs(&campaign_id).await?;
    Ok(Json(DataResponse::new(logs)))
}
