//! Campaign Routes
//!
//! - GET /api/v1/campaigns?status= - List campaigns, newest first
//! - POST /api/v1/campaigns - Create a campaign
//! - GET /api/v1/campaigns/stats - Headline numbers
//! - GET /api/v1/campaigns/:id - Get a campaign

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CampaignListQuery, CampaignListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::campaigns::{Campaign, CampaignDraft, CampaignSummary};
use crate::websocket::WsEvent;

/// GET /api/v1/campaigns
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CampaignListQuery>,
) -> Json<CampaignListResponse> {
    let campaigns = state.campaigns.list(query.status).await;

    Json(CampaignListResponse {
        total: campaigns.len(),
        campaigns,
    })
}

/// GET /api/v1/campaigns/:id
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> ApiResult<Json<Campaign>> {
    state
        .campaigns
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Campaign with id {} not found", id)))
}

/// GET /api/v1/campaigns/stats
pub async fn campaign_stats(State(state): State<Arc<AppState>>) -> Json<CampaignSummary> {
    Json(state.campaigns.summary().await)
}

/// POST /api/v1/campaigns
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<CampaignDraft>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let campaign = state.campaigns.create(&draft).await?;
    state
        .ws_hub
        .publish(WsEvent::campaign_created(campaign.clone()));

    Ok((StatusCode::CREATED, Json(campaign)))
}
