//! Dashboard Routes
//!
//! Read-only views of the live feed widgets.
//!
//! - GET /api/v1/dashboard - Full snapshot
//! - GET /api/v1/dashboard/donations - Revenue chart and recent donations
//! - GET /api/v1/dashboard/stats - Per-hour, per-minute and to-date counters
//! - GET /api/v1/dashboard/top-campaigns - Campaigns ranked by growth

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DonationsResponse, TopCampaignsQuery};
use crate::api::state::AppState;
use crate::feed::{CampaignStats, DashboardSnapshot, PlatformStats, TOP_CAMPAIGN_LIMIT};

/// GET /api/v1/dashboard
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard())
}

/// GET /api/v1/dashboard/donations
pub async fn get_donations(State(state): State<Arc<AppState>>) -> Json<DonationsResponse> {
    let pulse = state.dashboard().pulse;

    Json(DonationsResponse {
        chart: pulse.chart,
        recent: pulse.recent,
        total_raised: pulse.total_raised,
        highlight: pulse.highlight,
    })
}

/// GET /api/v1/dashboard/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<PlatformStats> {
    Json(state.feed.borrow().stats)
}

/// GET /api/v1/dashboard/top-campaigns?limit=N
///
/// `limit` is capped at the widget size.
pub async fn get_top_campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopCampaignsQuery>,
) -> Json<Vec<CampaignStats>> {
    let limit = query
        .limit
        .unwrap_or(TOP_CAMPAIGN_LIMIT)
        .min(TOP_CAMPAIGN_LIMIT);

    let mut campaigns = state.dashboard().top_campaigns;
    campaigns.truncate(limit);
    Json(campaigns)
}
