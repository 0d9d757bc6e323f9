//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::admin::{ActivityEntry, Admin, Address};
use crate::campaigns::{Campaign, CampaignStatus};
use crate::feed::{Sample, SampleId, TimeSeriesPoint};

// ============================================
// DASHBOARD DTOs
// ============================================

/// Donation pulse widget
#[derive(Debug, Serialize)]
pub struct DonationsResponse {
    /// Chart points, oldest first
    pub chart: Vec<TimeSeriesPoint>,
    /// Recent donations, newest first
    pub recent: Vec<Sample>,
    pub total_raised: f64,
    pub highlight: Option<SampleId>,
}

/// Query parameters for the top-campaigns widget
#[derive(Debug, Default, Deserialize)]
pub struct TopCampaignsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================
// ADMIN DTOs
// ============================================

/// Query parameters for listing admins
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    /// Case-insensitive address substring
    #[serde(default)]
    pub q: Option<String>,
}

/// Body carrying a single address
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressRequest {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub total: usize,
    pub admins: Vec<Admin>,
}

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub address: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminRemovedResponse {
    pub address: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatorResponse {
    pub creator: Address,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub total: usize,
    pub entries: Vec<ActivityEntry>,
}

// ============================================
// CAMPAIGN DTOs
// ============================================

/// Query parameters for listing campaigns
#[derive(Debug, Default, Deserialize)]
pub struct CampaignListQuery {
    #[serde(default)]
    pub status: Option<CampaignStatus>,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub total: usize,
    pub campaigns: Vec<Campaign>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Feed status: running, stopped
    pub feed: String,
    /// Connected WebSocket clients
    pub ws_connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
