//! WebSocket Message Types
//!
//! Defines all message types exchanged between dashboard clients and the
//! Pulseboard server.

use serde::{Deserialize, Serialize};

use crate::admin::ActivityEntry;
use crate::campaigns::Campaign;
use crate::feed::{DashboardSnapshot, DonationUpdate, PlatformStats, Sample, SampleId, TimeSeriesPoint};

pub const TOPIC_DONATIONS: &str = "feed.donations";
pub const TOPIC_HIGHLIGHT: &str = "feed.highlight";
pub const TOPIC_AGGREGATES: &str = "feed.aggregates";
pub const TOPIC_ADMIN_ACTIVITY: &str = "admin.activity";
pub const TOPIC_CAMPAIGNS: &str = "campaigns";
pub const TOPIC_SYSTEM: &str = "system";

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// Topics such as "feed.donations" or "feed.*"
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Ask for the full dashboard state
    Snapshot,
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new donation arrived
    Donation {
        sample: Sample,
        point: TimeSeriesPoint,
        total_raised: f64,
    },
    /// The highlight for a donation expired
    HighlightCleared { id: SampleId },
    /// Aggregate counters moved
    Aggregates { stats: PlatformStats },
    /// An admin console action completed
    AdminActivity { entry: ActivityEntry },
    /// A campaign was created
    CampaignCreated { campaign: Campaign },
    /// Full dashboard state
    Snapshot { dashboard: DashboardSnapshot },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Server-side notice
    System { message: String },
    /// Error message
    Error { message: String },
    /// Connection established
    Connected { connection_id: String },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "feed.donations")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    pub fn donation(update: &DonationUpdate) -> Self {
        Self {
            topic: TOPIC_DONATIONS.to_string(),
            message: ServerMessage::Donation {
                sample: update.sample.clone(),
                point: update.point.clone(),
                total_raised: update.total_raised,
            },
        }
    }

    pub fn highlight_cleared(id: SampleId) -> Self {
        Self {
            topic: TOPIC_HIGHLIGHT.to_string(),
            message: ServerMessage::HighlightCleared { id },
        }
    }

    pub fn aggregates(stats: PlatformStats) -> Self {
        Self {
            topic: TOPIC_AGGREGATES.to_string(),
            message: ServerMessage::Aggregates { stats },
        }
    }

    pub fn admin_activity(entry: ActivityEntry) -> Self {
        Self {
            topic: TOPIC_ADMIN_ACTIVITY.to_string(),
            message: ServerMessage::AdminActivity { entry },
        }
    }

    pub fn campaign_created(campaign: Campaign) -> Self {
        Self {
            topic: TOPIC_CAMPAIGNS.to_string(),
            message: ServerMessage::CampaignCreated { campaign },
        }
    }

    pub fn system(message: &str) -> Self {
        Self {
            topic: TOPIC_SYSTEM.to_string(),
            message: ServerMessage::System {
                message: message.to_string(),
            },
        }
    }
}
