//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::admin::AdminRegistry;
use crate::campaigns::CampaignRegistry;
use crate::config::ApiConfig;
use crate::feed::DashboardSnapshot;
use crate::websocket::ConnectionHub;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Latest dashboard snapshot published by the feed driver
    pub feed: watch::Receiver<DashboardSnapshot>,
    /// Admin console registry
    pub admins: Arc<AdminRegistry>,
    /// Campaign registry
    pub campaigns: Arc<CampaignRegistry>,
    /// WebSocket connection hub for real-time streaming
    pub ws_hub: Arc<ConnectionHub>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        feed: watch::Receiver<DashboardSnapshot>,
        admins: Arc<AdminRegistry>,
        campaigns: Arc<CampaignRegistry>,
        ws_hub: Arc<ConnectionHub>,
        config: ApiConfig,
    ) -> Self {
        Self {
            feed,
            admins,
            campaigns,
            ws_hub,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Current dashboard state
    pub fn dashboard(&self) -> DashboardSnapshot {
        self.feed.borrow().clone()
    }

    /// Whether the live feed is mounted and ticking
    pub fn feed_running(&self) -> bool {
        self.feed.borrow().mounted
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

/// State backed by a mounted, seeded dashboard and instant submissions
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::admin::{Address, SimulatedTransport, SubmissionDelays, Submitter};
    use crate::campaigns::DEFAULT_FACTORY;
    use crate::feed::{Dashboard, DashboardConfig, FeedGenerator, GeneratorConfig};
    use crate::websocket::HubConfig;

    let generator = FeedGenerator::new(GeneratorConfig::default(), Some(5)).unwrap();
    let mut dashboard = Dashboard::new(DashboardConfig::default(), generator).unwrap();
    dashboard.mount(1_699_000_000_000).unwrap();
    let (_tx, rx) = watch::channel(dashboard.snapshot());

    let submitter = Submitter::new(Arc::new(SimulatedTransport::new(SubmissionDelays::none())));
    let factory: Address = DEFAULT_FACTORY.parse().unwrap();

    AppState::new(
        rx,
        Arc::new(AdminRegistry::seeded(submitter.clone())),
        Arc::new(CampaignRegistry::seeded(factory, submitter)),
        Arc::new(ConnectionHub::new(HubConfig::default())),
        ApiConfig::default(),
    )
}
