//! # Pulseboard
//!
//! Live dashboard service for a crowdfunding platform. Serves campaign
//! listings, an admin console and live-updating donation widgets over HTTP and
//! WebSocket.
//!
//! ## Features
//!
//! - **Live feed**: seedable synthetic donations on a virtual-time scheduler
//! - **Rolling windows**: fixed-capacity chart and recent-donation buffers
//! - **Admin console**: validated, simulated submissions with an activity log
//! - **Real-time**: WebSocket topics for donations, counters and admin activity
//!
//! ## Modules
//!
//! - [`feed`]: Feed generator, rolling buffers, widgets and the async driver
//! - [`admin`]: Address validation, submissions and the admin registry
//! - [`campaigns`]: Campaign registry and creation drafts
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Connection hub and topic streaming
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulseboard::feed::*;
//!
//! let generator = FeedGenerator::new(GeneratorConfig::default(), Some(42))?;
//! let mut dashboard = Dashboard::new(DashboardConfig::default(), generator)?;
//!
//! let clock = ManualClock::new(1_700_000_000_000);
//! dashboard.mount(clock.now_ms())?;
//!
//! // Ten virtual seconds: at least one donation, probably two
//! clock.advance(std::time::Duration::from_secs(10));
//! for event in dashboard.advance(clock.now_ms()) {
//!     println!("{:?}", event);
//! }
//!
//! dashboard.unmount();
//! assert_eq!(dashboard.pending_timers(), 0);
//! # Ok::<(), pulseboard::feed::FeedError>(())
//! ```

pub mod admin;
pub mod api;
pub mod campaigns;
pub mod config;
pub mod feed;
pub mod websocket;

// Re-export top-level types for convenience
pub use feed::{
    spawn_feed, Clock, Dashboard, DashboardConfig, DashboardSnapshot, FeedError, FeedEvent,
    FeedGenerator, FeedHandle, FeedResult, GeneratorConfig, RollingBuffer, Sample, SystemClock,
};

pub use admin::{
    is_valid_address, Address, AdminRegistry, SimulatedTransport, SubmissionError,
    SubmissionTransport, Submitter, ValidationError,
};

pub use campaigns::{Campaign, CampaignDraft, CampaignRegistry};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{generate_default_config, ApiConfig, Config, ConfigError, LoggingConfig};
