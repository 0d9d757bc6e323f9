//! Live Feed Simulator
//!
//! Drives the dashboard's live widgets with synthetic data.
//!
//! ## Architecture
//!
//! - **FeedGenerator**: seedable source of donations and counter increments
//! - **RollingBuffer**: fixed-capacity FIFO display window
//! - **DonationPulse**: chart, recent donations and the running total
//! - **AggregateCounters**: per-hour, per-minute and to-date counters
//! - **Dashboard**: owns the widgets and a virtual-time `TimerQueue`
//! - **Driver**: runs a dashboard on a tokio task and publishes events
//!
//! Timers are the only suspension points. Within one dashboard they fire in
//! deadline order and never overlap, and unmounting cancels all of them.

mod aggregates;
mod buffer;
mod clock;
mod dashboard;
mod driver;
mod error;
mod generator;
mod pulse;
mod types;

pub use aggregates::{AggregateCounters, TopCampaigns, TOP_CAMPAIGN_LIMIT};
pub use buffer::RollingBuffer;
pub use clock::{Clock, ManualClock, SystemClock, TimerId, TimerQueue};
pub use dashboard::{Dashboard, DashboardConfig, DashboardSnapshot, FeedEvent, TimerKind};
pub use driver::{feed_event_to_ws, spawn_feed, FeedHandle};
pub use error::{FeedError, FeedResult};
pub use generator::{FeedGenerator, GeneratorConfig};
pub use pulse::{DonationPulse, DonationUpdate, PulseConfig, PulseSnapshot};
pub use types::{
    bucket_label, AggregateIncrement, CampaignStats, Currency, PlatformStats, Sample, SampleId,
    TimeSeriesPoint,
};
