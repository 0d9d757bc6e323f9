//! Dashboard widget lifecycle
//!
//! A `Dashboard` owns both live widgets, the generator and a single timer
//! queue. Nothing here sleeps: `advance` fires whatever is due at the time it
//! is given, so the same code runs under the tokio driver and under a
//! `ManualClock` in tests.

use serde::Serialize;
use std::time::Duration;

use super::aggregates::{AggregateCounters, TopCampaigns, TOP_CAMPAIGN_LIMIT};
use super::clock::TimerQueue;
use super::error::{FeedError, FeedResult};
use super::generator::FeedGenerator;
use super::pulse::{DonationPulse, DonationUpdate, PulseConfig, PulseSnapshot};
use super::types::{CampaignStats, PlatformStats, SampleId};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Generate the next donation
    DonationTick,
    /// Drop the highlight of a donation
    HighlightClear(SampleId),
    /// Advance the aggregate counters
    AggregateTick,
}

/// State change produced by a fired timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
    Donation(DonationUpdate),
    HighlightCleared { id: SampleId },
    Aggregates(PlatformStats),
}

/// Dashboard-level settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub pulse: PulseConfig,
    /// Fixed period of the aggregate tick
    pub aggregate_interval: Duration,
    pub initial_stats: PlatformStats,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            pulse: PulseConfig::default(),
            aggregate_interval: Duration::from_millis(60_000),
            initial_stats: PlatformStats::default(),
        }
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub mounted: bool,
    pub pulse: PulseSnapshot,
    pub stats: PlatformStats,
    pub top_campaigns: Vec<CampaignStats>,
    /// Deadline of the next timer, if any
    pub next_tick_ms: Option<i64>,
}

pub struct Dashboard {
    config: DashboardConfig,
    generator: FeedGenerator,
    pulse: DonationPulse,
    aggregates: AggregateCounters,
    top_campaigns: TopCampaigns,
    timers: TimerQueue<TimerKind>,
    mounted: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, generator: FeedGenerator) -> FeedResult<Self> {
        if config.aggregate_interval.is_zero() {
            return Err(FeedError::InvalidInterval {
                min_ms: 0,
                max_ms: 0,
            });
        }

        Ok(Self {
            pulse: DonationPulse::new(config.pulse)?,
            aggregates: AggregateCounters::new(config.initial_stats),
            top_campaigns: TopCampaigns::default(),
            timers: TimerQueue::new(),
            generator,
            config,
            mounted: false,
        })
    }

    /// Replace the campaigns shown by the top-campaigns widget
    pub fn with_top_campaigns(mut self, campaigns: Vec<CampaignStats>) -> Self {
        self.top_campaigns = TopCampaigns::new(campaigns);
        self
    }

    /// Populate the widgets and start both timers
    pub fn mount(&mut self, now_ms: i64) -> FeedResult<()> {
        if self.mounted {
            return Err(FeedError::AlreadyMounted);
        }

        let initial = self
            .generator
            .initial_series(now_ms, self.config.pulse.chart_capacity);
        self.pulse.seed(initial);
        self.aggregates.reset();

        let first_tick = self.generator.next_interval();
        self.timers
            .schedule_after(now_ms, first_tick, TimerKind::DonationTick);
        self.timers.schedule_after(
            now_ms,
            self.config.aggregate_interval,
            TimerKind::AggregateTick,
        );
        self.mounted = true;

        tracing::info!(
            now_ms,
            chart_points = self.pulse.chart_len(),
            first_tick_ms = first_tick.as_millis() as u64,
            "Dashboard mounted"
        );
        Ok(())
    }

    /// Cancel every timer; the widgets stop changing
    pub fn unmount(&mut self) {
        let cancelled = self.timers.cancel_all();
        if self.mounted {
            tracing::info!(cancelled, "Dashboard unmounted");
        }
        self.mounted = false;
    }

    /// Fire every timer due at `now_ms`, in order
    pub fn advance(&mut self, now_ms: i64) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        if !self.mounted {
            return events;
        }

        while let Some((_, deadline, kind)) = self.timers.pop_due(now_ms) {
            if let Some(event) = self.fire(deadline, kind) {
                events.push(event);
            }
        }

        events
    }

    /// Run one timer at its own deadline
    fn fire(&mut self, at_ms: i64, kind: TimerKind) -> Option<FeedEvent> {
        match kind {
            TimerKind::DonationTick => {
                let sample = self.generator.next_sample(at_ms);
                let id = sample.id;
                let update = self.pulse.apply(sample);

                self.timers.schedule_after(
                    at_ms,
                    Duration::from_millis(self.config.pulse.highlight_ms),
                    TimerKind::HighlightClear(id),
                );
                let next = self.generator.next_interval();
                self.timers
                    .schedule_after(at_ms, next, TimerKind::DonationTick);

                Some(FeedEvent::Donation(update))
            }
            TimerKind::HighlightClear(id) => self
                .pulse
                .clear_highlight(id)
                .then_some(FeedEvent::HighlightCleared { id }),
            TimerKind::AggregateTick => {
                let increment = self.generator.aggregate_increment();
                let stats = self.aggregates.apply(increment);
                self.timers.schedule_after(
                    at_ms,
                    self.config.aggregate_interval,
                    TimerKind::AggregateTick,
                );

                tracing::debug!(
                    hourly = stats.hourly_total,
                    today = stats.today_total,
                    "Aggregates updated"
                );
                Some(FeedEvent::Aggregates(stats))
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.next_deadline()
    }

    pub fn total_raised(&self) -> f64 {
        self.pulse.total_raised()
    }

    pub fn stats(&self) -> PlatformStats {
        self.aggregates.stats()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            mounted: self.mounted,
            pulse: self.pulse.snapshot(),
            stats: self.aggregates.stats(),
            top_campaigns: self.top_campaigns.top(TOP_CAMPAIGN_LIMIT),
            next_tick_ms: self.timers.next_deadline(),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}
