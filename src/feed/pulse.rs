//! Donation pulse widget
//!
//! Owns the display windows for the donation chart and the recent donations
//! list, plus the running "total raised" counter. The windows evict; the
//! counter never goes down.

use serde::Serialize;

use super::buffer::RollingBuffer;
use super::error::FeedResult;
use super::types::{Sample, SampleId, TimeSeriesPoint};

/// Window sizes for the pulse widget
#[derive(Debug, Clone, Copy)]
pub struct PulseConfig {
    /// Points kept on the chart
    pub chart_capacity: usize,
    /// Donations kept in the recent list
    pub recent_capacity: usize,
    /// How long a new donation stays highlighted, in milliseconds
    pub highlight_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            chart_capacity: 20,
            recent_capacity: 10,
            highlight_ms: 1_000,
        }
    }
}

/// Result of applying one donation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationUpdate {
    pub sample: Sample,
    /// Point appended to the chart
    pub point: TimeSeriesPoint,
    /// Running total after this donation
    pub total_raised: f64,
    /// Chart point evicted to make room, if any
    #[serde(skip)]
    pub evicted: Option<TimeSeriesPoint>,
}

/// Read-only view of the pulse widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseSnapshot {
    /// Chart points, oldest first
    pub chart: Vec<TimeSeriesPoint>,
    /// Recent donations, newest first
    pub recent: Vec<Sample>,
    pub total_raised: f64,
    pub last_donation: Option<Sample>,
    /// Donation currently highlighted on the chart
    pub highlight: Option<SampleId>,
}

#[derive(Debug)]
pub struct DonationPulse {
    config: PulseConfig,
    chart: RollingBuffer<TimeSeriesPoint>,
    recent: RollingBuffer<Sample>,
    total_raised: f64,
    last_donation: Option<Sample>,
    highlight: Option<SampleId>,
}

impl DonationPulse {
    /// Create an empty widget
    pub fn new(config: PulseConfig) -> FeedResult<Self> {
        Ok(Self {
            chart: RollingBuffer::new(config.chart_capacity)?,
            recent: RollingBuffer::new(config.recent_capacity)?,
            config,
            total_raised: 0.0,
            last_donation: None,
            highlight: None,
        })
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    /// Load the initial chart batch
    ///
    /// The running total starts at the last initial point.
    pub fn seed(&mut self, initial: Vec<TimeSeriesPoint>) {
        self.chart.clear();
        self.recent.clear();
        self.chart.extend(initial);
        self.total_raised = self.chart.latest().map(|p| p.total).unwrap_or(0.0);
        self.last_donation = None;
        self.highlight = None;
    }

    /// Record a donation and highlight it
    pub fn apply(&mut self, sample: Sample) -> DonationUpdate {
        let previous = self.chart.latest().map(|p| p.total).unwrap_or(self.total_raised);
        let point = TimeSeriesPoint::new(sample.timestamp, previous + sample.usd_value);

        let evicted = self.chart.insert(point.clone());
        self.recent.insert(sample.clone());
        self.total_raised += sample.usd_value;
        self.highlight = Some(sample.id);
        self.last_donation = Some(sample.clone());

        tracing::debug!(
            id = %sample.id,
            usd_value = sample.usd_value,
            total_raised = self.total_raised,
            "Donation applied"
        );

        DonationUpdate {
            sample,
            point,
            total_raised: self.total_raised,
            evicted,
        }
    }

    /// Clear the highlight if it still belongs to `id`
    ///
    /// Returns true if the highlight was cleared.
    pub fn clear_highlight(&mut self, id: SampleId) -> bool {
        if self.highlight == Some(id) {
            self.highlight = None;
            true
        } else {
            false
        }
    }

    pub fn highlight(&self) -> Option<SampleId> {
        self.highlight
    }

    pub fn total_raised(&self) -> f64 {
        self.total_raised
    }

    pub fn chart_len(&self) -> usize {
        self.chart.len()
    }

    pub fn snapshot(&self) -> PulseSnapshot {
        PulseSnapshot {
            chart: self.chart.snapshot(),
            recent: self.recent.newest_first(),
            total_raised: self.total_raised,
            last_donation: self.last_donation.clone(),
            highlight: self.highlight,
        }
    }
}
