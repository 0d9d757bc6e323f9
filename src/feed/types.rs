//! Core data types for the live feed
//!
//! - `Sample`: one synthetic donation
//! - `TimeSeriesPoint`: one point of the cumulative "total raised" chart
//! - `PlatformStats`: the slow aggregate counters
//! - `CampaignStats`: a row of the top-campaigns widget

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::admin::Address;

/// Unique, strictly increasing donation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub i64);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset a donation was made in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Primary asset
    Eth,
    /// Secondary asset
    Wbtc,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eth => "ETH",
            Currency::Wbtc => "WBTC",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single synthetic donation
///
/// Immutable once generated; the pulse widget only ever clones it into its
/// display window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    /// Campaign the donation went to
    pub campaign: Address,
    /// Amount in `currency` units
    pub amount: f64,
    pub currency: Currency,
    /// Value of the donation in USD
    pub usd_value: f64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl Sample {
    /// One-line summary, e.g. `0.5000 ETH ($1250.00)`
    pub fn summary(&self) -> String {
        format!("{:.4} {} (${:.2})", self.amount, self.currency, self.usd_value)
    }
}

/// One point of the cumulative total chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Time bucket label (`HH:MM`)
    pub label: String,
    /// Cumulative USD raised at this point
    pub total: f64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: i64, total: f64) -> Self {
        Self {
            label: bucket_label(timestamp),
            total,
            timestamp,
        }
    }
}

/// Format a millisecond timestamp as an `HH:MM` bucket label (UTC)
pub fn bucket_label(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Platform-wide aggregate counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub hourly_total: f64,
    pub minute_total: f64,
    pub today_total: f64,
}

impl Default for PlatformStats {
    fn default() -> Self {
        Self {
            hourly_total: 2660.0,
            minute_total: 44.3,
            today_total: 52450.0,
        }
    }
}

/// Random values for one slow tick of `PlatformStats`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateIncrement {
    /// Added to `hourly_total`
    pub hourly: f64,
    /// Replaces `minute_total`
    pub minute: f64,
    /// Added to `today_total`
    pub today: f64,
}

/// A row of the top-campaigns widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub address: Address,
    pub name: String,
    pub raised: f64,
    /// Growth in percent
    pub growth: f64,
    pub contributors: u32,
    /// USD raised per hour
    pub hourly_rate: f64,
}
