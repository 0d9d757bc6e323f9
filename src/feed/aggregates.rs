//! Platform aggregate counters and the top-campaigns widget
//!
//! The counters advance on their own slow tick with their own random
//! values. They are not derived from the donation stream. The hourly and
//! to-date figures accumulate; the per-minute figure is a rate and is
//! replaced on every tick.

use serde::Serialize;

use super::types::{AggregateIncrement, CampaignStats, PlatformStats};
use crate::admin::Address;

/// Campaigns listed by the top-campaigns widget
pub const TOP_CAMPAIGN_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct AggregateCounters {
    initial: PlatformStats,
    stats: PlatformStats,
    ticks: u64,
}

impl AggregateCounters {
    pub fn new(initial: PlatformStats) -> Self {
        Self {
            initial,
            stats: initial,
            ticks: 0,
        }
    }

    /// Apply one slow tick
    pub fn apply(&mut self, increment: AggregateIncrement) -> PlatformStats {
        self.stats.hourly_total += increment.hourly;
        self.stats.minute_total = increment.minute;
        self.stats.today_total += increment.today;
        self.ticks += 1;
        self.stats
    }

    /// Restore the seeded values
    pub fn reset(&mut self) {
        self.stats = self.initial;
        self.ticks = 0;
    }

    pub fn stats(&self) -> PlatformStats {
        self.stats
    }

    /// Slow ticks applied since mount
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for AggregateCounters {
    fn default() -> Self {
        Self::new(PlatformStats::default())
    }
}

/// Ranked list of the best-growing campaigns
#[derive(Debug, Clone, Serialize)]
pub struct TopCampaigns {
    campaigns: Vec<CampaignStats>,
}

impl TopCampaigns {
    pub fn new(mut campaigns: Vec<CampaignStats>) -> Self {
        campaigns.sort_by(|a, b| b.growth.total_cmp(&a.growth));
        Self { campaigns }
    }

    /// The `limit` best campaigns by growth, best first
    pub fn top(&self, limit: usize) -> Vec<CampaignStats> {
        self.campaigns.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

impl Default for TopCampaigns {
    fn default() -> Self {
        Self::new(seed_campaign_stats())
    }
}

fn seed_campaign_stats() -> Vec<CampaignStats> {
    let rows = [
        ("0x1234567890123456789012345678901234567890", "Konklux Innovation", 45_000.0, 23.5, 127, 850.0),
        ("0x2234567890123456789012345678901234567890", "Blockchain Education", 32_000.0, 18.2, 94, 620.0),
        ("0x3234567890123456789012345678901234567890", "DeFi Protocol", 28_000.0, 15.8, 78, 520.0),
        ("0x4234567890123456789012345678901234567890", "NFT Marketplace", 21_000.0, 12.4, 56, 380.0),
        ("0x5234567890123456789012345678901234567890", "Web3 Gaming", 18_000.0, 10.1, 42, 290.0),
    ];

    rows.into_iter()
        .map(|(address, name, raised, growth, contributors, hourly_rate)| CampaignStats {
            address: Address::new_unchecked(address),
            name: name.to_string(),
            raised,
            growth,
            contributors,
            hourly_rate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values() {
        let counters = AggregateCounters::default();
        let stats = counters.stats();
        assert_eq!(stats.hourly_total, 2660.0);
        assert_eq!(stats.minute_total, 44.3);
        assert_eq!(stats.today_total, 52450.0);
        assert_eq!(counters.ticks(), 0);
    }

    #[test]
    fn test_apply_accumulates_totals_and_replaces_rate() {
        let mut counters = AggregateCounters::default();
        let stats = counters.apply(AggregateIncrement {
            hourly: 10.0,
            minute: 25.0,
            today: 400.0,
        });

        assert_eq!(stats.hourly_total, 2670.0);
        assert_eq!(stats.minute_total, 25.0);
        assert_eq!(stats.today_total, 52850.0);
        assert_eq!(counters.ticks(), 1);

        let stats = counters.apply(AggregateIncrement {
            hourly: 5.0,
            minute: 61.0,
            today: 100.0,
        });
        assert_eq!(stats.hourly_total, 2675.0);
        assert_eq!(stats.minute_total, 61.0);
        assert_eq!(stats.today_total, 52950.0);

        counters.reset();
        assert_eq!(counters.stats(), PlatformStats::default());
    }

    #[test]
    fn test_top_campaigns_ranked_by_growth() {
        let mut rows = seed_campaign_stats();
        rows.reverse();
        rows.push(CampaignStats {
            address: Address::new_unchecked("0x6234567890123456789012345678901234567890"),
            name: "Rising Star".to_string(),
            raised: 1_000.0,
            growth: 99.0,
            contributors: 3,
            hourly_rate: 10.0,
        });

        let top = TopCampaigns::new(rows);
        let ranked = top.top(TOP_CAMPAIGN_LIMIT);

        assert_eq!(top.len(), 6);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].name, "Rising Star");
        assert_eq!(ranked[1].name, "Konklux Innovation");
        assert!(ranked.windows(2).all(|w| w[0].growth >= w[1].growth));
    }
}
