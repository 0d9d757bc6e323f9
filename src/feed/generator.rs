//! Feed Generator
//!
//! Pure synthetic data generation. The generator owns a seedable RNG and knows
//! nothing about buffers, timers or rendering: callers hand it the current time
//! and store what it returns. Seeding it makes every run reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::time::Duration;

use super::error::{FeedError, FeedResult};
use super::types::{AggregateIncrement, Currency, Sample, SampleId, TimeSeriesPoint};
use crate::admin::Address;

/// Spacing of the initial chart batch
const INITIAL_POINT_SPACING_MS: i64 = 60_000;

/// Ranges and intervals used to generate synthetic data
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Shortest gap between two donation ticks
    pub min_interval: Duration,
    /// Longest gap between two donation ticks
    pub max_interval: Duration,
    /// Donation amount in asset units
    pub amount_range: Range<f64>,
    /// Donation value in USD
    pub usd_range: Range<f64>,
    /// Probability that a donation is in the secondary asset
    pub secondary_probability: f64,
    /// Fixed campaign for every donation; random addresses when `None`
    pub campaign: Option<Address>,
    /// Base total of the initial chart batch
    pub initial_base: f64,
    /// Random spread added to each initial point
    pub initial_jitter: f64,
    /// Per-point step of the initial chart batch
    pub initial_step: f64,
    pub hourly_increment: Range<f64>,
    /// Per-minute rate, redrawn each slow tick
    pub minute_rate: Range<f64>,
    pub today_increment: Range<f64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(3_000),
            max_interval: Duration::from_millis(7_000),
            amount_range: 0.1..2.1,
            usd_range: 500.0..5_500.0,
            secondary_probability: 0.3,
            campaign: None,
            initial_base: 10_000.0,
            initial_jitter: 5_000.0,
            initial_step: 500.0,
            hourly_increment: 0.0..100.0,
            minute_rate: 20.0..70.0,
            today_increment: 0.0..500.0,
        }
    }
}

impl GeneratorConfig {
    /// Check that every range can be sampled from
    pub fn validate(&self) -> FeedResult<()> {
        let min_ms = self.min_interval.as_millis() as u64;
        let max_ms = self.max_interval.as_millis() as u64;
        if min_ms == 0 || min_ms > max_ms {
            return Err(FeedError::InvalidInterval { min_ms, max_ms });
        }

        check_range("amount", &self.amount_range)?;
        check_range("usd", &self.usd_range)?;
        check_range("hourly_increment", &self.hourly_increment)?;
        check_range("minute_rate", &self.minute_rate)?;
        check_range("today_increment", &self.today_increment)?;

        if !(0.0..=1.0).contains(&self.secondary_probability) {
            return Err(FeedError::InvalidRange {
                name: "secondary_probability",
                low: self.secondary_probability,
                high: self.secondary_probability,
            });
        }

        if !self.initial_jitter.is_finite() || self.initial_jitter < 0.0 {
            return Err(FeedError::InvalidRange {
                name: "initial_jitter",
                low: 0.0,
                high: self.initial_jitter,
            });
        }

        Ok(())
    }
}

fn check_range(name: &'static str, range: &Range<f64>) -> FeedResult<()> {
    if range.start.is_finite() && range.end.is_finite() && range.start < range.end {
        Ok(())
    } else {
        Err(FeedError::InvalidRange {
            name,
            low: range.start,
            high: range.end,
        })
    }
}

/// Seedable source of synthetic donations and counter increments
#[derive(Debug)]
pub struct FeedGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    last_id: Option<i64>,
}

impl FeedGenerator {
    /// Create a generator; `seed = None` draws a seed from the OS
    pub fn new(config: GeneratorConfig, seed: Option<u64>) -> FeedResult<Self> {
        config.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            rng,
            last_id: None,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the next donation
    ///
    /// The id is the current timestamp, bumped past the previous id when two
    /// donations land in the same millisecond, so ids never repeat.
    pub fn next_sample(&mut self, now_ms: i64) -> Sample {
        let id = match self.last_id {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        };
        self.last_id = Some(id);

        let campaign = match &self.config.campaign {
            Some(address) => address.clone(),
            None => self.random_address(),
        };

        let currency = if self.rng.gen_bool(self.config.secondary_probability) {
            Currency::Wbtc
        } else {
            Currency::Eth
        };

        Sample {
            id: SampleId(id),
            campaign,
            amount: self.rng.gen_range(self.config.amount_range.clone()),
            currency,
            usd_value: self.rng.gen_range(self.config.usd_range.clone()),
            timestamp: now_ms,
        }
    }

    /// Delay until the next donation tick
    pub fn next_interval(&mut self) -> Duration {
        let min_ms = self.config.min_interval.as_millis() as u64;
        let max_ms = self.config.max_interval.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(min_ms..=max_ms))
    }

    /// Initial chart batch: `len` points one minute apart, the last at `now_ms`
    pub fn initial_series(&mut self, now_ms: i64, len: usize) -> Vec<TimeSeriesPoint> {
        (0..len)
            .map(|i| {
                let minutes_ago = (len - 1 - i) as i64;
                let timestamp = now_ms - minutes_ago * INITIAL_POINT_SPACING_MS;
                let jitter = self.rng.gen::<f64>() * self.config.initial_jitter;
                let total = self.config.initial_base + jitter + i as f64 * self.config.initial_step;
                TimeSeriesPoint::new(timestamp, total)
            })
            .collect()
    }

    /// Values for one slow aggregate tick
    pub fn aggregate_increment(&mut self) -> AggregateIncrement {
        AggregateIncrement {
            hourly: self.rng.gen_range(self.config.hourly_increment.clone()),
            minute: self.rng.gen_range(self.config.minute_rate.clone()),
            today: self.rng.gen_range(self.config.today_increment.clone()),
        }
    }

    fn random_address(&mut self) -> Address {
        Address::from_bytes(self.rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::is_valid_address;

    fn seeded(seed: u64) -> FeedGenerator {
        FeedGenerator::new(GeneratorConfig::default(), Some(seed)).unwrap()
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded(7);
        let mut b = seeded(7);

        for tick in 0..50 {
            let now = 1_000_000 + tick * 4_000;
            assert_eq!(a.next_sample(now), b.next_sample(now));
            assert_eq!(a.next_interval(), b.next_interval());
        }
    }

    #[test]
    fn test_sample_fields_in_range() {
        let mut generator = seeded(1);
        let config = GeneratorConfig::default();

        for tick in 0..500 {
            let sample = generator.next_sample(tick * 3_000);
            assert!(config.amount_range.contains(&sample.amount));
            assert!(config.usd_range.contains(&sample.usd_value));
            assert!(is_valid_address(sample.campaign.as_str()));
            assert_eq!(sample.timestamp, tick * 3_000);
        }
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut generator = seeded(2);

        let first = generator.next_sample(5_000);
        let second = generator.next_sample(5_000);
        let third = generator.next_sample(4_000);
        let fourth = generator.next_sample(9_000);

        assert_eq!(first.id, SampleId(5_000));
        assert_eq!(second.id, SampleId(5_001));
        assert_eq!(third.id, SampleId(5_002));
        assert_eq!(fourth.id, SampleId(9_000));
    }

    #[test]
    fn test_fixed_campaign() {
        let campaign: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
        let config = GeneratorConfig {
            campaign: Some(campaign.clone()),
            ..Default::default()
        };
        let mut generator = FeedGenerator::new(config, Some(3)).unwrap();

        assert_eq!(generator.next_sample(0).campaign, campaign);
    }

    #[test]
    fn test_interval_bounds() {
        let mut generator = seeded(4);
        for _ in 0..1_000 {
            let interval = generator.next_interval();
            assert!(interval >= Duration::from_millis(3_000));
            assert!(interval <= Duration::from_millis(7_000));
        }
    }

    #[test]
    fn test_initial_series_shape() {
        let mut generator = seeded(5);
        let now = 1_710_081_000_000;
        let points = generator.initial_series(now, 20);

        assert_eq!(points.len(), 20);
        assert_eq!(points[19].timestamp, now);
        assert_eq!(points[0].timestamp, now - 19 * 60_000);
        assert_eq!(points[19].label, "14:30");

        for (i, point) in points.iter().enumerate() {
            let base = 10_000.0 + i as f64 * 500.0;
            assert!(point.total >= base && point.total < base + 5_000.0);
        }
    }

    #[test]
    fn test_aggregate_increment_ranges() {
        let mut generator = seeded(6);
        for _ in 0..200 {
            let inc = generator.aggregate_increment();
            assert!((0.0..100.0).contains(&inc.hourly));
            assert!((20.0..70.0).contains(&inc.minute));
            assert!((0.0..500.0).contains(&inc.today));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            min_interval: Duration::from_millis(7_000),
            max_interval: Duration::from_millis(3_000),
            ..Default::default()
        };
        assert!(matches!(
            FeedGenerator::new(config, None),
            Err(FeedError::InvalidInterval { .. })
        ));

        let config = GeneratorConfig {
            usd_range: 10.0..10.0,
            ..Default::default()
        };
        assert!(matches!(
            FeedGenerator::new(config, None),
            Err(FeedError::InvalidRange { name: "usd", .. })
        ));

        let config = GeneratorConfig {
            secondary_probability: 1.5,
            ..Default::default()
        };
        assert!(FeedGenerator::new(config, None).is_err());
    }
}
