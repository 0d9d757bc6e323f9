//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::admin::{Address, SubmissionDelays, DEFAULT_OPERATOR};
use crate::campaigns::DEFAULT_FACTORY;
use crate::feed::{DashboardConfig, GeneratorConfig, PulseConfig};
use crate::websocket::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub submissions: SubmissionConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Live feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,

    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,

    #[serde(default = "default_chart_capacity")]
    pub chart_capacity: usize,

    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,

    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,

    #[serde(default = "default_aggregate_interval")]
    pub aggregate_interval_ms: u64,

    #[serde(default = "default_secondary_probability")]
    pub secondary_probability: f64,

    /// Fixed RNG seed for reproducible feeds
    pub seed: Option<u64>,

    /// Campaign every donation is attributed to; random when unset
    pub campaign: Option<String>,
}

fn default_min_interval() -> u64 {
    3_000
}

fn default_max_interval() -> u64 {
    7_000
}

fn default_chart_capacity() -> usize {
    20
}

fn default_recent_capacity() -> usize {
    10
}

fn default_highlight() -> u64 {
    1_000
}

fn default_aggregate_interval() -> u64 {
    60_000
}

fn default_secondary_probability() -> f64 {
    0.3
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
            max_interval_ms: default_max_interval(),
            chart_capacity: default_chart_capacity(),
            recent_capacity: default_recent_capacity(),
            highlight_ms: default_highlight(),
            aggregate_interval_ms: default_aggregate_interval(),
            secondary_probability: default_secondary_probability(),
            seed: None,
            campaign: None,
        }
    }
}

/// Simulated submission configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_admin_delay")]
    pub admin_delay_ms: u64,

    #[serde(default = "default_check_delay")]
    pub check_delay_ms: u64,

    #[serde(default = "default_campaign_delay")]
    pub campaign_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_factory")]
    pub factory: String,
}

fn default_admin_delay() -> u64 {
    1_500
}

fn default_check_delay() -> u64 {
    1_000
}

fn default_campaign_delay() -> u64 {
    2_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_factory() -> String {
    DEFAULT_FACTORY.to_string()
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            admin_delay_ms: default_admin_delay(),
            check_delay_ms: default_check_delay(),
            campaign_delay_ms: default_campaign_delay(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            factory: default_factory(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_connections")]
    pub max_ws_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_ws_connections: default_max_connections(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            max_connections: self.max_ws_connections,
            ..HubConfig::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Default config file locations, in search order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pulseboard").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/pulseboard/config.toml"));
        paths.push(PathBuf::from("./config.toml"));
        paths
    }

    /// Load from default locations or environment
    ///
    /// Returns the file the config came from, if any. A file that exists but
    /// does not load is an error, not a fallback to defaults.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_first(&Self::search_paths())
    }

    /// Load the first existing file in `paths`, or env-only defaults
    pub fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => {
                let config = Self::from_env();
                config.validate()?;
                Ok((config, None))
            }
        }
    }

    /// Apply `PULSEBOARD_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|v| v.trim().parse().ok())
        }

        // Feed overrides
        if let Some(seed) = parsed(lookup("PULSEBOARD_FEED_SEED")) {
            self.feed.seed = Some(seed);
        }
        if let Some(campaign) = lookup("PULSEBOARD_FEED_CAMPAIGN") {
            self.feed.campaign = Some(campaign);
        }
        if let Some(ms) = parsed(lookup("PULSEBOARD_FEED_MIN_INTERVAL_MS")) {
            self.feed.min_interval_ms = ms;
        }
        if let Some(ms) = parsed(lookup("PULSEBOARD_FEED_MAX_INTERVAL_MS")) {
            self.feed.max_interval_ms = ms;
        }

        // Submission overrides
        if let Some(ms) = parsed(lookup("PULSEBOARD_SUBMIT_DELAY_MS")) {
            self.submissions.admin_delay_ms = ms;
            self.submissions.check_delay_ms = ms;
            self.submissions.campaign_delay_ms = ms;
        }

        // API overrides
        if let Some(host) = lookup("PULSEBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = parsed(lookup("PULSEBOARD_API_PORT")) {
            self.api.port = port;
        }

        // Logging overrides
        if let Some(level) = lookup("PULSEBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PULSEBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject settings the feed or registries cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;
        if feed.min_interval_ms == 0 || feed.min_interval_ms > feed.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "feed interval must satisfy 0 < min <= max (got {}..{})",
                feed.min_interval_ms, feed.max_interval_ms
            )));
        }
        if feed.chart_capacity == 0 || feed.recent_capacity == 0 {
            return Err(ConfigError::Invalid(
                "feed capacities must be greater than zero".to_string(),
            ));
        }
        if feed.aggregate_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "aggregate_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&feed.secondary_probability) {
            return Err(ConfigError::Invalid(format!(
                "secondary_probability must be within 0..=1 (got {})",
                feed.secondary_probability
            )));
        }

        self.campaign_address()?;
        self.factory_address()?;
        Ok(())
    }

    fn campaign_address(&self) -> Result<Option<Address>, ConfigError> {
        self.feed
            .campaign
            .as_deref()
            .map(|s| {
                Address::parse(s).map_err(|e| ConfigError::Invalid(format!("feed.campaign: {}", e)))
            })
            .transpose()
    }

    pub fn factory_address(&self) -> Result<Address, ConfigError> {
        Address::parse(&self.submissions.factory)
            .map_err(|e| ConfigError::Invalid(format!("submissions.factory: {}", e)))
    }

    pub fn generator_config(&self) -> Result<GeneratorConfig, ConfigError> {
        Ok(GeneratorConfig {
            min_interval: Duration::from_millis(self.feed.min_interval_ms),
            max_interval: Duration::from_millis(self.feed.max_interval_ms),
            secondary_probability: self.feed.secondary_probability,
            campaign: self.campaign_address()?,
            ..GeneratorConfig::default()
        })
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            pulse: PulseConfig {
                chart_capacity: self.feed.chart_capacity,
                recent_capacity: self.feed.recent_capacity,
                highlight_ms: self.feed.highlight_ms,
            },
            aggregate_interval: Duration::from_millis(self.feed.aggregate_interval_ms),
            ..DashboardConfig::default()
        }
    }

    pub fn submission_delays(&self) -> SubmissionDelays {
        SubmissionDelays {
            admin: Duration::from_millis(self.submissions.admin_delay_ms),
            check: Duration::from_millis(self.submissions.check_delay_ms),
            campaign: Duration::from_millis(self.submissions.campaign_delay_ms),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.submissions.retry_backoff_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Pulseboard Configuration
#
# Environment variables override these settings:
# - PULSEBOARD_FEED_SEED
# - PULSEBOARD_FEED_CAMPAIGN
# - PULSEBOARD_FEED_MIN_INTERVAL_MS
# - PULSEBOARD_FEED_MAX_INTERVAL_MS
# - PULSEBOARD_SUBMIT_DELAY_MS
# - PULSEBOARD_API_HOST
# - PULSEBOARD_API_PORT
# - PULSEBOARD_LOG_LEVEL
# - PULSEBOARD_LOG_FORMAT

[feed]
# Gap between donations, drawn uniformly (ms)
min_interval_ms = 3000
max_interval_ms = 7000

# Points on the revenue chart and rows in the recent list
chart_capacity = 20
recent_capacity = 10

# How long the newest donation stays highlighted (ms)
highlight_ms = 1000

# Period of the hourly/minute/today counters (ms)
aggregate_interval_ms = 60000

# Share of donations paid in WBTC
secondary_probability = 0.3

# Fixed seed for a reproducible feed
# seed = 42

# Attribute every donation to one campaign
# campaign = "0x1234567890123456789012345678901234567890"

[submissions]
# Simulated round-trip per action (ms)
admin_delay_ms = 1500
check_delay_ms = 1000
campaign_delay_ms = 2000

# Retries for transient failures, with linear backoff
max_retries = 2
retry_backoff_ms = 250

# Factory that campaign creation is submitted to
factory = "{factory}"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Concurrent WebSocket clients
max_ws_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Admin console operator: {operator}
"#,
        factory = DEFAULT_FACTORY,
        operator = DEFAULT_OPERATOR,
    )
}
