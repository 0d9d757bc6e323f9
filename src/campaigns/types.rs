//! Campaign data types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::admin::{Address, ValidationError};

/// Metadata hash used when none is given
pub const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Pause,
    Cancel,
}

/// Price feeds and token used when a campaign accepts the secondary asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSettings {
    pub wbtc_address: Option<Address>,
    pub eth_usd_feed: Option<Address>,
    pub wbtc_usd_feed: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub id: u32,
    pub address: Address,
    pub name: String,
    /// Percent of goal reached
    pub progress: f64,
    pub status: CampaignStatus,
    pub goal: f64,
    pub started: NaiveDate,
    pub creator: Option<Address>,
    pub admin: Option<Address>,
    pub expiry: Option<DateTime<Utc>>,
    pub metadata_hash: String,
    pub token: Option<TokenSettings>,
}

impl Campaign {
    /// Amount raised so far
    pub fn raised(&self) -> f64 {
        self.goal * self.progress / 100.0
    }
}

/// Headline numbers over all campaigns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub total: usize,
    pub active: usize,
    pub total_raised: f64,
    pub average_progress: f64,
}

impl CampaignSummary {
    pub fn from_campaigns(campaigns: &[Campaign]) -> Self {
        let total = campaigns.len();
        let average_progress = if total > 0 {
            campaigns.iter().map(|c| c.progress).sum::<f64>() / total as f64
        } else {
            0.0
        };

        Self {
            total,
            active: campaigns
                .iter()
                .filter(|c| c.status == CampaignStatus::Active)
                .count(),
            total_raised: campaigns.iter().map(Campaign::raised).sum(),
            average_progress,
        }
    }
}

/// Campaign creation form, as submitted
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignDraft {
    #[serde(default)]
    pub creator_address: String,
    #[serde(default)]
    pub label: String,
    /// Goal in USD, as typed
    #[serde(default)]
    pub goal_amount: String,
    #[serde(default)]
    pub metadata_hash: Option<String>,
    /// RFC 3339 or `YYYY-MM-DDTHH:MM`
    #[serde(default)]
    pub deadline: String,
    #[serde(default = "default_token_enabled")]
    pub token_enabled: bool,
    #[serde(default)]
    pub wbtc_address: Option<String>,
    #[serde(default)]
    pub eth_usd_feed: Option<String>,
    #[serde(default)]
    pub wbtc_usd_feed: Option<String>,
}

fn default_token_enabled() -> bool {
    true
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self {
            creator_address: String::new(),
            label: String::new(),
            goal_amount: String::new(),
            metadata_hash: None,
            deadline: String::new(),
            token_enabled: default_token_enabled(),
            wbtc_address: None,
            eth_usd_feed: None,
            wbtc_usd_feed: None,
        }
    }
}

/// A draft that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub creator: Address,
    pub label: String,
    pub goal: f64,
    pub metadata_hash: String,
    pub deadline: DateTime<Utc>,
    pub token: Option<TokenSettings>,
}

impl CampaignDraft {
    /// Check required fields and address formats
    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let creator = required("creator_address", &self.creator_address)?;
        let label = required("label", &self.label)?;
        let goal = required("goal_amount", &self.goal_amount)?;
        let deadline = required("deadline", &self.deadline)?;

        let creator = Address::parse(creator)?;

        let goal: f64 = goal.parse().map_err(|_| ValidationError::InvalidField {
            field: "goal_amount",
            reason: format!("not a number: {}", goal),
        })?;
        if !goal.is_finite() || goal <= 0.0 {
            return Err(ValidationError::InvalidField {
                field: "goal_amount",
                reason: "must be greater than zero".to_string(),
            });
        }

        let deadline = parse_deadline(deadline)?;

        let metadata_hash = self
            .metadata_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(ZERO_HASH)
            .to_string();

        let token = if self.token_enabled {
            Some(TokenSettings {
                wbtc_address: optional_address(&self.wbtc_address)?,
                eth_usd_feed: optional_address(&self.eth_usd_feed)?,
                wbtc_usd_feed: optional_address(&self.wbtc_usd_feed)?,
            })
        } else {
            None
        };

        Ok(ValidDraft {
            creator,
            label: label.to_string(),
            goal,
            metadata_hash,
            deadline,
            token,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn optional_address(value: &Option<String>) -> Result<Option<Address>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Address::parse(s).map(Some),
    }
}

fn parse_deadline(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidField {
            field: "deadline",
            reason: format!("unrecognized date: {}", s),
        })
}
