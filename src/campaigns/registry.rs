//! In-memory campaign registry

use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{Campaign, CampaignDraft, CampaignStatus, CampaignSummary};
use crate::admin::{Address, Submission, SubmissionResult, Submitter};
use crate::feed::{Clock, SystemClock};

/// Factory contract new campaigns are created through
pub const DEFAULT_FACTORY: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

pub struct CampaignRegistry {
    campaigns: RwLock<Vec<Campaign>>,
    factory: Address,
    submitter: Submitter,
    clock: Arc<dyn Clock>,
}

impl CampaignRegistry {
    pub fn new(factory: Address, submitter: Submitter) -> Self {
        Self {
            campaigns: RwLock::new(Vec::new()),
            factory,
            submitter,
            clock: Arc::new(SystemClock),
        }
    }

    /// Registry preloaded with the demo campaigns
    pub fn seeded(factory: Address, submitter: Submitter) -> Self {
        Self {
            campaigns: RwLock::new(seed_campaigns()),
            ..Self::new(factory, submitter)
        }
    }

    /// Builder method: clock used for start dates
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn factory(&self) -> &Address {
        &self.factory
    }

    /// All campaigns, newest id first, optionally filtered by status
    pub async fn list(&self, status: Option<CampaignStatus>) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .read()
            .await
            .iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.id.cmp(&a.id));
        campaigns
    }

    pub async fn get(&self, id: u32) -> Option<Campaign> {
        self.campaigns
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub async fn summary(&self) -> CampaignSummary {
        CampaignSummary::from_campaigns(&self.campaigns.read().await)
    }

    /// Validate, submit and register a new campaign
    pub async fn create(&self, draft: &CampaignDraft) -> SubmissionResult<Campaign> {
        let valid = draft.validate()?;

        self.submitter
            .submit(&Submission::CreateCampaign(valid.label.clone()))
            .await?;

        let started = Utc
            .timestamp_millis_opt(self.clock.now_ms())
            .single()
            .unwrap_or_else(Utc::now)
            .date_naive();

        let mut campaigns = self.campaigns.write().await;
        let id = campaigns.iter().map(|c| c.id).max().map_or(1, |max| max + 1);

        let campaign = Campaign {
            id,
            address: synthetic_address(id),
            name: valid.label,
            progress: 0.0,
            status: CampaignStatus::Active,
            goal: valid.goal,
            started,
            creator: Some(valid.creator),
            admin: None,
            expiry: Some(valid.deadline),
            metadata_hash: valid.metadata_hash,
            token: valid.token,
        };
        campaigns.push(campaign.clone());

        tracing::info!(
            id,
            factory = %self.factory,
            address = %campaign.address,
            goal = campaign.goal,
            "Campaign created"
        );
        Ok(campaign)
    }
}

/// Stand-in for the address a factory deployment would return
fn synthetic_address(id: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(&id.to_be_bytes());
    Address::from_bytes(bytes)
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

pub(crate) fn seed_campaigns() -> Vec<Campaign> {
    let rows = [
        (35, "0x1234567890123456789012345678901234567890", "Konklux", 23.0, CampaignStatus::Active, 61.0, (2021, 9, 12), '1', '2', (2024, 12, 31)),
        (34, "0x2234567890123456789012345678901234567890", "Tres-Zap", 5.0, CampaignStatus::Pause, 47.0, (2021, 5, 11), '3', '4', (2024, 11, 30)),
        (33, "0x3234567890123456789012345678901234567890", "Keylex", 44.0, CampaignStatus::Active, 44.0, (2021, 9, 19), '5', '6', (2025, 1, 15)),
        (32, "0x4234567890123456789012345678901234567890", "Latlux", 69.0, CampaignStatus::Cancel, 37.0, (2021, 5, 16), '7', '8', (2024, 10, 20)),
    ];

    rows.into_iter()
        .map(
            |(id, address, name, progress, status, goal, (y, m, d), creator, admin, (ey, em, ed))| {
                Campaign {
                    id,
                    address: Address::new_unchecked(address),
                    name: name.to_string(),
                    progress,
                    status,
                    goal,
                    started: seed_date(y, m, d),
                    creator: Some(repeated_address(creator)),
                    admin: Some(repeated_address(admin)),
                    expiry: Utc.with_ymd_and_hms(ey, em, ed, 23, 59, 59).single(),
                    metadata_hash: super::types::ZERO_HASH.to_string(),
                    token: None,
                }
            },
        )
        .collect()
}

fn repeated_address(digit: char) -> Address {
    Address::new_unchecked(&format!("0x{}", digit.to_string().repeat(40)))
}
