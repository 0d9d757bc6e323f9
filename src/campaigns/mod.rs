//! Campaign Registry
//!
//! Campaign listings, headline statistics and campaign creation.

mod registry;
mod types;

pub use registry::{CampaignRegistry, DEFAULT_FACTORY};
pub use types::{
    Campaign, CampaignDraft, CampaignStatus, CampaignSummary, TokenSettings, ValidDraft,
    ZERO_HASH,
};
