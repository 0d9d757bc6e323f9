//! Admin registry
//!
//! Holds the admin list, the current creator and the activity log. Every
//! mutating action is validated first, then submitted, then applied; a failure
//! at any step leaves all three untouched.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::address::Address;
use super::error::{SubmissionResult, ValidationError};
use super::submit::{Submission, Submitter};
use crate::feed::{Clock, SystemClock};

/// Account that performs console actions in the simulated system
pub const DEFAULT_OPERATOR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Pending,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admin {
    pub address: Address,
    pub added_by: Address,
    pub added_at: NaiveDate,
    pub status: AdminStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdminAction {
    #[serde(rename = "Admin Added")]
    AdminAdded,
    #[serde(rename = "Admin Removed")]
    AdminRemoved,
    #[serde(rename = "Admin Status Checked")]
    AdminStatusChecked,
    #[serde(rename = "Creator Transferred")]
    CreatorTransferred,
}

impl AdminAction {
    pub fn label(&self) -> &'static str {
        match self {
            AdminAction::AdminAdded => "Admin Added",
            AdminAction::AdminRemoved => "Admin Removed",
            AdminAction::AdminStatusChecked => "Admin Status Checked",
            AdminAction::CreatorTransferred => "Creator Transferred",
        }
    }
}

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub action: AdminAction,
    /// Abbreviated performer address
    pub performer: String,
    /// Abbreviated target address
    pub target: String,
    pub timestamp: DateTime<Utc>,
}

pub struct AdminRegistry {
    admins: RwLock<Vec<Admin>>,
    /// Newest first
    activity: RwLock<Vec<ActivityEntry>>,
    creator: RwLock<Option<Address>>,
    operator: Address,
    submitter: Submitter,
    clock: Arc<dyn Clock>,
}

impl AdminRegistry {
    /// Empty registry
    pub fn new(operator: Address, submitter: Submitter) -> Self {
        Self {
            admins: RwLock::new(Vec::new()),
            activity: RwLock::new(Vec::new()),
            creator: RwLock::new(None),
            operator,
            submitter,
            clock: Arc::new(SystemClock),
        }
    }

    /// Registry preloaded with the demo admins and activity
    pub fn seeded(submitter: Submitter) -> Self {
        let operator = Address::new_unchecked(DEFAULT_OPERATOR);
        Self {
            admins: RwLock::new(seed_admins(&operator)),
            activity: RwLock::new(seed_activity(&operator)),
            ..Self::new(operator, submitter)
        }
    }

    /// Builder method: clock used for dates and timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn operator(&self) -> &Address {
        &self.operator
    }

    /// Grant admin rights
    ///
    /// Duplicates are rejected before anything is submitted. Every action
    /// returns the activity entry it appended.
    pub async fn add_admin(&self, input: &str) -> SubmissionResult<(Admin, ActivityEntry)> {
        let address = Address::parse(input)?;
        self.ensure_not_admin(&address).await?;

        self.submitter
            .submit(&Submission::AddAdmin(address.clone()))
            .await?;

        let admin = Admin {
            address: address.clone(),
            added_by: self.operator.clone(),
            added_at: self.now().date_naive(),
            status: AdminStatus::Active,
        };

        {
            let mut admins = self.admins.write().await;
            // Another caller may have added it while we were submitting
            if admins.iter().any(|a| a.address == address) {
                return Err(ValidationError::AlreadyAdmin(address.to_string()).into());
            }
            admins.insert(0, admin.clone());
        }
        let entry = self.log(AdminAction::AdminAdded, &address).await;

        tracing::info!(address = %address, "Admin added");
        Ok((admin, entry))
    }

    /// Revoke admin rights. Returns false if the address was not an admin.
    pub async fn remove_admin(&self, input: &str) -> SubmissionResult<(bool, ActivityEntry)> {
        let address = Address::parse(input)?;

        self.submitter
            .submit(&Submission::RemoveAdmin(address.clone()))
            .await?;

        let removed = {
            let mut admins = self.admins.write().await;
            let before = admins.len();
            admins.retain(|a| a.address != address);
            admins.len() != before
        };
        let entry = self.log(AdminAction::AdminRemoved, &address).await;

        tracing::info!(address = %address, removed, "Admin removed");
        Ok((removed, entry))
    }

    /// Whether `input` is currently an admin
    pub async fn check_admin(&self, input: &str) -> SubmissionResult<(bool, ActivityEntry)> {
        let address = Address::parse(input)?;

        self.submitter
            .submit(&Submission::CheckAdmin(address.clone()))
            .await?;

        let is_admin = self.is_admin(&address).await;
        let entry = self.log(AdminAction::AdminStatusChecked, &address).await;

        tracing::info!(address = %address, is_admin, "Admin status checked");
        Ok((is_admin, entry))
    }

    /// Hand campaign ownership to a new creator
    pub async fn transfer_creator(
        &self,
        input: &str,
    ) -> SubmissionResult<(Address, ActivityEntry)> {
        let address = Address::parse(input)?;

        self.submitter
            .submit(&Submission::TransferCreator(address.clone()))
            .await?;

        *self.creator.write().await = Some(address.clone());
        let entry = self.log(AdminAction::CreatorTransferred, &address).await;

        tracing::info!(address = %address, "Creator transferred");
        Ok((address, entry))
    }

    /// Admins whose address contains `query`, ignoring case
    pub async fn list(&self, query: Option<&str>) -> Vec<Admin> {
        let admins = self.admins.read().await;
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => admins
                .iter()
                .filter(|a| a.address.contains_ignore_case(q))
                .cloned()
                .collect(),
            None => admins.clone(),
        }
    }

    /// Activity log, newest first
    pub async fn activity(&self) -> Vec<ActivityEntry> {
        self.activity.read().await.clone()
    }

    pub async fn creator(&self) -> Option<Address> {
        self.creator.read().await.clone()
    }

    pub async fn is_admin(&self, address: &Address) -> bool {
        self.admins.read().await.iter().any(|a| &a.address == address)
    }

    pub async fn admin_count(&self) -> usize {
        self.admins.read().await.len()
    }

    async fn ensure_not_admin(&self, address: &Address) -> Result<(), ValidationError> {
        if self.is_admin(address).await {
            return Err(ValidationError::AlreadyAdmin(address.to_string()));
        }
        Ok(())
    }

    async fn log(&self, action: AdminAction, target: &Address) -> ActivityEntry {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            action,
            performer: self.operator.short(),
            target: target.short(),
            timestamp: self.now(),
        };
        self.activity.write().await.insert(0, entry.clone());
        entry
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.clock.now_ms())
            .single()
            .unwrap_or_else(Utc::now)
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn seed_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn seed_admins(operator: &Address) -> Vec<Admin> {
    vec![
        Admin {
            address: operator.clone(),
            added_by: Address::zero(),
            added_at: seed_date(2024, 1, 15),
            status: AdminStatus::Active,
        },
        Admin {
            address: Address::new_unchecked("0x1111111111111111111111111111111111111111"),
            added_by: operator.clone(),
            added_at: seed_date(2024, 2, 20),
            status: AdminStatus::Active,
        },
        Admin {
            address: Address::new_unchecked("0x2222222222222222222222222222222222222222"),
            added_by: operator.clone(),
            added_at: seed_date(2024, 3, 10),
            status: AdminStatus::Active,
        },
    ]
}

fn seed_activity(operator: &Address) -> Vec<ActivityEntry> {
    let first = Address::new_unchecked("0x1111111111111111111111111111111111111111");
    let second = Address::new_unchecked("0x2222222222222222222222222222222222222222");

    vec![
        ActivityEntry {
            id: "1".to_string(),
            action: AdminAction::AdminAdded,
            performer: operator.short(),
            target: second.short(),
            timestamp: seed_time(2024, 3, 10, 14, 30),
        },
        ActivityEntry {
            id: "2".to_string(),
            action: AdminAction::AdminStatusChecked,
            performer: first.short(),
            target: second.short(),
            timestamp: seed_time(2024, 3, 9, 10, 15),
        },
        ActivityEntry {
            id: "3".to_string(),
            action: AdminAction::AdminAdded,
            performer: operator.short(),
            target: first.short(),
            timestamp: seed_time(2024, 2, 20, 9, 0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::error::SubmissionError;
    use crate::admin::shorten;
    use crate::admin::submit::testing::RecordingTransport;
    use crate::feed::ManualClock;
    use std::time::Duration;

    const NEW_ADMIN: &str = "0x3333333333333333333333333333333333333333";

    fn registry() -> (AdminRegistry, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let submitter = Submitter::new(transport.clone()).retries(0, Duration::ZERO);
        let clock = Arc::new(ManualClock::new(1_710_081_000_000));
        (AdminRegistry::seeded(submitter).with_clock(clock), transport)
    }

    #[tokio::test]
    async fn test_seeded_state() {
        let (registry, _) = registry();
        assert_eq!(registry.admin_count().await, 3);
        assert_eq!(registry.activity().await.len(), 3);
        assert_eq!(registry.operator().short(), "0x742d...0bEb");
        assert!(registry.creator().await.is_none());
    }

    #[tokio::test]
    async fn test_add_admin() {
        let (registry, transport) = registry();

        let (admin, entry) = registry.add_admin(NEW_ADMIN).await.unwrap();
        assert_eq!(admin.status, AdminStatus::Active);
        assert_eq!(admin.added_at, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(&admin.added_by, registry.operator());

        let admins = registry.list(None).await;
        assert_eq!(admins.len(), 4);
        assert_eq!(admins[0].address.as_str(), NEW_ADMIN);

        let activity = registry.activity().await;
        assert_eq!(activity.len(), 4);
        assert_eq!(activity[0].action, AdminAction::AdminAdded);
        assert_eq!(activity[0].target, "0x3333...3333");
        assert_eq!(activity[0], entry);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected_before_submit() {
        let (registry, transport) = registry();

        let err = registry
            .add_admin("0x1111111111111111111111111111111111111111")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::AlreadyAdmin(_))
        ));

        assert!(transport.sent().is_empty());
        assert_eq!(registry.activity().await.len(), 3);
        assert_eq!(registry.admin_count().await, 3);
    }

    #[tokio::test]
    async fn test_duplicate_ignores_case() {
        let (registry, transport) = registry();

        registry
            .add_admin("0xabcdef0000000000000000000000000000000000")
            .await
            .unwrap();
        let err = registry
            .add_admin("0xABCDEF0000000000000000000000000000000000")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::AlreadyAdmin(_))
        ));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(registry.activity().await.len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let (registry, transport) = registry();

        for input in ["", "0x111", "1111111111111111111111111111111111111111"] {
            let err = registry.add_admin(input).await.unwrap_err();
            assert!(matches!(err, SubmissionError::Validation(_)));
            assert!(registry.remove_admin(input).await.is_err());
            assert!(registry.check_admin(input).await.is_err());
            assert!(registry.transfer_creator(input).await.is_err());
        }

        assert!(transport.sent().is_empty());
        assert_eq!(registry.activity().await.len(), 3);
    }

    #[tokio::test]
    async fn test_remove_admin() {
        let (registry, _) = registry();

        let (removed, _) = registry
            .remove_admin("0x2222222222222222222222222222222222222222")
            .await
            .unwrap();
        assert!(removed);
        assert_eq!(registry.admin_count().await, 2);

        // Not an admin: still logged, nothing removed
        let (removed, entry) = registry.remove_admin(NEW_ADMIN).await.unwrap();
        assert!(!removed);
        assert_eq!(entry.action, AdminAction::AdminRemoved);
        assert_eq!(registry.admin_count().await, 2);

        let activity = registry.activity().await;
        assert_eq!(activity.len(), 5);
        assert_eq!(activity[0].action, AdminAction::AdminRemoved);
    }

    #[tokio::test]
    async fn test_check_admin() {
        let (registry, _) = registry();

        let (is_admin, _) = registry
            .check_admin("0x1111111111111111111111111111111111111111")
            .await
            .unwrap();
        assert!(is_admin);
        let (is_admin, entry) = registry.check_admin(NEW_ADMIN).await.unwrap();
        assert!(!is_admin);
        assert_eq!(entry.target, "0x3333...3333");

        let activity = registry.activity().await;
        assert_eq!(activity[0].action, AdminAction::AdminStatusChecked);
        assert_eq!(activity.len(), 5);
    }

    #[tokio::test]
    async fn test_transfer_creator() {
        let (registry, _) = registry();

        let (creator, entry) = registry.transfer_creator(NEW_ADMIN).await.unwrap();
        assert_eq!(registry.creator().await, Some(creator));
        assert_eq!(entry.action, AdminAction::CreatorTransferred);
        assert_eq!(registry.activity().await[0], entry);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_actions_return_their_own_entries() {
        let (registry, _) = registry();
        let registry = Arc::new(registry);

        let mut tasks = Vec::new();
        for digit in ['4', '5', '6', '7', '8', '9'] {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let address = format!("0x{}", digit.to_string().repeat(40));
                let (_, entry) = registry.check_admin(&address).await.unwrap();
                (address, entry)
            }));
        }

        for task in tasks {
            let (address, entry) = task.await.unwrap();
            assert_eq!(entry.target, shorten(&address));
            assert_eq!(entry.action, AdminAction::AdminStatusChecked);
        }
        assert_eq!(registry.activity().await.len(), 9);
    }

    #[tokio::test]
    async fn test_failed_submission_mutates_nothing() {
        let transport = Arc::new(RecordingTransport::failing_with(vec![
            SubmissionError::Fatal("reverted".into()),
        ]));
        let submitter = Submitter::new(transport.clone()).retries(0, Duration::ZERO);
        let registry = AdminRegistry::seeded(submitter);

        assert!(registry.add_admin(NEW_ADMIN).await.is_err());
        assert_eq!(registry.admin_count().await, 3);
        assert_eq!(registry.activity().await.len(), 3);
    }

    #[tokio::test]
    async fn test_list_search() {
        let (registry, _) = registry();

        assert_eq!(registry.list(Some("1111")).await.len(), 1);
        assert_eq!(registry.list(Some("0X742D")).await.len(), 1);
        assert_eq!(registry.list(Some("  ")).await.len(), 3);
        assert!(registry.list(Some("ffff")).await.is_empty());
    }

    #[test]
    fn test_action_serialize() {
        let json = serde_json::to_string(&AdminAction::AdminStatusChecked).unwrap();
        assert_eq!(json, "\"Admin Status Checked\"");
    }
}
