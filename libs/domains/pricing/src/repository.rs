use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::PricingResult;
use crate::models::{LockOutcome, LockRecord};

/// Storage for write-once pricing locks.
///
/// `insert_if_absent` must be atomic across every process sharing the store:
/// of N concurrent inserts for one account exactly one returns `Created`, the
/// rest return `AlreadyLocked` carrying the winner's record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockRepository: Send + Sync {
    /// Insert the record unless the account already has one
    async fn insert_if_absent(&self, record: LockRecord) -> PricingResult<LockOutcome>;

    /// Plain read, no writes
    async fn find_by_account(&self, account_id: Uuid) -> PricingResult<Option<LockRecord>>;

    /// Overwrite the stored record only if it is provisional and its
    /// re-evaluation deadline is after `now`. Returns `None` when nothing changed.
    async fn replace_provisional(
        &self,
        record: LockRecord,
        now: DateTime<Utc>,
    ) -> PricingResult<Option<LockRecord>>;
}
