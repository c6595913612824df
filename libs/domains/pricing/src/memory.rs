//! Process-local lock store for tests and single-instance runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PricingResult;
use crate::models::{LockOutcome, LockRecord};
use crate::repository::LockRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLockRepository {
    records: Arc<RwLock<HashMap<Uuid, LockRecord>>>,
}

impl InMemoryLockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl LockRepository for InMemoryLockRepository {
    async fn insert_if_absent(&self, record: LockRecord) -> PricingResult<LockOutcome> {
        let mut records = self.records.write().await;
        match records.entry(record.account_id) {
            Entry::Occupied(existing) => Ok(LockOutcome::AlreadyLocked(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(LockOutcome::Created(record))
            }
        }
    }

    async fn find_by_account(&self, account_id: Uuid) -> PricingResult<Option<LockRecord>> {
        Ok(self.records.read().await.get(&account_id).cloned())
    }

    async fn replace_provisional(
        &self,
        record: LockRecord,
        now: DateTime<Utc>,
    ) -> PricingResult<Option<LockRecord>> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.account_id) {
            Some(existing) if existing.reevaluation_open(now) => {
                *existing = record.clone();
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }
}
