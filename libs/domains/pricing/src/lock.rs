//! The only writer of [`LockRecord`]s.

use chrono::{DateTime, Utc};
use observability::PricingMetrics;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::PricingResult;
use crate::models::{LocationResult, LockOutcome, LockRecord, PricingZone, ZoneProfile};
use crate::repository::LockRepository;

/// Lock creation details supplied by the facade
#[derive(Debug, Clone)]
pub struct LockRequest {
    pub account_id: Uuid,
    pub zone: PricingZone,
    pub profile: ZoneProfile,
    pub location: LocationResult,
    /// Set when the location was unavailable; the lock may be re-evaluated until then
    pub reevaluate_until: Option<DateTime<Utc>>,
}

impl LockRequest {
    fn into_record(self, now: DateTime<Utc>) -> LockRecord {
        LockRecord {
            account_id: self.account_id,
            zone: self.zone,
            schedule: self.profile.schedule,
            zone_message: self.profile.zone_message,
            location_change_allowed: self.profile.location_change_allowed,
            source_location: self.location,
            provisional: self.reevaluate_until.is_some(),
            reevaluate_until: self.reevaluate_until,
            locked_at: now,
        }
    }
}

pub struct LockManager<R: LockRepository> {
    repository: Arc<R>,
}

impl<R: LockRepository> Clone for LockManager<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: LockRepository> LockManager<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Atomic, idempotent create. A second call for the same account returns
    /// the stored record untouched as `AlreadyLocked`.
    #[instrument(skip_all, fields(account_id = %request.account_id, zone = %request.zone))]
    pub async fn try_lock(&self, request: LockRequest) -> PricingResult<LockOutcome> {
        let record = request.into_record(Utc::now());
        let provisional = record.provisional;
        let outcome = self.repository.insert_if_absent(record).await?;

        let stored = outcome.record();
        match &outcome {
            LockOutcome::Created(_) => {
                info!(provisional, "Pricing lock created");
                PricingMetrics::record_lock("created", &stored.zone.to_string());
                if provisional {
                    PricingMetrics::record_provisional_lock();
                }
            }
            LockOutcome::AlreadyLocked(_) => {
                info!(stored_zone = %stored.zone, "Pricing lock already present");
                PricingMetrics::record_lock("already_locked", &stored.zone.to_string());
            }
        }

        Ok(outcome)
    }

    /// Unguarded read used by login and display flows
    pub async fn read_lock(&self, account_id: Uuid) -> PricingResult<Option<LockRecord>> {
        self.repository.find_by_account(account_id).await
    }

    /// Finalize a provisional lock with a newly classified zone. `None` if the
    /// stored record is not provisional or its window has closed.
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn finalize_provisional(
        &self,
        account_id: Uuid,
        zone: PricingZone,
        profile: ZoneProfile,
        location: LocationResult,
    ) -> PricingResult<Option<LockRecord>> {
        let now = Utc::now();
        let record = LockRequest {
            account_id,
            zone,
            profile,
            location,
            reevaluate_until: None,
        }
        .into_record(now);

        let replaced = self.repository.replace_provisional(record, now).await?;
        if let Some(record) = &replaced {
            info!(zone = %record.zone, "Provisional pricing lock finalized");
        }
        Ok(replaced)
    }
}
