//! Pricing facade: the entry point used by registration, login and display flows.

use chrono::Utc;
use observability::{PricingMetrics, PricingTimer};
use std::sync::Arc;
use tracing::{Instrument, debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::PricingCatalog;
use crate::classifier::ZoneClassifier;
use crate::error::{PricingError, PricingResult};
use crate::location::{LocationProvider, LocationResolver};
use crate::lock::{LockManager, LockRequest};
use crate::models::{LocationResult, LockRecord, PricingQuote, PricingZone};
use crate::registry::ScheduleRegistry;
use crate::repository::LockRepository;
use crate::settings::{MAX_GRACE_WINDOW_HOURS, PricingSettings};

/// Lock policy knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceOptions {
    /// How long a provisional lock stays open for re-evaluation
    pub grace_window: chrono::Duration,
    /// Lookups allowed during registration before locking provisionally
    pub resolve_attempts: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            grace_window: chrono::Duration::hours(24),
            resolve_attempts: 2,
        }
    }
}

impl From<&PricingSettings> for ServiceOptions {
    fn from(settings: &PricingSettings) -> Self {
        let hours = settings.grace_window_hours.clamp(0, MAX_GRACE_WINDOW_HOURS);
        Self {
            grace_window: chrono::Duration::hours(hours),
            resolve_attempts: settings.resolve_attempts.max(1),
        }
    }
}

pub struct PricingService<R: LockRepository, P: LocationProvider> {
    classifier: Arc<ZoneClassifier>,
    registry: Arc<ScheduleRegistry>,
    resolver: Arc<LocationResolver<P>>,
    locks: LockManager<R>,
    options: ServiceOptions,
}

impl<R: LockRepository, P: LocationProvider> Clone for PricingService<R, P> {
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
            locks: self.locks.clone(),
            options: self.options,
        }
    }
}

impl<R, P> PricingService<R, P>
where
    R: LockRepository + 'static,
    P: LocationProvider,
{
    /// Normalizes the catalog, then fails with `Configuration` if it does
    /// not validate
    pub fn new(
        catalog: &PricingCatalog,
        repository: R,
        resolver: LocationResolver<P>,
        options: ServiceOptions,
    ) -> PricingResult<Self> {
        let catalog = catalog.clone().normalized()?;
        let registry = ScheduleRegistry::from_catalog(&catalog)?;

        Ok(Self {
            classifier: Arc::new(ZoneClassifier::from_catalog(&catalog)),
            registry: Arc::new(registry),
            resolver: Arc::new(resolver),
            locks: LockManager::new(Arc::new(repository)),
            options,
        })
    }

    pub fn classifier(&self) -> &ZoneClassifier {
        &self.classifier
    }

    pub fn registry(&self) -> &ScheduleRegistry {
        &self.registry
    }

    /// Pre-registration quote. Resolves and classifies but never writes.
    #[instrument(skip_all)]
    pub async fn preview_pricing(&self, address: &str) -> PricingResult<PricingQuote> {
        let address = require_address(address)?;
        let _timer = PricingTimer::new("preview");

        let location = self.resolver.resolve(address).await;
        let zone = self.classify(&location);

        Ok(PricingQuote::preview(zone, self.registry.profile(zone)))
    }

    /// Resolve, classify and lock. An existing lock is returned without any
    /// lookup or write; an unavailable location locks to `Global` provisionally.
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn complete_registration(
        &self,
        account_id: Uuid,
        address: &str,
    ) -> PricingResult<PricingQuote> {
        let address = require_address(address)?;
        let _timer = PricingTimer::new("complete_registration");

        if let Some(existing) = self.locks.read_lock(account_id).await? {
            debug!(zone = %existing.zone, "Account already locked");
            return Ok(existing.into());
        }

        let location = self.resolve_with_retry(address).await;
        let zone = self.classify(&location);

        let reevaluate_until = if location.is_valid() {
            None
        } else {
            warn!("Location unavailable at registration, locking to global provisionally");
            Some(Utc::now() + self.options.grace_window)
        };

        let request = LockRequest {
            account_id,
            zone,
            profile: self.registry.profile(zone).clone(),
            location,
            reevaluate_until,
        };

        // Detached so a dropped request cannot abandon the write halfway
        let locks = self.locks.clone();
        let outcome = tokio::spawn(async move { locks.try_lock(request).await }.in_current_span())
            .await??;

        Ok(outcome.into_record().into())
    }

    /// Locked pricing for login and dashboard. Never resolves location.
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn effective_pricing(&self, account_id: Uuid) -> PricingResult<PricingQuote> {
        let _timer = PricingTimer::new("effective");
        self.require_lock(account_id).await.map(Into::into)
    }

    /// Re-resolve a provisional lock inside its grace window. Any other state,
    /// or a still-unavailable location, returns the stored lock unchanged.
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn reevaluate_pricing(
        &self,
        account_id: Uuid,
        address: &str,
    ) -> PricingResult<PricingQuote> {
        let address = require_address(address)?;
        let _timer = PricingTimer::new("reevaluate");

        let existing = self.require_lock(account_id).await?;
        if !existing.reevaluation_open(Utc::now()) {
            debug!(provisional = existing.provisional, "Re-evaluation not open");
            PricingMetrics::record_reevaluation("closed");
            return Ok(existing.into());
        }

        let location = self.resolver.resolve(address).await;
        if !location.is_valid() {
            PricingMetrics::record_reevaluation("unchanged");
            return Ok(existing.into());
        }

        let zone = self.classify(&location);
        let profile = self.registry.profile(zone).clone();

        let locks = self.locks.clone();
        let finalized = tokio::spawn(
            async move {
                locks
                    .finalize_provisional(account_id, zone, profile, location)
                    .await
            }
            .in_current_span(),
        )
        .await??;

        match finalized {
            Some(record) => {
                info!(zone = %record.zone, "Provisional lock re-evaluated");
                PricingMetrics::record_reevaluation("applied");
                Ok(record.into())
            }
            None => {
                // Window closed or another re-evaluation won in the meantime
                PricingMetrics::record_reevaluation("closed");
                self.require_lock(account_id).await.map(Into::into)
            }
        }
    }

    /// Re-resolves only while the result is invalid, so a valid lookup is
    /// never repeated
    async fn resolve_with_retry(&self, address: &str) -> LocationResult {
        let mut location = self.resolver.resolve(address).await;

        for attempt in 2..=self.options.resolve_attempts {
            if location.is_valid() {
                break;
            }
            debug!(attempt, "Retrying location lookup");
            location = self.resolver.resolve(address).await;
        }

        location
    }

    fn classify(&self, location: &LocationResult) -> PricingZone {
        let zone = self.classifier.classify_location(location);
        PricingMetrics::record_classification(&zone.to_string());
        zone
    }

    async fn require_lock(&self, account_id: Uuid) -> PricingResult<LockRecord> {
        match self.locks.read_lock(account_id).await? {
            Some(record) => Ok(record),
            None => {
                PricingMetrics::record_not_registered();
                Err(PricingError::NotRegistered(account_id))
            }
        }
    }
}

fn require_address(address: &str) -> PricingResult<&str> {
    let address = address.trim();
    if address.is_empty() {
        return Err(PricingError::InvalidInput("address must not be empty".into()));
    }
    Ok(address)
}
