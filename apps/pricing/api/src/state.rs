//! Shared application state.

use domain_pricing::{HttpLocationProvider, PgLockRepository, PricingService};

pub type Pricing = PricingService<PgLockRepository, HttpLocationProvider>;

/// Cloned into every handler; all members are cheap `Arc`/pool clones
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub pricing: Pricing,
}
