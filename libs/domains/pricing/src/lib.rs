//! Regional Pricing Domain
//!
//! Resolves an account's location, classifies it into a pricing zone and
//! locks that zone to the account exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  PricingService  │  ← Facade: preview, registration, effective, re-evaluation
//! └──┬─────┬─────┬───┘
//!    │     │     │
//!    │     │  ┌──▼──────────┐
//!    │     │  │ LockManager │  ← Only writer of LockRecords
//!    │     │  └──┬──────────┘
//!    │     │  ┌──▼─────────────┐
//!    │     │  │ LockRepository │  ← Postgres (ON CONFLICT) or in-memory
//!    │     │  └────────────────┘
//!    │  ┌──▼──────────────────────────────┐
//!    │  │ ZoneClassifier + ScheduleRegistry │  ← Built from an immutable PricingCatalog
//!    │  └─────────────────────────────────┘
//! ┌──▼───────────────┐
//! │ LocationResolver │  ← Bounded timeout over a LocationProvider, never fails
//! └──────────────────┘
//! ```

pub mod catalog;
pub mod classifier;
pub mod country;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod location;
pub mod lock;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod registry;
pub mod repository;
pub mod service;
pub mod settings;

pub use catalog::PricingCatalog;
pub use classifier::ZoneClassifier;
pub use error::{PricingError, PricingResult};
pub use handlers::ApiDoc;
pub use location::{HttpLocationProvider, LocationProvider, LocationResolver, ProviderLocation};
pub use lock::{LockManager, LockRequest};
pub use memory::InMemoryLockRepository;
pub use models::{
    AddressRequest, Currency, LocationResult, LockOutcome, LockRecord, PriceSchedule,
    PricingQuote, PricingZone, Tier, TierPrice, ZoneProfile,
};
pub use postgres::PgLockRepository;
pub use registry::ScheduleRegistry;
pub use repository::LockRepository;
pub use service::{PricingService, ServiceOptions};
pub use settings::{LocationSettings, PricingSettings};
