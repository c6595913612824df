use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Pricing zone. The three zones partition the ISO 3166-1 alpha-2 code space.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingZone {
    /// Single hard-coded country with its own schedule and a fixed location
    #[sea_orm(string_value = "special_region")]
    SpecialRegion,
    /// Configurable set of countries sharing a regional schedule
    #[sea_orm(string_value = "regional_bloc")]
    RegionalBloc,
    /// Catch-all default and universal safe fallback
    #[default]
    #[sea_orm(string_value = "global")]
    Global,
}

impl PricingZone {
    pub const ALL: [PricingZone; 3] = [
        PricingZone::SpecialRegion,
        PricingZone::RegionalBloc,
        PricingZone::Global,
    ];
}

/// Subscription tier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Creator,
    Pro,
    Enterprise,
    MediaPack,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Creator, Tier::Pro, Tier::Enterprise, Tier::MediaPack];
}

/// Currency enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Ils,
    Zar,
}

/// Price points for one tier. Amounts are in the smallest currency unit (cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct TierPrice {
    pub currency: Currency,
    #[serde(default)]
    pub weekly: Option<i64>,
    #[serde(default)]
    pub monthly: Option<i64>,
}

impl TierPrice {
    pub fn new(currency: Currency, weekly: Option<i64>, monthly: Option<i64>) -> Self {
        Self {
            currency,
            weekly,
            monthly,
        }
    }

    /// Weekly and monthly in whole units, e.g. `usd(35, 99)` is $35/week, $99/month
    pub fn usd(weekly: i64, monthly: i64) -> Self {
        Self::new(Currency::Usd, Some(weekly * 100), Some(monthly * 100))
    }

    /// Monthly-only price in whole units
    pub fn usd_monthly(monthly: i64) -> Self {
        Self::new(Currency::Usd, None, Some(monthly * 100))
    }

    pub fn has_price_point(&self) -> bool {
        self.weekly.is_some() || self.monthly.is_some()
    }
}

/// Price schedule for a zone, keyed by tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PriceSchedule(BTreeMap<Tier, TierPrice>);

impl PriceSchedule {
    pub fn new(tiers: impl IntoIterator<Item = (Tier, TierPrice)>) -> Self {
        Self(tiers.into_iter().collect())
    }

    pub fn get(&self, tier: Tier) -> Option<&TierPrice> {
        self.0.get(&tier)
    }

    pub fn tiers(&self) -> impl Iterator<Item = (&Tier, &TierPrice)> {
        self.0.iter()
    }

    /// Tiers with no entry in this schedule
    pub fn missing_tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| !self.0.contains_key(tier))
            .collect()
    }
}

/// Everything a zone carries besides its country membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ZoneProfile {
    pub schedule: PriceSchedule,
    /// Free text shown next to the price table
    #[serde(default)]
    pub zone_message: Option<String>,
    pub location_change_allowed: bool,
}

/// Normalized outcome of a geographic lookup.
///
/// An invalid result carries no geographic fields; construct through
/// [`LocationResult::resolved`] or [`LocationResult::unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct LocationResult {
    country_name: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
    source_address: String,
    valid: bool,
    resolved_at: DateTime<Utc>,
}

impl LocationResult {
    pub fn resolved(
        source_address: impl Into<String>,
        country_name: String,
        country_code: String,
        region: Option<String>,
        city: Option<String>,
    ) -> Self {
        Self {
            country_name: Some(country_name),
            country_code: Some(country_code),
            region,
            city,
            source_address: source_address.into(),
            valid: true,
            resolved_at: Utc::now(),
        }
    }

    pub fn unavailable(source_address: impl Into<String>) -> Self {
        Self {
            country_name: None,
            country_code: None,
            region: None,
            city: None,
            source_address: source_address.into(),
            valid: false,
            resolved_at: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Normalized ISO alpha-2 code; `None` whenever the result is invalid
    pub fn country_code(&self) -> Option<&str> {
        self.valid.then_some(self.country_code.as_deref()).flatten()
    }

    pub fn country_name(&self) -> Option<&str> {
        self.valid.then_some(self.country_name.as_deref()).flatten()
    }

    pub fn region(&self) -> Option<&str> {
        self.valid.then_some(self.region.as_deref()).flatten()
    }

    pub fn city(&self) -> Option<&str> {
        self.valid.then_some(self.city.as_deref()).flatten()
    }

    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

/// Write-once association between an account and its pricing zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct LockRecord {
    #[ts(as = "String")]
    pub account_id: Uuid,
    pub zone: PricingZone,
    /// Snapshot taken at lock time; later catalog changes do not apply
    pub schedule: PriceSchedule,
    pub zone_message: Option<String>,
    pub location_change_allowed: bool,
    pub source_location: LocationResult,
    /// Locked to `Global` because location was unavailable
    pub provisional: bool,
    /// Deadline for re-evaluating a provisional lock
    pub reevaluate_until: Option<DateTime<Utc>>,
    pub locked_at: DateTime<Utc>,
}

impl LockRecord {
    /// Whether a provisional lock may still be re-evaluated at `now`
    pub fn reevaluation_open(&self, now: DateTime<Utc>) -> bool {
        self.provisional && self.reevaluate_until.is_some_and(|deadline| deadline > now)
    }
}

/// Result of a lock attempt. `AlreadyLocked` is a normal idempotent outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum LockOutcome {
    Created(LockRecord),
    AlreadyLocked(LockRecord),
}

impl LockOutcome {
    pub fn record(&self) -> &LockRecord {
        match self {
            LockOutcome::Created(record) | LockOutcome::AlreadyLocked(record) => record,
        }
    }

    pub fn into_record(self) -> LockRecord {
        match self {
            LockOutcome::Created(record) | LockOutcome::AlreadyLocked(record) => record,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, LockOutcome::Created(_))
    }
}

/// What the display surface renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct PricingQuote {
    pub zone: PricingZone,
    pub schedule: PriceSchedule,
    pub zone_message: Option<String>,
    pub location_change_allowed: bool,
    pub locked: bool,
    /// True while a locked account awaits grace-window re-evaluation
    pub provisional: bool,
    pub locked_at: Option<DateTime<Utc>>,
}

impl PricingQuote {
    pub fn preview(zone: PricingZone, profile: &ZoneProfile) -> Self {
        Self {
            zone,
            schedule: profile.schedule.clone(),
            zone_message: profile.zone_message.clone(),
            location_change_allowed: profile.location_change_allowed,
            locked: false,
            provisional: false,
            locked_at: None,
        }
    }
}

impl From<LockRecord> for PricingQuote {
    fn from(record: LockRecord) -> Self {
        Self {
            zone: record.zone,
            schedule: record.schedule,
            zone_message: record.zone_message,
            location_change_allowed: record.location_change_allowed,
            locked: true,
            provisional: record.provisional,
            locked_at: Some(record.locked_at),
        }
    }
}

/// Request body carrying the caller's network address
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_result_exposes_no_geography() {
        let result = LocationResult::unavailable("203.0.113.7");
        assert!(!result.is_valid());
        assert_eq!(result.country_code(), None);
        assert_eq!(result.country_name(), None);
        assert_eq!(result.region(), None);
        assert_eq!(result.city(), None);
        assert_eq!(result.source_address(), "203.0.113.7");
    }

    #[test]
    fn test_resolved_result_exposes_fields() {
        let result = LocationResult::resolved(
            "198.51.100.1",
            "South Africa".into(),
            "ZA".into(),
            Some("Gauteng".into()),
            None,
        );
        assert!(result.is_valid());
        assert_eq!(result.country_code(), Some("ZA"));
        assert_eq!(result.region(), Some("Gauteng"));
        assert_eq!(result.city(), None);
    }

    #[test]
    fn test_schedule_reports_missing_tiers() {
        let schedule = PriceSchedule::new([
            (Tier::Creator, TierPrice::usd(15, 59)),
            (Tier::Pro, TierPrice::usd(29, 99)),
        ]);
        assert_eq!(schedule.missing_tiers(), vec![Tier::Enterprise, Tier::MediaPack]);
    }

    #[test]
    fn test_zone_serializes_snake_case() {
        let json = serde_json::to_string(&PricingZone::SpecialRegion).unwrap();
        assert_eq!(json, "\"special_region\"");
        assert_eq!(PricingZone::RegionalBloc.to_string(), "regional_bloc");
    }

    #[test]
    fn test_schedule_serializes_as_tier_map() {
        let schedule = PriceSchedule::new([(Tier::MediaPack, TierPrice::usd_monthly(10))]);
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["media_pack"]["monthly"], 1000);
        assert!(json["media_pack"]["weekly"].is_null());
    }

    #[test]
    fn test_reevaluation_window() {
        let now = Utc::now();
        let mut record = LockRecord {
            account_id: Uuid::nil(),
            zone: PricingZone::Global,
            schedule: PriceSchedule::default(),
            zone_message: None,
            location_change_allowed: true,
            source_location: LocationResult::unavailable("x"),
            provisional: true,
            reevaluate_until: Some(now + chrono::Duration::hours(1)),
            locked_at: now,
        };
        assert!(record.reevaluation_open(now));
        assert!(!record.reevaluation_open(now + chrono::Duration::hours(2)));

        record.provisional = false;
        assert!(!record.reevaluation_open(now));
    }
}
