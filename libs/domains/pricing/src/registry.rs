//! Zone to price schedule lookup.

use std::collections::BTreeMap;

use crate::catalog::PricingCatalog;
use crate::error::{PricingError, PricingResult};
use crate::models::{PriceSchedule, PricingZone, ZoneProfile};

/// Static per-zone profiles, built once from a validated catalog
#[derive(Debug, Clone)]
pub struct ScheduleRegistry {
    profiles: BTreeMap<PricingZone, ZoneProfile>,
    global: ZoneProfile,
}

impl ScheduleRegistry {
    /// Fails with `Configuration` if the catalog does not validate
    pub fn from_catalog(catalog: &PricingCatalog) -> PricingResult<Self> {
        catalog.validate()?;

        let global = catalog
            .zones
            .get(&PricingZone::Global)
            .cloned()
            .ok_or_else(|| PricingError::Configuration("zone global has no profile".into()))?;

        Ok(Self {
            profiles: catalog.zones.clone(),
            global,
        })
    }

    pub fn profile(&self, zone: PricingZone) -> &ZoneProfile {
        self.profiles.get(&zone).unwrap_or(&self.global)
    }

    pub fn schedule_for(&self, zone: PricingZone) -> &PriceSchedule {
        &self.profile(zone).schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn registry() -> ScheduleRegistry {
        ScheduleRegistry::from_catalog(&PricingCatalog::default()).unwrap()
    }

    #[test]
    fn test_creator_prices_per_zone() {
        let registry = registry();

        let creator = registry
            .schedule_for(PricingZone::SpecialRegion)
            .get(Tier::Creator)
            .unwrap();
        assert_eq!((creator.weekly, creator.monthly), (Some(3500), Some(9900)));

        let creator = registry
            .schedule_for(PricingZone::RegionalBloc)
            .get(Tier::Creator)
            .unwrap();
        assert_eq!((creator.weekly, creator.monthly), (Some(800), Some(3000)));

        let creator = registry
            .schedule_for(PricingZone::Global)
            .get(Tier::Creator)
            .unwrap();
        assert_eq!((creator.weekly, creator.monthly), (Some(1500), Some(5900)));
    }

    #[test]
    fn test_every_zone_has_all_tiers() {
        let registry = registry();
        for zone in PricingZone::ALL {
            assert!(registry.schedule_for(zone).missing_tiers().is_empty());
        }
    }

    #[test]
    fn test_enterprise_has_no_weekly_option() {
        let enterprise = *registry()
            .schedule_for(PricingZone::Global)
            .get(Tier::Enterprise)
            .unwrap();
        assert_eq!(enterprise.weekly, None);
        assert!(enterprise.monthly.is_some());
    }

    #[test]
    fn test_special_region_is_location_fixed() {
        let registry = registry();
        assert!(!registry.profile(PricingZone::SpecialRegion).location_change_allowed);
        assert!(registry.profile(PricingZone::Global).location_change_allowed);
        assert!(registry.profile(PricingZone::SpecialRegion).zone_message.is_some());
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        let mut catalog = PricingCatalog::default();
        catalog.zones.remove(&PricingZone::SpecialRegion);
        assert!(matches!(
            ScheduleRegistry::from_catalog(&catalog),
            Err(PricingError::Configuration(_))
        ));
    }
}
