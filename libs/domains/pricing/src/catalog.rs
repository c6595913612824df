//! Pricing catalog: zone membership plus per-zone price schedules.
//!
//! Loaded once at startup and handed to [`ZoneClassifier`](crate::ZoneClassifier)
//! and [`ScheduleRegistry`](crate::ScheduleRegistry). Nothing mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::country;
use crate::error::{PricingError, PricingResult};
use crate::models::{PriceSchedule, PricingZone, Tier, TierPrice, ZoneProfile};
use crate::settings::PricingSettings;

/// Southern African Development Community member states
pub const SADC_MEMBERS: [&str; 16] = [
    "AO", "BW", "KM", "CD", "SZ", "LS", "MG", "MW", "MU", "MZ", "NA", "SC", "ZA", "TZ", "ZM", "ZW",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    /// ISO alpha-2 code of the single special-region country
    pub special_region: String,
    /// ISO alpha-2 codes sharing the regional schedule
    pub regional_bloc: BTreeSet<String>,
    pub zones: BTreeMap<PricingZone, ZoneProfile>,
}

impl Default for PricingCatalog {
    fn default() -> Self {
        let special = ZoneProfile {
            schedule: PriceSchedule::new([
                (Tier::Creator, TierPrice::usd(35, 99)),
                (Tier::Pro, TierPrice::usd(69, 199)),
                (Tier::Enterprise, TierPrice::usd_monthly(499)),
                (Tier::MediaPack, TierPrice::usd_monthly(49)),
            ]),
            zone_message: Some(
                "Prices are fixed to your registration country and cannot be changed.".to_string(),
            ),
            location_change_allowed: false,
        };

        let bloc = ZoneProfile {
            schedule: PriceSchedule::new([
                (Tier::Creator, TierPrice::usd(8, 30)),
                (Tier::Pro, TierPrice::usd(19, 69)),
                (Tier::Enterprise, TierPrice::usd_monthly(199)),
                (Tier::MediaPack, TierPrice::usd_monthly(15)),
            ]),
            zone_message: Some("Regional pricing for SADC member states.".to_string()),
            location_change_allowed: true,
        };

        let global = ZoneProfile {
            schedule: PriceSchedule::new([
                (Tier::Creator, TierPrice::usd(15, 59)),
                (Tier::Pro, TierPrice::usd(39, 129)),
                (Tier::Enterprise, TierPrice::usd_monthly(349)),
                (Tier::MediaPack, TierPrice::usd_monthly(29)),
            ]),
            zone_message: None,
            location_change_allowed: true,
        };

        Self {
            special_region: "IL".to_string(),
            regional_bloc: SADC_MEMBERS.iter().map(|code| code.to_string()).collect(),
            zones: BTreeMap::from([
                (PricingZone::SpecialRegion, special),
                (PricingZone::RegionalBloc, bloc),
                (PricingZone::Global, global),
            ]),
        }
    }
}

impl PricingCatalog {
    /// Built-in catalog or `PRICING_CONFIG_PATH`, with the optional bloc
    /// override applied, normalized and validated.
    pub fn load(settings: &PricingSettings) -> PricingResult<Self> {
        let mut catalog = match &settings.config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    PricingError::Configuration(format!(
                        "cannot read pricing catalog {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };

        if let Some(codes) = &settings.regional_bloc {
            catalog.regional_bloc = codes.iter().cloned().collect();
        }

        let catalog = catalog.normalized()?;
        catalog.validate()?;

        info!(
            special_region = %catalog.special_region,
            bloc_size = catalog.regional_bloc.len(),
            "Pricing catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> PricingResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| PricingError::Configuration(format!("invalid pricing catalog: {}", e)))
    }

    /// Upper-case every code, rejecting anything that is not a recognized ISO code
    pub fn normalized(mut self) -> PricingResult<Self> {
        let as_config_error =
            |e: PricingError| PricingError::Configuration(format!("pricing catalog: {}", e));

        self.special_region = country::recognized_code(&self.special_region).map_err(as_config_error)?;
        self.regional_bloc = self
            .regional_bloc
            .iter()
            .map(|code| country::recognized_code(code).map_err(as_config_error))
            .collect::<PricingResult<_>>()?;
        Ok(self)
    }

    /// Startup checks; any failure aborts the service
    pub fn validate(&self) -> PricingResult<()> {
        let fail = |msg: String| Err(PricingError::Configuration(msg));

        if !is_canonical(&self.special_region) {
            return fail(format!(
                "special region {:?} is not an upper-case recognized country code",
                self.special_region
            ));
        }
        if let Some(code) = self.regional_bloc.iter().find(|c| !is_canonical(c)) {
            return fail(format!(
                "regional bloc code {:?} is not an upper-case recognized country code",
                code
            ));
        }
        if self.regional_bloc.contains(&self.special_region) {
            return fail(format!(
                "special region {} cannot also be a regional bloc member",
                self.special_region
            ));
        }

        for zone in PricingZone::ALL {
            let Some(profile) = self.zones.get(&zone) else {
                return fail(format!("zone {} has no profile", zone));
            };

            let missing = profile.schedule.missing_tiers();
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(Tier::to_string).collect();
                return fail(format!("zone {} is missing tiers: {}", zone, names.join(", ")));
            }

            if let Some((tier, _)) = profile.schedule.tiers().find(|(_, p)| !p.has_price_point()) {
                return fail(format!("zone {} tier {} has no price point", zone, tier));
            }

            if let Some((tier, _)) = profile
                .schedule
                .tiers()
                .find(|(_, p)| p.weekly.is_some_and(|v| v < 0) || p.monthly.is_some_and(|v| v < 0))
            {
                return fail(format!("zone {} tier {} has a negative price", zone, tier));
            }
        }

        if self
            .zones
            .get(&PricingZone::SpecialRegion)
            .is_some_and(|profile| profile.location_change_allowed)
        {
            return fail("special region must not allow location changes".to_string());
        }

        Ok(())
    }
}

/// Recognized and already in the form `normalized` produces
fn is_canonical(code: &str) -> bool {
    country::recognized_code(code).is_ok_and(|canonical| canonical == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings() -> PricingSettings {
        PricingSettings::default()
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PricingCatalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.regional_bloc.len(), 16);
        assert!(catalog.regional_bloc.contains("ZA"));
    }

    #[test]
    fn test_missing_tier_fails_validation() {
        let mut catalog = PricingCatalog::default();
        catalog.zones.insert(
            PricingZone::Global,
            ZoneProfile {
                schedule: PriceSchedule::new([(Tier::Creator, TierPrice::usd(15, 59))]),
                zone_message: None,
                location_change_allowed: true,
            },
        );

        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("missing tiers"));
        assert!(err.to_string().contains("media_pack"));
    }

    #[test]
    fn test_missing_zone_fails_validation() {
        let mut catalog = PricingCatalog::default();
        catalog.zones.remove(&PricingZone::RegionalBloc);
        assert!(matches!(
            catalog.validate(),
            Err(PricingError::Configuration(_))
        ));
    }

    #[test]
    fn test_tier_without_price_point_fails_validation() {
        let mut catalog = PricingCatalog::default();
        let profile = catalog.zones.get_mut(&PricingZone::Global).unwrap();
        profile.schedule = PriceSchedule::new([
            (Tier::Creator, TierPrice::usd(15, 59)),
            (Tier::Pro, TierPrice::usd(39, 129)),
            (Tier::Enterprise, TierPrice::new(Default::default(), None, None)),
            (Tier::MediaPack, TierPrice::usd_monthly(29)),
        ]);

        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("no price point"));
    }

    #[test]
    fn test_special_region_in_bloc_fails_validation() {
        let mut catalog = PricingCatalog::default();
        catalog.regional_bloc.insert("IL".to_string());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_special_region_must_be_fixed() {
        let mut catalog = PricingCatalog::default();
        catalog
            .zones
            .get_mut(&PricingZone::SpecialRegion)
            .unwrap()
            .location_change_allowed = true;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_normalized_uppercases_and_rejects_unknown() {
        let mut catalog = PricingCatalog::default();
        catalog.special_region = " il".to_string();
        catalog.regional_bloc = BTreeSet::from(["za".to_string(), "Bw".to_string()]);
        let catalog = catalog.normalized().unwrap();
        assert_eq!(catalog.special_region, "IL");
        assert!(catalog.regional_bloc.contains("BW"));

        let mut catalog = PricingCatalog::default();
        catalog.regional_bloc.insert("ZZ".to_string());
        assert!(catalog.normalized().is_err());
    }

    #[test]
    fn test_lowercase_codes_fail_validation_until_normalized() {
        let mut catalog = PricingCatalog::default();
        catalog.special_region = "il".to_string();
        catalog.regional_bloc = BTreeSet::from(["za".to_string(), "IL".to_string()]);
        assert!(matches!(
            catalog.validate(),
            Err(PricingError::Configuration(_))
        ));

        let normalized = catalog.normalized().unwrap();
        let err = normalized.validate().unwrap_err();
        assert!(err.to_string().contains("cannot also be a regional bloc member"));
    }

    #[test]
    fn test_load_applies_bloc_override() {
        let settings = PricingSettings {
            regional_bloc: Some(vec!["ke".to_string(), "NG".to_string()]),
            ..settings()
        };
        let catalog = PricingCatalog::load(&settings).unwrap();
        assert_eq!(
            catalog.regional_bloc,
            BTreeSet::from(["KE".to_string(), "NG".to_string()])
        );
    }

    #[test]
    fn test_load_from_json_file() {
        let mut catalog = PricingCatalog::default();
        catalog.special_region = "NZ".to_string();
        let json = serde_json::to_string_pretty(&catalog).unwrap();

        let path = std::env::temp_dir().join(format!("pricing-catalog-{}.json", uuid::Uuid::new_v4()));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(json.as_bytes())
            .unwrap();

        let settings = PricingSettings {
            config_path: Some(path.clone()),
            ..settings()
        };
        let loaded = PricingCatalog::load(&settings).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.special_region, "NZ");
        assert_eq!(loaded.zones, catalog.zones);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let settings = PricingSettings {
            config_path: Some("/nonexistent/pricing.json".into()),
            ..settings()
        };
        assert!(matches!(
            PricingCatalog::load(&settings),
            Err(PricingError::Configuration(_))
        ));
    }

    #[test]
    fn test_catalog_json_uses_zone_names_as_keys() {
        let json = serde_json::to_value(PricingCatalog::default()).unwrap();
        assert!(json["zones"]["special_region"].is_object());
        assert_eq!(
            json["zones"]["special_region"]["schedule"]["creator"]["weekly"],
            3500
        );
    }
}
