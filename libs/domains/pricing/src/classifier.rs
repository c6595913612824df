//! Country code to pricing zone classification.

use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::PricingCatalog;
use crate::country;
use crate::models::{LocationResult, PricingZone};

/// Pure mapping from an ISO alpha-2 code to a [`PricingZone`].
///
/// Precedence is special region, then regional bloc, then `Global`.
/// Empty, malformed and unrecognized codes classify as `Global`.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    special_region: String,
    regional_bloc: BTreeSet<String>,
}

impl ZoneClassifier {
    /// Codes are compared in canonical form, so an injected catalog that
    /// skipped [`PricingCatalog::normalized`] still classifies consistently.
    /// The special region wins over a bloc entry for the same code.
    pub fn from_catalog(catalog: &PricingCatalog) -> Self {
        let special_region = canonical(&catalog.special_region);
        let regional_bloc = catalog
            .regional_bloc
            .iter()
            .map(String::as_str)
            .map(canonical)
            .filter(|code| *code != special_region)
            .collect();

        Self {
            special_region,
            regional_bloc,
        }
    }

    pub fn classify(&self, country_code: Option<&str>) -> PricingZone {
        let Some(raw) = country_code else {
            return PricingZone::Global;
        };

        let code = match country::recognized_code(raw) {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "Unclassifiable country code, using global pricing");
                return PricingZone::Global;
            }
        };

        if code == self.special_region {
            PricingZone::SpecialRegion
        } else if self.regional_bloc.contains(&code) {
            PricingZone::RegionalBloc
        } else {
            PricingZone::Global
        }
    }

    /// Classifies by normalized code only; invalid results are `Global`
    pub fn classify_location(&self, location: &LocationResult) -> PricingZone {
        self.classify(location.country_code())
    }

    pub fn special_region(&self) -> &str {
        &self.special_region
    }

    pub fn regional_bloc(&self) -> &BTreeSet<String> {
        &self.regional_bloc
    }
}

fn canonical(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn classifier() -> ZoneClassifier {
        ZoneClassifier::from_catalog(&PricingCatalog::default())
    }

    #[test]
    fn test_known_scenarios() {
        let classifier = classifier();
        assert_eq!(classifier.classify(Some("IL")), PricingZone::SpecialRegion);
        assert_eq!(classifier.classify(Some("ZA")), PricingZone::RegionalBloc);
        assert_eq!(classifier.classify(Some("DE")), PricingZone::Global);
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = classifier();
        assert_eq!(classifier.classify(Some("il")), PricingZone::SpecialRegion);
        assert_eq!(classifier.classify(Some(" za ")), PricingZone::RegionalBloc);
    }

    #[test]
    fn test_safe_default() {
        let classifier = classifier();
        assert_eq!(classifier.classify(Some("")), PricingZone::Global);
        assert_eq!(classifier.classify(None), PricingZone::Global);
        assert_eq!(classifier.classify(Some("ZZ")), PricingZone::Global);
        assert_eq!(classifier.classify(Some("Israel")), PricingZone::Global);
        assert_eq!(classifier.classify(Some("I1")), PricingZone::Global);
    }

    #[test]
    fn test_total_and_partitioned_over_recognized_codes() {
        let classifier = classifier();
        let mut by_zone: HashMap<PricingZone, Vec<&str>> = HashMap::new();

        for &(code, _) in country::COUNTRIES {
            by_zone.entry(classifier.classify(Some(code))).or_default().push(code);
        }

        let total: usize = by_zone.values().map(Vec::len).sum();
        assert_eq!(total, country::COUNTRIES.len());
        assert_eq!(by_zone[&PricingZone::SpecialRegion], vec!["IL"]);
        assert_eq!(by_zone[&PricingZone::RegionalBloc].len(), 16);
        assert_eq!(
            by_zone[&PricingZone::Global].len(),
            country::COUNTRIES.len() - 17
        );
    }

    #[test]
    fn test_deterministic() {
        let classifier = classifier();
        for &(code, _) in country::COUNTRIES.iter().rev() {
            let first = classifier.classify(Some(code));
            let second = classifier.classify(Some(code));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_invalid_location_is_global_even_with_special_source() {
        let classifier = classifier();
        let location = LocationResult::unavailable("198.51.100.10");
        assert_eq!(classifier.classify_location(&location), PricingZone::Global);

        let location = LocationResult::resolved(
            "198.51.100.10",
            "Israel".into(),
            "IL".into(),
            None,
            None,
        );
        assert_eq!(
            classifier.classify_location(&location),
            PricingZone::SpecialRegion
        );
    }

    #[test]
    fn test_injected_catalog() {
        let mut catalog = PricingCatalog::default();
        catalog.special_region = "NZ".to_string();
        catalog.regional_bloc = BTreeSet::from(["AU".to_string()]);
        let classifier = ZoneClassifier::from_catalog(&catalog);

        assert_eq!(classifier.classify(Some("NZ")), PricingZone::SpecialRegion);
        assert_eq!(classifier.classify(Some("AU")), PricingZone::RegionalBloc);
        assert_eq!(classifier.classify(Some("IL")), PricingZone::Global);
        assert_eq!(classifier.classify(Some("ZA")), PricingZone::Global);
    }

    #[test]
    fn test_lowercase_catalog_keeps_zones_disjoint() {
        let mut catalog = PricingCatalog::default();
        catalog.special_region = "il".to_string();
        catalog.regional_bloc = BTreeSet::from(["za".to_string(), "IL".to_string()]);
        let classifier = ZoneClassifier::from_catalog(&catalog);

        assert_eq!(classifier.classify(Some("IL")), PricingZone::SpecialRegion);
        assert_eq!(classifier.classify(Some("ZA")), PricingZone::RegionalBloc);
        assert_eq!(classifier.special_region(), "IL");
        assert_eq!(
            classifier.regional_bloc(),
            &BTreeSet::from(["ZA".to_string()])
        );
    }
}
