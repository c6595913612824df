//! Pricing facade scenarios against the in-memory lock store.

mod common;

use common::*;
use domain_pricing::*;
use test_utils::TestDataBuilder;

fn creator(quote: &PricingQuote) -> (Option<i64>, Option<i64>) {
    let price = quote.schedule.get(Tier::Creator).expect("creator tier");
    (price.weekly, price.monthly)
}

#[tokio::test]
async fn test_preview_classifies_each_zone() {
    let (repository, service) = in_memory();

    let quote = service.preview_pricing(ISRAEL).await.unwrap();
    assert_eq!(quote.zone, PricingZone::SpecialRegion);
    assert_eq!(creator(&quote), (Some(3500), Some(9900)));
    assert!(!quote.location_change_allowed);

    let quote = service.preview_pricing(SOUTH_AFRICA).await.unwrap();
    assert_eq!(quote.zone, PricingZone::RegionalBloc);
    assert_eq!(creator(&quote), (Some(800), Some(3000)));

    let quote = service.preview_pricing(GERMANY).await.unwrap();
    assert_eq!(quote.zone, PricingZone::Global);
    assert_eq!(creator(&quote), (Some(1500), Some(5900)));

    assert!(!quote.locked);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_preview_follows_apparent_location() {
    let (_, service) = in_memory();

    let home = service.preview_pricing(ISRAEL).await.unwrap();
    let vpn = service.preview_pricing(UNITED_STATES).await.unwrap();

    assert_eq!(home.zone, PricingZone::SpecialRegion);
    assert_eq!(vpn.zone, PricingZone::Global);
}

#[tokio::test]
async fn test_lock_survives_later_location_change() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("lock_survives").account_id();

    let registered = service
        .complete_registration(account_id, ISRAEL)
        .await
        .unwrap();
    assert_eq!(registered.zone, PricingZone::SpecialRegion);
    assert!(registered.locked);

    let preview_elsewhere = service.preview_pricing(UNITED_STATES).await.unwrap();
    assert_eq!(preview_elsewhere.zone, PricingZone::Global);

    let effective = service.effective_pricing(account_id).await.unwrap();
    assert_eq!(effective, registered);
}

#[tokio::test]
async fn test_timeout_during_registration_locks_global() {
    let (repository, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("timeout_global").account_id();

    let quote = service
        .complete_registration(account_id, HANGING)
        .await
        .unwrap();

    assert_eq!(quote.zone, PricingZone::Global);
    assert!(quote.locked);
    assert!(quote.provisional);

    let stored = repository.find_by_account(account_id).await.unwrap().unwrap();
    assert!(!stored.source_location.is_valid());
    assert!(stored.reevaluate_until.is_some_and(|until| until > stored.locked_at));
}

#[tokio::test]
async fn test_unrecognized_code_is_global_and_final() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("unrecognized").account_id();

    let quote = service
        .complete_registration(account_id, UNKNOWN_CODE)
        .await
        .unwrap();

    assert_eq!(quote.zone, PricingZone::Global);
    assert!(!quote.provisional);
}

#[tokio::test]
async fn test_second_registration_returns_same_record() {
    let provider = world();
    let repository = InMemoryLockRepository::new();
    let service = service_with(repository.clone(), provider.clone());
    let account_id = TestDataBuilder::from_test_name("idempotent").account_id();

    let first = service
        .complete_registration(account_id, SOUTH_AFRICA)
        .await
        .unwrap();
    let lookups_after_first = provider.calls();

    let second = service
        .complete_registration(account_id, GERMANY)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.calls(), lookups_after_first);
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_effective_pricing_before_registration() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("not_registered").account_id();

    let err = service.effective_pricing(account_id).await.unwrap_err();
    assert!(matches!(err, PricingError::NotRegistered(id) if id == account_id));
}

#[tokio::test]
async fn test_provisional_lock_upgraded_within_grace_window() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("grace_upgrade").account_id();

    let provisional = service
        .complete_registration(account_id, HANGING)
        .await
        .unwrap();
    assert!(provisional.provisional);

    let upgraded = service
        .reevaluate_pricing(account_id, SOUTH_AFRICA)
        .await
        .unwrap();
    assert_eq!(upgraded.zone, PricingZone::RegionalBloc);
    assert!(!upgraded.provisional);

    let effective = service.effective_pricing(account_id).await.unwrap();
    assert_eq!(effective, upgraded);

    let again = service.reevaluate_pricing(account_id, ISRAEL).await.unwrap();
    assert_eq!(again.zone, PricingZone::RegionalBloc);
}

#[tokio::test]
async fn test_reevaluation_of_final_lock_changes_nothing() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("final_lock").account_id();

    let locked = service
        .complete_registration(account_id, GERMANY)
        .await
        .unwrap();
    let after = service.reevaluate_pricing(account_id, ISRAEL).await.unwrap();

    assert_eq!(locked, after);
    assert_eq!(after.zone, PricingZone::Global);
}

#[tokio::test]
async fn test_reevaluation_requires_lock() {
    let (_, service) = in_memory();
    let account_id = TestDataBuilder::from_test_name("reevaluate_missing").account_id();

    assert!(matches!(
        service.reevaluate_pricing(account_id, ISRAEL).await,
        Err(PricingError::NotRegistered(_))
    ));
}

#[tokio::test]
async fn test_injected_catalog_changes_classification() {
    let mut catalog = PricingCatalog::default();
    catalog.regional_bloc.insert("DE".to_string());

    let service = PricingService::new(
        &catalog,
        InMemoryLockRepository::new(),
        LocationResolver::new(world(), std::time::Duration::from_millis(100)),
        ServiceOptions::default(),
    )
    .unwrap();

    let quote = service.preview_pricing(GERMANY).await.unwrap();
    assert_eq!(quote.zone, PricingZone::RegionalBloc);
}
