//! Shared fixtures for the pricing integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use domain_pricing::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the stub answers for one address
#[derive(Debug, Clone)]
pub enum Answer {
    Country(&'static str, &'static str),
    Fail,
    Hang,
}

/// Scripted provider keyed by address; unknown addresses fail
#[derive(Debug, Default)]
pub struct StubLocationProvider {
    answers: HashMap<String, Answer>,
    calls: AtomicUsize,
}

impl StubLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, answer: Answer) -> Self {
        self.answers.insert(address.to_string(), answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for StubLocationProvider {
    async fn lookup(&self, address: &str) -> PricingResult<ProviderLocation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(address) {
            Some(Answer::Country(code, name)) => Ok(ProviderLocation {
                country_name: Some(name.to_string()),
                country_code: Some(code.to_string()),
                region: None,
                city: None,
            }),
            Some(Answer::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(PricingError::LocationUnavailable("hung".into()))
            }
            Some(Answer::Fail) | None => {
                Err(PricingError::LocationUnavailable("no answer".into()))
            }
        }
    }
}

pub const ISRAEL: &str = "198.51.100.1";
pub const SOUTH_AFRICA: &str = "198.51.100.2";
pub const GERMANY: &str = "198.51.100.3";
pub const UNITED_STATES: &str = "198.51.100.4";
pub const HANGING: &str = "198.51.100.5";
pub const UNKNOWN_CODE: &str = "198.51.100.6";

pub fn world() -> Arc<StubLocationProvider> {
    Arc::new(
        StubLocationProvider::new()
            .with(ISRAEL, Answer::Country("IL", "ISRAEL"))
            .with(SOUTH_AFRICA, Answer::Country("ZA", "south africa"))
            .with(GERMANY, Answer::Country("DE", "Germany"))
            .with(UNITED_STATES, Answer::Country("US", "United States"))
            .with(HANGING, Answer::Hang)
            .with(UNKNOWN_CODE, Answer::Country("ZZ", "Nowhere")),
    )
}

pub type TestService<R> = PricingService<R, Arc<StubLocationProvider>>;

pub fn service_with<R: LockRepository + 'static>(
    repository: R,
    provider: Arc<StubLocationProvider>,
) -> TestService<R> {
    PricingService::new(
        &PricingCatalog::default(),
        repository,
        LocationResolver::new(provider, Duration::from_millis(100)),
        ServiceOptions::default(),
    )
    .expect("default catalog is valid")
}

pub fn in_memory() -> (InMemoryLockRepository, TestService<InMemoryLockRepository>) {
    let repository = InMemoryLockRepository::new();
    let service = service_with(repository.clone(), world());
    (repository, service)
}
