//! Address to country resolution.
//!
//! [`LocationResolver`] wraps a [`LocationProvider`] with a bounded timeout and
//! turns every failure into an invalid [`LocationResult`]. It never retries;
//! the facade owns retry policy.

use async_trait::async_trait;
use observability::PricingMetrics;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::country;
use crate::error::{PricingError, PricingResult};
use crate::models::LocationResult;
use crate::settings::LocationSettings;

/// Raw provider answer, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderLocation {
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Query-by-address against an external geolocation source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn lookup(&self, address: &str) -> PricingResult<ProviderLocation>;
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for Arc<T> {
    async fn lookup(&self, address: &str) -> PricingResult<ProviderLocation> {
        (**self).lookup(address).await
    }
}

/// ip-api.com style JSON body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> PricingResult<ProviderLocation> {
        if self.status != "success" {
            return Err(PricingError::LocationUnavailable(
                self.message.unwrap_or_else(|| format!("provider status {}", self.status)),
            ));
        }

        Ok(ProviderLocation {
            country_name: self.country,
            country_code: self.country_code,
            region: self.region_name,
            city: self.city,
        })
    }
}

/// HTTP provider calling `{base_url}/{address}`
#[derive(Debug, Clone)]
pub struct HttpLocationProvider {
    client: Client,
    base_url: Url,
}

impl HttpLocationProvider {
    pub fn new(settings: &LocationSettings) -> PricingResult<Self> {
        let base_url = Url::parse(&settings.provider_url).map_err(|e| {
            PricingError::Configuration(format!(
                "invalid location provider url {:?}: {}",
                settings.provider_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PricingError::Configuration(format!(
                "location provider url {:?} cannot take a path",
                settings.provider_url
            )));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("regional-pricing/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PricingError::Configuration(format!("http client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn lookup_url(&self, address: &str) -> PricingResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PricingError::Internal("provider url cannot be a base".into()))?
            .pop_if_empty()
            .push(address);
        Ok(url)
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn lookup(&self, address: &str) -> PricingResult<ProviderLocation> {
        let url = self.lookup_url(address)?;
        let unavailable = |e: reqwest::Error| PricingError::LocationUnavailable(e.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let body: IpApiResponse = response.json().await.map_err(unavailable)?;
        body.into_location()
    }
}

/// Bounded-time resolution that never fails
pub struct LocationResolver<P: LocationProvider> {
    provider: P,
    timeout: Duration,
}

impl<P: LocationProvider> LocationResolver<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Timeout, provider error, and a missing or malformed code all yield
    /// `valid = false`.
    pub async fn resolve(&self, address: &str) -> LocationResult {
        let address = address.trim();
        if address.is_empty() {
            return LocationResult::unavailable(address);
        }

        let started = Instant::now();
        let lookup = tokio::time::timeout(self.timeout, self.provider.lookup(address)).await;
        let elapsed = started.elapsed();

        let raw = match lookup {
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Location lookup timed out");
                PricingMetrics::record_lookup("timeout", elapsed);
                return LocationResult::unavailable(address);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Location lookup failed");
                PricingMetrics::record_lookup("invalid", elapsed);
                return LocationResult::unavailable(address);
            }
            Ok(Ok(raw)) => raw,
        };

        match normalize(address, raw) {
            Ok(result) => {
                debug!(%address, country_code = ?result.country_code(), "Location resolved");
                PricingMetrics::record_lookup("valid", elapsed);
                result
            }
            Err(e) => {
                warn!(error = %e, "Location provider returned unusable data");
                PricingMetrics::record_lookup("invalid", elapsed);
                LocationResult::unavailable(address)
            }
        }
    }
}

fn normalize(address: &str, raw: ProviderLocation) -> PricingResult<LocationResult> {
    let raw_code = raw
        .country_code
        .as_deref()
        .ok_or_else(|| PricingError::LocationUnavailable("response has no country code".into()))?;
    let code = country::normalize_code(raw_code)?;

    let name = raw
        .country_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(country::title_case)
        .or_else(|| country::country_name(&code).map(str::to_string))
        .unwrap_or_else(|| code.clone());

    Ok(LocationResult::resolved(
        address,
        name,
        code,
        non_empty(raw.region),
        non_empty(raw.city),
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
