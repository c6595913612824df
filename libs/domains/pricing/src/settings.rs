//! Environment-driven settings for the pricing engine.

use core_config::{ConfigError, FromEnv, env_list, env_optional, env_or_default, env_parse_or};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PROVIDER_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3000;
pub const MIN_LOOKUP_TIMEOUT_MS: u64 = 2000;
pub const MAX_LOOKUP_TIMEOUT_MS: u64 = 5000;
/// One year
pub const MAX_GRACE_WINDOW_HOURS: i64 = 8760;

/// Catalog source and lock policy
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSettings {
    /// `PRICING_CONFIG_PATH`: JSON catalog replacing the built-in one
    pub config_path: Option<PathBuf>,
    /// `PRICING_REGIONAL_BLOC`: comma-separated codes replacing the bloc
    pub regional_bloc: Option<Vec<String>>,
    /// `PRICING_GRACE_WINDOW_HOURS`
    pub grace_window_hours: i64,
    /// `PRICING_RESOLVE_ATTEMPTS`: lookups allowed before locking provisionally
    pub resolve_attempts: u32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            config_path: None,
            regional_bloc: None,
            grace_window_hours: 24,
            resolve_attempts: 2,
        }
    }
}

impl FromEnv for PricingSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Self {
            config_path: env_optional("PRICING_CONFIG_PATH").map(PathBuf::from),
            regional_bloc: env_list("PRICING_REGIONAL_BLOC"),
            grace_window_hours: env_parse_or(
                "PRICING_GRACE_WINDOW_HOURS",
                defaults.grace_window_hours,
            )?,
            resolve_attempts: env_parse_or("PRICING_RESOLVE_ATTEMPTS", defaults.resolve_attempts)?,
        };

        if !(0..=MAX_GRACE_WINDOW_HOURS).contains(&settings.grace_window_hours) {
            return Err(ConfigError::Invalid(format!(
                "PRICING_GRACE_WINDOW_HOURS must be between 0 and {}",
                MAX_GRACE_WINDOW_HOURS
            )));
        }
        if settings.resolve_attempts == 0 {
            return Err(ConfigError::Invalid(
                "PRICING_RESOLVE_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(settings)
    }
}

/// Outbound location provider
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    /// `LOCATION_PROVIDER_URL`
    pub provider_url: String,
    /// `LOCATION_TIMEOUT_MS`, clamped to 2-5 seconds
    pub timeout: Duration,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
        }
    }
}

impl FromEnv for LocationSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms = env_parse_or("LOCATION_TIMEOUT_MS", DEFAULT_LOOKUP_TIMEOUT_MS)?
            .clamp(MIN_LOOKUP_TIMEOUT_MS, MAX_LOOKUP_TIMEOUT_MS);

        Ok(Self {
            provider_url: env_or_default("LOCATION_PROVIDER_URL", DEFAULT_PROVIDER_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
