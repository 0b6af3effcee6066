//! Provider configuration from environment.

use crate::error::ProviderError;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub google_maps_api_key: String,
    pub openweather_api_key: String,
    /// Locale parameters forwarded to the mapping provider.
    pub language: String,
    pub region: String,
    pub components: String,
    /// Per-call timeout for weather and geocoding requests, seconds.
    pub request_timeout_s: u64,
    /// Per-call timeout for directions requests, seconds.
    pub directions_timeout_s: u64,
    /// Extra attempts after the first on transient errors.
    pub retry_attempts: u32,
    pub weather_cache_ttl_s: u64,
    pub geocode_cache_ttl_s: u64,
    pub max_route_alternatives: usize,
    /// Bound on in-flight weather fetches within one analysis pass.
    pub weather_concurrency: usize,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Required provider credentials fail here, at startup, rather than
    /// mid-analysis.
    pub fn from_env() -> Result<Self, ProviderError> {
        let google_maps_api_key = require_key("GOOGLE_MAPS_API_KEY")?;
        let openweather_api_key = require_key("OPENWEATHER_API_KEY")?;
        Ok(Self {
            google_maps_api_key,
            openweather_api_key,
            language: env::var("RAINROUTE_LANGUAGE").unwrap_or_else(|_| "zh-TW".to_string()),
            region: env::var("RAINROUTE_REGION").unwrap_or_else(|_| "tw".to_string()),
            components: env::var("RAINROUTE_COMPONENTS")
                .unwrap_or_else(|_| "country:TW".to_string()),
            request_timeout_s: env_u64("RAINROUTE_REQUEST_TIMEOUT_S", 20),
            directions_timeout_s: env_u64("RAINROUTE_DIRECTIONS_TIMEOUT_S", 30),
            retry_attempts: env_u64("RAINROUTE_RETRY_ATTEMPTS", 2) as u32,
            weather_cache_ttl_s: env_u64("RAINROUTE_WEATHER_CACHE_TTL_S", 120),
            geocode_cache_ttl_s: env_u64("RAINROUTE_GEOCODE_CACHE_TTL_S", 600),
            max_route_alternatives: env_u64("RAINROUTE_MAX_ROUTES", 3) as usize,
            weather_concurrency: env_u64("RAINROUTE_WEATHER_CONCURRENCY", 8).max(1) as usize,
        })
    }

    /// Configuration for tests and offline tooling: dummy keys, short
    /// timeouts, no retries.
    pub fn for_tests() -> Self {
        Self {
            google_maps_api_key: "test-google-key".to_string(),
            openweather_api_key: "test-openweather-key".to_string(),
            language: "zh-TW".to_string(),
            region: "tw".to_string(),
            components: "country:TW".to_string(),
            request_timeout_s: 2,
            directions_timeout_s: 2,
            retry_attempts: 0,
            weather_cache_ttl_s: 120,
            geocode_cache_ttl_s: 600,
            max_route_alternatives: 3,
            weather_concurrency: 8,
        }
    }
}

fn require_key(name: &'static str) -> Result<String, ProviderError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ProviderError::MissingCredential(name)),
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
