//! External collaborator clients: geocoding, routing and weather providers
//! behind short-TTL caches, plus the fused weather service.

pub mod backoff;
pub mod cache;
pub mod config;
pub mod directions;
pub mod error;
mod http;
pub mod geocode;
pub mod weather;

pub use config::Config;
pub use directions::{DirectionsClient, TravelMode};
pub use error::ProviderError;
pub use geocode::{GeocodeClient, Resolved};
pub use weather::WeatherService;

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Build the shared HTTP client used by every provider.
pub fn http_client(config: &Config) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(
            config.request_timeout_s.max(config.directions_timeout_s),
        ))
        .build()
        .expect("Failed to create HTTP client")
}

/// All provider clients wired off one HTTP client and one config.
pub struct Providers {
    pub geocode: GeocodeClient,
    pub directions: DirectionsClient,
    pub weather: Arc<WeatherService>,
}

impl Providers {
    pub fn new(config: Config, rules: rainroute_core::RainRules) -> Self {
        let config = Arc::new(config);
        let client = http_client(&config);
        Self {
            geocode: GeocodeClient::new(client.clone(), config.clone()),
            directions: DirectionsClient::new(client.clone(), config.clone()),
            weather: Arc::new(WeatherService::new(client, config, rules)),
        }
    }
}
