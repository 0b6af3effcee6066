//! Google Geocoding client with a short-TTL cache.

use crate::cache::{self, Cached};
use crate::config::Config;
use crate::error::ProviderError;
use crate::http::get_json;
use dashmap::DashMap;
use rainroute_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const CACHE_MAX_ENTRIES: usize = 256;

/// A resolved place: router reference, display label and position.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// `place_id:`-prefixed reference usable as a directions endpoint.
    pub place_ref: String,
    pub label: String,
    pub coord: Coordinate,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    place_id: String,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

pub struct GeocodeClient {
    client: Client,
    config: Arc<Config>,
    cache: DashMap<String, Cached<Resolved>>,
}

impl GeocodeClient {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self {
            client,
            config,
            cache: DashMap::new(),
        }
    }

    /// Resolve a free-text place query.
    ///
    /// `PlaceNotFound` is the explicit "could not resolve" outcome and is
    /// raised before any routing or weather work happens.
    pub async fn resolve(&self, query: &str) -> Result<Resolved, ProviderError> {
        let key = query.trim().to_lowercase();
        let ttl = Duration::from_secs(self.config.geocode_cache_ttl_s);
        if let Some(hit) = cache::fresh_value(&self.cache, &key, ttl) {
            tracing::debug!(query, "geocode cache hit");
            return Ok(hit);
        }

        let params = [
            ("address", query.to_string()),
            ("key", self.config.google_maps_api_key.clone()),
            ("language", self.config.language.clone()),
            ("region", self.config.region.clone()),
            ("components", self.config.components.clone()),
        ];
        let timeout = Duration::from_secs(self.config.request_timeout_s);
        let response: GeocodeResponse = get_json(
            &self.client,
            GEOCODE_URL,
            &params,
            timeout,
            self.config.retry_attempts,
        )
        .await?;

        let resolved = parse_geocode(response, query)?;
        cache::prune(&self.cache, CACHE_MAX_ENTRIES, ttl.saturating_mul(2));
        self.cache.insert(key, Cached::new(resolved.clone()));
        Ok(resolved)
    }
}

fn parse_geocode(response: GeocodeResponse, query: &str) -> Result<Resolved, ProviderError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(ProviderError::PlaceNotFound(query.to_string())),
        other => return Err(ProviderError::ApiStatus(other.to_string())),
    }
    let top = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::PlaceNotFound(query.to_string()))?;
    Ok(Resolved {
        place_ref: format!("place_id:{}", top.place_id),
        label: top.formatted_address.unwrap_or_else(|| query.to_string()),
        coord: Coordinate::new(top.geometry.location.lat, top.geometry.location.lng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_ok_result() {
        let response: GeocodeResponse = serde_json::from_value(json!({
            "status": "OK",
            "results": [{
                "place_id": "abc123",
                "formatted_address": "Taipei Main Station",
                "geometry": {"location": {"lat": 25.0478, "lng": 121.5170}}
            }]
        }))
        .unwrap();
        let resolved = parse_geocode(response, "taipei station").unwrap();
        assert_eq!(resolved.place_ref, "place_id:abc123");
        assert_eq!(resolved.label, "Taipei Main Station");
        assert!((resolved.coord.lat - 25.0478).abs() < 1e-9);
    }

    #[test]
    fn zero_results_is_place_not_found() {
        let response: GeocodeResponse =
            serde_json::from_value(json!({"status": "ZERO_RESULTS", "results": []})).unwrap();
        assert!(matches!(
            parse_geocode(response, "nowhere"),
            Err(ProviderError::PlaceNotFound(_))
        ));
    }

    #[test]
    fn denied_status_is_api_error() {
        let response: GeocodeResponse =
            serde_json::from_value(json!({"status": "REQUEST_DENIED"})).unwrap();
        assert!(matches!(
            parse_geocode(response, "x"),
            Err(ProviderError::ApiStatus(_))
        ));
    }
}
