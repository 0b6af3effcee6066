//! Google Directions client: route alternatives between two resolved places.

use crate::cache::{self, Cached};
use crate::config::Config;
use crate::error::ProviderError;
use crate::geocode::Resolved;
use crate::http::get_json;
use dashmap::DashMap;
use rainroute_core::{decode_polyline, Route};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const CACHE_MAX_ENTRIES: usize = 128;

/// Travel mode requested by the user.
///
/// `Motorcycle` is not a router mode: it maps to driving with highways
/// avoided, since scooters are banned from expressways in the target
/// region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Motorcycle,
    Bicycling,
    Transit,
    Walking,
}

impl TravelMode {
    pub fn router_mode(&self) -> &'static str {
        match self {
            TravelMode::Driving | TravelMode::Motorcycle => "driving",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
        }
    }

    pub fn avoid(&self) -> Option<&'static str> {
        match self {
            TravelMode::Motorcycle => Some("highways"),
            _ => None,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TravelMode::Driving => "driving",
            TravelMode::Motorcycle => "motorcycle",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: ValueField,
    distance: ValueField,
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: f64,
}

pub struct DirectionsClient {
    client: Client,
    config: Arc<Config>,
    cache: DashMap<String, Cached<Vec<Route>>>,
}

impl DirectionsClient {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self {
            client,
            config,
            cache: DashMap::new(),
        }
    }

    /// Fetch up to `max_route_alternatives` candidate routes.
    ///
    /// An empty vector is the explicit "no route" outcome; it is distinct
    /// from a degraded analysis.
    pub async fn routes(
        &self,
        origin: &Resolved,
        destination: &Resolved,
        mode: TravelMode,
    ) -> Result<Vec<Route>, ProviderError> {
        let key = format!("{}|{}|{}", origin.place_ref, destination.place_ref, mode);
        let ttl = Duration::from_secs(self.config.geocode_cache_ttl_s);
        if let Some(hit) = cache::fresh_value(&self.cache, &key, ttl) {
            tracing::debug!(%mode, "directions cache hit");
            return Ok(hit);
        }

        let mut params = vec![
            ("origin", origin.place_ref.clone()),
            ("destination", destination.place_ref.clone()),
            ("mode", mode.router_mode().to_string()),
            ("alternatives", "true".to_string()),
            ("key", self.config.google_maps_api_key.clone()),
            ("language", self.config.language.clone()),
            ("region", self.config.region.clone()),
        ];
        if mode == TravelMode::Transit {
            params.push(("departure_time", "now".to_string()));
        }
        if let Some(avoid) = mode.avoid() {
            params.push(("avoid", avoid.to_string()));
        }

        let timeout = Duration::from_secs(self.config.directions_timeout_s);
        let response: DirectionsResponse = get_json(
            &self.client,
            DIRECTIONS_URL,
            &params,
            timeout,
            self.config.retry_attempts,
        )
        .await?;

        let routes = parse_directions(response, self.config.max_route_alternatives)?;
        cache::prune(&self.cache, CACHE_MAX_ENTRIES, ttl.saturating_mul(2));
        self.cache.insert(key, Cached::new(routes.clone()));
        Ok(routes)
    }
}

fn parse_directions(
    response: DirectionsResponse,
    max_routes: usize,
) -> Result<Vec<Route>, ProviderError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(Vec::new()),
        other => return Err(ProviderError::ApiStatus(other.to_string())),
    }

    let mut routes = Vec::new();
    for candidate in response.routes.into_iter().take(max_routes) {
        let Some(leg) = candidate.legs.first() else {
            continue;
        };
        let points = decode_polyline(&candidate.overview_polyline.points);
        if points.is_empty() {
            continue;
        }
        routes.push(Route {
            points,
            duration_s: leg.duration.value.max(0.0) as u32,
            distance_m: leg.distance.value.max(0.0),
            start_label: leg.start_address.clone(),
            end_label: leg.end_address.clone(),
        });
    }
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainroute_core::{encode_polyline, Coordinate};
    use serde_json::json;

    fn payload(statuses: &str, n_routes: usize) -> DirectionsResponse {
        let encoded = encode_polyline(&[
            Coordinate::new(25.03, 121.56),
            Coordinate::new(25.05, 121.58),
        ]);
        let route = json!({
            "overview_polyline": {"points": encoded},
            "legs": [{
                "duration": {"value": 1200.0},
                "distance": {"value": 8500.0},
                "start_address": "A",
                "end_address": "B"
            }]
        });
        serde_json::from_value(json!({
            "status": statuses,
            "routes": vec![route; n_routes],
        }))
        .unwrap()
    }

    #[test]
    fn parses_routes_and_decodes_polyline() {
        let routes = parse_directions(payload("OK", 2), 3).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].points.len(), 2);
        assert_eq!(routes[0].duration_s, 1200);
        assert!((routes[0].distance_m - 8500.0).abs() < 1e-9);
    }

    #[test]
    fn caps_alternatives_at_configured_max() {
        let routes = parse_directions(payload("OK", 5), 3).unwrap();
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn zero_results_is_empty_not_error() {
        assert!(parse_directions(payload("ZERO_RESULTS", 0), 3)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn denied_status_is_api_error() {
        assert!(matches!(
            parse_directions(payload("OVER_QUERY_LIMIT", 0), 3),
            Err(ProviderError::ApiStatus(_))
        ));
    }

    #[test]
    fn motorcycle_maps_to_driving_avoiding_highways() {
        assert_eq!(TravelMode::Motorcycle.router_mode(), "driving");
        assert_eq!(TravelMode::Motorcycle.avoid(), Some("highways"));
        assert_eq!(TravelMode::Driving.avoid(), None);
    }
}
