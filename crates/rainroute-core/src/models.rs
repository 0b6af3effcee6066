//! Core data models for route rain-risk analysis.

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Coordinate quantized to a fixed grid step.
///
/// Used as the weather cache key so nearby sample points share one fetch.
/// The mapping is deterministic and idempotent: quantizing a cell's own
/// center returns the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub lat_idx: i32,
    pub lon_idx: i32,
}

impl GridCell {
    pub fn from_coordinate(coord: Coordinate, step_deg: f64) -> Self {
        let step = step_deg.max(1e-6);
        Self {
            lat_idx: (coord.lat / step).round() as i32,
            lon_idx: (coord.lon / step).round() as i32,
        }
    }

    /// Center of this cell in degrees.
    pub fn center(&self, step_deg: f64) -> Coordinate {
        let step = step_deg.max(1e-6);
        Coordinate {
            lat: self.lat_idx as f64 * step,
            lon: self.lon_idx as f64 * step,
        }
    }
}

/// Fused weather reading for one location (one grid cell), combining a
/// current-conditions provider and an hourly-forecast provider.
///
/// Never mutated after creation; cached with a short TTL by the fetch layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherBundle {
    /// Free-text sky condition for display. Only ever substring-matched.
    pub description: String,
    /// Measured precipitation right now, mm/h. Max of the two providers.
    pub now_precip_mm: f64,
    /// Forecast precipitation for the immediately following hour, mm.
    pub next_hour_precip_mm: f64,
    /// Precipitation probability for the coming hour, 0-100.
    pub precip_probability: u8,
    /// WMO weather code from the forecast provider.
    pub weather_code: u16,
    /// Display-only temperature, Celsius.
    pub temperature_c: Option<f64>,
    /// Local "HH:MM" when rain is forecast to stop, if currently raining.
    pub estimated_clear_time: Option<String>,
}

impl WeatherBundle {
    /// Neutral bundle used when every upstream fetch failed.
    ///
    /// Absence of data must never escalate risk, so all fields read as
    /// "no rain, no signal".
    pub fn neutral() -> Self {
        Self {
            description: String::new(),
            now_precip_mm: 0.0,
            next_hour_precip_mm: 0.0,
            precip_probability: 0,
            weather_code: 0,
            temperature_c: None,
            estimated_clear_time: None,
        }
    }

    /// Clamp numeric fields into their documented ranges.
    pub fn sanitized(mut self) -> Self {
        if !self.now_precip_mm.is_finite() || self.now_precip_mm < 0.0 {
            self.now_precip_mm = 0.0;
        }
        if !self.next_hour_precip_mm.is_finite() || self.next_hour_precip_mm < 0.0 {
            self.next_hour_precip_mm = 0.0;
        }
        self.precip_probability = self.precip_probability.min(100);
        self
    }
}

impl Default for WeatherBundle {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Maximal run of consecutive route points sharing one rain state.
///
/// Consecutive segments share one boundary coordinate: the point where the
/// state flips closes the prior run and opens the next. Every emitted
/// segment carries at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub rainy: bool,
    pub points: Vec<Coordinate>,
}

/// A candidate route as returned by the external router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<Coordinate>,
    pub duration_s: u32,
    pub distance_m: f64,
    pub start_label: String,
    pub end_label: String,
}

/// Result of analyzing one route. Produced fresh per request, never
/// persisted or mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAnalysis {
    /// Sample points the weather statistics were computed over.
    pub samples: Vec<Coordinate>,
    /// Rain/no-rain partition of the full-resolution polyline.
    pub segments: Vec<Segment>,
    /// Fraction of samples classified rainy, in [0, 1].
    pub rain_ratio: f64,
    /// Mean effective precipitation over the samples, mm/h.
    pub avg_effective_mm: f64,
    /// Weighted risk score in [0, 1]; lower is better.
    pub score: f64,
}

impl RouteAnalysis {
    /// Zero result for an empty input polyline.
    pub fn zero() -> Self {
        Self {
            samples: Vec::new(),
            segments: Vec::new(),
            rain_ratio: 0.0,
            avg_effective_mm: 0.0,
            score: 0.0,
        }
    }
}

/// A route together with its rain-risk analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedRoute {
    pub route: Route,
    pub analysis: RouteAnalysis,
}
