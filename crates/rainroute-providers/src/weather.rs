//! Fused weather signal fetcher.
//!
//! Two independent sources feed one [`WeatherBundle`] per grid cell: an
//! OpenWeather current-conditions reading and an Open-Meteo hourly
//! forecast. Each side has its own short-TTL cache, and either side failing
//! degrades to the other's fields; a missing reading never aborts a route
//! analysis.

use crate::cache::{self, Cached};
use crate::config::Config;
use crate::error::ProviderError;
use crate::http::get_json;
use chrono::{DateTime, FixedOffset, Utc};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use rainroute_core::classify::is_rain_code;
use rainroute_core::{Coordinate, GridCell, RainRules, WeatherBundle};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CACHE_MAX_ENTRIES: usize = 512;

/// Normalized current-conditions reading (OpenWeather).
#[derive(Debug, Clone)]
struct CurrentConditions {
    description: String,
    rain_mm: f64,
    temperature_c: Option<f64>,
}

/// Normalized hourly-forecast extract (Open-Meteo).
#[derive(Debug, Clone)]
struct HourlyOutlook {
    now_precip_mm: f64,
    next_hour_precip_mm: f64,
    probability: u8,
    weather_code: u16,
    temperature_c: Option<f64>,
    clear_time: Option<String>,
}

// ---- OpenWeather payload ----

#[derive(Debug, Deserialize)]
struct OwResponse {
    #[serde(default)]
    weather: Vec<OwCondition>,
    #[serde(default)]
    rain: Option<OwRain>,
    #[serde(default)]
    main: Option<OwMain>,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: Option<f64>,
}

fn current_from_payload(payload: OwResponse) -> Result<CurrentConditions, ProviderError> {
    let condition = payload
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("missing weather conditions".to_string()))?;
    let rain_mm = payload
        .rain
        .and_then(|rain| rain.one_hour.or(rain.three_hours))
        .unwrap_or(0.0)
        .max(0.0);
    Ok(CurrentConditions {
        description: condition.description,
        rain_mm,
        temperature_c: payload.main.and_then(|main| main.temp),
    })
}

// ---- Open-Meteo payload ----

#[derive(Debug, Deserialize)]
struct OmResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(default)]
    current: Option<OmCurrent>,
    #[serde(default)]
    hourly: Option<OmHourly>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    #[serde(default)]
    temperature_2m: Option<f64>,
}

// Open-Meteo pads hourly arrays with nulls past the forecast horizon.
#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<f64>>,
}

impl OmHourly {
    fn precip(&self, idx: usize) -> f64 {
        self.precipitation
            .get(idx)
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .max(0.0)
    }

    fn probability(&self, idx: usize) -> u8 {
        self.precipitation_probability
            .get(idx)
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .clamp(0.0, 100.0) as u8
    }

    fn code(&self, idx: usize) -> u16 {
        self.weather_code
            .get(idx)
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

/// Extract the outlook for "now" from an hourly payload.
///
/// The current hour is located by matching the provider's local-time label;
/// when the label is absent the scan falls back to the middle entry, which
/// keeps a skewed clock from zeroing the whole reading.
fn outlook_from_payload(
    payload: &OmResponse,
    now_utc: DateTime<Utc>,
    rules: &RainRules,
) -> HourlyOutlook {
    let temperature_c = payload
        .current
        .as_ref()
        .and_then(|current| current.temperature_2m);
    let empty = OmHourly::default();
    let hourly = payload.hourly.as_ref().unwrap_or(&empty);

    let offset = FixedOffset::east_opt(payload.utc_offset_seconds)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
    let target = now_utc
        .with_timezone(&offset)
        .format("%Y-%m-%dT%H:00")
        .to_string();

    let idx = hourly
        .time
        .iter()
        .position(|t| *t == target)
        .unwrap_or_else(|| {
            if hourly.time.is_empty() {
                0
            } else {
                (hourly.time.len() / 2).min(hourly.time.len() - 1)
            }
        });

    let now_precip_mm = hourly.precip(idx);
    let weather_code = hourly.code(idx);

    let currently_raining = now_precip_mm > 0.0 || is_rain_code(weather_code, rules);
    let clear_time = if currently_raining {
        hourly.time.iter().enumerate().skip(idx + 1).find_map(|(j, time)| {
            let clear = hourly.precip(j) <= 0.0
                && hourly.probability(j) < rules.clear_probability_max
                && !is_rain_code(hourly.code(j), rules);
            (clear && time.len() >= 16).then(|| time[11..16].to_string())
        })
    } else {
        None
    };

    HourlyOutlook {
        now_precip_mm,
        next_hour_precip_mm: hourly.precip(idx + 1),
        probability: hourly.probability(idx),
        weather_code,
        temperature_c,
        clear_time,
    }
}

/// Merge the two provider readings into one bundle.
///
/// The measured intensity takes the max of both providers; forecast fields
/// come from the hourly side; the display description comes from the
/// observation side. Both sides missing yields the neutral bundle.
fn fuse(current: Option<CurrentConditions>, outlook: Option<HourlyOutlook>) -> WeatherBundle {
    let mut bundle = WeatherBundle::neutral();
    if let Some(current) = &current {
        bundle.description = current.description.clone();
        bundle.now_precip_mm = current.rain_mm;
        bundle.temperature_c = current.temperature_c;
    }
    if let Some(outlook) = outlook {
        bundle.now_precip_mm = bundle.now_precip_mm.max(outlook.now_precip_mm);
        bundle.next_hour_precip_mm = outlook.next_hour_precip_mm;
        bundle.precip_probability = outlook.probability;
        bundle.weather_code = outlook.weather_code;
        bundle.estimated_clear_time = outlook.clear_time;
        if outlook.temperature_c.is_some() {
            bundle.temperature_c = outlook.temperature_c;
        }
    }
    bundle.sanitized()
}

/// Weather fetch layer: per-provider caches keyed by grid cell, bounded
/// concurrent fan-out, fail-soft fusion.
pub struct WeatherService {
    client: Client,
    config: Arc<Config>,
    rules: RainRules,
    current_cache: DashMap<GridCell, Cached<CurrentConditions>>,
    outlook_cache: DashMap<GridCell, Cached<HourlyOutlook>>,
}

impl WeatherService {
    pub fn new(client: Client, config: Arc<Config>, rules: RainRules) -> Self {
        Self {
            client,
            config,
            rules,
            current_cache: DashMap::new(),
            outlook_cache: DashMap::new(),
        }
    }

    pub fn rules(&self) -> &RainRules {
        &self.rules
    }

    /// Grid cell covering a coordinate under the configured quantization.
    pub fn cell_for(&self, coord: Coordinate) -> GridCell {
        GridCell::from_coordinate(coord, self.rules.grid_step_deg)
    }

    /// Fused bundle for one coordinate. Never fails: upstream errors
    /// degrade the affected side and are logged.
    pub async fn bundle_at(&self, coord: Coordinate) -> WeatherBundle {
        self.bundle_for_cell(self.cell_for(coord)).await
    }

    /// Fused bundle for one grid cell.
    pub async fn bundle_for_cell(&self, cell: GridCell) -> WeatherBundle {
        let (current, outlook) =
            tokio::join!(self.current_for_cell(cell), self.outlook_for_cell(cell));
        fuse(current, outlook)
    }

    /// Fetch bundles for an analysis pass: each distinct cell fetched at
    /// most once, at most `weather_concurrency` calls in flight, fan-in
    /// waits for all. Failed entries degrade individually.
    pub async fn bundles_for_cells(&self, cells: &[GridCell]) -> HashMap<GridCell, WeatherBundle> {
        let mut seen = HashSet::new();
        let distinct: Vec<GridCell> = cells
            .iter()
            .copied()
            .filter(|cell| seen.insert(*cell))
            .collect();

        stream::iter(distinct)
            .map(|cell| async move { (cell, self.bundle_for_cell(cell).await) })
            .buffer_unordered(self.config.weather_concurrency)
            .collect()
            .await
    }

    async fn current_for_cell(&self, cell: GridCell) -> Option<CurrentConditions> {
        let ttl = Duration::from_secs(self.config.weather_cache_ttl_s);
        if let Some(hit) = cache::fresh_value(&self.current_cache, &cell, ttl) {
            return Some(hit);
        }
        match self.fetch_current(cell.center(self.rules.grid_step_deg)).await {
            Ok(current) => {
                cache::prune(&self.current_cache, CACHE_MAX_ENTRIES, ttl.saturating_mul(2));
                self.current_cache.insert(cell, Cached::new(current.clone()));
                Some(current)
            }
            Err(err) => {
                tracing::warn!(?cell, "current-conditions fetch degraded: {err}");
                None
            }
        }
    }

    async fn outlook_for_cell(&self, cell: GridCell) -> Option<HourlyOutlook> {
        let ttl = Duration::from_secs(self.config.weather_cache_ttl_s);
        if let Some(hit) = cache::fresh_value(&self.outlook_cache, &cell, ttl) {
            return Some(hit);
        }
        match self.fetch_outlook(cell.center(self.rules.grid_step_deg)).await {
            Ok(outlook) => {
                cache::prune(&self.outlook_cache, CACHE_MAX_ENTRIES, ttl.saturating_mul(2));
                self.outlook_cache.insert(cell, Cached::new(outlook.clone()));
                Some(outlook)
            }
            Err(err) => {
                tracing::warn!(?cell, "hourly-outlook fetch degraded: {err}");
                None
            }
        }
    }

    async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions, ProviderError> {
        let params = [
            ("lat", format!("{:.6}", coord.lat)),
            ("lon", format!("{:.6}", coord.lon)),
            ("appid", self.config.openweather_api_key.clone()),
            ("units", "metric".to_string()),
            ("lang", self.config.language.to_lowercase().replace('-', "_")),
        ];
        let payload: OwResponse = get_json(
            &self.client,
            OPENWEATHER_URL,
            &params,
            Duration::from_secs(self.config.request_timeout_s),
            self.config.retry_attempts,
        )
        .await?;
        current_from_payload(payload)
    }

    async fn fetch_outlook(&self, coord: Coordinate) -> Result<HourlyOutlook, ProviderError> {
        let params = [
            ("latitude", format!("{:.6}", coord.lat)),
            ("longitude", format!("{:.6}", coord.lon)),
            ("current", "temperature_2m".to_string()),
            (
                "hourly",
                "precipitation,precipitation_probability,weather_code".to_string(),
            ),
            ("forecast_days", "1".to_string()),
            ("timezone", "auto".to_string()),
        ];
        let payload: OmResponse = get_json(
            &self.client,
            OPEN_METEO_URL,
            &params,
            Duration::from_secs(self.config.request_timeout_s),
            self.config.retry_attempts,
        )
        .await?;
        Ok(outlook_from_payload(&payload, Utc::now(), &self.rules))
    }
}
