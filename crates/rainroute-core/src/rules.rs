//! Tunable thresholds and weights for rain classification and scoring.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Policy knobs for the analysis pipeline.
///
/// These are configuration, not constants baked into the logic: provider
/// code ranges and precipitation thresholds can be tuned without touching
/// the classifier or the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainRules {
    /// Precipitation at or above this counts as rain, mm/h.
    pub rain_threshold_mm: f64,
    /// Weight applied to the next-hour forecast when blending with the
    /// current reading (travel takes time, so imminent rain still matters).
    pub next_hour_weight: f64,
    /// Weight of the rainy-sample ratio in the route score.
    pub ratio_weight: f64,
    /// Weight of the intensity term in the route score.
    pub intensity_weight: f64,
    /// Intensity normalization, mm/h (30 mm/h saturates the term).
    pub intensity_norm_mm: f64,
    /// Grid quantization step for the weather cache, degrees.
    pub grid_step_deg: f64,
    /// Sampling interval for routes up to the long-route threshold, meters.
    pub short_interval_m: f64,
    /// Sampling interval for longer routes, meters.
    pub long_interval_m: f64,
    /// Routes longer than this use the coarser interval, kilometers.
    pub long_route_threshold_km: f64,
    /// Fixed sample count for the quick yes/no scan.
    pub quick_scan_samples: usize,
    /// Instant risk at or above this warrants the detailed map view.
    pub detail_view_risk_threshold: f64,
    /// Severity waterfall bounds, mm/h: torrential, heavy, moderate-heavy
    /// shower, shower. Anything above zero but below `shower_mm` is a
    /// brief shower.
    pub torrential_mm: f64,
    pub heavy_rain_mm: f64,
    pub heavy_shower_mm: f64,
    pub shower_mm: f64,
    /// Probability at or above this reads as a possible shower even with
    /// no measured rain, percent.
    pub possible_shower_probability: u8,
    /// WMO codes treated as thunderstorm.
    pub thunder_codes: RangeInclusive<u16>,
    /// WMO code ranges treated as rain of any kind.
    pub rain_code_ranges: Vec<RangeInclusive<u16>>,
    /// A forecast hour only counts as "clearly not rainy" below this
    /// probability, percent.
    pub clear_probability_max: u8,
}

impl Default for RainRules {
    fn default() -> Self {
        Self {
            rain_threshold_mm: 0.2,
            next_hour_weight: 0.5,
            ratio_weight: 0.7,
            intensity_weight: 0.3,
            intensity_norm_mm: 30.0,
            grid_step_deg: 0.02,
            short_interval_m: 500.0,
            long_interval_m: 1000.0,
            long_route_threshold_km: 30.0,
            quick_scan_samples: 8,
            detail_view_risk_threshold: 0.20,
            torrential_mm: 30.0,
            heavy_rain_mm: 15.0,
            heavy_shower_mm: 7.0,
            shower_mm: 2.0,
            possible_shower_probability: 50,
            thunder_codes: 95..=99,
            // WMO: drizzle 51-57, rain 61-67, showers 80-82, thunder 95-99
            rain_code_ranges: vec![51..=57, 61..=67, 80..=82, 95..=99],
            clear_probability_max: 30,
        }
    }
}

impl RainRules {
    /// Sampling interval for a route of the given total length.
    pub fn interval_for_distance(&self, total_distance_m: f64) -> f64 {
        if total_distance_m > self.long_route_threshold_km * 1000.0 {
            self.long_interval_m
        } else {
            self.short_interval_m
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_switches_at_long_route_threshold() {
        let rules = RainRules::default();
        assert_eq!(rules.interval_for_distance(12_000.0), 500.0);
        assert_eq!(rules.interval_for_distance(30_000.0), 500.0);
        assert_eq!(rules.interval_for_distance(30_001.0), 1000.0);
    }
}
