//! Rain classification over fused weather bundles.
//!
//! Pure and deterministic: no I/O, no clock. Everything here is a function
//! of one [`WeatherBundle`] and the configured [`RainRules`].

use crate::models::WeatherBundle;
use crate::rules::RainRules;
use serde::{Deserialize, Serialize};

/// True iff the code falls in the thunderstorm sub-range.
pub fn is_thunder(code: u16, rules: &RainRules) -> bool {
    rules.thunder_codes.contains(&code)
}

/// True iff the code denotes rain of any kind (drizzle, rain, showers,
/// thunder).
pub fn is_rain_code(code: u16, rules: &RainRules) -> bool {
    rules.rain_code_ranges.iter().any(|r| r.contains(&code))
}

/// Blended "now" and weighted "next hour" precipitation, mm/h.
///
/// Travel takes time: a point that will start raining shortly is still a
/// planning-relevant risk, so the next-hour forecast contributes at half
/// weight.
pub fn effective_precip(bundle: &WeatherBundle, rules: &RainRules) -> f64 {
    bundle
        .now_precip_mm
        .max(rules.next_hour_weight * bundle.next_hour_precip_mm)
}

/// The binary state used for segmentation and ratio counting.
pub fn is_rainy(bundle: &WeatherBundle, rules: &RainRules) -> bool {
    bundle.now_precip_mm >= rules.rain_threshold_mm
        || bundle.next_hour_precip_mm >= rules.rain_threshold_mm
        || is_thunder(bundle.weather_code, rules)
}

/// Instantaneous 0-1 risk, used only to gate the detailed map view.
pub fn instant_risk(bundle: &WeatherBundle, rules: &RainRules) -> f64 {
    let mut risk = f64::from(bundle.precip_probability.min(100)) / 100.0;
    if bundle.now_precip_mm >= rules.rain_threshold_mm {
        risk = risk.max(0.6);
    }
    if bundle.next_hour_precip_mm >= rules.rain_threshold_mm {
        risk = risk.max(0.6);
    }
    if is_thunder(bundle.weather_code, rules) {
        risk = risk.max(0.8);
    }
    risk
}

/// Human-facing severity bucket.
///
/// The ordering is a deliberate priority: thunderstorm beats measured
/// intensity, intensity beats probability. Changing it changes labels users
/// already recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Thunderstorm,
    Torrential,
    Heavy,
    HeavyShower,
    Shower,
    BriefShower,
    PossibleShower,
    NoRain,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Thunderstorm => "thunderstorm",
            Severity::Torrential => "torrential rain",
            Severity::Heavy => "heavy rain",
            Severity::HeavyShower => "moderate-heavy shower",
            Severity::Shower => "shower",
            Severity::BriefShower => "brief shower",
            Severity::PossibleShower => "possible light shower",
            Severity::NoRain => "no rain",
        }
    }

    pub fn is_rain(&self) -> bool {
        !matches!(self, Severity::NoRain)
    }
}

/// Classify a bundle into a severity bucket.
pub fn severity(bundle: &WeatherBundle, rules: &RainRules) -> Severity {
    let mm = bundle.now_precip_mm;
    if is_thunder(bundle.weather_code, rules) {
        Severity::Thunderstorm
    } else if mm >= rules.torrential_mm {
        Severity::Torrential
    } else if mm >= rules.heavy_rain_mm {
        Severity::Heavy
    } else if mm >= rules.heavy_shower_mm {
        Severity::HeavyShower
    } else if mm >= rules.shower_mm {
        Severity::Shower
    } else if mm > 0.0 {
        Severity::BriefShower
    } else if bundle.precip_probability >= rules.possible_shower_probability
        || bundle.next_hour_precip_mm >= rules.rain_threshold_mm
    {
        Severity::PossibleShower
    } else {
        Severity::NoRain
    }
}
