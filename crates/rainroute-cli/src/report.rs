//! Human-facing report formatting for the destination weather and routes.

use rainroute_core::{severity, RainRules, Severity, WeatherBundle};

// CWA-style intensity bands, mm/h. Display only; classification bounds
// live in `RainRules`.
const EXTREMELY_HEAVY_MM: f64 = 50.0;
const TORRENTIAL_MM: f64 = 30.0;
const HEAVY_MM: f64 = 15.0;
const MODERATE_MM: f64 = 7.0;

/// Bucket the measured intensity into a display label.
pub fn rainfall_intensity_label(mm: f64) -> Option<&'static str> {
    if !mm.is_finite() || mm <= 0.0 {
        return None;
    }
    Some(if mm >= EXTREMELY_HEAVY_MM {
        "extremely heavy rain"
    } else if mm >= TORRENTIAL_MM {
        "torrential rain"
    } else if mm >= HEAVY_MM {
        "heavy rain"
    } else if mm >= MODERATE_MM {
        "moderate rain"
    } else {
        "light rain"
    })
}

/// Rough sky label from the observation provider's free-text description.
/// Only ever substring-matched, per the provider contract.
pub fn sky_label(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    if lower.contains("overcast") {
        "overcast"
    } else if lower.contains("cloud") {
        "cloudy"
    } else {
        "clear skies"
    }
}

/// One-line destination weather summary.
pub fn destination_summary(bundle: &WeatherBundle, rules: &RainRules) -> String {
    let state = severity(bundle, rules);
    let temperature = bundle
        .temperature_c
        .map(|t| format!("{t:.1}°C"))
        .unwrap_or_else(|| "—".to_string());

    let mut line = if state == Severity::NoRain {
        format!(
            "{} | {} | rain probability {}%",
            sky_label(&bundle.description),
            temperature,
            bundle.precip_probability
        )
    } else {
        format!(
            "{} | {} | rain probability {}%",
            state.label(),
            temperature,
            bundle.precip_probability
        )
    };

    if let Some(label) = rainfall_intensity_label(bundle.now_precip_mm) {
        line.push_str(&format!(
            " | ~{:.1} mm/h ({label})",
            bundle.now_precip_mm
        ));
    }
    if let Some(clear_at) = &bundle.estimated_clear_time {
        line.push_str(&format!(" | rain expected to stop around {clear_at}"));
    }
    line
}
