//! Detail-view gate: is a map and full analysis worth producing at all?

use rainroute_core::classify::instant_risk;
use rainroute_core::{RainRules, WeatherBundle};

/// True when the destination or any quick-scan sample carries enough
/// instantaneous risk to justify the full analysis and map rendering.
pub fn needs_detailed_view(
    rules: &RainRules,
    destination: &WeatherBundle,
    quick_scan_bundles: &[WeatherBundle],
) -> bool {
    if instant_risk(destination, rules) >= rules.detail_view_risk_threshold {
        return true;
    }
    quick_scan_bundles
        .iter()
        .any(|bundle| instant_risk(bundle, rules) >= rules.detail_view_risk_threshold)
}
