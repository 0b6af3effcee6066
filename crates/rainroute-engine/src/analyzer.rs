//! Route analysis: sampling, concurrent weather fetch, segmentation.

use rainroute_core::classify::is_rainy;
use rainroute_core::{
    analyze_with_bundles, sample_by_count, sample_by_distance, Coordinate, GridCell, Route,
    RouteAnalysis, WeatherBundle,
};
use rainroute_providers::WeatherService;

/// Outcome of the cheap pre-analysis pass.
///
/// Distinct from "not yet analyzed": a scan always produces one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickScan {
    /// No sampled point classified rainy.
    Clear,
    /// At least one sampled point classified rainy.
    RainAhead,
}

/// Quick-scan result plus the bundles inspected on the way, for the
/// detail-view gate.
#[derive(Debug)]
pub struct QuickScanReport {
    pub outcome: QuickScan,
    pub bundles: Vec<WeatherBundle>,
}

/// Full analysis of one route.
///
/// Samples by distance (density proportional to geography, not vertex
/// spacing), fetches each distinct grid cell at most once and concurrently,
/// then hands off to the pure segmentation/scoring pass over the
/// full-resolution polyline. Never fails: fetch errors already degraded to
/// neutral bundles inside the weather service.
pub async fn analyze_route(weather: &WeatherService, route: &Route) -> RouteAnalysis {
    let rules = weather.rules();
    if route.points.is_empty() {
        return RouteAnalysis::zero();
    }

    let interval_m = rules.interval_for_distance(route.distance_m);
    let samples = sample_by_distance(&route.points, interval_m);
    let cells: Vec<GridCell> = samples.iter().map(|&p| weather.cell_for(p)).collect();

    tracing::debug!(
        samples = samples.len(),
        interval_m,
        distance_m = route.distance_m,
        "analyzing route"
    );
    let bundles = weather.bundles_for_cells(&cells).await;

    analyze_with_bundles(&route.points, &samples, &bundles, rules)
}

/// Cheap yes/no scan over a fixed number of samples.
///
/// Fetches sequentially and returns at the first rainy sample; the
/// short-circuit only saves upstream calls, it never changes what a later
/// full analysis would conclude. The grid-cell cache absorbs duplicate
/// lookups when samples share a cell.
pub async fn quick_scan(weather: &WeatherService, points: &[Coordinate]) -> QuickScanReport {
    let rules = weather.rules().clone();
    let samples = sample_by_count(points, rules.quick_scan_samples);

    let mut bundles = Vec::with_capacity(samples.len());
    for &point in &samples {
        let bundle = weather.bundle_at(point).await;
        let rainy = is_rainy(&bundle, &rules);
        bundles.push(bundle);
        if rainy {
            tracing::debug!(?point, "quick scan found rain, short-circuiting");
            return QuickScanReport {
                outcome: QuickScan::RainAhead,
                bundles,
            };
        }
    }
    QuickScanReport {
        outcome: QuickScan::Clear,
        bundles,
    }
}
