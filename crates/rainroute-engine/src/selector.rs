//! Candidate route selection.

use crate::analyzer::analyze_route;
use futures::future::join_all;
use rainroute_core::{rank, AnalyzedRoute, Route};
use rainroute_providers::WeatherService;

/// Analyze all candidates and pick the best.
///
/// Route analyses are independent (the weather cache is shared and safe
/// for concurrent use), so they run concurrently. Returns `None` only for
/// an empty candidate list; the caller surfaces that as the explicit
/// "no route" outcome.
pub async fn select_best(
    weather: &WeatherService,
    routes: Vec<Route>,
) -> Option<(AnalyzedRoute, Vec<AnalyzedRoute>)> {
    if routes.is_empty() {
        return None;
    }

    let analyses = join_all(routes.iter().map(|route| analyze_route(weather, route))).await;
    let analyzed: Vec<AnalyzedRoute> = routes
        .into_iter()
        .zip(analyses)
        .map(|(route, analysis)| AnalyzedRoute { route, analysis })
        .collect();

    for candidate in &analyzed {
        tracing::info!(
            score = candidate.analysis.score,
            rain_ratio = candidate.analysis.rain_ratio,
            duration_s = candidate.route.duration_s,
            "route analyzed"
        );
    }
    rank(analyzed)
}
