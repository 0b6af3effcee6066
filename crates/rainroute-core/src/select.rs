//! Ranking of analyzed route alternatives.

use crate::models::AnalyzedRoute;

/// Sort key: score rounded to 4 decimals, then duration.
///
/// Rounding keeps near-identical risk scores from masking the duration
/// tie-break (lower risk first; among equal risk, the faster route wins).
fn rank_key(route: &AnalyzedRoute) -> (i64, u32) {
    let rounded = (route.analysis.score * 10_000.0).round() as i64;
    (rounded, route.route.duration_s)
}

/// Partition analyzed candidates into the best route and the rest.
///
/// The rest keep their original relative order. Returns `None` for an empty
/// candidate list (the explicit "no route" outcome is handled upstream).
pub fn rank(mut candidates: Vec<AnalyzedRoute>) -> Option<(AnalyzedRoute, Vec<AnalyzedRoute>)> {
    if candidates.is_empty() {
        return None;
    }
    let best_index = candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, route)| rank_key(route))
        .map(|(i, _)| i)?;
    let best = candidates.remove(best_index);
    Some((best, candidates))
}
