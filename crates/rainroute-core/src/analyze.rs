//! Pure analysis over a polyline and a prefetched cell-to-bundle map.
//!
//! The fetch layer resolves sample points to weather bundles (one per grid
//! cell); everything after that point is deterministic and lives here so it
//! can be tested without any I/O.

use std::collections::HashMap;

use crate::classify::{effective_precip, is_rainy};
use crate::geo::haversine_distance_m;
use crate::models::{Coordinate, GridCell, RouteAnalysis, Segment, WeatherBundle};
use crate::rules::RainRules;

/// Analyze a full-resolution polyline against fetched weather bundles.
///
/// `samples` are the points the statistics (`rain_ratio`,
/// `avg_effective_mm`) are computed over; segmentation walks the full
/// `points` list so segment boundaries follow route geometry, not sampling
/// density. Both are expected to map into `bundles` through grid
/// quantization; points whose cell was never fetched inherit the nearest
/// fetched cell's state.
pub fn analyze_with_bundles(
    points: &[Coordinate],
    samples: &[Coordinate],
    bundles: &HashMap<GridCell, WeatherBundle>,
    rules: &RainRules,
) -> RouteAnalysis {
    if points.is_empty() {
        return RouteAnalysis::zero();
    }

    let mut rainy_count = 0usize;
    let mut effective_sum = 0.0;
    for sample in samples {
        let bundle = bundle_for_point(*sample, bundles, rules);
        if let Some(bundle) = bundle {
            if is_rainy(bundle, rules) {
                rainy_count += 1;
            }
            effective_sum += effective_precip(bundle, rules);
        }
    }

    let rain_ratio = if samples.is_empty() {
        0.0
    } else {
        rainy_count as f64 / samples.len() as f64
    };
    let avg_effective_mm = if samples.is_empty() {
        0.0
    } else {
        effective_sum / samples.len() as f64
    };

    let states = point_states(points, bundles, rules);
    let segments = encode_segments(points, &states);

    RouteAnalysis {
        samples: samples.to_vec(),
        segments,
        rain_ratio,
        avg_effective_mm,
        score: risk_score(rain_ratio, avg_effective_mm, rules),
    }
}

/// Weighted risk score, clamped to [0, 1]. Lower is better.
pub fn risk_score(rain_ratio: f64, avg_effective_mm: f64, rules: &RainRules) -> f64 {
    let intensity = (avg_effective_mm / rules.intensity_norm_mm).min(1.0);
    (rules.ratio_weight * rain_ratio + rules.intensity_weight * intensity).clamp(0.0, 1.0)
}

/// Rain state for every raw point of the polyline.
///
/// Exact cell hit first; otherwise the nearest fetched cell by center
/// distance. With nothing fetched at all, a point inherits its
/// predecessor's state, and the very first point defaults to not rainy.
fn point_states(
    points: &[Coordinate],
    bundles: &HashMap<GridCell, WeatherBundle>,
    rules: &RainRules,
) -> Vec<bool> {
    let mut states = Vec::with_capacity(points.len());
    let mut previous = false;
    for &point in points {
        let state = bundle_for_point(point, bundles, rules)
            .map(|bundle| is_rainy(bundle, rules))
            .unwrap_or(previous);
        states.push(state);
        previous = state;
    }
    states
}

fn bundle_for_point<'a>(
    point: Coordinate,
    bundles: &'a HashMap<GridCell, WeatherBundle>,
    rules: &RainRules,
) -> Option<&'a WeatherBundle> {
    let cell = GridCell::from_coordinate(point, rules.grid_step_deg);
    if let Some(bundle) = bundles.get(&cell) {
        return Some(bundle);
    }
    // The fetched set is small (one entry per grid cell of the sampled
    // route), so a linear nearest-neighbor scan is fine.
    bundles
        .iter()
        .min_by(|(a, _), (b, _)| {
            let da = haversine_distance_m(point, a.center(rules.grid_step_deg));
            let db = haversine_distance_m(point, b.center(rules.grid_step_deg));
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(_, bundle)| bundle)
}

/// Run-length encode per-point rain states into segments.
///
/// The point where the state flips closes the prior segment and opens the
/// next, so consecutive segments share one boundary coordinate and every
/// emitted segment has at least two points. A trailing singleton run is
/// already covered by the prior segment's closing point and is dropped.
fn encode_segments(points: &[Coordinate], states: &[bool]) -> Vec<Segment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current_state = states[0];
    let mut current_points = vec![points[0]];

    for (&point, &state) in points[1..].iter().zip(&states[1..]) {
        if state == current_state {
            current_points.push(point);
        } else {
            // Boundary point closes the old run and opens the new one.
            current_points.push(point);
            segments.push(Segment {
                rainy: current_state,
                points: std::mem::take(&mut current_points),
            });
            current_state = state;
            current_points.push(point);
        }
    }

    if current_points.len() >= 2 {
        segments.push(Segment {
            rainy: current_state,
            points: current_points,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherBundle;

    fn rainy_bundle() -> WeatherBundle {
        WeatherBundle {
            now_precip_mm: 5.0,
            ..WeatherBundle::neutral()
        }
    }

    fn clear_bundle() -> WeatherBundle {
        WeatherBundle {
            precip_probability: 5,
            weather_code: 0,
            ..WeatherBundle::neutral()
        }
    }

    fn cell_of(point: Coordinate, rules: &RainRules) -> GridCell {
        GridCell::from_coordinate(point, rules.grid_step_deg)
    }

    #[test]
    fn empty_polyline_returns_zero() {
        let rules = RainRules::default();
        let analysis = analyze_with_bundles(&[], &[], &HashMap::new(), &rules);
        assert!(analysis.segments.is_empty());
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.rain_ratio, 0.0);
    }

    #[test]
    fn all_clear_route_scores_zero() {
        let rules = RainRules::default();
        let points = vec![
            Coordinate::new(25.03, 121.56),
            Coordinate::new(25.05, 121.58),
            Coordinate::new(25.10, 121.60),
        ];
        let mut bundles = HashMap::new();
        for &p in &points {
            bundles.insert(cell_of(p, &rules), clear_bundle());
        }
        let analysis = analyze_with_bundles(&points, &points, &bundles, &rules);
        assert_eq!(analysis.rain_ratio, 0.0);
        assert_eq!(analysis.score, 0.0);
        assert!(analysis.segments.iter().all(|s| !s.rainy));
    }

    #[test]
    fn rainy_middle_yields_bounded_rain_segment() {
        let rules = RainRules::default();
        let points = vec![
            Coordinate::new(25.03, 121.56),
            Coordinate::new(25.05, 121.58),
            Coordinate::new(25.10, 121.60),
        ];
        let mut bundles = HashMap::new();
        bundles.insert(cell_of(points[0], &rules), clear_bundle());
        bundles.insert(cell_of(points[1], &rules), rainy_bundle());
        bundles.insert(cell_of(points[2], &rules), clear_bundle());

        let analysis = analyze_with_bundles(&points, &points, &bundles, &rules);
        assert!((analysis.rain_ratio - 1.0 / 3.0).abs() < 1e-9);
        let rainy: Vec<&Segment> = analysis.segments.iter().filter(|s| s.rainy).collect();
        assert_eq!(rainy.len(), 1);
        // A middle singleton still spans two boundary points.
        assert!(rainy[0].points.len() >= 2);
    }

    #[test]
    fn segments_round_trip_to_original_polyline() {
        let rules = RainRules::default();
        let points: Vec<Coordinate> = (0..12)
            .map(|i| Coordinate::new(25.0 + i as f64 * 0.03, 121.5))
            .collect();
        let mut bundles = HashMap::new();
        for (i, &p) in points.iter().enumerate() {
            let b = if (4..8).contains(&i) {
                rainy_bundle()
            } else {
                clear_bundle()
            };
            bundles.insert(cell_of(p, &rules), b);
        }
        let analysis = analyze_with_bundles(&points, &points, &bundles, &rules);

        // Concatenate, deduplicating shared boundary points.
        let mut rebuilt: Vec<Coordinate> = Vec::new();
        for segment in &analysis.segments {
            assert!(segment.points.len() >= 2);
            let start = if rebuilt.last() == segment.points.first() {
                1
            } else {
                0
            };
            rebuilt.extend_from_slice(&segment.points[start..]);
        }
        assert_eq!(rebuilt, points);
    }

    #[test]
    fn unfetched_points_inherit_nearest_cell_state() {
        let rules = RainRules::default();
        let points = vec![
            Coordinate::new(25.00, 121.50),
            Coordinate::new(25.001, 121.50),
            // Far point with no fetched cell of its own.
            Coordinate::new(25.50, 121.90),
        ];
        let mut bundles = HashMap::new();
        bundles.insert(cell_of(points[0], &rules), rainy_bundle());
        let analysis = analyze_with_bundles(&points, &points[..1], &bundles, &rules);
        // Only one cell was fetched, so every point maps to it.
        assert_eq!(analysis.segments.len(), 1);
        assert!(analysis.segments[0].rainy);
    }

    #[test]
    fn no_bundles_defaults_to_not_rainy() {
        let rules = RainRules::default();
        let points = vec![Coordinate::new(25.0, 121.5), Coordinate::new(25.1, 121.5)];
        let analysis = analyze_with_bundles(&points, &points, &HashMap::new(), &rules);
        assert_eq!(analysis.segments.len(), 1);
        assert!(!analysis.segments[0].rainy);
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn score_stays_in_unit_range() {
        let rules = RainRules::default();
        assert_eq!(risk_score(0.0, 0.0, &rules), 0.0);
        assert!((risk_score(1.0, 30.0, &rules) - 1.0).abs() < 1e-12);
        assert!((risk_score(1.0, 10_000.0, &rules) - 1.0).abs() < 1e-12);
        let mid = risk_score(0.5, 15.0, &rules);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
