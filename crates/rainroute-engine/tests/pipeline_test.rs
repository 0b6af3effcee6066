//! End-to-end pipeline scenarios over synthetic weather data, plus the
//! degraded-provider path with a live (unreachable) weather service.

use std::collections::HashMap;

use rainroute_core::{
    analyze_with_bundles, sample_by_distance, Coordinate, GridCell, RainRules, Route,
    WeatherBundle,
};
use rainroute_engine::{analyze_route, quick_scan, QuickScan};
use rainroute_providers::{Config, WeatherService};

fn test_polyline() -> Vec<Coordinate> {
    vec![
        Coordinate::new(25.03, 121.56),
        Coordinate::new(25.05, 121.58),
        Coordinate::new(25.10, 121.60),
    ]
}

fn clear_bundle() -> WeatherBundle {
    WeatherBundle {
        precip_probability: 5,
        weather_code: 0,
        ..WeatherBundle::neutral()
    }
}

fn rainy_bundle() -> WeatherBundle {
    WeatherBundle {
        now_precip_mm: 5.0,
        ..WeatherBundle::neutral()
    }
}

/// Every grid cell touched by the samples or raw vertices of the route.
fn touched_cells(points: &[Coordinate], samples: &[Coordinate], rules: &RainRules) -> Vec<GridCell> {
    points
        .iter()
        .chain(samples.iter())
        .map(|&p| GridCell::from_coordinate(p, rules.grid_step_deg))
        .collect()
}

#[test]
fn clear_route_scores_zero() {
    let rules = RainRules::default();
    let points = test_polyline();
    // 12km total: below the 30km threshold, so the 500m interval applies.
    let interval = rules.interval_for_distance(12_000.0);
    assert_eq!(interval, 500.0);
    let samples = sample_by_distance(&points, interval);

    let mut bundles = HashMap::new();
    for cell in touched_cells(&points, &samples, &rules) {
        bundles.insert(cell, clear_bundle());
    }

    let analysis = analyze_with_bundles(&points, &samples, &bundles, &rules);
    assert_eq!(analysis.rain_ratio, 0.0);
    assert_eq!(analysis.score, 0.0);
    assert!(analysis.segments.iter().all(|s| !s.rainy));
}

#[test]
fn rain_around_middle_vertex_yields_one_rainy_stretch() {
    let rules = RainRules::default();
    let points = test_polyline();
    let samples = sample_by_distance(&points, rules.interval_for_distance(12_000.0));

    let rainy_cell = GridCell::from_coordinate(points[1], rules.grid_step_deg);
    let mut bundles = HashMap::new();
    for cell in touched_cells(&points, &samples, &rules) {
        let bundle = if cell == rainy_cell {
            rainy_bundle()
        } else {
            clear_bundle()
        };
        bundles.insert(cell, bundle);
    }

    let analysis = analyze_with_bundles(&points, &samples, &bundles, &rules);
    assert!(analysis.rain_ratio > 0.0 && analysis.rain_ratio < 1.0);
    assert!(analysis.score > 0.0);

    let rainy_segments: Vec<_> = analysis.segments.iter().filter(|s| s.rainy).collect();
    assert_eq!(rainy_segments.len(), 1);
    assert!(rainy_segments[0].points.len() >= 2);
    // The route starts outside the rainy cell.
    assert!(!analysis.segments[0].rainy);
}

#[tokio::test]
async fn unreachable_providers_degrade_to_no_risk() {
    // Dummy credentials and no reachable upstream: every fetch fails and
    // every bundle degrades to neutral. The analysis must complete and
    // report zero risk rather than erroring out.
    let weather = WeatherService::new(
        reqwest::Client::new(),
        std::sync::Arc::new(Config::for_tests()),
        RainRules::default(),
    );

    // A short hop inside one grid cell keeps this to one fetch per provider.
    let route = Route {
        points: vec![Coordinate::new(25.03, 121.56), Coordinate::new(25.031, 121.561)],
        duration_s: 120,
        distance_m: 150.0,
        start_label: "A".to_string(),
        end_label: "B".to_string(),
    };

    let analysis = analyze_route(&weather, &route).await;
    assert_eq!(analysis.rain_ratio, 0.0);
    assert_eq!(analysis.score, 0.0);
    assert_eq!(analysis.segments.len(), 1);
    assert!(!analysis.segments[0].rainy);

    let report = quick_scan(&weather, &route.points).await;
    assert_eq!(report.outcome, QuickScan::Clear);
    assert_eq!(report.bundles.len(), 2);
}
