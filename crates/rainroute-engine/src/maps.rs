//! Static map URL assembly for the selected and candidate routes.
//!
//! Rendering itself is the provider's job; this module only packages path
//! specs (gray base lines for the other candidates, blue overlays for
//! rainy stretches, green/blue for the recommended route) and keeps the
//! request inside a practical URL-length budget.

use rainroute_core::{encode_polyline, AnalyzedRoute, Coordinate};
use rainroute_providers::Config;
use reqwest::Url;

const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

// Google Static Maps RGBA colors.
const COLOR_CLEAR: &str = "0x00AA00FF";
const COLOR_RAIN: &str = "0x0066CCFF";
const COLOR_OTHER: &str = "0x999999FF";

/// Static map requests above this size risk provider rejection; fall back
/// to rendering only the recommended route plus markers.
pub const MAX_URL_LEN: usize = 8192;

/// Build the static map URL for a ranked set of routes.
pub fn static_map_url(
    config: &Config,
    best: &AnalyzedRoute,
    others: &[AnalyzedRoute],
    origin: Coordinate,
    destination: Coordinate,
) -> String {
    let full = build_url(config, best, others, origin, destination);
    if full.len() <= MAX_URL_LEN {
        return full;
    }
    tracing::warn!(
        len = full.len(),
        "static map request over budget, dropping candidate overlays"
    );
    build_url(config, best, &[], origin, destination)
}

fn build_url(
    config: &Config,
    best: &AnalyzedRoute,
    others: &[AnalyzedRoute],
    origin: Coordinate,
    destination: Coordinate,
) -> String {
    let mut url = Url::parse(STATIC_MAP_URL).expect("static map base URL is valid");
    {
        let mut query = url.query_pairs_mut();
        // Other candidates: gray base line plus blue rainy overlays.
        for other in others {
            query.append_pair(
                "path",
                &format!(
                    "weight:3|color:{COLOR_OTHER}|enc:{}",
                    encode_polyline(&other.route.points)
                ),
            );
            for segment in &other.analysis.segments {
                if segment.rainy {
                    query.append_pair(
                        "path",
                        &format!(
                            "weight:6|color:{COLOR_RAIN}|enc:{}",
                            encode_polyline(&segment.points)
                        ),
                    );
                }
            }
        }
        // Recommended route: green where clear, blue where rainy.
        for segment in &best.analysis.segments {
            let color = if segment.rainy { COLOR_RAIN } else { COLOR_CLEAR };
            query.append_pair(
                "path",
                &format!(
                    "weight:7|color:{color}|enc:{}",
                    encode_polyline(&segment.points)
                ),
            );
        }
        query.append_pair(
            "markers",
            &format!("color:green|label:A|{:.6},{:.6}", origin.lat, origin.lon),
        );
        query.append_pair(
            "markers",
            &format!(
                "color:red|label:B|{:.6},{:.6}",
                destination.lat, destination.lon
            ),
        );
        query.append_pair("size", "640x640");
        query.append_pair("scale", "2");
        query.append_pair("language", &config.language);
        query.append_pair("key", &config.google_maps_api_key);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainroute_core::{Route, RouteAnalysis, Segment};

    fn analyzed(points: Vec<Coordinate>, rainy: bool) -> AnalyzedRoute {
        AnalyzedRoute {
            route: Route {
                points: points.clone(),
                duration_s: 600,
                distance_m: 5000.0,
                start_label: "A".to_string(),
                end_label: "B".to_string(),
            },
            analysis: RouteAnalysis {
                samples: Vec::new(),
                segments: vec![Segment { rainy, points }],
                rain_ratio: 0.0,
                avg_effective_mm: 0.0,
                score: 0.0,
            },
        }
    }

    fn short_route(rainy: bool) -> AnalyzedRoute {
        analyzed(
            vec![Coordinate::new(25.03, 121.56), Coordinate::new(25.05, 121.58)],
            rainy,
        )
    }

    fn long_route() -> AnalyzedRoute {
        let points: Vec<Coordinate> = (0..4000)
            .map(|i| Coordinate::new(25.0 + i as f64 * 0.001, 121.5 + i as f64 * 0.0007))
            .collect();
        analyzed(points, true)
    }

    #[test]
    fn url_contains_markers_and_key() {
        let config = Config::for_tests();
        let url = static_map_url(
            &config,
            &short_route(false),
            &[],
            Coordinate::new(25.03, 121.56),
            Coordinate::new(25.05, 121.58),
        );
        assert!(url.starts_with(STATIC_MAP_URL));
        assert!(url.contains("label%3AA"));
        assert!(url.contains("label%3AB"));
        assert!(url.contains("key=test-google-key"));
        assert!(url.contains(COLOR_CLEAR));
    }

    #[test]
    fn rainy_best_segment_renders_blue() {
        let config = Config::for_tests();
        let url = static_map_url(
            &config,
            &short_route(true),
            &[],
            Coordinate::new(25.03, 121.56),
            Coordinate::new(25.05, 121.58),
        );
        assert!(url.contains(COLOR_RAIN));
        assert!(!url.contains(COLOR_CLEAR));
    }

    #[test]
    fn over_budget_request_drops_candidate_overlays() {
        let config = Config::for_tests();
        let others = vec![long_route(), long_route()];
        let url = static_map_url(
            &config,
            &short_route(false),
            &others,
            Coordinate::new(25.0, 121.5),
            Coordinate::new(25.1, 121.6),
        );
        assert!(url.len() <= MAX_URL_LEN);
        assert!(!url.contains(COLOR_OTHER));
        // The recommended route and markers survive the fallback.
        assert!(url.contains(COLOR_CLEAR));
        assert!(url.contains("label%3AA"));
    }
}
