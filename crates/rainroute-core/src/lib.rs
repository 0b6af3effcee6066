pub mod analyze;
pub mod classify;
pub mod geo;
pub mod models;
pub mod rules;
pub mod sample;
pub mod select;

pub use analyze::{analyze_with_bundles, risk_score};
pub use classify::{
    effective_precip, instant_risk, is_rain_code, is_rainy, is_thunder, severity, Severity,
};
pub use geo::{decode_polyline, encode_polyline, haversine_distance_m, polyline_length_m};
pub use models::{
    AnalyzedRoute, Coordinate, GridCell, Route, RouteAnalysis, Segment, WeatherBundle,
};
pub use rules::RainRules;
pub use sample::{sample_by_count, sample_by_distance};
pub use select::rank;
