//! Orchestration of the rain-risk pipeline: per-route analysis, candidate
//! selection and the detail-view/map assembly around them.

pub mod analyzer;
pub mod decision;
pub mod maps;
pub mod selector;

pub use analyzer::{analyze_route, quick_scan, QuickScan, QuickScanReport};
pub use decision::needs_detailed_view;
pub use maps::static_map_url;
pub use selector::select_best;
