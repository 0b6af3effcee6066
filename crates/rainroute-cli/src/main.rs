//! Route rain-risk advisor: will it rain on the way there?

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rainroute_core::{severity, RainRules};
use rainroute_engine::{needs_detailed_view, quick_scan, select_best, static_map_url, QuickScan};
use rainroute_providers::{Config, Providers, TravelMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Check a planned route for rain and pick the driest alternative.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Origin, as a free-text place query
    origin: String,

    /// Destination, as a free-text place query
    destination: String,

    /// Travel mode
    #[arg(long, value_enum, default_value_t = ModeArg::Driving)]
    mode: ModeArg,

    /// Cap on route alternatives to analyze
    #[arg(long, value_name = "N")]
    max_routes: Option<usize>,

    /// Always run the full analysis, even when the quick scan sees no rain
    #[arg(long)]
    force_detail: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Driving,
    Motorcycle,
    Bicycling,
    Transit,
    Walking,
}

impl From<ModeArg> for TravelMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Driving => TravelMode::Driving,
            ModeArg::Motorcycle => TravelMode::Motorcycle,
            ModeArg::Bicycling => TravelMode::Bicycling,
            ModeArg::Transit => TravelMode::Transit,
            ModeArg::Walking => TravelMode::Walking,
        }
    }
}

// Library events carry their own crate targets, so the default filter
// must name every workspace crate, not just the bin.
const DEFAULT_LOG_TARGETS: [&str; 3] = ["rainroute", "rainroute_engine", "rainroute_providers"];

fn log_filter() -> Result<tracing_subscriber::EnvFilter> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for target in DEFAULT_LOG_TARGETS {
        filter = filter.add_directive(format!("{target}=info").parse()?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(log_filter()?)
        .init();

    let args = Args::parse();
    let mode = TravelMode::from(args.mode);
    let rules = RainRules::default();

    // Missing credentials fail here, before any network work.
    let mut config = Config::from_env().context("provider configuration")?;
    if let Some(max_routes) = args.max_routes {
        config.max_route_alternatives = max_routes.max(1);
    }
    let providers = Providers::new(config.clone(), rules.clone());

    let origin = providers
        .geocode
        .resolve(&args.origin)
        .await
        .with_context(|| format!("resolving origin {:?}", args.origin))?;
    let destination = providers
        .geocode
        .resolve(&args.destination)
        .await
        .with_context(|| format!("resolving destination {:?}", args.destination))?;
    tracing::info!(origin = %origin.label, destination = %destination.label, %mode, "resolved places");

    let destination_weather = providers.weather.bundle_at(destination.coord).await;
    println!("Destination: {}", destination.label);
    println!(
        "Current weather: {}",
        report::destination_summary(&destination_weather, &rules)
    );

    let routes = providers
        .directions
        .routes(&origin, &destination, mode)
        .await?;
    if routes.is_empty() {
        bail!(
            "no {} route found between {:?} and {:?}",
            mode,
            origin.label,
            destination.label
        );
    }

    // Quick scan on the first candidate gates the full analysis: when the
    // destination is dry and no sample along the way carries risk, skip the
    // per-cell fan-out and map assembly entirely.
    let mut show_detail = args.force_detail || severity(&destination_weather, &rules).is_rain();
    if !show_detail {
        let scan = quick_scan(&providers.weather, &routes[0].points).await;
        show_detail = scan.outcome == QuickScan::RainAhead
            || needs_detailed_view(&rules, &destination_weather, &scan.bundles);
    }
    if !show_detail {
        println!("No rain expected along the route.");
        return Ok(());
    }

    let Some((best, others)) = select_best(&providers.weather, routes).await else {
        bail!("no analyzable route");
    };

    println!();
    println!("Recommended route ({} alternatives analyzed):", others.len() + 1);
    print_route("  best", &best);
    for (i, other) in others.iter().enumerate() {
        print_route(&format!("  alt{}", i + 1), other);
    }

    let url = static_map_url(&config, &best, &others, origin.coord, destination.coord);
    println!();
    println!("Map (blue = rainy stretch, green = recommended dry stretch):");
    println!("{url}");
    Ok(())
}

fn print_route(tag: &str, route: &rainroute_core::AnalyzedRoute) {
    let rainy_segments = route
        .analysis
        .segments
        .iter()
        .filter(|segment| segment.rainy)
        .count();
    println!(
        "{tag}: score {:.3} | rain on {:.0}% of samples | {:.1} mm/h avg | {} min | {:.1} km | {} rainy stretch(es)",
        route.analysis.score,
        route.analysis.rain_ratio * 100.0,
        route.analysis.avg_effective_mm,
        route.route.duration_s / 60,
        route.route.distance_m / 1000.0,
        rainy_segments,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_every_workspace_crate() {
        let rendered = log_filter().unwrap().to_string();
        assert!(rendered.contains("rainroute=info"));
        assert!(rendered.contains("rainroute_engine=info"));
        assert!(rendered.contains("rainroute_providers=info"));
    }

    #[test]
    fn max_routes_flag_parses() {
        let args = Args::try_parse_from(["rainroute", "a", "b", "--max-routes", "2"]).unwrap();
        assert_eq!(args.max_routes, Some(2));
        let args = Args::try_parse_from(["rainroute", "a", "b"]).unwrap();
        assert_eq!(args.max_routes, None);
    }

    #[test]
    fn mode_flag_parses_every_variant() {
        for mode in ["driving", "motorcycle", "bicycling", "transit", "walking"] {
            assert!(Args::try_parse_from(["rainroute", "a", "b", "--mode", mode]).is_ok());
        }
        assert!(Args::try_parse_from(["rainroute", "a", "b", "--mode", "boat"]).is_err());
    }
}
