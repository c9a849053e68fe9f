//! Check a primary drone's flight plan against surrounding traffic.

use anyhow::Result;
use clap::Parser;
use deconflict_cli::{load_primary, load_traffic, Config, DetectionMode, Summary};
use deconflict_core::ConflictDetection;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Traffic file with the other drones' flights
    #[arg(long)]
    traffic: PathBuf,

    /// Primary flight file
    #[arg(long)]
    primary: PathBuf,

    /// Drone safety radius in meters [env: DECONFLICT_DRONE_RADIUS_M]
    #[arg(long)]
    radius: Option<f64>,

    /// Safety time threshold in seconds [env: DECONFLICT_SAFETY_TIME_S]
    #[arg(long)]
    safety_time: Option<f64>,

    /// Safety threshold as a multiple of the radius [env: DECONFLICT_THRESHOLD_MULTIPLIER]
    #[arg(long)]
    threshold_multiplier: Option<f64>,

    /// Detection strategy
    #[arg(long, value_enum, default_value_t = DetectionMode::Exact)]
    mode: DetectionMode,

    /// Compare every drone pair, even when bounding boxes are far apart
    #[arg(long)]
    no_prefilter: bool,

    /// Run comparisons on a single thread
    #[arg(long)]
    sequential: bool,

    /// Print conflicts as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deconflict=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(radius) = args.radius {
        config.drone_radius_m = radius;
    }
    if let Some(safety_time) = args.safety_time {
        config.safety_time_s = safety_time;
    }
    if let Some(multiplier) = args.threshold_multiplier {
        config.threshold_multiplier = multiplier;
    }
    config.mode = args.mode;
    config.prefilter = !args.no_prefilter;
    config.parallel = !args.sequential;

    let rules = config.safety_rules()?;
    tracing::info!(
        "Safety configuration: radius={}m threshold={}m safety_time={}s",
        rules.drone_radius_m,
        rules.safety_threshold_m(),
        rules.safety_time_s
    );

    let traffic = load_traffic(&args.traffic)?;
    let primary = load_primary(&args.primary)?;

    let detector = config.build_detector()?;
    tracing::info!("Detecting conflicts ({} mode)...", detector.name());
    let conflicts = detector.detect_conflicts(&primary, &traffic)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
    } else {
        print!("{}", Summary(&conflicts));
    }

    Ok(())
}
