use clap::Parser;
use simple_location_tracker::scenario::{self, Scenario, ScenarioReport};
use simple_location_tracker::TrackerSettings;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Simple Location Tracker: scenario runner
///
/// Drives a location tracker against a simulated platform and prints every
/// listener notification as one JSON line.
///
/// Examples:
///   slt walk.json
///   slt --settings ~/.slt/settings.json walk.json
///   slt --debug walk.json
#[derive(Parser)]
#[command(name = "slt", version, about, long_about = None)]
struct Cli {
    /// Scenario file (JSON).
    #[arg(index = 1)]
    scenario: PathBuf,

    /// Settings file. Defaults to ~/.slt/settings.json when present.
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    // ── Load settings ───────────────────────────────────────────

    let settings = match &cli.settings {
        Some(path) => TrackerSettings::load_from(path),
        None => TrackerSettings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Load scenario ───────────────────────────────────────────

    let scenario: Scenario = std::fs::read_to_string(&cli.scenario)
        .map_err(|e| e.to_string())
        .and_then(|data| serde_json::from_str(&data).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot load scenario {}: {}", cli.scenario.display(), e);
            std::process::exit(1);
        });

    // ── Run ─────────────────────────────────────────────────────

    let report = match scenario::run(&scenario, settings) {
        Ok(report) => report,
        Err(failure) => {
            print_notifications(&failure.report);
            eprintln!("Error: {}", failure);
            std::process::exit(1);
        }
    };
    print_notifications(&report);

    let state = &report.state;
    eprintln!(
        "  listening={} found={} notifications={}",
        state.is_listening,
        state.has_location_found,
        report.notifications.len()
    );
    if let Some(location) = &state.last_known_location {
        eprintln!("  \u{1F4CD} last known {}", location);
    }
}

fn print_notifications(report: &ScenarioReport) {
    for notification in &report.notifications {
        match serde_json::to_string(notification) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Warning: cannot encode notification: {}", e),
        }
    }
}
