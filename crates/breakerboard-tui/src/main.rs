//! `breakerboard` — a live electrical distribution panel in the terminal.
//!
//! Renders the configured panel and keeps it synchronized with state
//! snapshots from a host automation runtime: either a JSON file that is
//! re-read on a poll interval, or a built-in demo feed. Toggle and
//! reconnect interactions are rendered into service calls and appended to
//! an NDJSON outbox for the host bridge.
//!
//! Logs are written to a file (default `/tmp/breakerboard.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use breakerboard_core::{PanelConfig, ServiceMap};

use crate::app::App;
use crate::data_bridge::SnapshotSource;

/// Terminal renderer for an electrical distribution panel.
#[derive(Parser, Debug)]
#[command(name = "breakerboard", version, about)]
struct Cli {
    /// Panel definition file (YAML or JSON)
    #[arg(short = 'p', long, env = "BREAKERBOARD_PANEL")]
    panel: Option<PathBuf>,

    /// Snapshot JSON file polled for entity states
    #[arg(short = 's', long, env = "BREAKERBOARD_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// NDJSON file where outbound service calls are appended
    #[arg(long, env = "BREAKERBOARD_OUTBOX")]
    outbox: Option<PathBuf>,

    /// Use the built-in demo telemetry feed
    #[arg(long)]
    demo: bool,

    /// Profile name from the config file
    #[arg(long)]
    profile: Option<String>,

    /// Snapshot poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Log file path (defaults to /tmp/breakerboard.log)
    #[arg(long, default_value = "/tmp/breakerboard.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("breakerboard={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("breakerboard.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Everything the app needs, resolved from CLI flags and the config file.
struct Resolved {
    panel: PanelConfig,
    panel_path: Option<PathBuf>,
    services: ServiceMap,
    source: SnapshotSource,
    outbox: Option<PathBuf>,
    poll_interval: Duration,
}

/// Priority: CLI flags > config profile > built-in sample (demo only).
fn resolve(cli: &Cli) -> Result<Resolved> {
    let config = breakerboard_config::load_config_or_default();
    let profile = breakerboard_config::resolve_profile(&config, cli.profile.as_deref()).ok();

    let panel_path = cli
        .panel
        .clone()
        .or_else(|| profile.map(|(_, p)| p.panel.clone()));

    let (panel, panel_path) = match panel_path {
        Some(path) => {
            let panel = breakerboard_config::load_panel_file(&path)?;
            (panel, Some(path))
        }
        None if cli.demo => (sample_panel(), None),
        None => {
            return Err(eyre!(
                "no panel definition: pass --panel <file>, configure a profile, \
                 or try `breakerboard --demo`"
            ));
        }
    };

    let services = profile.map(|(_, p)| p.services.clone()).unwrap_or_default();

    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| profile.and_then(|(_, p)| p.snapshot.clone()));
    let source = if cli.demo {
        SnapshotSource::Demo
    } else if let Some(path) = snapshot_path {
        SnapshotSource::File(path)
    } else {
        info!("no snapshot source configured; using the demo feed");
        SnapshotSource::Demo
    };

    let outbox = cli
        .outbox
        .clone()
        .or_else(|| profile.and_then(|(_, p)| p.outbox.clone()));

    let poll_interval = Duration::from_millis(
        cli.poll_ms
            .unwrap_or(config.defaults.poll_interval_ms)
            .max(50),
    );

    Ok(Resolved {
        panel,
        panel_path,
        services,
        source,
        outbox,
        poll_interval,
    })
}

/// Built-in sample panel so `breakerboard --demo` works out of the box.
fn sample_panel() -> PanelConfig {
    let raw = serde_json::json!({
        "title": "Demo Distribution Panel",
        "columns": 2,
        "main_breakers": [
            { "switch": "switch.phase_a", "current_entity": "sensor.phase_a_amps",
              "voltage_entity": "sensor.phase_a_volts", "max_current": 63 },
            { "switch": "switch.phase_b", "current_entity": "sensor.phase_b_amps",
              "voltage_entity": "sensor.phase_b_volts", "max_current": 63 },
        ],
        "breakers": [
            { "name": "Kitchen", "switch": "switch.kitchen",
              "current_entity": "sensor.kitchen_amps",
              "power_entity": "sensor.kitchen_power", "max_current": 20 },
            { "name": "EV Charger", "switch": "switch.ev",
              "current_entity": "sensor.ev_amps",
              "power_entity": "sensor.ev_power", "max_current": 32,
              "double": true, "mac": "aa:bb:cc:dd:ee:01" },
            { "name": "Lights", "switch": "switch.lights",
              "current_entity": "sensor.lights_amps", "max_current": 10 },
            { "name": "Surge", "dps": true },
            { "name": "Laundry", "switch": "switch.laundry",
              "current_entity": "sensor.laundry_amps",
              "power_entity": "sensor.laundry_power", "max_current": 16 },
            { "empty": true },
        ],
    });
    // The sample is static and known-good.
    PanelConfig::from_value(&raw).unwrap_or_else(|_| PanelConfig {
        title: "Demo Distribution Panel".into(),
        columns: 2,
        main_breakers: Vec::new(),
        breakers: Vec::new(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal.
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit.
    let _log_guard = setup_tracing(&cli);

    let resolved = resolve(&cli)?;
    let panel_label = resolved.panel_path.as_ref().map_or_else(
        || "(built-in sample)".to_owned(),
        |p| p.display().to_string(),
    );
    info!(panel = %panel_label, source = ?resolved.source, "starting breakerboard");

    let mut app = App::new(
        resolved.panel,
        resolved.panel_path,
        resolved.services,
        resolved.source,
        resolved.outbox,
        resolved.poll_interval,
    );
    app.run().await?;

    Ok(())
}
