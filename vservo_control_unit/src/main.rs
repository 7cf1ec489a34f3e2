//! # VServo Control Unit
//!
//! Visual-servo tracking session: loads the tracker configuration, creates
//! the selected backend from the driver registry, waits for the launch key,
//! then runs the fuzzy tracking loop until a quit key, Ctrl-C or an exit
//! timer ends the session. The metrics report is printed to stdout.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;
use vservo_common::config::LogLevel;
use vservo_common::consts::DEFAULT_CONFIG_PATH;
use vservo_common::vehicle::driver::KeySource;
use vservo_control_unit::config::{LoadedConfig, load_config, load_config_or_default};
use vservo_control_unit::cycle::Supervisor;
use vservo_control_unit::error::SupervisorError;
use vservo_control_unit::input::{KeyChain, ScriptedKeys, StdinKeys};
use vservo_hal::default_registry;

/// VServo Control Unit - fuzzy visual-servo tracking loop
#[derive(Parser, Debug)]
#[command(name = "vservo_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Fuzzy visual-servo tracking loop with step-response metrics")]
struct Args {
    /// Path to the tracker configuration TOML.
    /// Defaults to config/tracker.toml, falling back to built-in defaults.
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Backend to use instead of `driver.name` from the config.
    #[arg(long, value_name = "NAME")]
    driver: Option<String>,

    /// Press the launch key automatically on the first tick.
    #[arg(long)]
    auto_launch: bool,

    /// Do not read keys from stdin (quit with Ctrl-C or exit timers).
    #[arg(long)]
    headless: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path),
        None => load_config_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    };
    let log_level = loaded
        .as_ref()
        .map(|c| c.tracker.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("VServo Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(SupervisorError::Config(e)) as Box<dyn std::error::Error>)
        .and_then(|loaded| run(&args, loaded));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("VServo Control Unit shutdown complete");
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = match &args.driver {
        Some(name) => loaded.with_driver(name).map_err(SupervisorError::Config)?,
        None => loaded,
    };
    match &loaded.source {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("Using built-in configuration defaults"),
    }
    let tracker = &loaded.tracker;
    info!(
        "Config OK: stabilize={}s, no_detect={}s, track={}s, lost={}s, frame={}ms",
        tracker.timing.stabilize_time,
        tracker.timing.no_detect_timeout,
        tracker.timing.track_duration,
        tracker.timing.lost_timeout,
        tracker.timing.frame_period_ms,
    );

    let registry = default_registry();
    info!(
        "Available drivers: {:?}, selected '{}'",
        registry.list_drivers(),
        tracker.driver.name
    );
    let backend = registry.create_backend(tracker)?;

    let keys = build_keys(args, tracker.keys.launch)?;

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let span = info_span!("session", name = %tracker.shared.session_name);
    let _guard = span.enter();

    // The report is printed on termination, before the vehicle lands.
    let mut supervisor = Supervisor::new(tracker, backend, keys)
        .with_running_flag(running)
        .with_report_sink(|report| println!("{report}"));
    supervisor.run()?;
    Ok(())
}

fn build_keys(args: &Args, launch: char) -> std::io::Result<Box<dyn KeySource>> {
    let script = if args.auto_launch {
        ScriptedKeys::new().key(launch)
    } else {
        ScriptedKeys::new()
    };

    if args.headless {
        return Ok(Box::new(script));
    }
    Ok(Box::new(KeyChain::new(script, StdinKeys::spawn()?)))
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured
    };

    // RUST_LOG, when set, takes precedence over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
