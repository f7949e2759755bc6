//! APM Meter CLI
//!
//! Live actions-per-minute gauge for keyboard and mouse input.

use apm_meter::{
    collector::{check_permission, Collector, CollectorConfig},
    config::{Config, SourceConfig},
    core::ActionTracker,
    display::LiveDisplay,
    report::{write_report, ReportBuilder},
    VERSION,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "apm-meter")]
#[command(version = VERSION)]
#[command(about = "Live actions-per-minute gauge for keyboard and mouse input", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start counting actions and show the live readout
    Run {
        /// Input sources to capture (keyboard, mouse, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Interval length in seconds (overrides the config file)
        #[arg(long)]
        interval: Option<u64>,

        /// Write a session report at exit
        #[arg(long)]
        export: bool,
    },

    /// Check whether global input hooks can be installed
    Check,

    /// Show configuration
    Config {
        /// Write the default configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            sources,
            interval,
            export,
        } => {
            cmd_run(&sources, interval, export);
        }
        Commands::Check => {
            cmd_check();
        }
        Commands::Config { write } => {
            cmd_config(write);
        }
    }
}

fn cmd_run(sources: &str, interval_override: Option<u64>, export: bool) {
    println!("APM Meter v{VERSION}");
    println!();

    // Global hooks need permission on some platforms
    if !check_permission() {
        eprintln!("Error: input hook permission not granted.");
        eprintln!();
        eprintln!("On macOS, grant Input Monitoring access:");
        eprintln!("1. Open System Preferences > Security & Privacy > Privacy");
        eprintln!("2. Select 'Input Monitoring' in the left sidebar");
        eprintln!("3. Add this application to the allowed list");
        eprintln!("4. Restart the application");
        std::process::exit(1);
    }

    // Parse source configuration
    let source_config = SourceConfig::from_csv(sources);
    if !source_config.any_enabled() {
        eprintln!("Error: At least one source must be enabled (keyboard or mouse)");
        std::process::exit(1);
    }

    // Load configuration; CLI flags win over the file
    let config = Config::load().unwrap_or_default();
    let interval = interval_override
        .map(Duration::from_secs)
        .unwrap_or(config.interval);
    if interval.is_zero() {
        eprintln!("Error: interval must be at least 1 second");
        std::process::exit(1);
    }

    if export {
        if let Err(e) = config.ensure_directories() {
            eprintln!("Warning: Could not create report directory: {e}");
        }
    }

    println!("Counting actions...");
    println!(
        "  Keyboard: {}",
        if source_config.keyboard {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  Mouse: {}",
        if source_config.mouse {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Interval: {}s", interval.as_secs());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Create collector
    let collector_config = CollectorConfig {
        capture_keyboard: source_config.keyboard,
        capture_mouse: source_config.mouse,
    };
    let mut collector = Collector::new(collector_config);

    let mut tracker = ActionTracker::new();
    let mut display = LiveDisplay::new();
    let report_builder = export.then(ReportBuilder::new);

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        std::process::exit(1);
    }

    // Main loop: the collector's hook threads deliver events through the
    // channel, so every counter mutation happens here, on one thread.
    let receiver = collector.receiver().clone();
    let mut last_tick = Instant::now();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                tracker.record(&event);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                tracing::error!("Collector disconnected unexpectedly");
                break;
            }
        }

        // Interval tick: render the finished interval (its counts still
        // provisional, so peak/average include them), then commit and reset.
        if last_tick.elapsed() >= interval {
            if let Err(e) = display.render(&tracker.snapshot()) {
                tracing::warn!("Display write failed: {e}");
            }
            tracker.complete_interval();
            last_tick = Instant::now();
        }
    }

    // Stop collection
    collector.stop();
    let _ = display.finish();

    println!();
    println!("{}", tracker.summary());

    // Write the session report
    if let Some(builder) = report_builder {
        let report = builder.build(&tracker, interval);
        let report_path = config
            .export_path
            .join(format!("session_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));

        match write_report(&report_path, &report) {
            Ok(()) => println!("Report written to {report_path:?}"),
            Err(e) => {
                tracing::error!("Failed to write report: {e}");
                eprintln!("Error writing report: {e}");
            }
        }
    }
}

fn cmd_check() {
    if check_permission() {
        println!("Input hook permission: granted");
    } else {
        println!("Input hook permission: not granted");
        std::process::exit(1);
    }
}

fn cmd_config(write: bool) {
    if write {
        let config = Config::default();
        if let Err(e) = config.save() {
            eprintln!("Error saving config: {e}");
            std::process::exit(1);
        }
        println!("Wrote default configuration to {:?}", Config::config_path());
        return;
    }

    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
