// Rust guideline compliant 2026-10-19

//! Bot-watch pipeline entry point.
//!
//! Wires the simulation to a file-backed model source, a channel notifier and
//! a terminal reporter, then runs until CTRL+C.
//!
//! # Usage
//!
//! ```text
//! # Infinite mode -- press CTRL+C to stop
//! RUST_LOG=info cargo run
//!
//! # Other model artifact, problematic bots only
//! BOT_WATCH_MODEL=/tmp/forest.json BOT_WATCH_FILTER=problematic RUST_LOG=info cargo run
//!
//! # Also show per-account debug output
//! RUST_LOG=debug cargo run
//! ```
//!
//! Without a readable model file the classifier runs on its heuristic fallback.

mod adapters;

use adapters::channel_notifier::ChannelNotifier;
use adapters::dashboard_reporter::DashboardReporter;
use adapters::file_model_source::FileModelSource;
use anyhow::Context as _;
use classifier::{ClassificationService, ClassifierConfig};
use domain::CategoryFilter;
use generator::{GeneratorConfig, TelemetryGenerator};
use simulation::{Simulation, SimulationConfig, SimulationHandle};
use window::{MAX_ACCOUNTS, StreamWindow};

/// Model artifact read when `BOT_WATCH_MODEL` is unset.
const DEFAULT_MODEL_PATH: &str = "model/bot_forest.json";
const MODEL_ENV: &str = "BOT_WATCH_MODEL";
/// `all | normal | satisfactory | disruptive | problematic`.
const FILTER_ENV: &str = "BOT_WATCH_FILTER";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber before any async work.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let model_path = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_owned());
    let filter = match std::env::var(FILTER_ENV) {
        Ok(value) => value
            .parse::<CategoryFilter>()
            .with_context(|| format!("invalid {FILTER_ENV}"))?,
        Err(_) => CategoryFilter::All,
    };

    let generator = TelemetryGenerator::new(
        GeneratorConfig::builder()
            .build()
            .context("failed to build generator config")?,
    );
    // Defaults: 10 seed accounts, one tick every 3 s, 3 refreshes per tick.
    let simulation_config = SimulationConfig::builder()
        .build()
        .context("failed to build simulation config")?;
    let window = StreamWindow::new(MAX_ACCOUNTS).context("failed to build stream window")?;
    let classifier_config = ClassifierConfig::builder()
        .build()
        .context("failed to build classifier config")?;

    let service = ClassificationService::new(FileModelSource::new(model_path), classifier_config);
    let simulation = Simulation::new(simulation_config, generator, window);
    let handle = simulation.handle();
    let snapshots = simulation.subscribe();
    let (notifier, alerts) = ChannelNotifier::new();
    let reporter = DashboardReporter::new(filter);

    // The driver owns the simulation and the notifier; dropping them when it
    // finishes closes both channels, which lets the reporter drain and exit.
    let driver = async move {
        let mut simulation = simulation;
        let run = simulation.run(&service, &notifier);
        tokio::pin!(run);
        tokio::select! {
            ticks = &mut run => return ticks,
            () = wait_for_ctrl_c() => request_stop(&handle),
        }
        // The in-flight tick completes before the loop exits.
        run.await
    };

    let (ticks, ()) = tokio::join!(driver, reporter.run(snapshots, alerts));
    let ticks = ticks.context("simulation failed")?;
    tracing::info!(ticks, "main.shutdown: simulation finished");
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "main.signal.unavailable");
        // Without a signal handler the loop only stops on its own.
        std::future::pending::<()>().await;
    }
    tracing::info!("main.shutdown: ctrl_c received, stopping simulation");
}

fn request_stop(handle: &SimulationHandle) {
    if let Err(e) = handle.stop() {
        tracing::debug!(error = %e, "main.shutdown: simulation already stopped");
    }
}
