//! storyloc - real-time positioning core for place-based story discovery
//!
//! Fuses GNSS signal quality, zone geometry, and dead-reckoning hand-off
//! into one authoritative location stream and place entered/exited events.
//!
//! Module structure:
//! - `domain/` - Core types (PositionFix, Place, PositioningState) and geometry
//! - `io/` - External boundaries (fix provider, step tracker, catalog, replay)
//! - `services/` - Positioning logic (classifier, resolver, controller, discovery)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use storyloc::domain::types::{ControllerEvent, PositionFix, PositioningState};
use storyloc::infra::{Config, Metrics};
use storyloc::io::{FixProvider, FixRequest, PlaceCatalog, StepTracker};
use storyloc::services::{
    DiscoveryTrigger, NearestPlaceResolver, PositioningModeController, SignalQualityClassifier,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// storyloc - positioning and place discovery core
#[derive(Parser, Debug)]
#[command(name = "storyloc", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config/dev.toml")]
    config: String,

    /// JSONL sensor trace to replay instead of live sensors
    #[arg(short, long)]
    replay: Option<String>,
}

/// Fix provider for the dev binary: logs the subscription commands the
/// platform location service would receive (fixes come from the replay)
struct CommandLogFixProvider;

impl FixProvider for CommandLogFixProvider {
    fn subscribe(&mut self, request: FixRequest) -> anyhow::Result<()> {
        info!(
            priority = %request.priority.as_str(),
            interval_ms = %request.interval_ms,
            min_distance_m = %request.min_distance_m,
            "fix_subscription_started"
        );
        Ok(())
    }

    fn unsubscribe(&mut self) -> anyhow::Result<()> {
        info!("fix_subscription_stopped");
        Ok(())
    }
}

/// Step tracker for the dev binary: logs the commands the external
/// dead-reckoning system would receive
struct CommandLogStepTracker;

impl StepTracker for CommandLogStepTracker {
    fn start(&mut self, seed: PositionFix) -> anyhow::Result<()> {
        info!(seed_lat = %seed.point.lat, seed_lon = %seed.point.lon, "step_tracker_started");
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        info!("step_tracker_stopped");
        Ok(())
    }

    fn calibrate(&mut self, fix: &PositionFix) -> anyhow::Result<()> {
        info!(lat = %fix.point.lat, lon = %fix.point.lon, "step_tracker_calibrated");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for full event visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = %env!("GIT_HASH"), "storyloc starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        catalog_file = %config.catalog_file(),
        acquisition_timeout_secs = %config.acquisition_timeout_secs(),
        gps_accuracy_cutoff_m = %config.gps_accuracy_cutoff_m(),
        discovery_radius_m = %config.discovery_radius_m(),
        "config_loaded"
    );

    // Load the place catalog (an empty catalog still runs, nothing resolves)
    let catalog = match PlaceCatalog::load(config.catalog_file()) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "catalog_load_failed_starting_empty");
            PlaceCatalog::empty()
        }
    };

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Shared components
    let metrics = Arc::new(Metrics::new());
    let classifier = SignalQualityClassifier::new(config.classifier().clone());

    // Merged controller event channel (bounded for backpressure)
    let (event_tx, event_rx) = mpsc::channel::<ControllerEvent>(256);
    // Published state and fused location stream
    let (state_tx, state_rx) = watch::channel::<Option<PositioningState>>(None);
    let (fused_tx, mut fused_rx) = mpsc::channel::<PositionFix>(256);

    // Resolver task: recompute zone membership per fused fix, feed the
    // membership back into the controller, and diff into discovery events
    let resolver_catalog = catalog.clone();
    let resolver_event_tx = event_tx.clone();
    let resolver_metrics = metrics.clone();
    let discovery_radius_m = config.discovery_radius_m();
    let map_radius_m = config.map_radius_m();
    tokio::spawn(async move {
        let resolver = NearestPlaceResolver::new();
        let mut discovery = DiscoveryTrigger::new();

        while let Some(fix) = fused_rx.recv().await {
            let places = resolver_catalog.snapshot();
            let membership = resolver.membership(fix.point, &places, discovery_radius_m);

            // Coarser radius for map display: shows the nearest place long
            // before the discovery radius is reached
            if let Some(near) = resolver.resolve_id(fix.point, &places, map_radius_m) {
                tracing::debug!(place_id = %near, "map_nearest_place");
            }

            if resolver_event_tx
                .send(ControllerEvent::Zone { in_zone: membership.in_zone })
                .await
                .is_err()
            {
                break;
            }

            for event in discovery.observe(membership.nearest) {
                resolver_metrics.record_discovery_event();
                match serde_json::to_string(&event) {
                    Ok(json) => info!(event = %json, "discovery_event"),
                    Err(e) => warn!(error = %e, "discovery_event_serialize_failed"),
                }
            }
        }
    });

    // State observer: log every published mode change
    let mut observer_state_rx = state_rx.clone();
    tokio::spawn(async move {
        while observer_state_rx.changed().await.is_ok() {
            let state = *observer_state_rx.borrow();
            info!(state = %state.as_ref().map(|s| s.as_str()).unwrap_or("idle"), "positioning_state");
        }
    });

    // Metrics reporter
    let metrics_clone = metrics.clone();
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            metrics_clone.report();
        }
    });

    // Replay task stands in for live sensor callbacks
    if let Some(replay_path) = args.replay {
        let replay_tx = event_tx.clone();
        let replay_shutdown = shutdown_rx.clone();
        let replay_classifier = classifier.clone();
        tokio::spawn(async move {
            if let Err(e) =
                storyloc::io::run_replay(replay_path, replay_classifier, replay_tx, replay_shutdown).await
            {
                tracing::error!(error = %e, "replay error");
            }
        });
    } else {
        info!("no_replay_trace_waiting_for_events");
    }

    // Handle shutdown on Ctrl+C
    let shutdown_signal = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_signal.send(true);
    });

    // Run the controller - consumes merged events until shutdown
    let mut controller = PositioningModeController::new(
        config,
        Box::new(CommandLogFixProvider),
        Box::new(CommandLogStepTracker),
        metrics,
        event_tx,
        state_tx,
        fused_tx,
    );
    info!("controller_started");
    controller.run(event_rx, shutdown_rx).await;

    info!("storyloc shutdown complete");
    Ok(())
}
