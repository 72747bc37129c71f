//! JSONL sensor trace replay
//!
//! Replays a recorded trace of GNSS epochs and position fixes into the
//! controller's merged event channel, standing in for live sensor
//! callbacks so the binary runs end-to-end offline. One JSON object per
//! line:
//!
//! ```jsonl
//! {"type":"gnss","satellites":[{"snr_dbhz":35.0,"used_in_fix":true}]}
//! {"type":"fix","lat":0.0005,"lon":0.0005,"accuracy_m":4.0,"source":"gps"}
//! {"type":"signal_lost"}
//! {"type":"wait","ms":500}
//! ```

use crate::domain::types::{
    ControllerEvent, FixSource, GeoPoint, PositionFix, SatelliteObservation, SignalVerdict,
};
use crate::services::classifier::SignalQualityClassifier;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// One line of a replay trace
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// One GNSS epoch; classified before entering the event channel
    Gnss { satellites: Vec<SatelliteObservation> },
    /// A provider or step-tracker fix
    Fix {
        lat: f64,
        lon: f64,
        #[serde(default)]
        accuracy_m: Option<f64>,
        source: FixSource,
    },
    /// Satellite source closed (permission revoked): falls back to outdoor
    SignalLost,
    /// Pause the replay to model real-time spacing
    Wait { ms: u64 },
}

/// Replay a JSONL trace into the controller event channel
///
/// The classifier runs here, on the sensor side, so the controller only
/// ever sees verdicts — the same split as the live wiring.
pub async fn run_replay<P: AsRef<Path>>(
    path: P,
    classifier: SignalQualityClassifier,
    event_tx: mpsc::Sender<ControllerEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open replay file {}", path.display()))?;

    info!(path = %path.display(), "replay_started");

    let mut lines = BufReader::new(file).lines();
    let mut line_no = 0u64;

    loop {
        let line = tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("replay_shutdown");
                    return Ok(());
                }
                continue;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else { break };
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: ReplayEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = %line_no, error = %e, "replay_line_skipped");
                continue;
            }
        };

        match event {
            ReplayEvent::Gnss { satellites } => {
                let verdict = classifier.classify(&satellites);
                debug!(line = %line_no, verdict = %verdict.as_str(), sats = %satellites.len(), "replay_gnss_epoch");
                if event_tx.send(ControllerEvent::Signal(verdict)).await.is_err() {
                    break;
                }
            }
            ReplayEvent::Fix { lat, lon, accuracy_m, source } => {
                let fix = PositionFix::new(GeoPoint::new(lat, lon), accuracy_m, source);
                if event_tx.send(ControllerEvent::Fix(fix)).await.is_err() {
                    break;
                }
            }
            ReplayEvent::SignalLost => {
                // No data is not an error: degrade to the outdoor fallback
                warn!(line = %line_no, "replay_signal_lost");
                if event_tx.send(ControllerEvent::Signal(SignalVerdict::Outdoor)).await.is_err() {
                    break;
                }
            }
            ReplayEvent::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
    }

    info!(lines = %line_no, "replay_finished");
    Ok(())
}
