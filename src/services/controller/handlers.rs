//! Event handlers and the transition function for the mode controller
//!
//! Each handler folds one input into the controller's view of the world,
//! then re-evaluates the target state. The transition function itself is
//! synchronous and non-blocking; the only suspension points live at the
//! sensor sources (timer sleep, fix subscription).

use super::PositioningModeController;
use crate::domain::types::{ControllerEvent, FixSource, PositionFix, PositioningState, SignalVerdict};
use crate::io::{FixPriority, FixRequest};
use tokio::time::Duration;
use tracing::{debug, info, warn};

impl PositioningModeController {
    /// Fold in a new indoor/outdoor verdict
    pub(crate) fn handle_signal(&mut self, verdict: SignalVerdict) {
        let indoor = verdict == SignalVerdict::Indoor;
        if self.indoor != indoor {
            debug!(verdict = %verdict.as_str(), "signal_verdict_changed");
            self.indoor = indoor;
        }
        self.evaluate();
    }

    /// Fold in recomputed zone membership
    pub(crate) fn handle_zone(&mut self, in_zone: bool) {
        if self.in_zone != in_zone {
            debug!(in_zone = %in_zone, "zone_status_changed");
            self.in_zone = in_zone;
        }
        self.evaluate();
    }

    /// Fold in a new position fix (last-fix-wins, no queuing)
    pub(crate) fn handle_fix(&mut self, fix: PositionFix) {
        self.last_fix = Some(fix);

        match self.state {
            // GPS fixes are authoritative in GPS modes
            Some(PositioningState::GpsTracking) | Some(PositioningState::Acquiring) => {
                self.emit_fused(fix);
            }
            // In assisted dead reckoning, network/GPS fixes calibrate the
            // tracker; only the tracker's own fixes feed downstream
            Some(PositioningState::NetworkAssistedDeadReckoning) => {
                if fix.source == FixSource::DeadReckoning {
                    self.emit_fused(fix);
                } else {
                    let result = self.step_tracker.calibrate(&fix);
                    self.log_collaborator("step_tracker_calibrate", result);
                }
            }
            Some(PositioningState::DeadReckoningLocked) => {
                if fix.source == FixSource::DeadReckoning {
                    self.emit_fused(fix);
                }
            }
            None => {}
        }

        self.evaluate();
    }

    /// Acquisition timer expired
    pub(crate) fn handle_acquisition_timeout(&mut self, generation: u64) {
        if generation != self.timer_generation {
            debug!(generation = %generation, current = %self.timer_generation, "stale_acquisition_timer_ignored");
            return;
        }
        if self.state != Some(PositioningState::Acquiring) {
            return;
        }

        self.metrics.record_acquisition_timeout();
        self.acquisition_retries += 1;
        info!(retries = %self.acquisition_retries, "acquisition_timeout");

        // A fix may have arrived since the timer was armed; re-evaluating
        // picks the locked mode in that case
        self.evaluate();

        if self.state == Some(PositioningState::Acquiring) {
            match self.config.max_acquisition_retries() {
                Some(cap) if self.acquisition_retries >= cap => {
                    // Keep the subscription running but stop the timer churn
                    warn!(cap = %cap, "acquisition_retries_exhausted");
                }
                _ => self.arm_acquisition_timer(),
            }
        }
    }

    /// Re-evaluate the target state and transition if it changed
    pub(crate) fn evaluate(&mut self) {
        let target = self.target_state();
        if self.state == Some(target) {
            return;
        }
        self.transition(target);
    }

    /// The mode the current inputs call for
    ///
    /// Locked indoors inside a zone, dead reckoning takes over as soon as a
    /// seed fix exists; otherwise GPS quality decides between plain GPS and
    /// network-assisted dead reckoning.
    fn target_state(&self) -> PositioningState {
        if self.indoor && self.in_zone {
            if self.last_fix.is_some() {
                PositioningState::DeadReckoningLocked
            } else {
                PositioningState::Acquiring
            }
        } else {
            let accurate_gps = self
                .last_fix
                .and_then(|f| f.accuracy_m)
                .is_some_and(|acc| acc < self.config.gps_accuracy_cutoff_m());
            if accurate_gps {
                PositioningState::GpsTracking
            } else {
                PositioningState::NetworkAssistedDeadReckoning
            }
        }
    }

    /// Tear down the old state's source, then start the new one
    fn transition(&mut self, target: PositioningState) {
        let from = self.state;
        self.teardown_current();

        match target {
            PositioningState::Acquiring => {
                self.subscribe_fixes(FixPriority::HighAccuracy);
                self.acquisition_retries = 0;
                self.arm_acquisition_timer();
            }
            PositioningState::GpsTracking => {
                self.subscribe_fixes(FixPriority::HighAccuracy);
            }
            PositioningState::NetworkAssistedDeadReckoning => {
                self.subscribe_fixes(FixPriority::Balanced);
                self.start_step_tracker();
            }
            PositioningState::DeadReckoningLocked => {
                self.start_step_tracker();
            }
        }

        self.state = Some(target);
        self.metrics.record_transition();
        info!(
            from = %from.as_ref().map(|s| s.as_str()).unwrap_or("idle"),
            to = %target.as_str(),
            indoor = %self.indoor,
            in_zone = %self.in_zone,
            has_fix = %self.last_fix.is_some(),
            "mode_switched"
        );
        self.publish_state();
    }

    /// Stop whatever source the current state holds active
    pub(crate) fn teardown_current(&mut self) {
        match self.state {
            Some(PositioningState::Acquiring) => {
                self.unsubscribe_fixes();
                // Invalidate the pending timer
                self.timer_generation = self.timer_generation.wrapping_add(1);
            }
            Some(PositioningState::GpsTracking) => {
                self.unsubscribe_fixes();
            }
            Some(PositioningState::NetworkAssistedDeadReckoning) => {
                self.unsubscribe_fixes();
                let result = self.step_tracker.stop();
                self.log_collaborator("step_tracker_stop", result);
            }
            Some(PositioningState::DeadReckoningLocked) => {
                let result = self.step_tracker.stop();
                self.log_collaborator("step_tracker_stop", result);
            }
            None => {}
        }
    }

    fn subscribe_fixes(&mut self, priority: FixPriority) {
        let request = FixRequest {
            priority,
            interval_ms: self.config.fix_interval_ms(),
            min_distance_m: self.config.fix_min_distance_m(),
        };
        let result = self.fix_provider.subscribe(request);
        self.log_collaborator("fix_subscribe", result);
    }

    fn unsubscribe_fixes(&mut self) {
        let result = self.fix_provider.unsubscribe();
        self.log_collaborator("fix_unsubscribe", result);
    }

    /// Start dead reckoning seeded with the last known fix
    fn start_step_tracker(&mut self) {
        match self.last_fix {
            Some(seed) => {
                let result = self.step_tracker.start(seed);
                self.log_collaborator("step_tracker_start", result);
            }
            None => warn!("pdr_start_skipped_no_seed"),
        }
    }

    /// Arm the acquisition timer under a fresh generation
    fn arm_acquisition_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        let generation = self.timer_generation;
        let timeout = Duration::from_secs(self.config.acquisition_timeout_secs());
        let tx = self.event_tx.clone();

        debug!(generation = %generation, timeout_secs = %timeout.as_secs(), "acquisition_timer_armed");
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            // A closed channel means the session is gone; nothing to do
            let _ = tx.send(ControllerEvent::AcquisitionTimeout { generation }).await;
        });
    }

    /// Publish the fused fix downstream; drops on a full channel rather
    /// than blocking the reducer (last-fix-wins)
    fn emit_fused(&mut self, fix: PositionFix) {
        match self.fused_tx.try_send(fix) {
            Ok(()) => self.metrics.record_fix_emitted(),
            Err(_) => debug!("fused_fix_dropped"),
        }
    }

    /// Publish the current state, at most once per change
    pub(crate) fn publish_state(&self) {
        self.state_tx.send_if_modified(|published| {
            if *published == self.state {
                false
            } else {
                *published = self.state;
                true
            }
        });
    }

    /// Collaborator failures are transient: log, count, carry on
    fn log_collaborator(&self, op: &str, result: anyhow::Result<()>) {
        if let Err(e) = result {
            self.metrics.record_collaborator_error();
            warn!(op = %op, error = %e, "collaborator_call_failed");
        }
    }
}
