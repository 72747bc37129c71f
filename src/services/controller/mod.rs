//! Positioning mode state machine
//!
//! The controller is the single authoritative owner of PositioningState for
//! a tracking session. All sensor callbacks (signal verdicts, fixes, zone
//! membership, timer expiries) are merged into one bounded event channel
//! and evaluated strictly one at a time, so two transitions can never race
//! and start two sources.
//!
//! Invariant: at most one active positioning source. Every transition
//! tears down the previous state's source (fix subscription or step
//! tracker session) before starting the next one.

mod handlers;

use crate::domain::types::{ControllerEvent, PositionFix, PositioningState};
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::{FixProvider, StepTracker};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Mode-switching state machine over the merged event stream
pub struct PositioningModeController {
    /// Current mode; None while idle (before start / after stop)
    pub(crate) state: Option<PositioningState>,
    /// Most recent fix from any source; cleared on stop
    pub(crate) last_fix: Option<PositionFix>,
    /// Latest indoor/outdoor verdict (outdoor until told otherwise)
    pub(crate) indoor: bool,
    /// Latest zone membership
    pub(crate) in_zone: bool,
    /// Generation of the armed acquisition timer; expiries from other
    /// generations are stale and ignored
    pub(crate) timer_generation: u64,
    /// Timeouts seen during the current acquisition attempt
    pub(crate) acquisition_retries: u32,
    /// Injected location-fix provider
    pub(crate) fix_provider: Box<dyn FixProvider>,
    /// Injected dead-reckoning step tracker
    pub(crate) step_tracker: Box<dyn StepTracker>,
    /// Application configuration
    pub(crate) config: Config,
    /// Metrics collector
    pub(crate) metrics: Arc<Metrics>,
    /// Sender side of the merged event channel, used to arm timers
    pub(crate) event_tx: mpsc::Sender<ControllerEvent>,
    /// Published state for observers (at most once per change)
    pub(crate) state_tx: watch::Sender<Option<PositioningState>>,
    /// Authoritative fused location stream
    pub(crate) fused_tx: mpsc::Sender<PositionFix>,
}

impl PositioningModeController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        fix_provider: Box<dyn FixProvider>,
        step_tracker: Box<dyn StepTracker>,
        metrics: Arc<Metrics>,
        event_tx: mpsc::Sender<ControllerEvent>,
        state_tx: watch::Sender<Option<PositioningState>>,
        fused_tx: mpsc::Sender<PositionFix>,
    ) -> Self {
        Self {
            state: None,
            last_fix: None,
            indoor: false,
            in_zone: false,
            timer_generation: 0,
            acquisition_retries: 0,
            fix_provider,
            step_tracker,
            config,
            metrics,
            event_tx,
            state_tx,
            fused_tx,
        }
    }

    /// Begin a tracking session, entering the initial mode
    pub fn start(&mut self) {
        if self.state.is_some() {
            return;
        }
        info!("tracking_started");
        self.evaluate();
    }

    /// Stop the tracking session: tear down the active source, invalidate
    /// any pending acquisition timer, and clear the session's last fix
    pub fn stop(&mut self) {
        self.teardown_current();
        // A late timer expiry must not resurrect a stale transition
        self.timer_generation = self.timer_generation.wrapping_add(1);
        self.state = None;
        self.last_fix = None;
        self.publish_state();
        info!("tracking_stopped");
    }

    /// Run the session, consuming events until the channel closes or
    /// shutdown is signalled
    pub async fn run(
        &mut self,
        mut event_rx: mpsc::Receiver<ControllerEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        self.start();

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    match event {
                        Some(e) => self.process_event(e),
                        None => break, // Channel closed
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.stop();
    }

    /// Process a single event, dispatching to the appropriate handler
    pub fn process_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Signal(verdict) => self.handle_signal(verdict),
            ControllerEvent::Fix(fix) => self.handle_fix(fix),
            ControllerEvent::Zone { in_zone } => self.handle_zone(in_zone),
            ControllerEvent::AcquisitionTimeout { generation } => {
                self.handle_acquisition_timeout(generation)
            }
        }
        self.metrics.record_event_processed();
    }

    /// Current state, for observers with direct access
    pub fn state(&self) -> Option<PositioningState> {
        self.state
    }

    /// Most recent fix retained for this session
    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }
}
