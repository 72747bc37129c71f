//! IO modules - external collaborator interfaces
//!
//! This module contains the boundaries to systems the core does not own:
//! - `FixProvider` / `StepTracker` - injected positioning collaborators
//! - `catalog` - file-backed place catalog with a shared latest snapshot
//! - `replay` - JSONL sensor trace ingest for running the binary offline

pub mod catalog;
pub mod replay;

use crate::domain::types::PositionFix;

/// Requested fix subscription quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixPriority {
    /// GNSS-grade fixes for direct tracking
    HighAccuracy,
    /// Network/cell fixes used to calibrate dead reckoning
    Balanced,
}

impl FixPriority {
    pub fn as_str(&self) -> &str {
        match self {
            FixPriority::HighAccuracy => "high_accuracy",
            FixPriority::Balanced => "balanced",
        }
    }
}

/// Parameters for a fix subscription
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixRequest {
    pub priority: FixPriority,
    pub interval_ms: u64,
    pub min_distance_m: f64,
}

/// Location-fix provider collaborator
///
/// Implementations deliver `PositionFix` values into the controller's
/// merged event channel; these methods only manage the subscription.
/// Errors are transient (permission denied, provider restart) and the
/// controller treats them as "no new input" for that tick.
pub trait FixProvider: Send {
    fn subscribe(&mut self, request: FixRequest) -> anyhow::Result<()>;
    fn unsubscribe(&mut self) -> anyhow::Result<()>;
}

/// Dead-reckoning step tracker collaborator
///
/// The integration algorithm lives outside the core; the controller only
/// starts, stops, and calibrates it. It emits fixes tagged
/// `FixSource::DeadReckoning` into the merged event channel.
pub trait StepTracker: Send {
    fn start(&mut self, seed: PositionFix) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
    fn calibrate(&mut self, fix: &PositionFix) -> anyhow::Result<()>;
}

// Re-export commonly used types
pub use catalog::PlaceCatalog;
pub use replay::{run_replay, ReplayEvent};
