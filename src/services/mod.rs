//! Services - positioning logic and state management
//!
//! This module contains the core positioning services:
//! - `classifier` - Indoor/outdoor verdict from GNSS signal quality
//! - `resolver` - Nearest-place resolution and zone membership
//! - `discovery` - Place entered/exited events from successive resolutions
//! - `controller` - Mode-switching state machine over the merged event stream

pub mod classifier;
pub mod controller;
pub mod discovery;
pub mod resolver;

// Re-export commonly used types
pub use classifier::SignalQualityClassifier;
pub use controller::PositioningModeController;
pub use discovery::{DiscoveryEvent, DiscoveryTrigger};
pub use resolver::NearestPlaceResolver;
