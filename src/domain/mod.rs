//! Domain models - core positioning types and zone geometry
//!
//! This module contains the canonical data types used throughout the system:
//! - `PositionFix` - a single position estimate from any source
//! - `SatelliteObservation` / `SignalVerdict` - GNSS signal quality inputs
//! - `Place` / `ZoneDefinition` - named places and polygonal zones
//! - `PositioningState` - the mode-switching state machine's states
//! - `ControllerEvent` - the merged event stream feeding the controller
//! - `geometry` - point-in-polygon and great-circle distance functions

pub mod geometry;
pub mod types;
