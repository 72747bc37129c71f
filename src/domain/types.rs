//! Shared types for the positioning core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Newtype wrapper for place IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PlaceId(pub String);

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        PlaceId(s.to_string())
    }
}

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Origin of a position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
    Gps,
    Network,
    DeadReckoning,
}

impl FixSource {
    pub fn as_str(&self) -> &str {
        match self {
            FixSource::Gps => "gps",
            FixSource::Network => "network",
            FixSource::DeadReckoning => "dead_reckoning",
        }
    }
}

/// A single position estimate with known or unknown accuracy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub point: GeoPoint,
    /// Estimated horizontal accuracy in meters, if the source reports one
    pub accuracy_m: Option<f64>,
    pub source: FixSource,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    pub fn new(point: GeoPoint, accuracy_m: Option<f64>, source: FixSource) -> Self {
        Self { point, accuracy_m, source, timestamp: Utc::now() }
    }
}

/// One satellite's contribution to the current GNSS epoch
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SatelliteObservation {
    /// Carrier-to-noise ratio in dB-Hz
    pub snr_dbhz: f64,
    /// Whether the receiver used this satellite in the fix solution
    pub used_in_fix: bool,
}

/// Indoor/outdoor verdict derived from one GNSS epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalVerdict {
    Indoor,
    Outdoor,
    /// Neither threshold pair matched; resolved by the classifier's tie-break
    Ambiguous,
}

impl SignalVerdict {
    pub fn as_str(&self) -> &str {
        match self {
            SignalVerdict::Indoor => "indoor",
            SignalVerdict::Outdoor => "outdoor",
            SignalVerdict::Ambiguous => "ambiguous",
        }
    }
}

/// Polygonal boundary of a zone-type place
///
/// Corners are an ordered ring, implicitly closed. Fewer than 3 corners
/// never matches (always-outside).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneDefinition {
    pub corners: SmallVec<[GeoPoint; 4]>,
}

impl ZoneDefinition {
    pub fn new(corners: impl IntoIterator<Item = GeoPoint>) -> Self {
        Self { corners: corners.into_iter().collect() }
    }

    /// A ring needs at least 3 corners to bound any area
    pub fn is_valid_polygon(&self) -> bool {
        self.corners.len() >= 3
    }
}

/// Indoor or outdoor place category (drives floor handling downstream)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Indoor,
    Outdoor,
}

impl PlaceCategory {
    pub fn as_str(&self) -> &str {
        match self {
            PlaceCategory::Indoor => "indoor",
            PlaceCategory::Outdoor => "outdoor",
        }
    }
}

/// Geometry of a place: a single coordinate or a polygonal zone
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceGeometry {
    Point(GeoPoint),
    Zone(ZoneDefinition),
}

/// A named place from the catalog (read-only input to the core)
#[derive(Debug, Clone)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub geometry: PlaceGeometry,
    pub category: PlaceCategory,
    /// Floor identifiers for multi-floor indoor places
    pub floors: Vec<i32>,
}

impl Place {
    pub fn is_zone(&self) -> bool {
        matches!(self.geometry, PlaceGeometry::Zone(_))
    }
}

/// Result of recomputing zone membership against the catalog for one fix
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMembership {
    /// True when the user is inside (or within radius of) a zone-type place
    pub in_zone: bool,
    /// Nearest matching place within the resolve radius, if any
    pub nearest: Option<PlaceId>,
    /// Distance to the nearest candidate in meters (infinite when no places)
    pub distance_m: f64,
}

impl ZoneMembership {
    pub fn none() -> Self {
        Self { in_zone: false, nearest: None, distance_m: f64::INFINITY }
    }
}

/// States of the mode-switching controller
///
/// At most one state is active per tracking session; each state owns at
/// most one active positioning source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositioningState {
    /// Indoors and in-zone with no fix yet; running GPS under a timer
    Acquiring,
    /// High-accuracy GPS subscription is authoritative
    GpsTracking,
    /// Balanced network fixes calibrate a running step tracker
    NetworkAssistedDeadReckoning,
    /// Step tracker only, seeded from the last known fix
    DeadReckoningLocked,
}

impl PositioningState {
    pub fn as_str(&self) -> &str {
        match self {
            PositioningState::Acquiring => "acquiring",
            PositioningState::GpsTracking => "gps_tracking",
            PositioningState::NetworkAssistedDeadReckoning => "network_pdr",
            PositioningState::DeadReckoningLocked => "pdr_locked",
        }
    }
}

/// Merged event stream consumed by the controller
///
/// All sensor callbacks are funneled through one channel so transitions
/// are evaluated strictly one at a time.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// New indoor/outdoor verdict from the signal classifier
    Signal(SignalVerdict),
    /// New position fix from the provider or the step tracker
    Fix(PositionFix),
    /// Zone membership recomputed against the latest fix
    Zone { in_zone: bool },
    /// Acquisition timer expired; stale generations are ignored
    AcquisitionTimeout { generation: u64 },
}
