//! Discovery trigger: place entered/exited events
//!
//! Diffs successive resolver results into boundary events consumed by the
//! hosting application (geofence wake-up, story fetch, notifications).
//! Those subsystems are external collaborators; this module only defines
//! the boundary events and the diffing.

use crate::domain::types::{epoch_ms, PlaceId};
use serde::Serialize;
use tracing::info;

/// A place boundary crossing derived from successive resolutions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    ZoneEntered { place_id: PlaceId, ts: u64 },
    ZoneExited { place_id: PlaceId, ts: u64 },
}

impl DiscoveryEvent {
    pub fn place_id(&self) -> &PlaceId {
        match self {
            DiscoveryEvent::ZoneEntered { place_id, .. } => place_id,
            DiscoveryEvent::ZoneExited { place_id, .. } => place_id,
        }
    }
}

/// Tracks the previously resolved place and emits boundary events
#[derive(Debug, Default)]
pub struct DiscoveryTrigger {
    current: Option<PlaceId>,
}

impl DiscoveryTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently resolved place, if any
    pub fn current(&self) -> Option<&PlaceId> {
        self.current.as_ref()
    }

    /// Feed the latest resolution and collect boundary events
    ///
    /// Moving directly between two places emits the exit before the entry.
    pub fn observe(&mut self, resolved: Option<PlaceId>) -> Vec<DiscoveryEvent> {
        if self.current == resolved {
            return Vec::new();
        }

        let ts = epoch_ms();
        let mut events = Vec::with_capacity(2);

        if let Some(old) = self.current.take() {
            info!(place_id = %old, "zone_exited");
            events.push(DiscoveryEvent::ZoneExited { place_id: old, ts });
        }
        if let Some(new) = resolved {
            info!(place_id = %new, "zone_entered");
            events.push(DiscoveryEvent::ZoneEntered { place_id: new.clone(), ts });
            self.current = Some(new);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlaceId {
        PlaceId::from(s)
    }

    #[test]
    fn test_first_resolution_enters() {
        let mut trigger = DiscoveryTrigger::new();

        let events = trigger.observe(Some(id("library")));

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DiscoveryEvent::ZoneEntered { place_id, .. } if place_id == &id("library")));
        assert_eq!(trigger.current(), Some(&id("library")));
    }

    #[test]
    fn test_unchanged_resolution_is_silent() {
        let mut trigger = DiscoveryTrigger::new();
        trigger.observe(Some(id("library")));

        assert!(trigger.observe(Some(id("library"))).is_empty());
        assert!(trigger.observe(Some(id("library"))).is_empty());
    }

    #[test]
    fn test_losing_resolution_exits() {
        let mut trigger = DiscoveryTrigger::new();
        trigger.observe(Some(id("library")));

        let events = trigger.observe(None);

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DiscoveryEvent::ZoneExited { place_id, .. } if place_id == &id("library")));
        assert_eq!(trigger.current(), None);
    }

    #[test]
    fn test_moving_between_places_exits_then_enters() {
        let mut trigger = DiscoveryTrigger::new();
        trigger.observe(Some(id("library")));

        let events = trigger.observe(Some(id("cafe")));

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], DiscoveryEvent::ZoneExited { place_id, .. } if place_id == &id("library")));
        assert!(matches!(&events[1], DiscoveryEvent::ZoneEntered { place_id, .. } if place_id == &id("cafe")));
    }

    #[test]
    fn test_none_to_none_is_silent() {
        let mut trigger = DiscoveryTrigger::new();
        assert!(trigger.observe(None).is_empty());
    }
}
