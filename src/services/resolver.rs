//! Nearest-place resolution against the catalog
//!
//! Pure over its inputs: the caller supplies the place snapshot and an
//! explicit radius on every call, so there is no hidden global radius and
//! results are deterministic for a given catalog order.

use crate::domain::geometry;
use crate::domain::types::{GeoPoint, Place, PlaceGeometry, PlaceId, ZoneMembership};

/// Picks the closest place (point or zone) within a radius
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestPlaceResolver;

impl NearestPlaceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Distance in meters from `user` to a place
    ///
    /// Zone-based places measure to the polygon (0 inside); point-based
    /// places measure great-circle to the coordinate.
    pub fn distance_to_place_m(&self, user: GeoPoint, place: &Place) -> f64 {
        match &place.geometry {
            PlaceGeometry::Zone(zone) => geometry::distance_to_zone_m(user, zone),
            PlaceGeometry::Point(point) => geometry::haversine_m(user, *point),
        }
    }

    /// Resolve the nearest place strictly within `radius_m`
    ///
    /// Ties break by catalog iteration order: the first minimal candidate
    /// wins.
    pub fn resolve<'a>(
        &self,
        user: GeoPoint,
        places: &'a [Place],
        radius_m: f64,
    ) -> Option<&'a Place> {
        let mut best: Option<(&Place, f64)> = None;

        for place in places {
            let distance = self.distance_to_place_m(user, place);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((place, distance)),
            }
        }

        match best {
            Some((place, distance)) if distance < radius_m => Some(place),
            _ => None,
        }
    }

    /// Resolve to an owned place id (convenience over [`resolve`])
    ///
    /// [`resolve`]: NearestPlaceResolver::resolve
    pub fn resolve_id(&self, user: GeoPoint, places: &[Place], radius_m: f64) -> Option<PlaceId> {
        self.resolve(user, places, radius_m).map(|p| p.id.clone())
    }

    /// Recompute zone membership for one fix
    ///
    /// Only zone-type places drive `in_zone`; a nearby point place resolves
    /// for discovery but does not put the user "in a zone" for the mode
    /// controller.
    pub fn membership(&self, user: GeoPoint, places: &[Place], radius_m: f64) -> ZoneMembership {
        let mut membership = ZoneMembership::none();

        if let Some(place) = self.resolve(user, places, radius_m) {
            let distance = self.distance_to_place_m(user, place);
            membership.in_zone = place.is_zone();
            membership.nearest = Some(place.id.clone());
            membership.distance_m = distance;
        }

        membership
    }
}
