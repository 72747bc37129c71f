//! Zone geometry: point-in-polygon and great-circle distances
//!
//! All functions are total and allocation-free. Inputs are lat/lon degrees,
//! so distances use a spherical-earth great-circle formula rather than
//! planar Euclidean distance. The segment projection is done in degree
//! space (zones span tens of meters, where the planar approximation of the
//! closest point is well within fix accuracy), then measured great-circle.

use crate::domain::types::{GeoPoint, ZoneDefinition};

/// Mean earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) distance between two coordinates in meters
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Even-odd ray-casting test over the implicitly closed polygon ring
///
/// Returns false when the zone has fewer than 3 corners.
pub fn is_inside(point: GeoPoint, zone: &ZoneDefinition) -> bool {
    let corners = &zone.corners;
    if corners.len() < 3 {
        return false;
    }

    let mut intersections = 0;
    for j in 0..corners.len() {
        let i = if j == 0 { corners.len() - 1 } else { j - 1 };
        let p1 = corners[i];
        let p2 = corners[j];

        if ((p1.lon > point.lon) != (p2.lon > point.lon))
            && (point.lat < (p2.lat - p1.lat) * (point.lon - p1.lon) / (p2.lon - p1.lon) + p1.lat)
        {
            intersections += 1;
        }
    }
    intersections % 2 == 1
}

/// Distance from `point` to the segment `a`-`b`, clamped to the endpoints
///
/// Zero-length segments degrade to direct point distance.
pub fn point_to_segment_m(point: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lon = b.lon - a.lon;

    if d_lat == 0.0 && d_lon == 0.0 {
        return haversine_m(point, a);
    }

    let t = ((point.lat - a.lat) * d_lat + (point.lon - a.lon) * d_lon)
        / (d_lat * d_lat + d_lon * d_lon);
    let t = t.clamp(0.0, 1.0);

    let closest = GeoPoint::new(a.lat + t * d_lat, a.lon + t * d_lon);
    haversine_m(point, closest)
}

/// Distance in meters from `point` to the zone boundary, 0 if inside
///
/// Minimum over all edges including the closing wrap-around edge. A zone
/// with no corners is infinitely far away (never matches).
pub fn distance_to_zone_m(point: GeoPoint, zone: &ZoneDefinition) -> f64 {
    if is_inside(point, zone) {
        return 0.0;
    }

    let corners = &zone.corners;
    if corners.is_empty() {
        return f64::INFINITY;
    }

    let mut min_distance = f64::INFINITY;
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        let d = point_to_segment_m(point, a, b);
        if d < min_distance {
            min_distance = d;
        }
    }
    min_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ~111 m per 0.001 degree of latitude at the equator
    const DEG_001_M: f64 = 111.0;

    fn square_zone() -> ZoneDefinition {
        // 0.001 x 0.001 degree square at the equator, roughly 111 m a side
        ZoneDefinition::new([
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.001, 0.0),
        ])
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km
        let d = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_haversine_zero() {
        let p = GeoPoint::new(10.5, -3.2);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn test_inside_square() {
        let zone = square_zone();
        assert!(is_inside(GeoPoint::new(0.0005, 0.0005), &zone));
    }

    #[test]
    fn test_outside_square() {
        let zone = square_zone();
        assert!(!is_inside(GeoPoint::new(0.005, 0.005), &zone));
        assert!(!is_inside(GeoPoint::new(-0.0005, 0.0005), &zone));
    }

    #[test]
    fn test_degenerate_polygon_never_inside() {
        let line = ZoneDefinition::new([GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001)]);
        assert!(!is_inside(GeoPoint::new(0.0, 0.0005), &line));
    }

    #[test]
    fn test_distance_zero_inside() {
        let zone = square_zone();
        assert_eq!(distance_to_zone_m(GeoPoint::new(0.0005, 0.0005), &zone), 0.0);
    }

    #[test]
    fn test_distance_to_nearest_edge() {
        let zone = square_zone();
        // Point east of the square at lon 0.002: nearest edge is lon=0.001,
        // expected distance one 0.001-degree step (~111 m)
        let d = distance_to_zone_m(GeoPoint::new(0.0005, 0.002), &zone);
        assert!((d - DEG_001_M).abs() < 2.0, "got {d}");
    }

    #[test]
    fn test_distance_clamps_to_corner() {
        let zone = square_zone();
        // Point diagonal from corner (0, 0): closest point on every edge is
        // the corner itself
        let p = GeoPoint::new(-0.001, -0.001);
        let expected = haversine_m(p, GeoPoint::new(0.0, 0.0));
        let d = distance_to_zone_m(p, &zone);
        assert!((d - expected).abs() < 0.01, "got {d}, expected {expected}");
    }

    #[test]
    fn test_zero_length_edge_degrades_to_point() {
        let a = GeoPoint::new(0.0, 0.0);
        let p = GeoPoint::new(0.0005, 0.0);
        assert_eq!(point_to_segment_m(p, a, a), haversine_m(p, a));
    }

    #[test]
    fn test_empty_zone_infinitely_far() {
        let zone = ZoneDefinition::default();
        assert_eq!(distance_to_zone_m(GeoPoint::new(0.0, 0.0), &zone), f64::INFINITY);
    }
}
