//! File-backed place catalog
//!
//! Loads place definitions from TOML and holds the latest snapshot behind
//! a lock so it can be swapped while the resolver keeps reading. The
//! authoritative catalog (persistence, sync) is an external collaborator;
//! this is only its in-process face.
//!
//! Format:
//!
//! ```toml
//! [[places]]
//! id = "library"
//! name = "Main Library"
//! category = "indoor"
//! floors = [1, 2]
//! corners = [[21.0278, 105.8342], [21.0279, 105.8342], ...]   # zone place
//!
//! [[places]]
//! id = "fountain"
//! name = "Fountain Square"
//! category = "outdoor"
//! coordinate = [21.0280, 105.8340]                             # point place
//! ```

use crate::domain::types::{GeoPoint, Place, PlaceCategory, PlaceGeometry, PlaceId, ZoneDefinition};
use anyhow::{bail, Context};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    places: Vec<PlaceEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaceEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    category: PlaceCategory,
    #[serde(default)]
    floors: Vec<i32>,
    /// [lat, lon] for point places
    #[serde(default)]
    coordinate: Option<[f64; 2]>,
    /// [[lat, lon], ...] ring for zone places
    #[serde(default)]
    corners: Vec<[f64; 2]>,
}

impl PlaceEntry {
    fn into_place(self) -> anyhow::Result<Place> {
        let geometry = if !self.corners.is_empty() {
            let zone = ZoneDefinition::new(
                self.corners.iter().map(|[lat, lon]| GeoPoint::new(*lat, *lon)),
            );
            if !zone.is_valid_polygon() {
                // Data-quality problem, not an error: the zone simply never
                // matches
                warn!(
                    place_id = %self.id,
                    corners = %zone.corners.len(),
                    "zone_has_too_few_corners"
                );
            }
            PlaceGeometry::Zone(zone)
        } else if let Some([lat, lon]) = self.coordinate {
            PlaceGeometry::Point(GeoPoint::new(lat, lon))
        } else {
            bail!("place '{}' has neither corners nor a coordinate", self.id);
        };

        let name = self.name.unwrap_or_else(|| self.id.clone());
        Ok(Place { id: PlaceId(self.id), name, geometry, category: self.category, floors: self.floors })
    }
}

/// Shared latest-snapshot view of the place catalog
#[derive(Clone)]
pub struct PlaceCatalog {
    inner: Arc<RwLock<CatalogSnapshot>>,
}

struct CatalogSnapshot {
    places: Arc<Vec<Place>>,
    by_id: FxHashMap<PlaceId, usize>,
}

impl CatalogSnapshot {
    fn from_places(places: Vec<Place>) -> Self {
        let by_id =
            places.iter().enumerate().map(|(i, p)| (p.id.clone(), i)).collect::<FxHashMap<_, _>>();
        Self { places: Arc::new(places), by_id }
    }
}

impl PlaceCatalog {
    pub fn empty() -> Self {
        Self { inner: Arc::new(RwLock::new(CatalogSnapshot::from_places(Vec::new()))) }
    }

    /// Load a catalog from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let catalog = Self::empty();
        catalog.reload(path)?;
        Ok(catalog)
    }

    /// Replace the snapshot from a TOML file (catalog updated asynchronously)
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;

        let file: CatalogFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;

        let mut places = Vec::with_capacity(file.places.len());
        for entry in file.places {
            places.push(entry.into_place()?);
        }

        info!(path = %path.display(), places = %places.len(), "catalog_loaded");
        self.replace(places);
        Ok(())
    }

    /// Swap in a new place list
    pub fn replace(&self, places: Vec<Place>) {
        *self.inner.write() = CatalogSnapshot::from_places(places);
    }

    /// Latest snapshot; cheap to clone, stable for the caller's iteration
    pub fn snapshot(&self) -> Arc<Vec<Place>> {
        self.inner.read().places.clone()
    }

    pub fn get(&self, id: &PlaceId) -> Option<Place> {
        let snapshot = self.inner.read();
        snapshot.by_id.get(id).map(|&i| snapshot.places[i].clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[places]]
        id = "library"
        name = "Main Library"
        category = "indoor"
        floors = [1, 2]
        corners = [[0.0, 0.0], [0.0, 0.001], [0.001, 0.001], [0.001, 0.0]]

        [[places]]
        id = "fountain"
        category = "outdoor"
        coordinate = [0.002, 0.002]
    "#;

    #[test]
    fn test_parse_sample_catalog() {
        let file: CatalogFile = toml::from_str(SAMPLE).unwrap();
        let places: Vec<Place> =
            file.places.into_iter().map(|e| e.into_place().unwrap()).collect();

        assert_eq!(places.len(), 2);
        assert!(places[0].is_zone());
        assert_eq!(places[0].floors, vec![1, 2]);
        assert_eq!(places[0].category, PlaceCategory::Indoor);
        assert!(!places[1].is_zone());
        // Name falls back to the id
        assert_eq!(places[1].name, "fountain");
    }

    #[test]
    fn test_place_without_geometry_is_rejected() {
        let entry: PlaceEntry = toml::from_str(
            r#"
            id = "ghost"
            category = "outdoor"
            "#,
        )
        .unwrap();
        assert!(entry.into_place().is_err());
    }

    #[test]
    fn test_snapshot_replace() {
        let catalog = PlaceCatalog::empty();
        assert!(catalog.is_empty());

        let file: CatalogFile = toml::from_str(SAMPLE).unwrap();
        let places = file.places.into_iter().map(|e| e.into_place().unwrap()).collect();
        catalog.replace(places);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&PlaceId::from("library")).is_some());
        assert!(catalog.get(&PlaceId::from("missing")).is_none());

        // Old snapshots remain valid after a replace
        let old = catalog.snapshot();
        catalog.replace(Vec::new());
        assert_eq!(old.len(), 2);
        assert!(catalog.is_empty());
    }
}
