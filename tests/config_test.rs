//! Integration tests for configuration and catalog loading

use std::io::Write;
use storyloc::domain::types::PlaceId;
use storyloc::infra::Config;
use storyloc::io::PlaceCatalog;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[classifier]
indoor_snr_dbhz = 20.0
outdoor_snr_dbhz = 30.0
max_indoor_sats = 4
min_outdoor_sats = 6
snr_percentile = 0.5

[controller]
acquisition_timeout_secs = 30
gps_accuracy_cutoff_m = 8.0
max_acquisition_retries = 5
fix_interval_ms = 1000
fix_min_distance_m = 5.0

[resolver]
discovery_radius_m = 10.0
map_radius_m = 100.0

[catalog]
file = "data/test-places.toml"

[metrics]
interval_secs = 2
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.classifier().indoor_snr_dbhz, 20.0);
    assert_eq!(config.classifier().outdoor_snr_dbhz, 30.0);
    assert_eq!(config.classifier().max_indoor_sats, 4);
    assert_eq!(config.classifier().min_outdoor_sats, 6);
    assert_eq!(config.classifier().snr_percentile, 0.5);
    assert_eq!(config.acquisition_timeout_secs(), 30);
    assert_eq!(config.gps_accuracy_cutoff_m(), 8.0);
    assert_eq!(config.max_acquisition_retries(), Some(5));
    assert_eq!(config.fix_interval_ms(), 1000);
    assert_eq!(config.fix_min_distance_m(), 5.0);
    assert_eq!(config.discovery_radius_m(), 10.0);
    assert_eq!(config.map_radius_m(), 100.0);
    assert_eq!(config.catalog_file(), "data/test-places.toml");
    assert_eq!(config.metrics_interval_secs(), 2);
}

#[test]
fn test_load_config_missing_sections_uses_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(
            br#"
[resolver]
discovery_radius_m = 6.0
"#,
        )
        .unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.discovery_radius_m(), 6.0);
    // Everything else falls back to defaults
    assert_eq!(config.acquisition_timeout_secs(), 60);
    assert_eq!(config.classifier().indoor_snr_dbhz, 23.0);
    assert_eq!(config.max_acquisition_retries(), None);
}

#[test]
fn test_load_config_missing_file_fails() {
    assert!(Config::from_file("/nonexistent/path/config.toml").is_err());
}

#[test]
fn test_load_config_invalid_toml_fails() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"not [ valid toml").unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}

#[test]
fn test_load_catalog_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(
            br#"
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
"#,
        )
        .unwrap();

    let catalog = PlaceCatalog::load(temp_file.path()).unwrap();

    assert_eq!(catalog.len(), 2);
    let library = catalog.get(&PlaceId::from("library")).unwrap();
    assert!(library.is_zone());
    assert_eq!(library.floors, vec![1, 2]);
    assert!(!catalog.get(&PlaceId::from("fountain")).unwrap().is_zone());
}

#[test]
fn test_load_catalog_rejects_place_without_geometry() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(
            br#"
[[places]]
id = "ghost"
category = "outdoor"
"#,
        )
        .unwrap();

    assert!(PlaceCatalog::load(temp_file.path()).is_err());
}
