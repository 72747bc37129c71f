//! Configuration loading from TOML files
//!
//! The config file path comes from the binary's `--config` argument (or
//! the CONFIG_FILE environment variable), defaulting to config/dev.toml.
//!
//! Every tuning threshold (SNR cutoffs, acquisition window, GPS accuracy
//! cutoff) is a configuration value here rather than a hard-coded code
//! path, so deployments can tune per site.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// SNR at or below which an epoch reads as indoor (dB-Hz)
    #[serde(default = "default_indoor_snr_dbhz")]
    pub indoor_snr_dbhz: f64,
    /// SNR at or above which an epoch reads as outdoor (dB-Hz)
    #[serde(default = "default_outdoor_snr_dbhz")]
    pub outdoor_snr_dbhz: f64,
    /// Maximum used-satellite count compatible with an indoor verdict
    #[serde(default = "default_max_indoor_sats")]
    pub max_indoor_sats: usize,
    /// Minimum used-satellite count required for an outdoor verdict
    #[serde(default = "default_min_outdoor_sats")]
    pub min_outdoor_sats: usize,
    /// Percentile of the sorted SNR list used as the signal metric
    #[serde(default = "default_snr_percentile")]
    pub snr_percentile: f64,
}

fn default_indoor_snr_dbhz() -> f64 {
    23.0
}

fn default_outdoor_snr_dbhz() -> f64 {
    28.0
}

fn default_max_indoor_sats() -> usize {
    3
}

fn default_min_outdoor_sats() -> usize {
    7
}

fn default_snr_percentile() -> f64 {
    0.7
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            indoor_snr_dbhz: default_indoor_snr_dbhz(),
            outdoor_snr_dbhz: default_outdoor_snr_dbhz(),
            max_indoor_sats: default_max_indoor_sats(),
            min_outdoor_sats: default_min_outdoor_sats(),
            snr_percentile: default_snr_percentile(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Seconds of GPS acquisition allowed while locked indoors in-zone
    #[serde(default = "default_acquisition_timeout_secs")]
    pub acquisition_timeout_secs: u64,
    /// Fix accuracy below which plain GPS tracking is preferred (meters)
    #[serde(default = "default_gps_accuracy_cutoff_m")]
    pub gps_accuracy_cutoff_m: f64,
    /// Cap on acquisition retries; absent means retry indefinitely
    #[serde(default)]
    pub max_acquisition_retries: Option<u32>,
    /// Requested interval between provider fixes (milliseconds)
    #[serde(default = "default_fix_interval_ms")]
    pub fix_interval_ms: u64,
    /// Requested minimum movement between provider fixes (meters)
    #[serde(default = "default_fix_min_distance_m")]
    pub fix_min_distance_m: f64,
}

fn default_acquisition_timeout_secs() -> u64 {
    60
}

fn default_gps_accuracy_cutoff_m() -> f64 {
    5.0
}

fn default_fix_interval_ms() -> u64 {
    2000
}

fn default_fix_min_distance_m() -> f64 {
    2.0
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            acquisition_timeout_secs: default_acquisition_timeout_secs(),
            gps_accuracy_cutoff_m: default_gps_accuracy_cutoff_m(),
            max_acquisition_retries: None,
            fix_interval_ms: default_fix_interval_ms(),
            fix_min_distance_m: default_fix_min_distance_m(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Radius for ambient story discovery (meters)
    #[serde(default = "default_discovery_radius_m")]
    pub discovery_radius_m: f64,
    /// Coarser radius for map-display resolution (meters)
    #[serde(default = "default_map_radius_m")]
    pub map_radius_m: f64,
}

fn default_discovery_radius_m() -> f64 {
    3.0
}

fn default_map_radius_m() -> f64 {
    50.0
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            discovery_radius_m: default_discovery_radius_m(),
            map_radius_m: default_map_radius_m(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to the place catalog TOML file
    #[serde(default = "default_catalog_file")]
    pub file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { file: default_catalog_file() }
    }
}

fn default_catalog_file() -> String {
    "config/places.toml".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval_secs() }
    }
}

fn default_metrics_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    classifier: ClassifierConfig,
    controller: ControllerConfig,
    resolver: ResolverConfig,
    catalog_file: String,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            controller: ControllerConfig::default(),
            resolver: ResolverConfig::default(),
            catalog_file: default_catalog_file(),
            metrics_interval_secs: default_metrics_interval_secs(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            classifier: toml_config.classifier,
            controller: toml_config.controller,
            resolver: toml_config.resolver,
            catalog_file: toml_config.catalog.file,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn classifier(&self) -> &ClassifierConfig {
        &self.classifier
    }

    pub fn acquisition_timeout_secs(&self) -> u64 {
        self.controller.acquisition_timeout_secs
    }

    pub fn gps_accuracy_cutoff_m(&self) -> f64 {
        self.controller.gps_accuracy_cutoff_m
    }

    pub fn max_acquisition_retries(&self) -> Option<u32> {
        self.controller.max_acquisition_retries
    }

    pub fn fix_interval_ms(&self) -> u64 {
        self.controller.fix_interval_ms
    }

    pub fn fix_min_distance_m(&self) -> f64 {
        self.controller.fix_min_distance_m
    }

    pub fn discovery_radius_m(&self) -> f64 {
        self.resolver.discovery_radius_m
    }

    pub fn map_radius_m(&self) -> f64 {
        self.resolver.map_radius_m
    }

    pub fn catalog_file(&self) -> &str {
        &self.catalog_file
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the acquisition timeout
    #[cfg(test)]
    pub fn with_acquisition_timeout_secs(mut self, secs: u64) -> Self {
        self.controller.acquisition_timeout_secs = secs;
        self
    }

    /// Builder method for tests to cap acquisition retries
    #[cfg(test)]
    pub fn with_max_acquisition_retries(mut self, cap: Option<u32>) -> Self {
        self.controller.max_acquisition_retries = cap;
        self
    }

    /// Builder method for tests to set the GPS accuracy cutoff
    #[cfg(test)]
    pub fn with_gps_accuracy_cutoff_m(mut self, cutoff: f64) -> Self {
        self.controller.gps_accuracy_cutoff_m = cutoff;
        self
    }
}
