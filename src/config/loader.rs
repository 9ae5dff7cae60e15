//! Configuration structures and loading logic.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::modes::{Reducer, TableFormat};
use crate::error::{Error, Result};

/// Load a TOML configuration file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Config(format!("Config file not found: {}", path.display()))
        } else {
            Error::Io(e)
        }
    })?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Contents of a `config/regions/<slug>.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionFile {
    pub region: RegionConfig,
}

/// Region of interest definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Short identifier used in export file names.
    pub region_slug: String,

    /// Place name resolved through OSM geocoding.
    pub place_name: String,

    /// Polygon used when geocoding fails, as `[lon, lat]` positions.
    pub fallback_polygon: Vec<[f64; 2]>,
}

/// Earth Engine project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeeConfig {
    pub project_id: String,
}

/// OAuth credential locations, relative to the project root unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth client secrets file (installed application).
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Cached authorized-user token file.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
        }
    }
}

/// Export settings for feature collections (tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExportConfig {
    /// Drive folder receiving the export. Drive root when unset.
    #[serde(default)]
    pub drive_folder: Option<String>,

    /// Output file format.
    #[serde(default)]
    pub file_format: TableFormat,

    /// Pattern with `{key}` placeholders filled from `metadata` and `region_slug`.
    pub filename_pattern: String,

    #[serde(default)]
    pub metadata: BTreeMap<String, toml::Value>,

    /// Seconds between status polls when waiting for the task.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Export settings for rasters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageExportConfig {
    #[serde(default)]
    pub drive_folder: Option<String>,

    pub filename_pattern: String,

    #[serde(default)]
    pub metadata: BTreeMap<String, toml::Value>,

    /// Output resolution in meters per pixel.
    pub scale_meters: f64,

    #[serde(default = "default_crs")]
    pub crs: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Building height export configuration (`export_buildings.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingsConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub gee: GeeConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    pub dataset: BuildingsDataset,

    pub export: TableExportConfig,
}

/// Temporal building height dataset parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingsDataset {
    pub collection_id: String,
    pub year: i32,
    pub height_band: String,
    pub confidence_band: String,
    pub confidence_threshold: f64,
    pub scale_meters: f64,

    #[serde(default = "default_tile_scale")]
    pub tile_scale: u32,
}

/// NDVI export configuration (`export_ndvi.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdviConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub gee: GeeConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Inline region, used when no `--region` is given.
    #[serde(default)]
    pub region: Option<RegionConfig>,

    pub dataset: NdviDataset,

    pub export: ImageExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdviDataset {
    #[serde(default = "default_s2_collection")]
    pub collection_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cloud_mask: NdviCloudMask,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdviCloudMask {
    /// Maximum `CLOUDY_PIXEL_PERCENTAGE` of accepted scenes.
    pub threshold: f64,
}

/// LST export configuration (`export_lst.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub gee: GeeConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub region: Option<RegionConfig>,

    pub dataset: LstDataset,

    pub export: ImageExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstDataset {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub reducer: Reducer,

    #[serde(default)]
    pub cloud_mask: LstCloudMask,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstCloudMask {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for LstCloudMask {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Drive sync configuration (`sync_drive.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub auth: AuthConfig,

    pub google_drive: DriveSource,

    pub local: LocalTarget,

    #[serde(default)]
    pub sync: SyncOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveSource {
    pub folder_name: String,

    /// File name suffixes to sync, e.g. `.tif`, `.geojson`.
    pub file_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTarget {
    pub target_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Re-download files that already exist locally.
    #[serde(default)]
    pub overwrite: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            log_level: default_log_level(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("secrets/credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("secrets/token.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_tile_scale() -> u32 {
    4
}

fn default_s2_collection() -> String {
    "COPERNICUS/S2_SR_HARMONIZED".to_string()
}

fn default_true() -> bool {
    true
}
