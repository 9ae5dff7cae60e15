//! Configuration module for the cool-routes pipelines.
//!
//! This module handles:
//! - Loading per-pipeline and per-region TOML files
//! - Export filename patterns
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod pattern;
pub mod validation;

pub use loader::{
    load_toml, AuthConfig, BuildingsConfig, BuildingsDataset, DriveSource, GeeConfig,
    ImageExportConfig, LocalTarget, LstCloudMask, LstConfig, LstDataset, NdviCloudMask,
    NdviConfig, NdviDataset, RegionConfig, RegionFile, SyncConfig, SyncOptions,
    TableExportConfig,
};
pub use modes::{Reducer, TableFormat};
pub use pattern::{render_export_name, render_pattern};
pub use validation::{
    validate_buildings_config, validate_lst_config, validate_ndvi_config, validate_sync_config,
};
