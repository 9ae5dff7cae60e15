//! Configuration validation logic.

use chrono::NaiveDate;
use regex::Regex;

use crate::config::loader::{
    BuildingsConfig, LstConfig, NdviConfig, RegionConfig, SyncConfig,
};
use crate::config::pattern::render_export_name;
use crate::error::{Error, Result};

/// Maximum length Earth Engine accepts for a task description.
const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Minimum number of distinct positions in a fallback polygon.
const MIN_POLYGON_POSITIONS: usize = 3;

/// Validate the building height export configuration.
pub fn validate_buildings_config(config: &BuildingsConfig, region: &RegionConfig) -> Result<()> {
    validate_project_id(&config.gee.project_id)?;
    validate_region(region)?;

    let dataset = &config.dataset;
    if dataset.collection_id.trim().is_empty() {
        return Err(Error::MissingConfig("dataset.collection_id".to_string()));
    }
    if !(1970..=2100).contains(&dataset.year) {
        return Err(Error::ConfigValidation {
            field: "dataset.year".to_string(),
            message: format!("Year {} is out of range", dataset.year),
        });
    }
    validate_range(
        "dataset.confidence_threshold",
        dataset.confidence_threshold,
        0.0,
        1.0,
    )?;
    validate_positive("dataset.scale_meters", dataset.scale_meters)?;
    if dataset.tile_scale == 0 || dataset.tile_scale > 16 {
        return Err(Error::ConfigValidation {
            field: "dataset.tile_scale".to_string(),
            message: format!("Tile scale must be between 1 and 16 (got {})", dataset.tile_scale),
        });
    }

    let name = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;
    validate_export_description(&name)
}

/// Validate the NDVI export configuration for the resolved region.
pub fn validate_ndvi_config(config: &NdviConfig, region: &RegionConfig) -> Result<()> {
    validate_project_id(&config.gee.project_id)?;
    validate_region(region)?;
    validate_date_range(config.dataset.start_date, config.dataset.end_date)?;
    validate_range(
        "dataset.cloud_mask.threshold",
        config.dataset.cloud_mask.threshold,
        0.0,
        100.0,
    )?;
    validate_positive("export.scale_meters", config.export.scale_meters)?;

    let name = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;
    validate_export_description(&name)
}

/// Validate the LST export configuration for the resolved region.
pub fn validate_lst_config(config: &LstConfig, region: &RegionConfig) -> Result<()> {
    validate_project_id(&config.gee.project_id)?;
    validate_region(region)?;
    validate_date_range(config.dataset.start_date, config.dataset.end_date)?;
    validate_positive("export.scale_meters", config.export.scale_meters)?;

    let name = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;
    validate_export_description(&name)
}

/// Validate the Drive sync configuration.
pub fn validate_sync_config(config: &SyncConfig) -> Result<()> {
    if config.google_drive.folder_name.trim().is_empty() {
        return Err(Error::MissingConfig("google_drive.folder_name".to_string()));
    }

    validate_extensions(&config.google_drive.file_extensions)?;

    if config.local.target_dir.as_os_str().is_empty() {
        return Err(Error::MissingConfig("local.target_dir".to_string()));
    }

    Ok(())
}

/// Validate a Google Cloud project id.
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.is_empty() {
        return Err(Error::MissingConfig("gee.project_id".to_string()));
    }

    let lower = project_id.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your-project") || lower.contains("your_project")
    {
        return Err(Error::ConfigValidation {
            field: "gee.project_id".to_string(),
            message: "Project id appears to be a placeholder. Please provide your Cloud project."
                .to_string(),
        });
    }

    // 6-30 chars, lowercase letters, digits and hyphens, starting with a letter
    let pattern = Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$")
        .map_err(|e| Error::Config(format!("Invalid project id pattern: {}", e)))?;
    if !pattern.is_match(project_id) {
        return Err(Error::ConfigValidation {
            field: "gee.project_id".to_string(),
            message: format!("'{}' is not a valid Cloud project id", project_id),
        });
    }

    Ok(())
}

/// Validate a region definition.
pub fn validate_region(region: &RegionConfig) -> Result<()> {
    if region.region_slug.trim().is_empty() {
        return Err(Error::MissingConfig("region.region_slug".to_string()));
    }

    if region.place_name.trim().is_empty() {
        return Err(Error::MissingConfig("region.place_name".to_string()));
    }

    validate_polygon(&region.fallback_polygon)
}

/// Validate a `[lon, lat]` polygon ring.
pub fn validate_polygon(ring: &[[f64; 2]]) -> Result<()> {
    let mut distinct = ring.to_vec();
    if distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }

    if distinct.len() < MIN_POLYGON_POSITIONS {
        return Err(Error::ConfigValidation {
            field: "region.fallback_polygon".to_string(),
            message: format!(
                "Polygon needs at least {} positions (got {})",
                MIN_POLYGON_POSITIONS,
                distinct.len()
            ),
        });
    }

    for [lon, lat] in ring {
        if !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat) {
            return Err(Error::ConfigValidation {
                field: "region.fallback_polygon".to_string(),
                message: format!("Position [{}, {}] is not a valid [lon, lat] pair", lon, lat),
            });
        }
    }

    Ok(())
}

/// Validate that `start` comes strictly before `end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start >= end {
        return Err(Error::ConfigValidation {
            field: "dataset.start_date".to_string(),
            message: format!("Start date {} must be before end date {}", start, end),
        });
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
pub fn validate_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("Must be a positive number (got {})", value),
        });
    }
    Ok(())
}

/// Validate that a value lies within `min..=max`.
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("Must be between {} and {} (got {})", min, max, value),
        });
    }
    Ok(())
}

/// Validate an export description against Earth Engine's naming rules.
pub fn validate_export_description(description: &str) -> Result<()> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::ConfigValidation {
            field: "export.filename_pattern".to_string(),
            message: format!(
                "Export name must be at most {} characters (got {})",
                MAX_DESCRIPTION_LENGTH,
                description.len()
            ),
        });
    }

    let pattern = Regex::new(r"^[A-Za-z0-9 .,:;_-]+$")
        .map_err(|e| Error::Config(format!("Invalid description pattern: {}", e)))?;
    if !pattern.is_match(description) {
        return Err(Error::ConfigValidation {
            field: "export.filename_pattern".to_string(),
            message: format!(
                "Export name '{}' may only contain letters, digits, spaces and . , : ; _ -",
                description
            ),
        });
    }

    Ok(())
}

/// Validate the list of file extensions to sync.
pub fn validate_extensions(extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(Error::MissingConfig(
            "google_drive.file_extensions (at least one extension required)".to_string(),
        ));
    }

    if let Some(empty) = extensions.iter().find(|e| e.trim().is_empty()) {
        return Err(Error::ConfigValidation {
            field: "google_drive.file_extensions".to_string(),
            message: format!("Extension '{}' is empty", empty),
        });
    }

    Ok(())
}
