//! Project directory layout.

use std::path::{Path, PathBuf};

use crate::fs::naming::sanitize_path_component;
use crate::error::{Error, Result};

/// Absolute locations of the project's directories, derived from its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
}

impl ProjectPaths {
    /// Create the layout for a project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn regions_dir(&self) -> PathBuf {
        self.config_dir().join("regions")
    }

    pub fn gee_config_dir(&self) -> PathBuf {
        self.config_dir().join("gee")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn outputs_data_dir(&self) -> PathBuf {
        self.data_dir().join("outputs")
    }

    /// Default config file of a GEE export pipeline, e.g. `export_ndvi`.
    pub fn gee_config(&self, name: &str) -> PathBuf {
        self.gee_config_dir().join(format!("{}.toml", name))
    }

    pub fn sync_config(&self) -> PathBuf {
        self.config_dir().join("sync_drive.toml")
    }

    /// Path of a region file, failing when the slug is unsafe or the file is missing.
    pub fn region_config(&self, slug: &str) -> Result<PathBuf> {
        let clean = sanitize_path_component(slug)?;
        if clean != slug {
            return Err(Error::InvalidFilename(format!(
                "Region slug contains invalid characters: '{}'",
                slug
            )));
        }

        let file_name = format!("{}.toml", slug);
        let path = self.regions_dir().join(&file_name);
        if !path.exists() {
            return Err(Error::RegionNotFound {
                slug: slug.to_string(),
                expected: file_name,
            });
        }

        Ok(path)
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
