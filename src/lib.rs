//! cool-routes - Earth Engine layer exports and incremental Drive sync
//!
//! This library builds environmental layers for a region of interest on
//! Google Earth Engine, exports them to Google Drive, and syncs the exported
//! files into a local directory.
//!
//! # Features
//!
//! - Building heights per OpenStreetMap footprint
//! - Sentinel-2 NDVI composites
//! - Landsat 8 land surface temperature composites
//! - Region of interest from OSM geocoding with a fallback polygon
//! - Incremental Drive sync with checksum verification
//!
//! # Example
//!
//! ```no_run
//! use cool_routes::output::LogControl;
//! use cool_routes::pipelines::{export_ndvi, ExportOptions, PipelineContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = PipelineContext::new(".", None, LogControl::disabled())?;
//!     let outcome = export_ndvi(&ctx, Some("aachen"), &ExportOptions::default()).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod drive;
pub mod ee;
pub mod error;
pub mod fs;
pub mod google;
pub mod layers;
pub mod osm;
pub mod output;
pub mod pipelines;
pub mod sync;

// Re-exports for convenience
pub use drive::DriveApi;
pub use ee::EarthEngineApi;
pub use error::{Error, Result};
pub use pipelines::{
    export_buildings, export_lst, export_ndvi, list_tasks, sync_drive, PipelineContext,
};
pub use sync::{plan_sync, run_sync, SyncPlan, SyncState};
