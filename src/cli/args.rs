//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::pipelines::ExportOptions;

/// Earth Engine export and Drive sync pipeline.
#[derive(Parser, Debug)]
#[command(
    name = "cool-routes",
    version,
    about = "Export environmental layers from Earth Engine and sync them locally",
    long_about = "Exports building heights, NDVI and land surface temperature for a region \
                  of interest from Google Earth Engine to Google Drive, and syncs the \
                  exported files into a local directory."
)]
pub struct Args {
    /// Project root containing config/, secrets/ and data/.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// OAuth access token to use instead of the cached credentials.
    #[arg(long, global = true, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export mean building height per OSM footprint.
    ExportBuildings {
        /// Region slug, matching config/regions/<slug>.toml.
        #[arg(short, long)]
        region: String,

        #[command(flatten)]
        export: ExportArgs,

        /// Compute the table and write GeoJSON to data/outputs instead of Drive.
        #[arg(long)]
        local_output: bool,
    },

    /// Export a Sentinel-2 NDVI composite.
    ExportNdvi {
        /// Region slug; defaults to the [region] section of the config.
        #[arg(short, long)]
        region: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Export a Landsat 8 land surface temperature composite.
    ExportLst {
        /// Region slug; defaults to the [region] section of the config.
        #[arg(short, long)]
        region: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Download new files from the export folder in Drive.
    Sync {
        /// Path to the sync configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Re-download files that already exist locally.
        #[arg(long)]
        overwrite: bool,

        /// Show what would be downloaded without downloading.
        #[arg(long)]
        dry_run: bool,
    },

    /// List recent Earth Engine tasks.
    Tasks {
        /// Cloud project id.
        #[arg(short, long)]
        project: String,

        /// Maximum number of tasks to show.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

/// Flags shared by the export subcommands.
#[derive(ClapArgs, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the export configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Wait for the export task to finish.
    #[arg(long)]
    pub wait: bool,
}

impl From<ExportArgs> for ExportOptions {
    fn from(args: ExportArgs) -> Self {
        ExportOptions {
            config: args.config,
            wait: args.wait,
        }
    }
}
