//! Building height export.

use crate::config::{render_export_name, validate_buildings_config, BuildingsConfig};
use crate::ee::{Expression, TableExport};
use crate::error::Result;
use crate::fs::ensure_dir;
use crate::layers::buildings::{
    footprints_to_feature_collection, heights_from_features, load_temporal_building_height,
    mean_height_per_building,
};
use crate::layers::get_roi;
use crate::output::{print_config_summary, print_info, print_success};
use crate::pipelines::{finish_export, ExportOptions, ExportOutcome, PipelineContext};

/// CRS used for the zonal statistics.
const ZONAL_CRS: &str = "EPSG:4326";

#[derive(Debug, Clone, Default)]
pub struct BuildingsOptions {
    pub export: ExportOptions,
    /// Compute the table and write GeoJSON under `data/outputs` instead of exporting.
    pub local_output: bool,
}

/// Mean building height per OSM footprint for a region.
pub async fn export_buildings(
    ctx: &PipelineContext,
    region_slug: &str,
    options: &BuildingsOptions,
) -> Result<ExportOutcome> {
    let region = ctx.load_region(region_slug)?;
    let (config_path, config): (_, BuildingsConfig) = ctx.load_config(
        options.export.config.as_deref(),
        ctx.paths.gee_config("export_buildings"),
    )?;
    ctx.log.apply_config_level(&config.log_level)?;
    validate_buildings_config(&config, &region)?;

    let filename = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;

    print_config_summary(&[
        ("Pipeline", "building heights".to_string()),
        ("Config", config_path.display().to_string()),
        ("Region", region.place_name.clone()),
        ("Project", config.gee.project_id.clone()),
        ("Dataset", format!("{} ({})", config.dataset.collection_id, config.dataset.year)),
        ("Output", filename.clone()),
    ]);

    let token = ctx.token_source(&config.auth).await?;
    let api = ctx.earth_engine(&config.gee.project_id, token);

    tracing::info!("Resolving region of interest");
    let roi = get_roi(&region, &ctx.nominatim()).await;
    print_info(&format!("ROI from {}", roi.source));

    tracing::info!("Loading building height dataset");
    let height = load_temporal_building_height(&api, &config.dataset, config.dataset.year, &roi).await?;

    tracing::info!("Downloading building footprints from OSM");
    let footprints = ctx.overpass().building_footprints(&roi.ring).await?;
    let buildings = footprints_to_feature_collection(&footprints)?;

    tracing::info!("Computing mean building height per footprint");
    let reduced = mean_height_per_building(
        &buildings,
        &height,
        config.dataset.scale_meters,
        ZONAL_CRS,
        config.dataset.tile_scale,
    );

    if options.local_output {
        let value = api.compute_value(Expression::new(&reduced.0)).await?;
        let collection = heights_from_features(value)?;

        let out_dir = ctx.paths.outputs_data_dir();
        ensure_dir(&out_dir)?;
        let path = out_dir.join(format!("{}.geojson", filename));
        std::fs::write(&path, serde_json::to_string_pretty(&collection)?)?;

        print_success(&format!("Wrote {}", path.display()));
        return Ok(ExportOutcome::Written(path));
    }

    tracing::info!("Exporting {} to Google Drive", filename);
    print_info(&format!(
        "Drive file will be {}",
        config.export.file_format.exported_file_name(&filename)
    ));
    let operation = api
        .export_table(TableExport {
            collection: reduced,
            description: filename.clone(),
            folder: config.export.drive_folder.clone(),
            file_prefix: filename,
            format: config.export.file_format,
        })
        .await?;

    finish_export(
        &api,
        operation,
        options.export.wait,
        config.export.poll_interval_seconds,
    )
    .await
}
