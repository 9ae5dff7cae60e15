//! Land surface temperature raster export.

use crate::config::{render_export_name, validate_lst_config, LstConfig};
use crate::ee::ImageExport;
use crate::error::Result;
use crate::layers::get_roi;
use crate::layers::lst::{
    apply_cloud_mask, build_lst_composite, load_landsat8_lst_collection, scale_to_celsius,
    validate_image_collection,
};
use crate::output::{print_config_summary, print_info};
use crate::pipelines::{finish_export, ExportOptions, ExportOutcome, PipelineContext};

/// Landsat 8 LST composite in degrees Celsius, exported as GeoTIFF.
pub async fn export_lst(
    ctx: &PipelineContext,
    region_slug: Option<&str>,
    options: &ExportOptions,
) -> Result<ExportOutcome> {
    let (config_path, config): (_, LstConfig) =
        ctx.load_config(options.config.as_deref(), ctx.paths.gee_config("export_lst"))?;
    ctx.log.apply_config_level(&config.log_level)?;

    let region = ctx.resolve_region(region_slug, config.region.as_ref())?;
    validate_lst_config(&config, &region)?;

    let dataset = &config.dataset;
    let filename = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;

    print_config_summary(&[
        ("Pipeline", "land surface temperature".to_string()),
        ("Config", config_path.display().to_string()),
        ("Region", region.place_name.clone()),
        ("Project", config.gee.project_id.clone()),
        ("Period", format!("{} .. {}", dataset.start_date, dataset.end_date)),
        ("Reducer", dataset.reducer.to_string()),
        ("Output", filename.clone()),
    ]);

    let token = ctx.token_source(&config.auth).await?;
    let api = ctx.earth_engine(&config.gee.project_id, token);

    let roi = get_roi(&region, &ctx.nominatim()).await;
    print_info(&format!("ROI from {}", roi.source));
    let geometry = roi.geometry();

    tracing::info!("Loading Landsat 8 collection");
    let mut collection = load_landsat8_lst_collection(dataset.start_date, dataset.end_date, &geometry);
    if dataset.cloud_mask.enabled {
        collection = collection.map(apply_cloud_mask);
    }
    let collection = collection.map(scale_to_celsius);

    validate_image_collection(
        &api,
        &collection,
        &format!(
            "No Landsat 8 images between {} and {} for {}",
            dataset.start_date, dataset.end_date, region.region_slug
        ),
    )
    .await?;

    let composite = build_lst_composite(&collection, &geometry, dataset.reducer);

    tracing::info!("Exporting {} to Google Drive", filename);
    let operation = api
        .export_image(ImageExport {
            image: composite,
            region: geometry,
            description: filename.clone(),
            folder: config.export.drive_folder.clone(),
            file_prefix: filename,
            scale: config.export.scale_meters,
            crs: config.export.crs.clone(),
        })
        .await?;

    finish_export(
        &api,
        operation,
        options.wait,
        config.export.poll_interval_seconds,
    )
    .await
}
