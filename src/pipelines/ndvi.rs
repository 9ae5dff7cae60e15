//! NDVI raster export.

use crate::config::{render_export_name, validate_ndvi_config, NdviConfig};
use crate::ee::ImageExport;
use crate::error::Result;
use crate::layers::get_roi;
use crate::layers::ndvi::load_ndvi;
use crate::output::{print_config_summary, print_info};
use crate::pipelines::{finish_export, ExportOptions, ExportOutcome, PipelineContext};

/// Sentinel-2 NDVI composite for a region, exported as GeoTIFF.
pub async fn export_ndvi(
    ctx: &PipelineContext,
    region_slug: Option<&str>,
    options: &ExportOptions,
) -> Result<ExportOutcome> {
    let (config_path, config): (_, NdviConfig) =
        ctx.load_config(options.config.as_deref(), ctx.paths.gee_config("export_ndvi"))?;
    ctx.log.apply_config_level(&config.log_level)?;

    let region = ctx.resolve_region(region_slug, config.region.as_ref())?;
    validate_ndvi_config(&config, &region)?;

    let filename = render_export_name(
        &config.export.filename_pattern,
        &config.export.metadata,
        &region.region_slug,
    )?;

    print_config_summary(&[
        ("Pipeline", "NDVI".to_string()),
        ("Config", config_path.display().to_string()),
        ("Region", region.place_name.clone()),
        ("Project", config.gee.project_id.clone()),
        (
            "Period",
            format!("{} .. {}", config.dataset.start_date, config.dataset.end_date),
        ),
        ("Output", filename.clone()),
    ]);

    let token = ctx.token_source(&config.auth).await?;
    let api = ctx.earth_engine(&config.gee.project_id, token);

    let roi = get_roi(&region, &ctx.nominatim()).await;
    print_info(&format!("ROI from {}", roi.source));

    tracing::info!("Building NDVI composite");
    let ndvi = load_ndvi(&api, &config.dataset, &roi).await?;

    tracing::info!("Exporting {} to Google Drive", filename);
    let operation = api
        .export_image(ImageExport {
            image: ndvi,
            region: roi.geometry(),
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
