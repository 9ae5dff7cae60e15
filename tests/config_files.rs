//! The configuration files shipped in config/ parse and validate.

use std::path::PathBuf;

use cool_routes::config::{
    load_toml, render_export_name, validate_buildings_config, validate_lst_config,
    validate_ndvi_config, validate_sync_config, BuildingsConfig, LstConfig, NdviConfig,
    RegionFile, SyncConfig, TableFormat,
};
use cool_routes::fs::ProjectPaths;

fn paths() -> ProjectPaths {
    ProjectPaths::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

fn region() -> RegionFile {
    let path = paths().region_config("valencia").unwrap();
    load_toml(&path).unwrap()
}

#[test]
fn test_buildings_config() {
    let config: BuildingsConfig = load_toml(&paths().gee_config("export_buildings")).unwrap();
    let region = region().region;

    validate_buildings_config(&config, &region).unwrap();
    assert_eq!(config.export.file_format, TableFormat::GeoJson);
    assert_eq!(
        render_export_name(
            &config.export.filename_pattern,
            &config.export.metadata,
            &region.region_slug
        )
        .unwrap(),
        "building_heights_valencia_2023"
    );
}

#[test]
fn test_raster_configs_carry_inline_region() {
    let ndvi: NdviConfig = load_toml(&paths().gee_config("export_ndvi")).unwrap();
    let ndvi_region = ndvi.region.clone().unwrap();
    validate_ndvi_config(&ndvi, &ndvi_region).unwrap();

    let lst: LstConfig = load_toml(&paths().gee_config("export_lst")).unwrap();
    let lst_region = lst.region.clone().unwrap();
    validate_lst_config(&lst, &lst_region).unwrap();

    assert_eq!(ndvi_region, region().region);
}

#[test]
fn test_sync_config() {
    let config: SyncConfig = load_toml(&paths().sync_config()).unwrap();
    validate_sync_config(&config).unwrap();
    assert_eq!(config.google_drive.folder_name, "cool_routes");
}
