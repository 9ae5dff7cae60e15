//! Export pipelines end to end, with every remote service on one mock server.

use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cool_routes::output::LogControl;
use cool_routes::pipelines::buildings::BuildingsOptions;
use cool_routes::pipelines::{
    export_buildings, export_lst, export_ndvi, list_tasks, ExportOptions, ExportOutcome,
    PipelineContext,
};

const PROJECT: &str = "cool-routes-dev";

const AACHEN: &str = r#"
[region]
region_slug = "aachen"
place_name = "Aachen, Germany"
fallback_polygon = [[6.05, 50.75], [6.15, 50.75], [6.15, 50.80], [6.05, 50.75]]
"#;

const INLINE_REGION: &str = r#"
[region]
region_slug = "valencia"
place_name = "Valencia, Spain"
fallback_polygon = [[-0.43, 39.43], [-0.33, 39.43], [-0.33, 39.51], [-0.43, 39.43]]
"#;

const BUILDINGS: &str = r#"
[gee]
project_id = "cool-routes-dev"

[dataset]
collection_id = "GOOGLE/Research/open-buildings-temporal/v1"
year = 2023
height_band = "building_height"
confidence_band = "building_presence"
confidence_threshold = 0.5
scale_meters = 4.0

[export]
drive_folder = "cool_routes"
filename_pattern = "building_heights_{region_slug}_{year}"
metadata = { year = 2023 }
"#;

const LST: &str = r#"
[gee]
project_id = "cool-routes-dev"

[dataset]
start_date = "2023-06-01"
end_date = "2023-09-01"

[dataset.cloud_mask]
enabled = CLOUD_MASK

[export]
drive_folder = "cool_routes"
filename_pattern = "lst_{region_slug}_{season}"
metadata = { season = "summer" }
scale_meters = 30.0
"#;

const NDVI: &str = r#"
[gee]
project_id = "cool-routes-dev"

[dataset]
start_date = "2023-06-01"
end_date = "2023-08-31"

[dataset.cloud_mask]
threshold = 20.0

[export]
drive_folder = "cool_routes"
filename_pattern = "ndvi_{region_slug}"
scale_meters = 10.0
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn context(root: &Path, server: &MockServer) -> PipelineContext {
    let mut ctx = PipelineContext::new(
        root,
        Some("test-token".to_string()),
        LogControl::disabled(),
    )
    .unwrap();
    ctx.endpoints.earth_engine = server.uri();
    ctx.endpoints.nominatim = server.uri();
    ctx.endpoints.overpass = server.uri();
    ctx
}

fn ee_path(suffix: &str) -> String {
    format!("/v1/projects/{}/{}", PROJECT, suffix)
}

async fn mount_geocoding_outage(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}

async fn mount_collection_size(server: &MockServer, size: u64) {
    Mock::given(method("POST"))
        .and(path(ee_path("value:compute")))
        .and(body_string_contains("Collection.size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": size })))
        .mount(server)
        .await;
}

async fn mount_image_export(server: &MockServer, operation: &str) {
    Mock::given(method("POST"))
        .and(path(ee_path("image:export")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("projects/{}/operations/{}", PROJECT, operation),
            "metadata": {"state": "PENDING"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Body of the single request whose path ends with `suffix`.
async fn request_body(server: &MockServer, suffix: &str) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path().ends_with(suffix))
        .unwrap();
    serde_json::from_slice(&request.body).unwrap()
}

async fn mount_buildings_services(server: &MockServer) {
    mount_geocoding_outage(server).await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(body_string_contains("6.05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [{
                "type": "way",
                "id": 42,
                "geometry": [
                    {"lat": 50.76, "lon": 6.06},
                    {"lat": 50.76, "lon": 6.07},
                    {"lat": 50.77, "lon": 6.07},
                    {"lat": 50.76, "lon": 6.06}
                ]
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    mount_collection_size(server, 3).await;
    Mock::given(method("POST"))
        .and(path(ee_path("value:compute")))
        .and(body_string_contains("Image.bandNames"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": ["building_height", "building_presence", "building_fractional_count"]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_buildings_local_output() {
    let server = MockServer::start().await;
    mount_buildings_services(&server).await;

    let footprint = json!({
        "type": "Polygon",
        "coordinates": [[[6.06, 50.76], [6.07, 50.76], [6.07, 50.77], [6.06, 50.76]]]
    });
    Mock::given(method("POST"))
        .and(path(ee_path("value:compute")))
        .and(body_string_contains("Image.reduceRegions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "geometry": footprint,
                     "properties": {"id": "way/42", "mean": 12.5}},
                    {"type": "Feature", "geometry": footprint,
                     "properties": {"id": "way/43", "mean": null}}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    write(root.path(), "config/regions/aachen.toml", AACHEN);
    write(root.path(), "config/gee/export_buildings.toml", BUILDINGS);

    let options = BuildingsOptions {
        local_output: true,
        ..Default::default()
    };
    let outcome = export_buildings(&context(root.path(), &server), "aachen", &options)
        .await
        .unwrap();

    let expected = root
        .path()
        .join("data/outputs/building_heights_aachen_2023.geojson");
    match outcome {
        ExportOutcome::Written(path) => assert_eq!(path, expected),
        other => panic!("unexpected outcome {:?}", other),
    }

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&expected).unwrap()).unwrap();
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["id"], "way/42");
    assert_eq!(features[0]["properties"]["height_m"], 12.5);
    assert!(features[0]["properties"].get("mean").is_none());
}

#[tokio::test]
async fn test_buildings_table_export() {
    let server = MockServer::start().await;
    mount_buildings_services(&server).await;

    Mock::given(method("POST"))
        .and(path(ee_path("table:export")))
        .and(body_partial_json(json!({
            "description": "building_heights_aachen_2023",
            "fileExportOptions": {
                "fileFormat": "GEO_JSON",
                "driveDestination": {
                    "folder": "cool_routes",
                    "filenamePrefix": "building_heights_aachen_2023"
                }
            }
        })))
        .and(body_string_contains("Image.reduceRegions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/cool-routes-dev/operations/TBL1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    write(root.path(), "config/regions/aachen.toml", AACHEN);
    write(root.path(), "config/gee/export_buildings.toml", BUILDINGS);

    let outcome = export_buildings(
        &context(root.path(), &server),
        "aachen",
        &BuildingsOptions::default(),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ExportOutcome::Submitted(op) if op.name.ends_with("TBL1")));
}

async fn run_lst(cloud_mask: bool, region: Option<&str>) -> Value {
    let server = MockServer::start().await;
    mount_geocoding_outage(&server).await;
    mount_collection_size(&server, 5).await;
    mount_image_export(&server, "LST1").await;

    let root = TempDir::new().unwrap();
    write(root.path(), "config/regions/aachen.toml", AACHEN);
    write(
        root.path(),
        "config/gee/export_lst.toml",
        &format!(
            "{}{}",
            LST.replace("CLOUD_MASK", &cloud_mask.to_string()),
            INLINE_REGION
        ),
    );

    let outcome = export_lst(&context(root.path(), &server), region, &ExportOptions::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ExportOutcome::Submitted(_)));

    request_body(&server, "image:export").await
}

#[tokio::test]
async fn test_lst_export_with_cloud_mask() {
    let body = run_lst(true, None).await;

    assert_eq!(body["description"], "lst_valencia_summer");
    assert_eq!(body["fileExportOptions"]["fileFormat"], "GEO_TIFF");
    assert_eq!(
        body["fileExportOptions"]["driveDestination"]["filenamePrefix"],
        "lst_valencia_summer"
    );
    assert_eq!(body["grid"]["crsCode"], "EPSG:4326");

    let expression = body["expression"].to_string();
    assert!(expression.contains("QA_PIXEL"));
    assert!(expression.contains("Image.bitwiseAnd"));
    assert!(expression.contains("ImageCollection.median"));
    assert!(expression.contains("-0.43"));
}

#[tokio::test]
async fn test_lst_export_without_cloud_mask() {
    let body = run_lst(false, Some("aachen")).await;

    assert_eq!(body["description"], "lst_aachen_summer");

    let expression = body["expression"].to_string();
    assert!(!expression.contains("QA_PIXEL"));
    assert!(!expression.contains("Image.bitwiseAnd"));
    assert!(expression.contains("ST_B10"));
    // --region wins over the inline section.
    assert!(expression.contains("6.05"));
    assert!(!expression.contains("-0.43"));
}

#[tokio::test]
async fn test_ndvi_export_waits_for_completion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "geojson": {
                "type": "Polygon",
                "coordinates": [[[7.77, 50.7], [7.88, 50.7], [7.88, 50.8], [7.77, 50.7]]]
            }
        }])))
        .mount(&server)
        .await;
    mount_collection_size(&server, 4).await;
    mount_image_export(&server, "NDVI1").await;
    Mock::given(method("GET"))
        .and(path(ee_path("operations/NDVI1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/cool-routes-dev/operations/NDVI1",
            "done": true,
            "metadata": {"state": "SUCCEEDED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    write(root.path(), "config/regions/aachen.toml", AACHEN);
    write(root.path(), "config/gee/export_ndvi.toml", NDVI);

    let options = ExportOptions {
        config: None,
        wait: true,
    };
    let outcome = export_ndvi(&context(root.path(), &server), Some("aachen"), &options)
        .await
        .unwrap();
    assert!(matches!(outcome, ExportOutcome::Completed(op) if op.name.ends_with("NDVI1")));

    let body = request_body(&server, "image:export").await;
    assert_eq!(body["description"], "ndvi_aachen");
    let expression = body["expression"].to_string();
    assert!(expression.contains("Image.normalizedDifference"));
    // Geocoded boundary, not the fallback polygon.
    assert!(expression.contains("7.77"));
    assert!(!expression.contains("6.05"));
}

#[tokio::test]
async fn test_ndvi_requires_a_region() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    write(root.path(), "config/gee/export_ndvi.toml", NDVI);

    let err = export_ndvi(&context(root.path(), &server), None, &ExportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, cool_routes::Error::MissingConfig(_)));
}

#[tokio::test]
async fn test_list_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ee_path("operations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "operations": [
                {"name": "op1", "done": true, "metadata": {"state": "SUCCEEDED"}},
                {"name": "op2", "metadata": {"state": "RUNNING"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let operations = list_tasks(&context(root.path(), &server), PROJECT, 10)
        .await
        .unwrap();
    assert_eq!(operations.len(), 2);
}
