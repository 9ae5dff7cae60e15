//! Drive listing, downloads and sync runs against a mock Drive API.

use std::path::Path;
use std::sync::Arc;

use md5::{Digest, Md5};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cool_routes::config::{AuthConfig, DriveSource, LocalTarget, SyncConfig, SyncOptions};
use cool_routes::drive::client::folder_query;
use cool_routes::drive::{DriveApi, DriveFile};
use cool_routes::google::StaticToken;
use cool_routes::output::LogControl;
use cool_routes::pipelines::sync::SyncDriveOptions;
use cool_routes::pipelines::{sync_drive, PipelineContext};
use cool_routes::sync::run_sync;
use cool_routes::Error;

const FOLDER: &str = "cool_routes";
const FOLDER_ID: &str = "F1";

fn drive(server: &MockServer) -> DriveApi {
    DriveApi::with_base_url(
        reqwest::Client::new(),
        server.uri(),
        Arc::new(StaticToken::new("test-token")),
    )
}

fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", Md5::digest(content))
}

fn remote_file(id: &str, name: &str, content: &[u8]) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "size": content.len().to_string(),
        "md5Checksum": md5_hex(content),
        "mimeType": "image/tiff"
    })
}

fn sync_config(target: &Path) -> SyncConfig {
    SyncConfig {
        auth: AuthConfig::default(),
        google_drive: DriveSource {
            folder_name: FOLDER.to_string(),
            file_extensions: vec![".tif".to_string(), ".geojson".to_string()],
        },
        local: LocalTarget {
            target_dir: target.to_path_buf(),
        },
        sync: SyncOptions::default(),
    }
}

async fn mount_folder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", folder_query(FOLDER)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{
                "id": FOLDER_ID,
                "name": FOLDER,
                "mimeType": "application/vnd.google-apps.folder"
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, files: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", format!("'{}' in parents and trashed = false", FOLDER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

async fn mount_content(server: &MockServer, id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/v3/files/{}", id)))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_find_folder_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("q", folder_query(FOLDER)))
        .and(query_param("pageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": FOLDER_ID, "name": FOLDER}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(drive(&server).find_folder_id(FOLDER).await.unwrap(), FOLDER_ID);
}

#[tokio::test]
async fn test_missing_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .mount(&server)
        .await;

    let err = drive(&server).find_folder_id("nope").await.unwrap_err();
    assert!(matches!(err, Error::FolderNotFound(name) if name == "nope"));
}

#[tokio::test]
async fn test_list_files_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [remote_file("c", "c.tif", b"c")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [remote_file("a", "a.tif", b"a"), remote_file("b", "b.tif", b"b")],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let files = drive(&server).list_files(FOLDER_ID).await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.tif", "b.tif", "c.tif"]);
    assert_eq!(files[0].size, Some(1));
}

#[tokio::test]
async fn test_download_file_writes_content() {
    let server = MockServer::start().await;
    let content = b"GeoTIFF bytes".to_vec();
    mount_content(&server, "a1", &content).await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("ndvi.tif");
    let file: DriveFile = serde_json::from_value(remote_file("a1", "ndvi.tif", &content)).unwrap();

    let downloaded = drive(&server).download_file(&file, &dest).await.unwrap();

    assert_eq!(downloaded.bytes, content.len() as u64);
    assert_eq!(downloaded.md5, md5_hex(&content));
    assert_eq!(std::fs::read(&dest).unwrap(), content);
    assert!(!dir.path().join("ndvi.tif.part").exists());
}

#[tokio::test]
async fn test_download_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/a1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("ndvi.tif");
    let file: DriveFile = serde_json::from_value(remote_file("a1", "ndvi.tif", b"x")).unwrap();

    let err = drive(&server).download_file(&file, &dest).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_run_sync_downloads_only_new_files() {
    let server = MockServer::start().await;
    let ndvi = b"ndvi raster".to_vec();
    let lst = b"lst raster".to_vec();

    mount_folder(&server).await;
    mount_listing(
        &server,
        vec![
            remote_file("a1", "ndvi.tif", &ndvi),
            remote_file("a2", "lst.tif", &lst),
            remote_file("a3", "notes.txt", b"notes"),
            json!({"id": "a4", "name": "summary.tif", "mimeType": "application/vnd.google-apps.document"}),
        ],
    )
    .await;
    mount_content(&server, "a1", &ndvi).await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lst.tif"), b"already here").unwrap();

    let state = run_sync(&drive(&server), &sync_config(dir.path()), false)
        .await
        .unwrap();

    assert_eq!(state.downloaded, 1);
    assert_eq!(state.bytes, ndvi.len() as u64);
    assert_eq!(state.skipped, 1);
    assert_eq!(state.ignored, 2);
    assert_eq!(state.failed, 0);
    assert_eq!(std::fs::read(dir.path().join("ndvi.tif")).unwrap(), ndvi);
    assert_eq!(std::fs::read(dir.path().join("lst.tif")).unwrap(), b"already here");
}

#[tokio::test]
async fn test_run_sync_checksum_mismatch_counts_as_failure() {
    let server = MockServer::start().await;

    mount_folder(&server).await;
    mount_listing(
        &server,
        vec![
            remote_file("a1", "good.tif", b"good"),
            remote_file("a2", "bad.tif", b"expected content"),
        ],
    )
    .await;
    mount_content(&server, "a1", b"good").await;
    mount_content(&server, "a2", b"corrupted").await;

    let dir = TempDir::new().unwrap();
    let state = run_sync(&drive(&server), &sync_config(dir.path()), false)
        .await
        .unwrap();

    assert_eq!(state.downloaded, 1);
    assert_eq!(state.failed, 1);
    assert!(!state.is_complete());
    assert!(dir.path().join("good.tif").exists());
    assert!(!dir.path().join("bad.tif").exists());
}

#[tokio::test]
async fn test_overwrite_with_bad_checksum_keeps_local_copy() {
    let server = MockServer::start().await;

    mount_folder(&server).await;
    mount_listing(&server, vec![remote_file("a1", "keep.tif", b"new good copy")]).await;
    mount_content(&server, "a1", b"truncated").await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("keep.tif"), b"previous good copy").unwrap();

    let mut config = sync_config(dir.path());
    config.sync.overwrite = true;
    let state = run_sync(&drive(&server), &config, false).await.unwrap();

    assert_eq!(state.failed, 1);
    assert_eq!(
        std::fs::read(dir.path().join("keep.tif")).unwrap(),
        b"previous good copy"
    );
    assert!(!dir.path().join("keep.tif.part").exists());
}

#[tokio::test]
async fn test_download_file_rejects_checksum_mismatch() {
    let server = MockServer::start().await;
    mount_content(&server, "a1", b"corrupted").await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("ndvi.tif");
    let file: DriveFile =
        serde_json::from_value(remote_file("a1", "ndvi.tif", b"expected")).unwrap();

    let err = drive(&server).download_file(&file, &dest).await.unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));
    assert!(!dest.exists());
    assert!(!dir.path().join("ndvi.tif.part").exists());
}

#[tokio::test]
async fn test_run_sync_dry_run_downloads_nothing() {
    let server = MockServer::start().await;

    mount_folder(&server).await;
    mount_listing(&server, vec![remote_file("a1", "ndvi.tif", b"ndvi")]).await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("drive");
    let state = run_sync(&drive(&server), &sync_config(&target), true)
        .await
        .unwrap();

    assert_eq!(state.planned, 1);
    assert_eq!(state.downloaded, 0);
    assert!(!target.exists());
}

#[tokio::test]
async fn test_sync_drive_reports_incomplete_run() {
    let server = MockServer::start().await;

    mount_folder(&server).await;
    mount_listing(&server, vec![remote_file("a1", "bad.tif", b"expected")]).await;
    mount_content(&server, "a1", b"other").await;

    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("config")).unwrap();
    std::fs::write(
        root.path().join("config/sync_drive.toml"),
        r#"
[google_drive]
folder_name = "cool_routes"
file_extensions = [".tif"]

[local]
target_dir = "data/drive"
"#,
    )
    .unwrap();

    let mut ctx = PipelineContext::new(
        root.path(),
        Some("test-token".to_string()),
        LogControl::disabled(),
    )
    .unwrap();
    ctx.endpoints.drive = server.uri();

    let err = sync_drive(&ctx, &SyncDriveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SyncIncomplete(1)));
    assert!(root.path().join("data/drive").is_dir());
}
