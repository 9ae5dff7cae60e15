//! Google Drive v3 HTTP client.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use md5::{Digest, Md5};
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::drive::types::{DriveFile, FileList, FOLDER_MIME_TYPE};
use crate::error::{Error, Result};
use crate::fs::partial_path;
use crate::google::{check_response, Service, TokenSource};
use crate::output::create_download_bar;

/// Drive API base URL.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";

/// Maximum page size accepted by `files.list`.
const PAGE_SIZE: u32 = 1000;

/// Minimum file size to show a progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

const FILE_FIELDS: &str = "nextPageToken, files(id,name,size,md5Checksum,mimeType)";

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: u64,
    /// Hex MD5 of the written content.
    pub md5: String,
}

/// Drive client.
#[derive(Clone)]
pub struct DriveApi {
    http: Client,
    base_url: String,
    token: Arc<dyn TokenSource>,
}

impl DriveApi {
    pub fn new(http: Client, token: Arc<dyn TokenSource>) -> Self {
        Self::with_base_url(http, DRIVE_API_BASE, token)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>, token: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.token.access_token().await?;
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        check_response(response, Service::Drive).await
    }

    async fn list_page(&self, q: &str, page_token: Option<&str>) -> Result<FileList> {
        let page_size = PAGE_SIZE.to_string();
        let mut query = vec![
            ("q", q),
            ("fields", FILE_FIELDS),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get("/drive/v3/files", &query).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse file list: {} - Response: {}",
                e, text
            ))
        })
    }

    /// Id of the first non-trashed folder named `name`.
    pub async fn find_folder_id(&self, name: &str) -> Result<String> {
        let q = folder_query(name);
        let page = self.list_page(&q, None).await?;

        if page.files.len() > 1 {
            tracing::warn!(
                "{} folders named '{}' found, using the first",
                page.files.len(),
                name
            );
        }

        page.files
            .into_iter()
            .next()
            .map(|folder| folder.id)
            .ok_or_else(|| Error::FolderNotFound(name.to_string()))
    }

    /// Every non-trashed file directly inside a folder.
    pub async fn list_files(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let q = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(&q, page_token.as_deref()).await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Listed {} files in folder {}", files.len(), folder_id);
        Ok(files)
    }

    /// Stream a file's content to `dest`.
    ///
    /// Bytes go to a `.part` sibling first. When Drive reports an MD5 the
    /// digest must match before the `.part` file replaces `dest`; on any
    /// failure only the `.part` file is removed.
    pub async fn download_file(&self, file: &DriveFile, dest: &Path) -> Result<Downloaded> {
        let path = format!("/drive/v3/files/{}", file.id);
        let response = self.get(&path, &[("alt", "media")]).await?;

        let partial = partial_path(dest);
        let result = stream_to_file(response, &partial, file.size)
            .await
            .and_then(|downloaded| verify_checksum(file, downloaded));

        match result {
            Ok(downloaded) => {
                tokio::fs::rename(&partial, dest).await?;
                Ok(downloaded)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

fn verify_checksum(file: &DriveFile, downloaded: Downloaded) -> Result<Downloaded> {
    match &file.md5_checksum {
        Some(expected) if !expected.eq_ignore_ascii_case(&downloaded.md5) => {
            Err(Error::ChecksumMismatch {
                file: file.name.clone(),
                expected: expected.clone(),
                actual: downloaded.md5,
            })
        }
        _ => Ok(downloaded),
    }
}

async fn stream_to_file(response: Response, output: &Path, size: Option<u64>) -> Result<Downloaded> {
    let total = size.or_else(|| response.content_length());
    let progress = match total {
        Some(len) if len > PROGRESS_THRESHOLD => Some(create_download_bar(len)),
        _ => None,
    };

    let mut file = File::create(output).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Md5::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;

        if let Some(ref pb) = progress {
            pb.set_position(downloaded);
        }
    }

    file.flush().await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(Downloaded {
        bytes: downloaded,
        md5: format!("{:x}", hasher.finalize()),
    })
}

/// Escape a literal for a Drive query string.
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Query matching non-trashed folders with an exact name.
pub fn folder_query(name: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escape_query(name),
        FOLDER_MIME_TYPE
    )
}
