//! Earth Engine REST API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ee::expr::Expression;
use crate::ee::types::*;
use crate::error::{Error, Result};
use crate::google::{check_response, Service, TokenSource};
use crate::output::create_spinner;

/// Earth Engine REST endpoint.
pub const EE_API_BASE: &str = "https://earthengine.googleapis.com";

/// Page size used when listing operations.
const LIST_PAGE_SIZE: usize = 100;

/// Earth Engine client scoped to one Cloud project.
#[derive(Clone)]
pub struct EarthEngineApi {
    http: Client,
    base_url: String,
    project_id: String,
    token: Arc<dyn TokenSource>,
}

impl EarthEngineApi {
    pub fn new(http: Client, project_id: impl Into<String>, token: Arc<dyn TokenSource>) -> Self {
        Self::with_base_url(http, EE_API_BASE, project_id, token)
    }

    /// Client against a different endpoint (used by tests).
    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        token: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            token,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.base_url, self.project_id, method
        )
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        let token = self.token.access_token().await?;
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        check_response(response, Service::EarthEngine).await
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let token = self.token.access_token().await?;
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        check_response(response, Service::EarthEngine).await
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let text = response.text().await?;
        tracing::debug!("{} response: {}", what, text);
        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                what, e, text
            ))
        })
    }

    /// Evaluate an expression and return its JSON value.
    pub async fn compute_value(&self, expression: Expression) -> Result<serde_json::Value> {
        let url = self.project_url("value:compute");
        let response = self.post(&url, &ComputeValueRequest { expression }).await?;
        let parsed: ComputeValueResponse = Self::parse(response, "value:compute").await?;
        Ok(parsed.result)
    }

    /// Start a GeoTIFF export to Drive.
    pub async fn export_image(&self, export: ImageExport) -> Result<Operation> {
        let image = export
            .image
            .clip_to_bounds_and_scale(&export.region, export.scale);
        let request = ExportImageRequest {
            expression: Expression::new(&image.0),
            description: export.description,
            file_export_options: FileExportOptions {
                file_format: "GEO_TIFF".to_string(),
                drive_destination: DriveDestination {
                    folder: export.folder,
                    filename_prefix: export.file_prefix,
                },
            },
            grid: PixelGrid {
                crs_code: export.crs,
            },
            max_pixels: MAX_PIXELS,
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        let url = self.project_url("image:export");
        let response = self.post(&url, &request).await?;
        let operation: Operation = Self::parse(response, "image:export").await?;
        tracing::info!("Started image export {}", operation.name);
        Ok(operation)
    }

    /// Start a table export to Drive.
    pub async fn export_table(&self, export: TableExport) -> Result<Operation> {
        let request = ExportTableRequest {
            expression: Expression::new(&export.collection.0),
            description: export.description,
            file_export_options: FileExportOptions {
                file_format: export.format.wire_name().to_string(),
                drive_destination: DriveDestination {
                    folder: export.folder,
                    filename_prefix: export.file_prefix,
                },
            },
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        let url = self.project_url("table:export");
        let response = self.post(&url, &request).await?;
        let operation: Operation = Self::parse(response, "table:export").await?;
        tracing::info!("Started table export {}", operation.name);
        Ok(operation)
    }

    /// Fetch an operation by its full resource name.
    pub async fn get_operation(&self, name: &str) -> Result<Operation> {
        let url = format!("{}/v1/{}", self.base_url, name.trim_start_matches('/'));
        let response = self.get(&url, &[]).await?;
        Self::parse(response, "operation").await
    }

    /// Most recent operations of the project, newest first as the server orders them.
    pub async fn list_operations(&self, limit: usize) -> Result<Vec<Operation>> {
        let url = self.project_url("operations");
        let mut operations = Vec::new();
        let mut page_token: Option<String> = None;

        while operations.len() < limit {
            let mut query = vec![(
                "pageSize",
                LIST_PAGE_SIZE.min(limit - operations.len()).to_string(),
            )];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self.get(&url, &query).await?;
            let page: ListOperationsResponse = Self::parse(response, "operations").await?;
            operations.extend(page.operations);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        operations.truncate(limit);
        Ok(operations)
    }

    /// Poll an operation until it finishes.
    ///
    /// Returns the final operation, or an error if the task failed or was
    /// cancelled.
    pub async fn wait_for_operation(&self, name: &str, interval: Duration) -> Result<Operation> {
        let spinner = create_spinner(&format!("Waiting for {}", name));

        let operation = loop {
            let operation = match self.get_operation(name).await {
                Ok(op) => op,
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e);
                }
            };

            spinner.set_message(format!("{} ({})", name, operation.state()));
            if operation.done {
                break operation;
            }
            tokio::time::sleep(interval).await;
        };
        spinner.finish_and_clear();

        if let Some(status) = &operation.error {
            return Err(Error::EarthEngine {
                status: 500,
                message: format!("Task {} failed: {}", operation.name, status.message),
            });
        }
        if operation.state() == TaskState::Cancelled {
            return Err(Error::Api(format!("Task {} was cancelled", operation.name)));
        }

        tracing::info!("Task {} finished: {}", operation.name, operation.state());
        Ok(operation)
    }
}
