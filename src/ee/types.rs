//! Earth Engine REST request and response types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TableFormat;
use crate::ee::expr::Expression;
use crate::ee::objects::{FeatureCollection, Geometry, Image};

/// Pixel cap sent with every image export.
pub const MAX_PIXELS: i64 = 10_000_000_000_000;

/// `value:compute` request body.
#[derive(Debug, Serialize)]
pub struct ComputeValueRequest {
    pub expression: Expression,
}

/// `value:compute` response body.
#[derive(Debug, Deserialize)]
pub struct ComputeValueResponse {
    #[serde(default)]
    pub result: serde_json::Value,
}

/// State of an export task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Running,
    Cancelling,
    Succeeded,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Pending => "PENDING",
            TaskState::Running => "RUNNING",
            TaskState::Cancelling => "CANCELLING",
            TaskState::Succeeded => "SUCCEEDED",
            TaskState::Cancelled => "CANCELLED",
            TaskState::Failed => "FAILED",
            TaskState::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// Metadata attached to an export operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    pub state: Option<TaskState>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub progress: Option<f64>,
    #[serde(default)]
    pub destination_uris: Vec<String>,
}

/// `google.rpc.Status`.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Long-running operation returned by export calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: OperationMetadata,
    pub error: Option<Status>,
}

impl Operation {
    pub fn state(&self) -> TaskState {
        match self.metadata.state {
            Some(state) => state,
            None if self.error.is_some() => TaskState::Failed,
            None if self.done => TaskState::Succeeded,
            None => TaskState::Pending,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOperationsResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub filename_prefix: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExportOptions {
    pub file_format: String,
    pub drive_destination: DriveDestination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelGrid {
    pub crs_code: String,
}

/// `image:export` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImageRequest {
    pub expression: Expression,
    pub description: String,
    pub file_export_options: FileExportOptions,
    pub grid: PixelGrid,
    /// int64 travels as a JSON string.
    #[serde(with = "int64_string")]
    pub max_pixels: i64,
    pub request_id: String,
}

/// `table:export` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTableRequest {
    pub expression: Expression,
    pub description: String,
    pub file_export_options: FileExportOptions,
    pub request_id: String,
}

/// An image export to Drive.
#[derive(Debug, Clone)]
pub struct ImageExport {
    pub image: Image,
    pub region: Geometry,
    pub description: String,
    /// Drive folder name; the Drive root when unset.
    pub folder: Option<String>,
    pub file_prefix: String,
    pub scale: f64,
    pub crs: String,
}

/// A table export to Drive.
#[derive(Debug, Clone)]
pub struct TableExport {
    pub collection: FeatureCollection,
    pub description: String,
    pub folder: Option<String>,
    pub file_prefix: String,
    pub format: TableFormat,
}

mod int64_string {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}
