//! Drive v3 response types.

use serde::{Deserialize, Deserializer};

/// MIME type of Drive folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix of Google-native document types, which have no binary content.
pub const GOOGLE_APPS_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// A file listed in a Drive folder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,

    /// Byte size; absent for Google-native documents.
    #[serde(default, deserialize_with = "int64_string")]
    pub size: Option<u64>,

    pub md5_checksum: Option<String>,

    #[serde(default)]
    pub mime_type: String,
}

impl DriveFile {
    /// Google Docs, Sheets and the like cannot be fetched with `alt=media`.
    pub fn is_google_native(&self) -> bool {
        self.mime_type.starts_with(GOOGLE_APPS_MIME_PREFIX)
    }
}

/// One page of `files.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

/// Drive encodes int64 fields as JSON strings.
fn int64_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}
