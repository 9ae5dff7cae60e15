//! Error types for the cool-routes pipeline.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Region '{slug}' not found. Expected file: {expected}")]
    RegionNotFound { slug: String, expected: String },

    #[error("Invalid filename pattern: {0}")]
    Pattern(String),

    // Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Remote API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Earth Engine error (HTTP {status}): {message}")]
    EarthEngine { status: u16, message: String },

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    // Layer construction errors
    #[error("No images found in ImageCollection. {0}")]
    EmptyCollection(String),

    #[error("Expected bands not found in dataset (expected {expected:?}, found {found:?})")]
    MissingBands {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("No building footprints found in OSM")]
    NoFootprints,

    #[error("No valid features with height values found")]
    NoHeightValues,

    // Drive / sync errors
    #[error("Folder '{0}' not found in Drive")]
    FolderNotFound(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("{0} file(s) failed to sync")]
    SyncIncomplete(u64),

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::MissingConfig(_)
            | Error::RegionNotFound { .. }
            | Error::Pattern(_)
            | Error::InvalidFilename(_)
            | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
            Error::Authentication(_)
            | Error::Api(_)
            | Error::EarthEngine { .. }
            | Error::RateLimited(_)
            | Error::EmptyCollection(_)
            | Error::MissingBands { .. }
            | Error::NoFootprints
            | Error::NoHeightValues
            | Error::FolderNotFound(_) => exit_codes::API_ERROR,
            Error::Download(_) | Error::ChecksumMismatch { .. } => exit_codes::DOWNLOAD_ERROR,
            Error::SyncIncomplete(_) => exit_codes::SOME_FILES_FAILED,
            _ => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const SOME_FILES_FAILED: i32 = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            Error::InvalidFilename("../aachen".to_string()).exit_code(),
            exit_codes::CONFIG_ERROR
        );
        assert_eq!(Error::NoFootprints.exit_code(), exit_codes::API_ERROR);
        assert_eq!(Error::SyncIncomplete(2).exit_code(), exit_codes::SOME_FILES_FAILED);
        assert_eq!(
            Error::Io(std::io::Error::other("disk")).exit_code(),
            exit_codes::UNEXPECTED_ERROR
        );
    }
}
