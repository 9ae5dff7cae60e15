//! HTTP status handling shared by the Google API clients.

use reqwest::{header, Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Seconds to wait when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Which API a response came from, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    EarthEngine,
    Drive,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Pass successful responses through, turn the rest into errors.
pub async fn check_response(response: Response, service: Service) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Response status: {}", status);

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(Error::RateLimited(retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::error!("Auth error response: {}", body);
        return Err(Error::Authentication(format!("HTTP {}: {}", status, message)));
    }

    Err(match service {
        Service::EarthEngine => Error::EarthEngine {
            status: status.as_u16(),
            message,
        },
        Service::Drive => Error::Api(format!("Drive HTTP {}: {}", status, message)),
    })
}

/// Human-readable message from a Google JSON error body.
pub fn error_message(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) if !parsed.error.message.is_empty() => {
                format!("{} ({})", parsed.error.message, code)
            }
            _ if !parsed.error.message.is_empty() => parsed.error.message,
            _ => status.to_string(),
        },
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.chars().take(500).collect(),
    }
}
