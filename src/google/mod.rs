//! Google API plumbing shared by the Earth Engine and Drive clients.
//!
//! This module provides:
//! - OAuth 2.0 token sources
//! - HTTP error mapping

pub mod auth;
pub mod errors;

pub use auth::{
    fallback_token_path, AuthorizedUser, OAuthTokenSource, StaticToken, TokenSource,
    DEFAULT_SCOPES,
};
pub use errors::{check_response, Service};
