//! OAuth 2.0 user credentials for Google APIs.
//!
//! Tokens are cached in the authorized-user JSON format used by Google's
//! client libraries, so a `token.json` written by other Google tooling can
//! be reused as is.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{Error, Result};
use crate::output::print_info;

pub const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Scopes requested by every pipeline, so one token serves exports and sync.
pub const DEFAULT_SCOPES: &[&str] = &[EARTH_ENGINE_SCOPE, DRIVE_SCOPE];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Something that can hand out bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed access token, e.g. from `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Authorized-user credentials file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    pub client_id: String,
    pub client_secret: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUser {
    /// Whether the cached access token can still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (Some(_), Some(expiry)) => expiry - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            _ => false,
        }
    }

    /// Load credentials from a token file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let user: AuthorizedUser = serde_json::from_str(&content).map_err(|e| {
            Error::Authentication(format!("Invalid token file {}: {}", path.display(), e))
        })?;
        Ok(user)
    }

    /// Write credentials to a token file, readable only by the owner on unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, serde_json::to_string_pretty(self)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

/// OAuth client secrets file as downloaded from the Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    #[serde(alias = "web")]
    pub installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingConfig(format!(
                    "OAuth client secrets file {} (download it from the Cloud console)",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Token source backed by a refreshable authorized-user file.
pub struct OAuthTokenSource {
    http: Client,
    token_path: PathBuf,
    user: Mutex<AuthorizedUser>,
}

impl OAuthTokenSource {
    pub fn new(http: Client, user: AuthorizedUser, token_path: PathBuf) -> Self {
        Self {
            http,
            token_path,
            user: Mutex::new(user),
        }
    }

    /// Load the cached token file, or run the installed-app flow and create it.
    pub async fn authorize(
        http: Client,
        credentials_path: &Path,
        token_path: &Path,
        scopes: &[&str],
    ) -> Result<Self> {
        if token_path.exists() {
            tracing::debug!("Using cached credentials from {}", token_path.display());
            let user = AuthorizedUser::load(token_path)?;
            return Ok(Self::new(http, user, token_path.to_path_buf()));
        }

        let secrets = ClientSecrets::load(credentials_path)?;
        let user = run_installed_flow(&http, &secrets.installed, scopes).await?;
        user.save(token_path)?;
        print_info(&format!("Saved credentials to {}", token_path.display()));

        Ok(Self::new(http, user, token_path.to_path_buf()))
    }

    async fn refresh(&self, user: &mut AuthorizedUser) -> Result<()> {
        let refresh_token = user.refresh_token.clone().ok_or_else(|| {
            Error::Authentication(format!(
                "No refresh token in {}; delete it to authorize again",
                self.token_path.display()
            ))
        })?;

        let response = self
            .http
            .post(&user.token_uri)
            .form(&[
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let token = parse_token_response(response).await?;
        user.token = Some(token.access_token);
        user.expiry = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(rotated) = token.refresh_token {
            user.refresh_token = Some(rotated);
        }

        user.save(&self.token_path)?;
        Ok(())
    }
}

#[async_trait]
impl TokenSource for OAuthTokenSource {
    async fn access_token(&self) -> Result<String> {
        let mut user = self.user.lock().await;

        if !user.is_valid_at(Utc::now()) {
            tracing::debug!("Refreshing OAuth access token");
            self.refresh(&mut user).await?;
        }

        user.token
            .clone()
            .ok_or_else(|| Error::Authentication("No access token available".into()))
    }
}

/// Default token location outside the project, used when it has no secrets directory.
pub fn fallback_token_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cool-routes")
        .map(|dirs| dirs.config_dir().join("token.json"))
}

async fn parse_token_response(response: Response) -> Result<TokenResponse> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&text) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("HTTP {}", status),
        };
        return Err(Error::Authentication(message));
    }

    serde_json::from_str(&text)
        .map_err(|e| Error::Authentication(format!("Invalid token response: {}", e)))
}

/// Interactive installed-app flow with a loopback redirect.
async fn run_installed_flow(
    http: &Client,
    app: &InstalledApp,
    scopes: &[&str],
) -> Result<AuthorizedUser> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
    let state = random_state();
    let auth_url = build_authorization_url(app, &redirect_uri, scopes, &state)?;

    print_info("Open this URL in your browser to authorize access:");
    println!("\n  {}\n", auth_url);

    let (mut stream, _) = listener.accept().await?;
    let request_line = {
        let mut reader = BufReader::new(&mut stream);
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        line
    };

    let code = parse_redirect(&request_line, &state);
    let body = if code.is_ok() {
        "Authorization complete. You may close this window."
    } else {
        "Authorization failed. Check the terminal for details."
    };
    let reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    let code = code?;

    let response = http
        .post(&app.token_uri)
        .form(&[
            ("code", code.as_str()),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;
    let token = parse_token_response(response).await?;

    Ok(AuthorizedUser {
        token: Some(token.access_token),
        refresh_token: token.refresh_token,
        token_uri: app.token_uri.clone(),
        client_id: app.client_id.clone(),
        client_secret: app.client_secret.clone(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        expiry: token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

fn build_authorization_url(
    app: &InstalledApp,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    let url = Url::parse_with_params(
        &app.auth_uri,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )?;
    Ok(url)
}

/// Extract the authorization code from the redirect's HTTP request line.
fn parse_redirect(request_line: &str, expected_state: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::Authentication("Malformed redirect request".into()))?;
    let url = Url::parse("http://127.0.0.1")?.join(target)?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(Error::Authentication(format!(
                    "Authorization denied: {}",
                    value
                )));
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(Error::Authentication(
            "OAuth state mismatch in redirect".into(),
        ));
    }

    code.ok_or_else(|| Error::Authentication("Redirect did not contain a code".into()))
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
