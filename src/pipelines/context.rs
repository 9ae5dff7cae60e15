//! Shared state for pipeline runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;

use crate::config::{load_toml, AuthConfig, RegionConfig, RegionFile};
use crate::drive::{DriveApi, DRIVE_API_BASE};
use crate::ee::{EarthEngineApi, EE_API_BASE};
use crate::error::{Error, Result};
use crate::fs::ProjectPaths;
use crate::google::{
    fallback_token_path, OAuthTokenSource, StaticToken, TokenSource, DEFAULT_SCOPES,
};
use crate::osm::nominatim::{NOMINATIM_BASE, USER_AGENT};
use crate::osm::overpass::OVERPASS_BASE;
use crate::osm::{Nominatim, Overpass};
use crate::output::LogControl;

/// Base URLs of every remote service a pipeline talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub earth_engine: String,
    pub drive: String,
    pub nominatim: String,
    pub overpass: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            earth_engine: EE_API_BASE.to_string(),
            drive: DRIVE_API_BASE.to_string(),
            nominatim: NOMINATIM_BASE.to_string(),
            overpass: OVERPASS_BASE.to_string(),
        }
    }
}

/// Everything a pipeline needs besides its own config file.
pub struct PipelineContext {
    pub paths: ProjectPaths,
    pub http: Client,
    pub endpoints: Endpoints,
    /// Bearer token that bypasses the OAuth flow.
    pub access_token: Option<String>,
    pub log: LogControl,
}

impl PipelineContext {
    pub fn new(root: impl Into<PathBuf>, access_token: Option<String>, log: LogControl) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            paths: ProjectPaths::new(root),
            http,
            endpoints: Endpoints::default(),
            access_token,
            log,
        })
    }

    /// Load a config file, defaulting to `default` under the project root.
    pub fn load_config<T: serde::de::DeserializeOwned>(
        &self,
        explicit: Option<&Path>,
        default: PathBuf,
    ) -> Result<(PathBuf, T)> {
        let path = match explicit {
            Some(path) => self.paths.resolve(path),
            None => default,
        };
        tracing::debug!("Loading config from {}", path.display());
        let config = load_toml(&path)?;
        Ok((path, config))
    }

    pub fn load_region(&self, slug: &str) -> Result<RegionConfig> {
        let path = self.paths.region_config(slug)?;
        let file: RegionFile = load_toml(&path)?;
        Ok(file.region)
    }

    /// Region from a `--region` slug, else the config's inline `[region]`.
    pub fn resolve_region(
        &self,
        slug: Option<&str>,
        inline: Option<&RegionConfig>,
    ) -> Result<RegionConfig> {
        match (slug, inline) {
            (Some(slug), _) => self.load_region(slug),
            (None, Some(region)) => Ok(region.clone()),
            (None, None) => Err(Error::MissingConfig(
                "region (pass --region <slug> or add a [region] section)".to_string(),
            )),
        }
    }

    /// Token source for the configured credentials.
    pub async fn token_source(&self, auth: &AuthConfig) -> Result<Arc<dyn TokenSource>> {
        if let Some(token) = &self.access_token {
            tracing::debug!("Using access token from the command line");
            return Ok(Arc::new(StaticToken::new(token.clone())));
        }

        let credentials_path = self.paths.resolve(&auth.credentials_path);
        let token_path = self.token_path(auth);
        let source = OAuthTokenSource::authorize(
            self.http.clone(),
            &credentials_path,
            &token_path,
            DEFAULT_SCOPES,
        )
        .await?;
        Ok(Arc::new(source))
    }

    /// Token file location: the configured one, unless its directory is
    /// missing and a per-user location exists.
    fn token_path(&self, auth: &AuthConfig) -> PathBuf {
        let configured = self.paths.resolve(&auth.token_path);
        if configured.exists() || configured.parent().map(Path::exists).unwrap_or(false) {
            return configured;
        }
        match fallback_token_path() {
            Some(path) => {
                tracing::debug!(
                    "{} has no directory, using {}",
                    configured.display(),
                    path.display()
                );
                path
            }
            None => configured,
        }
    }

    pub fn earth_engine(&self, project_id: &str, token: Arc<dyn TokenSource>) -> EarthEngineApi {
        EarthEngineApi::with_base_url(
            self.http.clone(),
            self.endpoints.earth_engine.clone(),
            project_id,
            token,
        )
    }

    pub fn drive(&self, token: Arc<dyn TokenSource>) -> DriveApi {
        DriveApi::with_base_url(self.http.clone(), self.endpoints.drive.clone(), token)
    }

    pub fn nominatim(&self) -> Nominatim {
        Nominatim::with_base_url(self.http.clone(), self.endpoints.nominatim.clone())
    }

    pub fn overpass(&self) -> Overpass {
        Overpass::with_base_url(self.http.clone(), self.endpoints.overpass.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(root: &Path) -> PipelineContext {
        PipelineContext::new(root, None, LogControl::disabled()).unwrap()
    }

    #[test]
    fn test_resolve_region_prefers_slug() {
        let dir = tempfile::tempdir().unwrap();
        let regions = dir.path().join("config").join("regions");
        std::fs::create_dir_all(&regions).unwrap();
        std::fs::write(
            regions.join("aachen.toml"),
            r#"
[region]
region_slug = "aachen"
place_name = "Aachen, Germany"
fallback_polygon = [[6.0, 50.7], [6.2, 50.7], [6.2, 50.8], [6.0, 50.7]]
"#,
        )
        .unwrap();

        let ctx = context(dir.path());
        let inline = RegionConfig {
            region_slug: "inline".to_string(),
            place_name: "Elsewhere".to_string(),
            fallback_polygon: vec![],
        };

        let region = ctx.resolve_region(Some("aachen"), Some(&inline)).unwrap();
        assert_eq!(region.region_slug, "aachen");

        let region = ctx.resolve_region(None, Some(&inline)).unwrap();
        assert_eq!(region.region_slug, "inline");

        assert!(matches!(
            ctx.resolve_region(None, None),
            Err(Error::MissingConfig(_))
        ));
    }

    #[test]
    fn test_configured_token_path_kept_when_directory_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("secrets")).unwrap();
        let ctx = context(dir.path());
        assert_eq!(
            ctx.token_path(&AuthConfig::default()),
            dir.path().join("secrets").join("token.json")
        );
    }
}
