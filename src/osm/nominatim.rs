//! Place-name geocoding through Nominatim.

use reqwest::{header, Client};
use serde::Deserialize;

use crate::error::{Error, Result};

pub const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying agent.
pub const USER_AGENT: &str = concat!("cool-routes/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    geojson: Option<geojson::Geometry>,
}

/// Nominatim search client.
#[derive(Debug, Clone)]
pub struct Nominatim {
    http: Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, NOMINATIM_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Boundary polygon of the best match for `place`, as `[lon, lat]` positions.
    pub async fn geocode_polygon(&self, place: &str) -> Result<Vec<[f64; 2]>> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("Geocoding '{}' via {}", place, url);

        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(&[
                ("q", place),
                ("format", "jsonv2"),
                ("polygon_geojson", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned HTTP {} for '{}'",
                status, place
            )));
        }

        let text = response.text().await?;
        parse_search_response(&text, place)
    }
}

/// Exterior ring of the first search result, if it is a polygon.
pub fn parse_search_response(text: &str, place: &str) -> Result<Vec<[f64; 2]>> {
    let places: Vec<Place> = serde_json::from_str(text)
        .map_err(|e| Error::Geocoding(format!("Invalid Nominatim response: {}", e)))?;

    let first = places
        .into_iter()
        .next()
        .ok_or_else(|| Error::Geocoding(format!("No results for '{}'", place)))?;

    if let Some(name) = &first.display_name {
        tracing::debug!("Geocoded '{}' to {}", place, name);
    }

    match first.geojson.map(|g| g.value) {
        Some(geojson::Value::Polygon(rings)) => {
            let exterior = rings
                .into_iter()
                .next()
                .ok_or_else(|| Error::Geocoding(format!("Empty polygon for '{}'", place)))?;
            exterior
                .into_iter()
                .map(|position| match position.as_slice() {
                    [lon, lat, ..] => Ok([*lon, *lat]),
                    _ => Err(Error::Geocoding(format!(
                        "Malformed position in polygon for '{}'",
                        place
                    ))),
                })
                .collect()
        }
        Some(other) => Err(Error::Geocoding(format!(
            "'{}' resolved to a {} instead of a Polygon",
            place,
            other.type_name()
        ))),
        None => Err(Error::Geocoding(format!(
            "No boundary geometry for '{}'",
            place
        ))),
    }
}
