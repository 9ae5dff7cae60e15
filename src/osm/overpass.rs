//! Building footprints from the Overpass API.

use reqwest::{header, Client};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::osm::nominatim::USER_AGENT;

pub const OVERPASS_BASE: &str = "https://overpass-api.de";

/// Server-side timeout requested in the query, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 180;

/// A closed building outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// `way/<osm id>`.
    pub id: String,
    /// `[lon, lat]` positions, first equal to last.
    pub ring: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    geometry: Vec<LatLon>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Overpass interpreter client.
#[derive(Debug, Clone)]
pub struct Overpass {
    http: Client,
    base_url: String,
}

impl Overpass {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, OVERPASS_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// All building ways inside `ring`.
    pub async fn building_footprints(&self, ring: &[[f64; 2]]) -> Result<Vec<Footprint>> {
        let url = format!("{}/api/interpreter", self.base_url);
        let query = building_query(ring);
        tracing::debug!("Overpass query: {}", query);

        let response = self
            .http
            .post(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "Overpass HTTP {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let text = response.text().await?;
        let footprints = parse_footprints(&text)?;
        tracing::info!("Fetched {} building footprints from OSM", footprints.len());
        Ok(footprints)
    }
}

/// Overpass QL selecting building ways within a polygon.
pub fn building_query(ring: &[[f64; 2]]) -> String {
    let poly = ring
        .iter()
        .map(|[lon, lat]| format!("{} {}", lat, lon))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "[out:json][timeout:{}];way[\"building\"](poly:\"{}\");out geom;",
        QUERY_TIMEOUT_SECS, poly
    )
}

/// Valid footprints from an Overpass JSON response.
pub fn parse_footprints(text: &str) -> Result<Vec<Footprint>> {
    let response: OverpassResponse = serde_json::from_str(text)
        .map_err(|e| Error::Api(format!("Invalid Overpass response: {}", e)))?;

    let footprints: Vec<Footprint> = response
        .elements
        .into_iter()
        .filter(|e| e.kind == "way")
        .filter_map(|e| {
            let ring: Vec<[f64; 2]> = e.geometry.iter().map(|p| [p.lon, p.lat]).collect();
            is_valid_ring(&ring).then(|| Footprint {
                id: format!("way/{}", e.id),
                ring,
            })
        })
        .collect();

    if footprints.is_empty() {
        return Err(Error::NoFootprints);
    }
    Ok(footprints)
}

/// Closed, at least a triangle, and not degenerate.
fn is_valid_ring(ring: &[[f64; 2]]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last() && shoelace_area(ring).abs() > 0.0
}

fn shoelace_area(ring: &[[f64; 2]]) -> f64 {
    ring.windows(2)
        .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
        .sum::<f64>()
        / 2.0
}
