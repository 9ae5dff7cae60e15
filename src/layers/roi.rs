//! Region of interest resolution.

use std::fmt;

use async_trait::async_trait;

use crate::config::RegionConfig;
use crate::ee::Geometry;
use crate::error::Result;
use crate::osm::Nominatim;

/// Anything that can turn a place name into a boundary ring.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_polygon(&self, place: &str) -> Result<Vec<[f64; 2]>>;
}

#[async_trait]
impl Geocoder for Nominatim {
    async fn geocode_polygon(&self, place: &str) -> Result<Vec<[f64; 2]>> {
        Nominatim::geocode_polygon(self, place).await
    }
}

/// Where the ROI outline came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoiSource {
    Geocoded(String),
    Fallback,
}

impl fmt::Display for RoiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoiSource::Geocoded(place) => write!(f, "OSM boundary of '{}'", place),
            RoiSource::Fallback => write!(f, "fallback polygon"),
        }
    }
}

/// Resolved region of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    pub source: RoiSource,
    /// `[lon, lat]` exterior ring.
    pub ring: Vec<[f64; 2]>,
}

impl Roi {
    pub fn geometry(&self) -> Geometry {
        Geometry::polygon(&self.ring)
    }
}

/// Geocode the region's place name, falling back to its configured polygon.
pub async fn get_roi(region: &RegionConfig, geocoder: &dyn Geocoder) -> Roi {
    match geocoder.geocode_polygon(&region.place_name).await {
        Ok(ring) if ring.len() >= 3 => Roi {
            source: RoiSource::Geocoded(region.place_name.clone()),
            ring,
        },
        Ok(ring) => {
            tracing::warn!(
                "Geocoded boundary for '{}' has only {} positions, using fallback polygon",
                region.place_name,
                ring.len()
            );
            fallback(region)
        }
        Err(e) => {
            tracing::warn!(
                "Could not geocode '{}' ({}), using fallback polygon",
                region.place_name,
                e
            );
            fallback(region)
        }
    }
}

fn fallback(region: &RegionConfig) -> Roi {
    Roi {
        source: RoiSource::Fallback,
        ring: region.fallback_polygon.clone(),
    }
}
