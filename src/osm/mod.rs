//! OpenStreetMap lookups: place boundaries and building outlines.

pub mod nominatim;
pub mod overpass;

pub use nominatim::Nominatim;
pub use overpass::{Footprint, Overpass};
