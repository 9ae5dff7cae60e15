//! Earth Engine layer recipes.
//!
//! Each recipe builds a server-side image or feature collection for a
//! region of interest. Only collection sizes and band lists are evaluated
//! eagerly, to fail fast before an export is submitted.

pub mod buildings;
pub mod lst;
pub mod ndvi;
pub mod roi;

pub use roi::{get_roi, Geocoder, Roi, RoiSource};

use crate::ee::{EarthEngineApi, Expression, ImageCollection};
use crate::error::{Error, Result};

/// Number of images in a collection, evaluated on the server.
pub async fn collection_size(api: &EarthEngineApi, collection: &ImageCollection) -> Result<u64> {
    let value = api
        .compute_value(Expression::new(&collection.size()))
        .await?;
    value
        .as_u64()
        .ok_or_else(|| Error::Api(format!("Expected a collection size, got {}", value)))
}

/// Fail with [`Error::EmptyCollection`] when the collection has no images.
///
/// `context` is appended to the error to say which query came back empty.
pub async fn validate_image_collection(
    api: &EarthEngineApi,
    collection: &ImageCollection,
    context: &str,
) -> Result<u64> {
    let size = collection_size(api, collection).await?;
    if size == 0 {
        return Err(Error::EmptyCollection(context.to_string()));
    }
    tracing::info!("Validated collection: {} images found", size);
    Ok(size)
}
