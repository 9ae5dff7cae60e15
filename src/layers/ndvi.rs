//! Sentinel-2 NDVI composite.

use crate::config::NdviDataset;
use crate::ee::{EarthEngineApi, Filter, Image, ImageCollection};
use crate::error::Result;
use crate::layers::{validate_image_collection, Roi};

/// Scene-level cloud percentage property on Sentinel-2 images.
const CLOUDY_PIXEL_PERCENTAGE: &str = "CLOUDY_PIXEL_PERCENTAGE";

const QA_BAND: &str = "QA60";
const OPAQUE_CLOUD_BIT: u32 = 1 << 10;
const CIRRUS_BIT: u32 = 1 << 11;

/// Surface reflectance is stored scaled by this factor.
const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Mask opaque clouds and cirrus, then convert to reflectance.
pub fn mask_s2_clouds(image: Image) -> Image {
    let qa = image.select(&[QA_BAND]);
    let mask = qa
        .bitwise_and(OPAQUE_CLOUD_BIT)
        .eq(0.0)
        .and(qa.bitwise_and(CIRRUS_BIT).eq(0.0));
    image.update_mask(mask).divide(REFLECTANCE_SCALE)
}

/// Mean NDVI over the date range, clipped to the ROI.
pub async fn load_ndvi(api: &EarthEngineApi, dataset: &NdviDataset, roi: &Roi) -> Result<Image> {
    let region = roi.geometry();
    let start = dataset.start_date.format("%Y-%m-%d").to_string();
    let end = dataset.end_date.format("%Y-%m-%d").to_string();

    let collection = ImageCollection::load(&dataset.collection_id)
        .filter_date(&start, &end)
        .filter_bounds(&region)
        .filter(Filter::lt(CLOUDY_PIXEL_PERCENTAGE, dataset.cloud_mask.threshold))
        .map(mask_s2_clouds);

    validate_image_collection(
        api,
        &collection,
        &format!("No Sentinel-2 images for NDVI between {} and {}", start, end),
    )
    .await?;

    let ndvi = collection.map(|img| img.normalized_difference("B8", "B4").rename(&["NDVI"]));
    Ok(ndvi.mean().clip(&region))
}
