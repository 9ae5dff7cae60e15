//! Landsat 8 land surface temperature composite.

use chrono::NaiveDate;

use crate::config::Reducer;
use crate::ee::{Geometry, Image, ImageCollection};

pub use crate::layers::validate_image_collection;

pub const LANDSAT_8_LST_COLLECTION: &str = "LANDSAT/LC08/C02/T1_L2";
pub const LANDSAT_8_LST_BAND: &str = "ST_B10";
pub const LANDSAT_8_QA_BAND: &str = "QA_PIXEL";

pub const LANDSAT_8_CLOUD_SHADOW_BIT: u32 = 3;
pub const LANDSAT_8_CLOUD_BIT: u32 = 5;
pub const LANDSAT_8_CIRRUS_BIT: u32 = 7;

pub const LANDSAT_8_LST_SCALE: f64 = 0.00341802;
pub const LANDSAT_8_LST_OFFSET: f64 = 149.0;
pub const KELVIN_TO_CELSIUS: f64 = 273.15;

/// Name of the band added by [`scale_to_celsius`].
pub const LST_BAND: &str = "LST";

/// Landsat 8 Collection 2 Tier 1 scenes over the ROI and date range.
pub fn load_landsat8_lst_collection(
    start_date: NaiveDate,
    end_date: NaiveDate,
    roi: &Geometry,
) -> ImageCollection {
    ImageCollection::load(LANDSAT_8_LST_COLLECTION)
        .filter_date(
            &start_date.format("%Y-%m-%d").to_string(),
            &end_date.format("%Y-%m-%d").to_string(),
        )
        .filter_bounds(roi)
}

/// Add an `LST` band in degrees Celsius.
pub fn scale_to_celsius(image: Image) -> Image {
    let celsius = image
        .select(&[LANDSAT_8_LST_BAND])
        .multiply(LANDSAT_8_LST_SCALE)
        .add(LANDSAT_8_LST_OFFSET)
        .subtract(KELVIN_TO_CELSIUS)
        .rename(&[LST_BAND]);
    image.add_bands(celsius)
}

/// Mask cloud shadow, cloud and cirrus pixels.
pub fn apply_cloud_mask(image: Image) -> Image {
    let qa = image.select(&[LANDSAT_8_QA_BAND]);
    let clear = |bit: u32| qa.bitwise_and(1 << bit).eq(0.0);
    let mask = clear(LANDSAT_8_CLOUD_SHADOW_BIT)
        .and(clear(LANDSAT_8_CLOUD_BIT))
        .and(clear(LANDSAT_8_CIRRUS_BIT));
    image.update_mask(mask)
}

/// Reduce the `LST` band over time and clip to the ROI.
pub fn build_lst_composite(collection: &ImageCollection, roi: &Geometry, reducer: Reducer) -> Image {
    let lst = collection.select(&[LST_BAND]);
    let image = match reducer {
        Reducer::Median => lst.median(),
        Reducer::Mean => lst.mean(),
    };
    image.clip(roi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ee::{Expression, Node};

    fn function_name(image: &Image) -> String {
        let expr = Expression::new(&image.0);
        expr.values[&expr.result]["functionInvocationValue"]["functionName"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_scale_to_celsius_adds_band() {
        let image = scale_to_celsius(Image(Node::string("scene")));
        assert_eq!(function_name(&image), "Image.addBands");
    }

    #[test]
    fn test_composite_reducer() {
        let roi = Geometry::polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        let collection = ImageCollection::load(LANDSAT_8_LST_COLLECTION);

        let median = build_lst_composite(&collection, &roi, Reducer::Median);
        let Node::Invocation { arguments, .. } = &median.0 else {
            panic!("expected invocation");
        };
        assert_eq!(function_name(&Image(arguments["input"].clone())), "ImageCollection.median");

        let mean = build_lst_composite(&collection, &roi, Reducer::Mean);
        let Node::Invocation { arguments, .. } = &mean.0 else {
            panic!("expected invocation");
        };
        assert_eq!(function_name(&Image(arguments["input"].clone())), "ImageCollection.mean");
    }
}
