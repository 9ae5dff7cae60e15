//! Building heights per OSM footprint.

use geojson::{Feature as GeoFeature, FeatureCollection as GeoFeatureCollection};
use serde_json::{Map, Value};

use crate::config::BuildingsDataset;
use crate::ee::{
    EarthEngineApi, Expression, Feature, FeatureCollection, Geometry, Image, ImageCollection,
    Reducer,
};
use crate::error::{Error, Result};
use crate::layers::{validate_image_collection, Roi};
use crate::osm::Footprint;

/// Property name `Reducer.mean` writes on each feature.
const MEAN_PROPERTY: &str = "mean";

/// Property name used in exported height tables.
pub const HEIGHT_PROPERTY: &str = "height_m";

/// Building height for `year`, masked where presence is below the threshold.
pub async fn load_temporal_building_height(
    api: &EarthEngineApi,
    dataset: &BuildingsDataset,
    year: i32,
    roi: &Roi,
) -> Result<Image> {
    let region = roi.geometry();
    let collection = ImageCollection::load(&dataset.collection_id)
        .filter_date(&format!("{}-01-01", year), &format!("{}-12-31", year))
        .filter_bounds(&region);

    validate_image_collection(
        api,
        &collection,
        &format!("No building height images for {} and ROI", year),
    )
    .await?;

    let mosaic = collection.mosaic().clip(&region);

    let found = band_names(api, &mosaic).await?;
    let expected = [dataset.height_band.clone(), dataset.confidence_band.clone()];
    if expected.iter().any(|band| !found.contains(band)) {
        return Err(Error::MissingBands {
            expected: expected.to_vec(),
            found,
        });
    }

    let height = mosaic.select(&[&dataset.height_band]);
    let presence = mosaic.select(&[&dataset.confidence_band]);
    Ok(height.update_mask(presence.gt(dataset.confidence_threshold)))
}

async fn band_names(api: &EarthEngineApi, image: &Image) -> Result<Vec<String>> {
    let value = api.compute_value(Expression::new(&image.band_names())).await?;
    serde_json::from_value(value.clone())
        .map_err(|_| Error::Api(format!("Expected a list of band names, got {}", value)))
}

/// One feature per footprint, carrying its OSM id.
pub fn footprints_to_feature_collection(footprints: &[Footprint]) -> Result<FeatureCollection> {
    if footprints.is_empty() {
        return Err(Error::NoFootprints);
    }

    let features = footprints
        .iter()
        .map(|footprint| {
            let mut properties = Map::new();
            properties.insert("id".to_string(), Value::String(footprint.id.clone()));
            Feature::new(&Geometry::polygon(&footprint.ring), properties)
        })
        .collect();

    Ok(FeatureCollection::from_features(features))
}

/// Zonal mean of `image` over every footprint.
pub fn mean_height_per_building(
    buildings: &FeatureCollection,
    image: &Image,
    scale: f64,
    crs: &str,
    tile_scale: u32,
) -> FeatureCollection {
    image.reduce_regions(buildings, Reducer::mean(), scale, crs, tile_scale)
}

/// Keep features with a computed mean and expose it as `height_m`.
pub fn heights_from_features(value: Value) -> Result<GeoFeatureCollection> {
    let collection: GeoFeatureCollection = serde_json::from_value(value)
        .map_err(|e| Error::Api(format!("Invalid feature collection: {}", e)))?;

    let features: Vec<GeoFeature> = collection
        .features
        .into_iter()
        .filter_map(|mut feature| {
            let properties = feature.properties.as_mut()?;
            match properties.remove(MEAN_PROPERTY) {
                Some(Value::Null) | None => None,
                Some(mean) => {
                    properties.insert(HEIGHT_PROPERTY.to_string(), mean);
                    Some(feature)
                }
            }
        })
        .collect();

    if features.is_empty() {
        return Err(Error::NoHeightValues);
    }

    tracing::info!("{} buildings with height values", features.len());
    Ok(GeoFeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_footprints() {
        assert!(matches!(
            footprints_to_feature_collection(&[]),
            Err(Error::NoFootprints)
        ));
    }

    #[test]
    fn test_footprints_carry_ids() {
        let fc = footprints_to_feature_collection(&[Footprint {
            id: "way/42".to_string(),
            ring: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
        }])
        .unwrap();
        let expr = Expression::new(&fc.0);
        let root = &expr.values[&expr.result]["functionInvocationValue"];
        let feature = &root["arguments"]["features"]["arrayValue"]["values"][0];
        assert_eq!(
            feature["functionInvocationValue"]["arguments"]["metadata"],
            json!({ "constantValue": { "id": "way/42" } })
        );
    }

    #[test]
    fn test_heights_from_features_renames_mean() {
        let value = json!({
            "type": "FeatureCollection",
            "columns": {"id": "String", "mean": "Float"},
            "features": [
                {
                    "type": "Feature",
                    "id": "0",
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]},
                    "properties": {"id": "way/1", "mean": 12.5}
                },
                {
                    "type": "Feature",
                    "id": "1",
                    "geometry": {"type": "Polygon", "coordinates": [[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 0.0]]]},
                    "properties": {"id": "way/2", "mean": null}
                },
                {
                    "type": "Feature",
                    "id": "2",
                    "geometry": {"type": "Polygon", "coordinates": [[[4.0, 0.0], [5.0, 0.0], [5.0, 1.0], [4.0, 0.0]]]},
                    "properties": {"id": "way/3"}
                }
            ]
        });

        let fc = heights_from_features(value).unwrap();
        assert_eq!(fc.features.len(), 1);
        let properties = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(properties[HEIGHT_PROPERTY], json!(12.5));
        assert!(!properties.contains_key(MEAN_PROPERTY));
    }

    #[test]
    fn test_no_height_values() {
        let value = json!({"type": "FeatureCollection", "features": []});
        assert!(matches!(
            heights_from_features(value),
            Err(Error::NoHeightValues)
        ));
    }
}
