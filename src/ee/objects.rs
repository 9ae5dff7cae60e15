//! Typed Earth Engine objects over computation graph nodes.
//!
//! Each method appends one algorithm invocation to the graph; nothing is
//! evaluated until the graph is sent to the server.

use crate::ee::expr::Node;

/// Server-side geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(pub Node);

impl Geometry {
    /// Polygon from a single `[lon, lat]` ring.
    pub fn polygon(ring: &[[f64; 2]]) -> Self {
        let coordinates: Vec<Vec<f64>> = ring.iter().map(|[lon, lat]| vec![*lon, *lat]).collect();
        Geometry(Node::invoke(
            "GeometryConstructors.Polygon",
            [
                ("coordinates", Node::constant(vec![coordinates])),
                ("evenOdd", Node::constant(true)),
            ],
        ))
    }
}

/// Server-side collection filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(pub Node);

impl Filter {
    /// Images whose `system:time_start` falls in `[start, end)`.
    pub fn date(start: &str, end: &str) -> Self {
        let range = Node::invoke(
            "DateRange",
            [("start", Node::string(start)), ("end", Node::string(end))],
        );
        Filter(Node::invoke(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", Node::string("system:time_start")),
            ],
        ))
    }

    /// Elements intersecting `geometry`.
    pub fn bounds(geometry: &Geometry) -> Self {
        Filter(Node::invoke(
            "Filter.intersects",
            [
                ("leftField", Node::string(".all")),
                ("rightValue", geometry.0.clone()),
            ],
        ))
    }

    /// Elements whose `property` is less than `value`.
    pub fn lt(property: &str, value: f64) -> Self {
        Filter(Node::invoke(
            "Filter.lessThan",
            [
                ("leftField", Node::string(property)),
                ("rightValue", Node::constant(value)),
            ],
        ))
    }
}

/// Server-side reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer(pub Node);

impl Reducer {
    pub fn mean() -> Self {
        Reducer(Node::invoke("Reducer.mean", Vec::<(&str, Node)>::new()))
    }
}

/// Server-side image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image(pub Node);

impl Image {
    /// Constant image, used to promote numbers in image arithmetic.
    pub fn constant(value: f64) -> Self {
        Image(Node::invoke("Image.constant", [("value", Node::constant(value))]))
    }

    fn binary(&self, function: &str, other: Image) -> Image {
        Image(Node::invoke(
            function,
            [("image1", self.0.clone()), ("image2", other.0)],
        ))
    }

    pub fn select<S: AsRef<str>>(&self, bands: &[S]) -> Image {
        Image(Node::invoke(
            "Image.select",
            [
                ("input", self.0.clone()),
                ("bandSelectors", Node::strings(bands)),
            ],
        ))
    }

    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Image {
        Image(Node::invoke(
            "Image.rename",
            [("input", self.0.clone()), ("names", Node::strings(names))],
        ))
    }

    pub fn clip(&self, geometry: &Geometry) -> Image {
        Image(Node::invoke(
            "Image.clip",
            [("input", self.0.clone()), ("geometry", geometry.0.clone())],
        ))
    }

    /// Clip to a region and fix the output scale, as exports require.
    pub fn clip_to_bounds_and_scale(&self, geometry: &Geometry, scale: f64) -> Image {
        Image(Node::invoke(
            "Image.clipToBoundsAndScale",
            [
                ("input", self.0.clone()),
                ("geometry", geometry.0.clone()),
                ("scale", Node::constant(scale)),
            ],
        ))
    }

    pub fn update_mask(&self, mask: Image) -> Image {
        Image(Node::invoke(
            "Image.updateMask",
            [("image", self.0.clone()), ("mask", mask.0)],
        ))
    }

    pub fn gt(&self, value: f64) -> Image {
        self.binary("Image.gt", Image::constant(value))
    }

    pub fn eq(&self, value: f64) -> Image {
        self.binary("Image.eq", Image::constant(value))
    }

    pub fn and(&self, other: Image) -> Image {
        self.binary("Image.and", other)
    }

    pub fn bitwise_and(&self, value: u32) -> Image {
        self.binary("Image.bitwiseAnd", Image::constant(f64::from(value)))
    }

    pub fn add(&self, value: f64) -> Image {
        self.binary("Image.add", Image::constant(value))
    }

    pub fn subtract(&self, value: f64) -> Image {
        self.binary("Image.subtract", Image::constant(value))
    }

    pub fn multiply(&self, value: f64) -> Image {
        self.binary("Image.multiply", Image::constant(value))
    }

    pub fn divide(&self, value: f64) -> Image {
        self.binary("Image.divide", Image::constant(value))
    }

    /// `(first - second) / (first + second)` over two bands.
    pub fn normalized_difference(&self, first: &str, second: &str) -> Image {
        Image(Node::invoke(
            "Image.normalizedDifference",
            [
                ("input", self.0.clone()),
                ("bandNames", Node::strings(&[first, second])),
            ],
        ))
    }

    pub fn add_bands(&self, bands: Image) -> Image {
        Image(Node::invoke(
            "Image.addBands",
            [("dstImg", self.0.clone()), ("srcImg", bands.0)],
        ))
    }

    /// Band names, as a list when computed.
    pub fn band_names(&self) -> Node {
        Node::invoke("Image.bandNames", [("image", self.0.clone())])
    }

    /// Apply `reducer` over each feature's geometry.
    pub fn reduce_regions(
        &self,
        collection: &FeatureCollection,
        reducer: Reducer,
        scale: f64,
        crs: &str,
        tile_scale: u32,
    ) -> FeatureCollection {
        FeatureCollection(Node::invoke(
            "Image.reduceRegions",
            [
                ("image", self.0.clone()),
                ("collection", collection.0.clone()),
                ("reducer", reducer.0),
                ("scale", Node::constant(scale)),
                ("crs", Node::string(crs)),
                ("tileScale", Node::constant(tile_scale)),
            ],
        ))
    }
}

/// Server-side image collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(pub Node);

impl ImageCollection {
    /// Load a catalog collection by id.
    pub fn load(id: &str) -> Self {
        ImageCollection(Node::invoke(
            "ImageCollection.load",
            [("id", Node::string(id))],
        ))
    }

    pub fn filter(&self, filter: Filter) -> Self {
        ImageCollection(Node::invoke(
            "Collection.filter",
            [("collection", self.0.clone()), ("filter", filter.0)],
        ))
    }

    pub fn filter_date(&self, start: &str, end: &str) -> Self {
        self.filter(Filter::date(start, end))
    }

    pub fn filter_bounds(&self, geometry: &Geometry) -> Self {
        self.filter(Filter::bounds(geometry))
    }

    /// Apply `f` to every image of the collection.
    pub fn map(&self, f: impl FnOnce(Image) -> Image) -> Self {
        let algorithm = Node::lambda(|arg| f(Image(arg)).0);
        ImageCollection(Node::invoke(
            "Collection.map",
            [("collection", self.0.clone()), ("baseAlgorithm", algorithm)],
        ))
    }

    pub fn select<S: AsRef<str>>(&self, bands: &[S]) -> Self {
        self.map(|img| img.select(bands))
    }

    pub fn mosaic(&self) -> Image {
        Image(Node::invoke(
            "ImageCollection.mosaic",
            [("collection", self.0.clone())],
        ))
    }

    pub fn mean(&self) -> Image {
        Image(Node::invoke(
            "ImageCollection.mean",
            [("collection", self.0.clone())],
        ))
    }

    pub fn median(&self) -> Image {
        Image(Node::invoke(
            "ImageCollection.median",
            [("collection", self.0.clone())],
        ))
    }

    /// Number of images, as an integer when computed.
    pub fn size(&self) -> Node {
        Node::invoke("Collection.size", [("collection", self.0.clone())])
    }
}

/// Server-side feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature(pub Node);

impl Feature {
    pub fn new(geometry: &Geometry, properties: serde_json::Map<String, serde_json::Value>) -> Self {
        Feature(Node::invoke(
            "Feature",
            [
                ("geometry", geometry.0.clone()),
                ("metadata", Node::constant(properties)),
            ],
        ))
    }
}

/// Server-side feature collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection(pub Node);

impl FeatureCollection {
    pub fn from_features(features: Vec<Feature>) -> Self {
        FeatureCollection(Node::invoke(
            "Collection",
            [(
                "features",
                Node::Array(features.into_iter().map(|f| f.0).collect()),
            )],
        ))
    }
}
