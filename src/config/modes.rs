//! Enumerated configuration choices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temporal reducer used to build a composite from an image collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Median,
    Mean,
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Median => write!(f, "median"),
            Reducer::Mean => write!(f, "mean"),
        }
    }
}

/// File format of a table export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableFormat {
    #[default]
    #[serde(rename = "GeoJSON")]
    GeoJson,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "SHP")]
    Shp,
    #[serde(rename = "KML")]
    Kml,
    #[serde(rename = "KMZ")]
    Kmz,
    #[serde(rename = "TFRecord")]
    TfRecord,
}

impl TableFormat {
    /// Name of the format in the Earth Engine REST API.
    pub fn wire_name(&self) -> &'static str {
        match self {
            TableFormat::GeoJson => "GEO_JSON",
            TableFormat::Csv => "CSV",
            TableFormat::Shp => "SHAPEFILE",
            TableFormat::Kml => "KML",
            TableFormat::Kmz => "KMZ",
            TableFormat::TfRecord => "TF_RECORD_TABLE",
        }
    }

    /// Name of the file a table export with `prefix` lands as in Drive.
    pub fn exported_file_name(&self, prefix: &str) -> String {
        format!("{}.{}", prefix, self.extension())
    }

    /// Extension Drive gives the exported file.
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::GeoJson => "geojson",
            TableFormat::Csv => "csv",
            TableFormat::Shp => "zip",
            TableFormat::Kml => "kml",
            TableFormat::Kmz => "kmz",
            TableFormat::TfRecord => "tfrecord",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableFormat::GeoJson => "GeoJSON",
            TableFormat::Csv => "CSV",
            TableFormat::Shp => "SHP",
            TableFormat::Kml => "KML",
            TableFormat::Kmz => "KMZ",
            TableFormat::TfRecord => "TFRecord",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_format_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: TableFormat,
        }
        let w: Wrapper = toml::from_str(r#"format = "SHP""#).unwrap();
        assert_eq!(w.format, TableFormat::Shp);
        assert_eq!(w.format.wire_name(), "SHAPEFILE");
        assert_eq!(TableFormat::default().wire_name(), "GEO_JSON");
        assert_eq!(w.format.exported_file_name("buildings_bilbao"), "buildings_bilbao.zip");
    }
}
