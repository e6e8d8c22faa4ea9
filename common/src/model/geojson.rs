//! Minimal GeoJSON (RFC 7946) model used for every feature that crosses the
//! persistence store, the layer cache and the external-database fetcher.
//!
//! Geometries are a tagged union on the `type` member. Feature properties are
//! kept as an insertion-ordered JSON object so column order from an external
//! table survives the round trip through the store.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `[longitude, latitude]` with an optional altitude.
pub type Position = Vec<f64>;

/// Ordered property bag of a feature.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Builds a 2D point from longitude/latitude.
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lon, lat],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// GeoJSON allows `"properties": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Properties>::deserialize(deserializer).map(Option::unwrap_or_default)
}
