//! Runtime, render-ready projection of a collection.
//!
//! A `Layer` is what the layer cache stores and what `GET /api/layers` returns.
//! It is never persisted itself; only its `Collection` form is.

use crate::model::collection::Collection;
use crate::model::geojson::FeatureCollection;
use crate::model::style::Style;
use serde::{Deserialize, Serialize};

/// Color given to layers that have no single-color style.
pub const DEFAULT_LAYER_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSource {
    /// Parsed from an uploaded file and not yet saved.
    Upload,
    /// Backed by a persisted collection.
    Database,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub name: String,
    pub data: FeatureCollection,
    pub visible: bool,
    pub opacity: f64,
    pub color: String,
    #[serde(rename = "type")]
    pub source: LayerSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl Layer {
    /// Projects a stored collection and its features into a visible layer.
    pub fn from_collection(collection: &Collection, data: FeatureCollection) -> Self {
        let mut layer = Self {
            id: collection.id.clone(),
            group_id: collection.group_id.clone(),
            name: collection.name.clone(),
            data,
            visible: true,
            opacity: 1.0,
            color: DEFAULT_LAYER_COLOR.to_string(),
            source: LayerSource::Database,
            style: None,
        };
        layer.apply_style(collection.metadata.style.clone());
        layer
    }

    /// Replaces the style and mirrors a single-color style onto `color`.
    pub fn apply_style(&mut self, style: Option<Style>) {
        if let Some(color) = style.as_ref().and_then(Style::base_color) {
            self.color = color.to_string();
        }
        self.style = style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::collection::CollectionMetadata;

    fn collection(style: Option<Style>) -> Collection {
        Collection {
            id: "c1".into(),
            name: "parks".into(),
            metadata: CollectionMetadata {
                style,
                ..Default::default()
            },
            group_id: Some("g1".into()),
            created_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn projection_defaults() {
        let layer = Layer::from_collection(&collection(None), FeatureCollection::default());
        assert_eq!(layer.id, "c1");
        assert_eq!(layer.group_id.as_deref(), Some("g1"));
        assert!(layer.visible);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.color, DEFAULT_LAYER_COLOR);
        assert_eq!(layer.source, LayerSource::Database);
    }

    #[test]
    fn simple_style_color_is_mirrored() {
        let style = Style::Simple {
            color: "#f97316".into(),
            weight: 2.0,
        };
        let layer = Layer::from_collection(&collection(Some(style)), FeatureCollection::default());
        assert_eq!(layer.color, "#f97316");
    }

    #[test]
    fn source_serializes_as_type() {
        let layer = Layer::from_collection(&collection(None), FeatureCollection::default());
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["type"], "database");
        assert_eq!(value["groupId"], "g1");
    }
}
