use crate::model::style::Style;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted feature collection as stored in the `collections` table.
///
/// The features themselves live in their own table and are attached when the
/// collection is projected into a `Layer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Server-assigned UUID; join key between store, cache and layer.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: CollectionMetadata,
    #[serde(default)]
    pub group_id: Option<String>,
    /// RFC 3339 UTC timestamp assigned by the store.
    pub created_at: String,
}

/// Free-form collection metadata with a typed `style` key.
///
/// Keys other than `style` (e.g. `savedAt`, `originalId`) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionMetadata {
    pub fn with_style(style: Style) -> Self {
        Self {
            style: Some(style),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_keeps_free_form_keys() {
        let metadata: CollectionMetadata = serde_json::from_value(json!({
            "savedAt": "2024-01-01T00:00:00Z",
            "style": {"type": "simple", "color": "#ffffff", "weight": 2.0}
        }))
        .unwrap();

        assert!(matches!(metadata.style, Some(Style::Simple { .. })));
        assert_eq!(metadata.extra["savedAt"], "2024-01-01T00:00:00Z");

        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back["savedAt"], "2024-01-01T00:00:00Z");
        assert_eq!(back["style"]["type"], "simple");
    }

    #[test]
    fn metadata_without_style_omits_the_key() {
        let value = serde_json::to_value(CollectionMetadata::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
