use super::state::MapState;
use crate::classification::class_key;
use crate::model::geojson::Feature;

const UNKNOWN_NAME: &str = "Unknown feature";

/// One feature matching a free-text search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub layer_id: String,
    pub layer_name: String,
    pub feature: Feature,
    pub display_name: String,
}

/// Case-insensitive substring search over property values of visible layers.
///
/// Results follow layer order, then feature order. A blank query matches nothing.
pub fn search(state: &MapState, query: &str) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    state
        .layers
        .iter()
        .filter(|layer| layer.visible)
        .flat_map(|layer| {
            let query = query.clone();
            layer
                .data
                .features
                .iter()
                .filter(move |feature| matches(feature, &query))
                .map(move |feature| SearchResult {
                    layer_id: layer.id.clone(),
                    layer_name: layer.name.clone(),
                    feature: feature.clone(),
                    display_name: display_name(feature),
                })
        })
        .collect()
}

fn matches(feature: &Feature, query: &str) -> bool {
    feature
        .properties
        .values()
        .filter_map(class_key)
        .any(|value| value.to_lowercase().contains(query))
}

/// Value of the first key mentioning "name" (or Portuguese "nome"), else of the first key.
fn display_name(feature: &Feature) -> String {
    let props = &feature.properties;
    let key = props
        .keys()
        .find(|k| {
            let k = k.to_lowercase();
            k.contains("name") || k.contains("nome")
        })
        .or_else(|| props.keys().next());

    key.and_then(|k| props.get(k))
        .and_then(class_key)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}
