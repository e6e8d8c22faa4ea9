//! Categorized styling: maps distinct property values to palette colors.
//!
//! Every caller (the map state reducer and the server's classify endpoint)
//! goes through `classify`, which orders values lexicographically before
//! assigning colors, so the same data always yields the same class map.

use crate::model::geojson::Feature;
use crate::model::layer::Layer;
use crate::model::style::{Style, DEFAULT_BORDER_COLOR, DEFAULT_WEIGHT};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Colors assigned to classes, cycled when there are more classes than entries.
pub const PALETTE: [&str; 15] = [
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#22c55e", "#10b981", "#14b8a6", "#06b6d4",
    "#0ea5e9", "#3b82f6", "#6366f1", "#8b5cf6", "#d946ef", "#f43f5e", "#881337",
];

/// String form of a property value used as a class key. `None` for null.
///
/// Strings are used verbatim; integral floats drop their fractional part so
/// `3` and `3.0` land in the same class.
pub fn class_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

/// Distinct class keys of `field`, skipping features where it is missing or null.
pub fn unique_values<'a, I>(features: I, field: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter_map(|feature| feature.properties.get(field))
        .filter_map(class_key)
        .collect()
}

/// Assigns palette colors to values in sorted order.
pub fn classify(values: &BTreeSet<String>) -> BTreeMap<String, String> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| (value.clone(), PALETTE[i % PALETTE.len()].to_string()))
        .collect()
}

/// Builds a categorized style for `layer` on `field`.
///
/// Keeps the weight and border color of an existing categorized style.
pub fn classify_layer(layer: &Layer, field: &str) -> Style {
    let class_map = classify(&unique_values(&layer.data.features, field));
    let (weight, border_color) = match &layer.style {
        Some(Style::Categorized {
            weight,
            border_color,
            ..
        }) => (*weight, border_color.clone()),
        _ => (DEFAULT_WEIGHT, DEFAULT_BORDER_COLOR.to_string()),
    };

    Style::Categorized {
        field: field.to_string(),
        class_map,
        weight,
        border_color,
    }
}

/// Fill color of one feature: its class color under a categorized style,
/// otherwise the layer color.
pub fn feature_fill_color<'a>(layer: &'a Layer, feature: &Feature) -> &'a str {
    if let Some(Style::Categorized {
        field, class_map, ..
    }) = &layer.style
    {
        let color = feature
            .properties
            .get(field)
            .and_then(class_key)
            .and_then(|key| class_map.get(&key));
        if let Some(color) = color {
            return color;
        }
    }
    &layer.color
}
