//! Rendering style attached to a collection's metadata and mirrored onto its layer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Stroke weight used when a style omits one.
pub const DEFAULT_WEIGHT: f64 = 2.0;

/// Border color of categorized styles when none is given.
pub const DEFAULT_BORDER_COLOR: &str = "#333333";

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// How a layer's features are colored.
///
/// Serialized with a `type` discriminant (`simple`, `border-only`, `categorized`).
/// Any other discriminant fails deserialization, so unknown styles never reach
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Style {
    Simple {
        color: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    BorderOnly {
        color: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    #[serde(rename_all = "camelCase")]
    Categorized {
        field: String,
        class_map: BTreeMap<String, String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default = "default_border_color")]
        border_color: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("invalid color {0:?}, expected #rgb or #rrggbb")]
    Color(String),
    #[error("weight must be a positive number, got {0}")]
    Weight(f64),
    #[error("categorized style needs a field name")]
    EmptyField,
}

impl Style {
    /// Checks colors and weight. Called before a style is persisted.
    pub fn validate(&self) -> Result<(), StyleError> {
        match self {
            Style::Simple { color, weight } | Style::BorderOnly { color, weight } => {
                check_color(color)?;
                check_weight(*weight)
            }
            Style::Categorized {
                field,
                class_map,
                weight,
                border_color,
            } => {
                if field.trim().is_empty() {
                    return Err(StyleError::EmptyField);
                }
                check_color(border_color)?;
                for color in class_map.values() {
                    check_color(color)?;
                }
                check_weight(*weight)
            }
        }
    }

    /// The single color of a simple or border-only style.
    pub fn base_color(&self) -> Option<&str> {
        match self {
            Style::Simple { color, .. } | Style::BorderOnly { color, .. } => Some(color),
            Style::Categorized { .. } => None,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Style::Simple { weight, .. }
            | Style::BorderOnly { weight, .. }
            | Style::Categorized { weight, .. } => *weight,
        }
    }
}

fn check_color(color: &str) -> Result<(), StyleError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(StyleError::Color(color.to_string()))
    }
}

fn check_weight(weight: f64) -> Result<(), StyleError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(StyleError::Weight(weight))
    }
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_border_color() -> String {
    DEFAULT_BORDER_COLOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn border_only_uses_kebab_case_tag() {
        let style = Style::BorderOnly {
            color: "#10b981".into(),
            weight: 3.0,
        };
        let value = serde_json::to_value(&style).unwrap();
        assert_eq!(value, json!({"type": "border-only", "color": "#10b981", "weight": 3.0}));
    }

    #[test]
    fn categorized_reads_camel_case_fields_and_defaults() {
        let style: Style = serde_json::from_value(json!({
            "type": "categorized",
            "field": "kind",
            "classMap": {"a": "#ef4444"}
        }))
        .unwrap();

        match style {
            Style::Categorized {
                field,
                class_map,
                weight,
                border_color,
            } => {
                assert_eq!(field, "kind");
                assert_eq!(class_map["a"], "#ef4444");
                assert_eq!(weight, DEFAULT_WEIGHT);
                assert_eq!(border_color, DEFAULT_BORDER_COLOR);
            }
            other => panic!("unexpected style {other:?}"),
        }
    }

    #[test]
    fn unknown_discriminant_is_rejected() {
        let parsed = serde_json::from_value::<Style>(json!({"type": "heatmap", "color": "#fff"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_bad_colors_and_weights() {
        let bad_color = Style::Simple {
            color: "red".into(),
            weight: 2.0,
        };
        assert_eq!(bad_color.validate(), Err(StyleError::Color("red".into())));

        let bad_weight = Style::Simple {
            color: "#fff".into(),
            weight: 0.0,
        };
        assert_eq!(bad_weight.validate(), Err(StyleError::Weight(0.0)));

        let mut class_map = BTreeMap::new();
        class_map.insert("x".to_string(), "#12345".to_string());
        let bad_class = Style::Categorized {
            field: "kind".into(),
            class_map,
            weight: 2.0,
            border_color: DEFAULT_BORDER_COLOR.into(),
        };
        assert!(bad_class.validate().is_err());
    }

    #[test]
    fn base_color_only_for_single_color_styles() {
        let simple = Style::Simple {
            color: "#abcdef".into(),
            weight: 1.0,
        };
        assert_eq!(simple.base_color(), Some("#abcdef"));

        let categorized = Style::Categorized {
            field: "f".into(),
            class_map: BTreeMap::new(),
            weight: 1.0,
            border_color: DEFAULT_BORDER_COLOR.into(),
        };
        assert_eq!(categorized.base_color(), None);
    }
}
