use super::messages::Msg;
use super::state::MapState;
use crate::classification::classify_layer;

/// Applies `msg` to `state`.
///
/// Returns `true` when the state changed and views should re-render.
pub fn update(state: &mut MapState, msg: Msg) -> bool {
    match msg {
        Msg::AddLayer(layer) => {
            if state.layer(&layer.id).is_some() {
                return false;
            }
            state.layers.push(layer);
            true
        }
        Msg::RemoveLayer(id) => {
            let before = state.layers.len();
            state.layers.retain(|l| l.id != id);
            if state.focused_layer_id.as_deref() == Some(id.as_str()) {
                state.focused_layer_id = None;
            }
            state.layers.len() != before
        }
        Msg::ToggleLayerVisibility(id) => match state.layer_mut(&id) {
            Some(layer) => {
                layer.visible = !layer.visible;
                true
            }
            None => false,
        },
        Msg::SetLayerOpacity { id, opacity } => match state.layer_mut(&id) {
            Some(layer) if opacity.is_finite() => {
                layer.opacity = opacity.clamp(0.0, 1.0);
                true
            }
            _ => false,
        },
        Msg::UpdateLayerColor { id, color } => match state.layer_mut(&id) {
            Some(layer) => {
                layer.color = color;
                true
            }
            None => false,
        },
        Msg::SetLayerStyle { id, style } => match state.layer_mut(&id) {
            Some(layer) => {
                layer.apply_style(style);
                true
            }
            None => false,
        },
        Msg::ClassifyLayer { id, field } => match state.layer_mut(&id) {
            Some(layer) => {
                let style = classify_layer(layer, &field);
                layer.style = Some(style);
                true
            }
            None => false,
        },
        Msg::SetLayers(layers) => {
            state.layers = layers;
            true
        }
        Msg::MoveLayerToGroup { layer_id, group_id } => match state.layer_mut(&layer_id) {
            Some(layer) => {
                layer.group_id = group_id;
                true
            }
            None => false,
        },
        Msg::SetGroups(groups) => {
            state.groups = groups;
            true
        }
        Msg::AddGroup(group) => {
            if state.group(&group.id).is_some() {
                return false;
            }
            state.groups.push(group);
            true
        }
        Msg::RemoveGroup(id) => {
            let before = state.groups.len();
            state.groups.retain(|g| g.id != id);
            if state.groups.len() == before {
                return false;
            }
            // Members fall back to the root.
            for layer in state.layers.iter_mut() {
                if layer.group_id.as_deref() == Some(id.as_str()) {
                    layer.group_id = None;
                }
            }
            true
        }
        Msg::ToggleGroupCollapse(id) => match state.groups.iter_mut().find(|g| g.id == id) {
            Some(group) => {
                group.collapsed = !group.collapsed;
                true
            }
            None => false,
        },
        Msg::ToggleGroupVisibility(id) => {
            let Some(group) = state.groups.iter_mut().find(|g| g.id == id) else {
                return false;
            };
            group.visible = !group.visible;
            let visible = group.visible;
            for layer in state.layers.iter_mut() {
                if layer.group_id.as_deref() == Some(id.as_str()) {
                    layer.visible = visible;
                }
            }
            true
        }
        Msg::SetFocusedLayer(id) => {
            state.focused_layer_id = id;
            true
        }
        Msg::BeginLoad => {
            state.generation += 1;
            false
        }
        Msg::LayersLoaded { generation, layers } => {
            if generation != state.generation {
                return false;
            }
            state.layers = layers;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geojson::{Feature, FeatureCollection, Geometry, Properties};
    use crate::model::group::Group;
    use crate::model::layer::{Layer, LayerSource, DEFAULT_LAYER_COLOR};
    use crate::model::style::Style;
    use serde_json::json;

    fn layer(id: &str, group_id: Option<&str>) -> Layer {
        Layer {
            id: id.into(),
            group_id: group_id.map(String::from),
            name: id.into(),
            data: FeatureCollection::default(),
            visible: true,
            opacity: 1.0,
            color: DEFAULT_LAYER_COLOR.into(),
            source: LayerSource::Database,
            style: None,
        }
    }

    fn state_with_group() -> MapState {
        let mut state = MapState::new();
        update(&mut state, Msg::AddGroup(Group::new("g1", "Parks")));
        update(&mut state, Msg::AddLayer(layer("a", Some("g1"))));
        update(&mut state, Msg::AddLayer(layer("b", Some("g1"))));
        update(&mut state, Msg::AddLayer(layer("c", None)));
        state
    }

    #[test]
    fn duplicate_layer_is_ignored() {
        let mut state = state_with_group();
        assert!(!update(&mut state, Msg::AddLayer(layer("a", None))));
        assert_eq!(state.layers.len(), 3);
        assert_eq!(state.layer("a").unwrap().group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn group_visibility_cascades_to_members_only() {
        let mut state = state_with_group();
        update(&mut state, Msg::ToggleLayerVisibility("b".into()));
        assert!(!state.layer("b").unwrap().visible);

        update(&mut state, Msg::ToggleGroupVisibility("g1".into()));
        assert!(!state.group("g1").unwrap().visible);
        assert!(state.layers_in_group("g1").all(|l| !l.visible));
        assert!(state.layer("c").unwrap().visible);

        // Showing the group again shows every member, including the one hidden before.
        update(&mut state, Msg::ToggleGroupVisibility("g1".into()));
        assert!(state.layers_in_group("g1").all(|l| l.visible));
    }

    #[test]
    fn layer_can_be_shown_under_hidden_group() {
        let mut state = state_with_group();
        update(&mut state, Msg::ToggleGroupVisibility("g1".into()));
        update(&mut state, Msg::ToggleLayerVisibility("a".into()));
        assert!(state.layer("a").unwrap().visible);
        assert!(!state.group("g1").unwrap().visible);
    }

    #[test]
    fn removing_group_orphans_members() {
        let mut state = state_with_group();
        assert!(update(&mut state, Msg::RemoveGroup("g1".into())));
        assert!(state.groups.is_empty());
        assert!(state.layers.iter().all(|l| l.group_id.is_none()));
        assert_eq!(state.root_layers().count(), 3);
    }

    #[test]
    fn stale_load_results_are_discarded() {
        let mut state = MapState::new();
        update(&mut state, Msg::BeginLoad);
        let stale = state.generation;
        update(&mut state, Msg::BeginLoad);
        let current = state.generation;

        assert!(!update(
            &mut state,
            Msg::LayersLoaded {
                generation: stale,
                layers: vec![layer("old", None)],
            }
        ));
        assert!(state.layers.is_empty());

        assert!(update(
            &mut state,
            Msg::LayersLoaded {
                generation: current,
                layers: vec![layer("new", None)],
            }
        ));
        assert_eq!(state.layers[0].id, "new");
    }

    #[test]
    fn classify_sets_categorized_style() {
        let mut state = MapState::new();
        let mut l = layer("a", None);
        for kind in ["b", "a"] {
            let mut props = Properties::new();
            props.insert("kind".into(), json!(kind));
            l.data
                .features
                .push(Feature::new(Geometry::point(0.0, 0.0), props));
        }
        update(&mut state, Msg::AddLayer(l));
        update(
            &mut state,
            Msg::ClassifyLayer {
                id: "a".into(),
                field: "kind".into(),
            },
        );

        match &state.layer("a").unwrap().style {
            Some(Style::Categorized { field, class_map, .. }) => {
                assert_eq!(field, "kind");
                assert_eq!(class_map.keys().collect::<Vec<_>>(), ["a", "b"]);
            }
            other => panic!("unexpected style {other:?}"),
        }
    }

    #[test]
    fn opacity_is_clamped() {
        let mut state = state_with_group();
        update(
            &mut state,
            Msg::SetLayerOpacity {
                id: "a".into(),
                opacity: 1.7,
            },
        );
        assert_eq!(state.layer("a").unwrap().opacity, 1.0);
    }

    #[test]
    fn removing_focused_layer_clears_focus() {
        let mut state = state_with_group();
        update(&mut state, Msg::SetFocusedLayer(Some("c".into())));
        update(&mut state, Msg::RemoveLayer("c".into()));
        assert_eq!(state.focused_layer_id, None);
    }
}
