use crate::model::group::Group;
use crate::model::layer::Layer;
use crate::model::style::Style;

#[derive(Debug, Clone)]
pub enum Msg {
    AddLayer(Layer),
    RemoveLayer(String),
    ToggleLayerVisibility(String),
    SetLayerOpacity { id: String, opacity: f64 },
    UpdateLayerColor { id: String, color: String },
    SetLayerStyle { id: String, style: Option<Style> },
    ClassifyLayer { id: String, field: String },
    SetLayers(Vec<Layer>),
    MoveLayerToGroup { layer_id: String, group_id: Option<String> },
    SetGroups(Vec<Group>),
    AddGroup(Group),
    RemoveGroup(String),
    ToggleGroupCollapse(String),
    ToggleGroupVisibility(String),
    SetFocusedLayer(Option<String>),
    /// Starts a new load cycle; the new generation is readable from `MapState::generation`.
    BeginLoad,
    LayersLoaded { generation: u64, layers: Vec<Layer> },
}
