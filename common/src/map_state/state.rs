use crate::model::group::Group;
use crate::model::layer::Layer;

/// Layers and groups currently shown, plus the load-cycle bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MapState {
    /// Render order; a layer id appears at most once.
    pub layers: Vec<Layer>,
    pub groups: Vec<Group>,
    pub focused_layer_id: Option<String>,
    /// Incremented by `Msg::BeginLoad`.
    pub generation: u64,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Layers assigned to `group_id`, in render order.
    pub fn layers_in_group<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Layer> {
        self.layers
            .iter()
            .filter(move |l| l.group_id.as_deref() == Some(group_id))
    }

    /// Layers not assigned to any known group.
    pub fn root_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| match &l.group_id {
            None => true,
            Some(id) => self.group(id).is_none(),
        })
    }
}
