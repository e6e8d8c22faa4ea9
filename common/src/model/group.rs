use serde::{Deserialize, Serialize};

/// A named, collapsible container of layers.
///
/// Layers reference their group through `Layer::group_id`; the group does not
/// own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            collapsed: false,
            visible: true,
        }
    }
}

fn visible_by_default() -> bool {
    true
}
