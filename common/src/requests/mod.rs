//! JSON payloads of the HTTP API.
//!
//! Query-proxy requests carry the connection parameters at the top level of the
//! body (flattened `ConnectionConfig`) next to the operation's own fields.

use crate::model::collection::CollectionMetadata;
use crate::model::connection::ConnectionConfig;
use crate::model::geojson::FeatureCollection;
use crate::model::style::Style;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/list-tables`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListTablesRequest {
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub schema: Option<String>,
}

/// Body of `POST /api/list-columns`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListColumnsRequest {
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
}

/// Body of `POST /api/fetch-layer`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchLayerRequest {
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
    pub lat_col: String,
    pub lon_col: String,
}

/// Response of `POST /api/check-connection`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConnectionResponse {
    pub success: bool,
    pub message: String,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `POST /api/layers`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLayerRequest {
    pub name: String,
    pub data: FeatureCollection,
    #[serde(default)]
    pub metadata: CollectionMetadata,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Body of `PUT /api/layers/{id}/style`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateStyleRequest {
    pub style: Style,
}

/// Body of `PUT /api/layers/{id}/group`. A `null` group moves the layer to the root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLayerGroupRequest {
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Body of `PUT /api/layers/{id}/name`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenameLayerRequest {
    pub name: String,
}

/// Body of `POST /api/layers/{id}/classify`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifyRequest {
    pub field: String,
}

/// Body of `POST /api/groups`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

/// Body of `PUT /api/groups/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub collapsed: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
}
