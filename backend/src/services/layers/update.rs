//! Partial updates of a saved layer. Each answers `204` on success.

use crate::error::StoreError;
use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};
use common::requests::{RenameLayerRequest, UpdateLayerGroupRequest, UpdateStyleRequest};
use log::error;

fn respond(action: &str, id: &str, result: Result<(), StoreError>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("Error updating {} of layer {}: {}", action, id, e);
            e.error_response()
        }
    }
}

/// `PUT /api/layers/{layer_id}/style`
pub async fn style(
    store: web::Data<LayerStore>,
    layer_id: web::Path<String>,
    payload: web::Json<UpdateStyleRequest>,
) -> HttpResponse {
    let result = store
        .update_layer_style(&layer_id, payload.into_inner().style)
        .await;
    respond("style", &layer_id, result)
}

/// `PUT /api/layers/{layer_id}/group`
pub async fn group(
    store: web::Data<LayerStore>,
    layer_id: web::Path<String>,
    payload: web::Json<UpdateLayerGroupRequest>,
) -> HttpResponse {
    let result = store
        .update_layer_group(&layer_id, payload.into_inner().group_id)
        .await;
    respond("group", &layer_id, result)
}

/// `PUT /api/layers/{layer_id}/name`
pub async fn name(
    store: web::Data<LayerStore>,
    layer_id: web::Path<String>,
    payload: web::Json<RenameLayerRequest>,
) -> HttpResponse {
    let result = store.rename_layer(&layer_id, &payload.name).await;
    respond("name", &layer_id, result)
}
