//! # Layer Classification Service
//!
//! `POST /api/layers/{layer_id}/classify` colors a saved layer by the values
//! of one property. The categorized style is built with the same
//! `classify_layer` the client-side state uses, then persisted like any other
//! style update so the cache entry follows.

use crate::error::StoreError;
use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};
use common::classification::classify_layer;
use common::model::style::Style;
use common::requests::ClassifyRequest;
use log::{error, info};

/// Actix web handler for `POST /api/layers/{layer_id}/classify`.
///
/// # Arguments
/// * `layer_id` - Collection id from the URL path.
/// * `payload` - The property name to classify by.
///
/// # Returns
/// - `200 OK` with the persisted categorized `Style`.
/// - `400 Bad Request` for an empty field name.
/// - `404 Not Found` for an unknown layer.
pub async fn process(
    store: web::Data<LayerStore>,
    layer_id: web::Path<String>,
    payload: web::Json<ClassifyRequest>,
) -> HttpResponse {
    match classify(&store, &layer_id, &payload.field).await {
        Ok(style) => HttpResponse::Ok().json(style),
        Err(e) => {
            error!("Error classifying layer {}: {}", layer_id, e);
            e.error_response()
        }
    }
}

/// Builds the categorized style for `field` and stores it on the layer.
pub async fn classify(store: &LayerStore, id: &str, field: &str) -> Result<Style, StoreError> {
    let layer = store.get_layer(id).await?;
    let style = classify_layer(&layer, field);
    store.update_layer_style(id, style.clone()).await?;
    if let Style::Categorized { class_map, .. } = &style {
        info!("Classified layer {} by {:?} into {} classes", id, field, class_map.len());
    }
    Ok(style)
}
