use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};
use log::error;

/// `GET /api/layers`
pub async fn list(store: web::Data<LayerStore>) -> HttpResponse {
    match store.get_saved_layers().await {
        Ok(layers) => HttpResponse::Ok().json(layers),
        Err(e) => {
            error!("Error loading saved layers: {}", e);
            e.error_response()
        }
    }
}

/// Actix web handler for the `GET /api/layers/{layer_id}` endpoint.
///
/// # Returns
/// - `200 OK` with the reconciled `Layer`.
/// - `404 Not Found` if no collection has this id.
pub async fn process(store: web::Data<LayerStore>, layer_id: web::Path<String>) -> HttpResponse {
    match store.get_layer(&layer_id).await {
        Ok(layer) => HttpResponse::Ok().json(layer),
        Err(e) => e.error_response(),
    }
}
