use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};

/// `DELETE /api/layers/{layer_id}`
pub async fn process(store: web::Data<LayerStore>, layer_id: web::Path<String>) -> HttpResponse {
    match store.delete_layer(&layer_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
