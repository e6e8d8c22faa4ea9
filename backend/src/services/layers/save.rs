use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};
use common::requests::SaveLayerRequest;
use log::error;

/// Actix web handler for the `POST /api/layers` endpoint.
///
/// # Arguments
/// * `store` - Shared persistence store.
/// * `payload` - Name, features, optional metadata and target group.
///
/// # Returns
/// - `201 Created` with the stored `Collection` on success.
/// - `400 Bad Request` for a blank name or an invalid style.
/// - `404 Not Found` when the target group does not exist.
/// - `500 Internal Server Error` if the store cannot be written.
pub async fn process(
    store: web::Data<LayerStore>,
    payload: web::Json<SaveLayerRequest>,
) -> HttpResponse {
    let request = payload.into_inner();
    match store
        .save_layer(&request.name, request.data, request.metadata, request.group_id)
        .await
    {
        Ok(collection) => HttpResponse::Created().json(collection),
        Err(e) => {
            error!("Error saving layer {:?}: {}", request.name, e);
            e.error_response()
        }
    }
}
