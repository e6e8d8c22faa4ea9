use crate::store::LayerStore;
use actix_web::{web, HttpResponse, ResponseError};
use common::requests::{CreateGroupRequest, UpdateGroupRequest};
use log::error;

/// `GET /api/groups`
pub async fn list(store: web::Data<LayerStore>) -> HttpResponse {
    match store.get_groups().await {
        Ok(groups) => HttpResponse::Ok().json(groups),
        Err(e) => {
            error!("Error loading groups: {}", e);
            e.error_response()
        }
    }
}

/// `POST /api/groups`
pub async fn create(
    store: web::Data<LayerStore>,
    payload: web::Json<CreateGroupRequest>,
) -> HttpResponse {
    match store.create_group(&payload.name).await {
        Ok(group) => HttpResponse::Created().json(group),
        Err(e) => e.error_response(),
    }
}

/// `PUT /api/groups/{group_id}`
pub async fn update(
    store: web::Data<LayerStore>,
    group_id: web::Path<String>,
    payload: web::Json<UpdateGroupRequest>,
) -> HttpResponse {
    match store
        .update_group(&group_id, payload.collapsed, payload.visible)
        .await
    {
        Ok(group) => HttpResponse::Ok().json(group),
        Err(e) => e.error_response(),
    }
}

/// `DELETE /api/groups/{group_id}`
pub async fn remove(store: web::Data<LayerStore>, group_id: web::Path<String>) -> HttpResponse {
    match store.delete_group(&group_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("Error deleting group {}: {}", group_id, e);
            e.error_response()
        }
    }
}
