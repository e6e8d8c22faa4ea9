//! # Group Service Module
//!
//! Routes under `/api/groups` for the folders layers are organized into.
//! Deleting a group never deletes its layers; they move to the root.

mod handlers;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

/// The base path for all group-related API endpoints.
const API_PATH: &str = "/api/groups";

/// # Registered Routes:
///
/// *   **`GET /`**: all groups in creation order.
/// *   **`POST /`**: creates a group from `{name}`, answers `201`.
/// *   **`PUT /{group_id}`**: persists `collapsed`/`visible` toggles.
/// *   **`DELETE /{group_id}`**: deletes the group, detaching its layers.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(handlers::list))
        .route("", post().to(handlers::create))
        .route("/{group_id}", put().to(handlers::update))
        .route("/{group_id}", delete().to(handlers::remove))
}
