//! # Layer Service Module
//!
//! Routes under `/api/layers` for saved layers: listing with cache
//! reconciliation, saving uploaded or fetched feature collections, deleting,
//! and the per-layer style, group and name updates.
//!
//! ## Sub-modules:
//! - `get`: listing all saved layers and loading one by id.
//! - `save`: persisting a new collection.
//! - `delete`: removing a collection and its cache entry.
//! - `update`: style, group and name changes.
//! - `classify`: building and persisting a categorized style from a field.

mod classify;
mod delete;
mod get;
mod save;
mod update;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

/// The base path for all layer-related API endpoints.
const API_PATH: &str = "/api/layers";

/// Configures and returns the Actix `Scope` for all layer-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: every saved layer, newest first.
/// *   **`POST /`**: saves a `SaveLayerRequest`, answers `201` with the new collection.
/// *   **`GET /{layer_id}`**: one saved layer.
/// *   **`DELETE /{layer_id}`**: deletes the layer and its features.
/// *   **`PUT /{layer_id}/style`**: replaces the layer's style.
/// *   **`PUT /{layer_id}/group`**: moves the layer into a group, or to the root on `null`.
/// *   **`PUT /{layer_id}/name`**: renames the layer.
/// *   **`POST /{layer_id}/classify`**: categorizes the layer by a property and
///     answers with the persisted style.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("", post().to(save::process))
        .route("/{layer_id}", get().to(get::process))
        .route("/{layer_id}", delete().to(delete::process))
        .route("/{layer_id}/style", put().to(update::style))
        .route("/{layer_id}/group", put().to(update::group))
        .route("/{layer_id}/name", put().to(update::name))
        .route("/{layer_id}/classify", post().to(classify::process))
}
