//! # Query Proxy Service Module
//!
//! Endpoints that talk to an external PostgreSQL database on behalf of the
//! client. Each request carries its own connection parameters; nothing about
//! the external database is stored.
//!
//! ## Sub-modules:
//! - `identifiers`: quoting of schema/table/column names and the fetch query.
//! - `connection`: one-shot connections that are always closed.
//! - `introspect`: connectivity check and schema/table/column listing.
//! - `fetch_layer`: table rows to GeoJSON features.

mod connection;
pub mod fetch_layer;
pub mod identifiers;
pub mod introspect;

use actix_web::web::{self, post};

/// Registers the proxy routes as individual resources, since they share the
/// `/api` prefix with the layer and group scopes.
///
/// # Registered Routes:
///
/// *   **`POST /api/check-connection`**: `200 {success, message}` or `400 {error}`.
/// *   **`POST /api/list-schemas`**: user schemas as a JSON array of names.
/// *   **`POST /api/list-tables`**: tables of `schema` (default `public`).
/// *   **`POST /api/list-columns`**: `[{name, dataType}]` of `schema.table`.
/// *   **`POST /api/fetch-layer`**: a `FeatureCollection` built from
///     `schema.table` using `latCol`/`lonCol`; `400` for rejected identifiers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/check-connection",
        post().to(introspect::check_connection_process),
    )
    .route("/api/list-schemas", post().to(introspect::list_schemas_process))
    .route("/api/list-tables", post().to(introspect::list_tables_process))
    .route("/api/list-columns", post().to(introspect::list_columns_process))
    .route("/api/fetch-layer", post().to(fetch_layer::process));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use common::requests::ErrorResponse;
    use serde_json::json;

    #[actix_web::test]
    async fn rejected_identifier_answers_400_without_connecting() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        // Nothing listens on this host; reaching it would fail with 500.
        let req = test::TestRequest::post()
            .uri("/api/fetch-layer")
            .set_json(json!({
                "host": "unreachable.invalid",
                "user": "postgres",
                "password": "secret",
                "database": "gis",
                "table": "parks\u{0}",
                "latCol": "lat",
                "lonCol": "lon"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.contains("invalid identifier"));
    }

    #[actix_web::test]
    async fn malformed_body_is_a_client_error() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/list-columns")
            .set_json(json!({"host": "db", "port": "not a port"}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
