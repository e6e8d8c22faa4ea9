//! # Schema Introspection
//!
//! Lets a client browse an unknown PostgreSQL database before importing from
//! it: connectivity check, schemas, tables of a schema and columns of a table.
//! Every call opens a single connection and closes it before returning.

use super::connection::with_connection;
use super::identifiers::schema_or_default;
use crate::error::{error_body, ProxyError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::model::connection::{ColumnDescriptor, ConnectionConfig};
use common::requests::{CheckConnectionResponse, ListColumnsRequest, ListTablesRequest};
use log::{error, info};

const SYSTEM_SCHEMAS: [&str; 3] = ["information_schema", "pg_catalog", "pg_toast"];

/// Catalog schemas hidden from the schema list.
pub fn is_system_schema(name: &str) -> bool {
    SYSTEM_SCHEMAS.contains(&name) || name.starts_with("pg_")
}

pub async fn check_connection(config: &ConnectionConfig) -> Result<(), ProxyError> {
    with_connection(config, |conn| {
        Box::pin(async move {
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&mut *conn)
                .await?;
            Ok(())
        })
    })
    .await
}

/// User schemas ordered by name.
pub async fn list_schemas(config: &ConnectionConfig) -> Result<Vec<String>, ProxyError> {
    let schemas = with_connection(config, |conn| {
        Box::pin(async move {
            let names = sqlx::query_scalar::<_, String>(
                "SELECT schema_name::text FROM information_schema.schemata ORDER BY schema_name",
            )
            .fetch_all(&mut *conn)
            .await?;
            Ok(names)
        })
    })
    .await?;
    Ok(schemas
        .into_iter()
        .filter(|name| !is_system_schema(name))
        .collect())
}

/// Tables and views of `schema` (default `public`) ordered by name.
pub async fn list_tables(
    config: &ConnectionConfig,
    schema: Option<&str>,
) -> Result<Vec<String>, ProxyError> {
    let schema = schema_or_default(schema).to_string();
    with_connection(config, |conn| {
        Box::pin(async move {
            let names = sqlx::query_scalar::<_, String>(
                "SELECT table_name::text FROM information_schema.tables
                 WHERE table_schema = $1
                 ORDER BY table_name",
            )
            .bind(schema)
            .fetch_all(&mut *conn)
            .await?;
            Ok(names)
        })
    })
    .await
}

/// Columns of `schema.table` in declaration order.
pub async fn list_columns(
    config: &ConnectionConfig,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ColumnDescriptor>, ProxyError> {
    let schema = schema_or_default(schema).to_string();
    let table = table.to_string();
    with_connection(config, |conn| {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, (String, String)>(
                "SELECT column_name::text, data_type::text FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
            )
            .bind(schema)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;
            Ok(rows
                .into_iter()
                .map(|(name, data_type)| ColumnDescriptor { name, data_type })
                .collect())
        })
    })
    .await
}

/// Actix web handler for the `POST /api/check-connection` endpoint.
///
/// # Arguments
/// * `payload` - Host, port, user, password and database to try.
///
/// # Returns
/// - `200 OK` with `{success: true, message}` once `SELECT 1` succeeds.
/// - `400 Bad Request` with `{error}` on any failure.
pub async fn check_connection_process(
    payload: web::Json<ConnectionConfig>,
) -> HttpResponse {
    match check_connection(&payload).await {
        Ok(()) => {
            info!("Connection check to {} succeeded", *payload);
            HttpResponse::Ok().json(CheckConnectionResponse {
                success: true,
                message: "Connected successfully".to_string(),
            })
        }
        Err(e) => {
            error!("Connection check to {} failed: {}", *payload, e);
            error_body(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// `POST /api/list-schemas`
pub async fn list_schemas_process(payload: web::Json<ConnectionConfig>) -> HttpResponse {
    match list_schemas(&payload).await {
        Ok(schemas) => HttpResponse::Ok().json(schemas),
        Err(e) => {
            error!("Listing schemas on {} failed: {}", *payload, e);
            e.error_response()
        }
    }
}

/// `POST /api/list-tables`
pub async fn list_tables_process(payload: web::Json<ListTablesRequest>) -> HttpResponse {
    match list_tables(&payload.connection, payload.schema.as_deref()).await {
        Ok(tables) => HttpResponse::Ok().json(tables),
        Err(e) => {
            error!("Listing tables on {} failed: {}", payload.connection, e);
            e.error_response()
        }
    }
}

/// `POST /api/list-columns`
pub async fn list_columns_process(payload: web::Json<ListColumnsRequest>) -> HttpResponse {
    match list_columns(&payload.connection, payload.schema.as_deref(), &payload.table).await {
        Ok(columns) => HttpResponse::Ok().json(columns),
        Err(e) => {
            error!(
                "Listing columns of {} on {} failed: {}",
                payload.table, payload.connection, e
            );
            e.error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_schemas_are_hidden() {
        for name in ["information_schema", "pg_catalog", "pg_toast", "pg_temp_1"] {
            assert!(is_system_schema(name), "{name}");
        }
        for name in ["public", "gis", "pgadmin", "staging"] {
            assert!(!is_system_schema(name), "{name}");
        }
    }
}
