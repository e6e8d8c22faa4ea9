//! # External Layer Fetcher
//!
//! Turns rows of an arbitrary PostgreSQL table into a GeoJSON
//! `FeatureCollection` for `POST /api/fetch-layer`.
//!
//! ## Workflow
//!
//! 1.  **Identifiers**: schema, table and both coordinate columns are quoted
//!     before anything else; a rejected name answers `400` without connecting.
//! 2.  **Query**: a single connection probes for PostGIS, then selects at most
//!     `MAX_ROWS` rows, each as a JSON object next to an optional computed
//!     GeoJSON point.
//! 3.  **Conversion**: `rows_to_features` runs on the rayon pool. Rows keep
//!     the computed geometry when it parses; otherwise the raw coordinate
//!     values are parsed and, when both are finite numbers, become a Point.
//!     Rows with neither are dropped.

use super::connection::with_connection;
use super::identifiers::{fetch_layer_query, FetchTarget, MAX_ROWS};
use crate::error::ProxyError;
use actix_web::{web, HttpResponse, ResponseError};
use common::model::connection::ConnectionConfig;
use common::model::geojson::{Feature, FeatureCollection, Geometry, Properties};
use common::requests::FetchLayerRequest;
use log::{debug, error, info};
use rayon::prelude::*;
use serde_json::Value;
use sqlx::types::Json;

/// One fetched row: the row as a JSON object and the PostGIS-computed
/// GeoJSON geometry, if any.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub properties: Value,
    pub geometry: Option<String>,
}

/// Actix web handler for the `POST /api/fetch-layer` endpoint.
///
/// # Arguments
/// * `payload` - Connection parameters plus `schema`, `table`, `latCol` and `lonCol`.
///
/// # Returns
/// - `200 OK` with a GeoJSON `FeatureCollection` (possibly empty).
/// - `400 Bad Request` when a schema, table or column name is rejected.
/// - `500 Internal Server Error` when connecting or querying fails.
pub async fn process(payload: web::Json<FetchLayerRequest>) -> HttpResponse {
    let request = payload.into_inner();
    match fetch_layer(&request).await {
        Ok(collection) => HttpResponse::Ok().json(collection),
        Err(e) => {
            error!(
                "Fetching layer {} from {} failed: {}",
                request.table, request.connection, e
            );
            e.error_response()
        }
    }
}

pub async fn fetch_layer(request: &FetchLayerRequest) -> Result<FeatureCollection, ProxyError> {
    let target = FetchTarget::new(
        request.schema.as_deref(),
        &request.table,
        &request.lat_col,
        &request.lon_col,
    )?;
    info!("Fetching {} from {}", target, request.connection);

    let rows = fetch_rows(&request.connection, target).await?;
    let lat_col = request.lat_col.clone();
    let lon_col = request.lon_col.clone();
    let total = rows.len();
    let collection =
        tokio::task::spawn_blocking(move || rows_to_features(rows, &lat_col, &lon_col)).await?;
    info!("Fetched {} features from {} rows", collection.len(), total);
    Ok(collection)
}

async fn fetch_rows(
    config: &ConnectionConfig,
    target: FetchTarget,
) -> Result<Vec<RawRow>, ProxyError> {
    with_connection(config, |conn| {
        Box::pin(async move {
            let postgis = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'postgis')",
            )
            .fetch_one(&mut *conn)
            .await?;
            debug!("PostGIS available: {}", postgis);

            let sql = fetch_layer_query(&target, postgis);
            let rows = sqlx::query_as::<_, (Json<Value>, Option<String>)>(&sql)
                .fetch_all(&mut *conn)
                .await?;
            Ok(rows
                .into_iter()
                .map(|(Json(properties), geometry)| RawRow {
                    properties,
                    geometry,
                })
                .collect())
        })
    })
    .await
}

/// Converts fetched rows into features, keeping row order.
///
/// At most `MAX_ROWS` rows are considered. Every returned feature has a
/// geometry.
pub fn rows_to_features(mut rows: Vec<RawRow>, lat_col: &str, lon_col: &str) -> FeatureCollection {
    rows.truncate(MAX_ROWS);
    let features = rows
        .into_par_iter()
        .filter_map(|row| row_to_feature(row, lat_col, lon_col))
        .collect();
    FeatureCollection::new(features)
}

fn row_to_feature(row: RawRow, lat_col: &str, lon_col: &str) -> Option<Feature> {
    let mut properties = match row.properties {
        Value::Object(map) => map,
        _ => Properties::new(),
    };
    coerce_id(&mut properties);

    let geometry = row
        .geometry
        .as_deref()
        .and_then(|text| serde_json::from_str::<Geometry>(text).ok())
        .or_else(|| fallback_point(&properties, lat_col, lon_col))?;
    Some(Feature::new(geometry, properties))
}

fn fallback_point(properties: &Properties, lat_col: &str, lon_col: &str) -> Option<Geometry> {
    let lat = parse_coordinate(properties.get(lat_col)?)?;
    let lon = parse_coordinate(properties.get(lon_col)?)?;
    Some(Geometry::point(lon, lat))
}

/// A finite number from a JSON number or a numeric string.
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

// Clients key features by `id`; bigint and uuid columns arrive as numbers or
// other JSON types.
fn coerce_id(properties: &mut Properties) {
    if let Some(id) = properties.get_mut("id") {
        match id {
            Value::Null | Value::String(_) => {}
            other => *other = Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(properties: Value, geometry: Option<&str>) -> RawRow {
        RawRow {
            properties,
            geometry: geometry.map(str::to_string),
        }
    }

    #[test]
    fn computed_geometry_is_preferred() {
        let rows = vec![row(
            json!({"id": 1, "lat": "0", "lon": "0"}),
            Some(r#"{"type":"Point","coordinates":[-46.63,-23.55]}"#),
        )];
        let collection = rows_to_features(rows, "lat", "lon");
        assert_eq!(collection.features[0].geometry, Geometry::point(-46.63, -23.55));
    }

    #[test]
    fn numeric_columns_fall_back_to_points() {
        let rows = vec![
            row(json!({"name": "a", "lat": -23.5, "lon": -46.6}), None),
            row(json!({"name": "b", "lat": " -22.9 ", "lon": "-43.2"}), None),
            row(json!({"name": "c", "lat": "north", "lon": "-43.2"}), None),
            row(json!({"name": "d", "lat": null, "lon": 1.0}), None),
            row(json!({"name": "e", "lat": "NaN", "lon": "inf"}), None),
            row(json!({"name": "f"}), None),
        ];
        let collection = rows_to_features(rows, "lat", "lon");
        let names: Vec<&Value> = collection
            .features
            .iter()
            .map(|f| &f.properties["name"])
            .collect();
        assert_eq!(names, [&json!("a"), &json!("b")]);
        assert_eq!(collection.features[0].geometry, Geometry::point(-46.6, -23.5));
        assert_eq!(collection.features[1].geometry, Geometry::point(-43.2, -22.9));
    }

    #[test]
    fn unparseable_computed_geometry_uses_fallback() {
        let rows = vec![row(json!({"lat": 1.5, "lon": 2.5}), Some("not geojson"))];
        let collection = rows_to_features(rows, "lat", "lon");
        assert_eq!(collection.features[0].geometry, Geometry::point(2.5, 1.5));
    }

    #[test]
    fn ids_become_strings() {
        let rows = vec![
            row(json!({"id": 42, "lat": 0, "lon": 0}), None),
            row(json!({"id": "abc", "lat": 0, "lon": 0}), None),
            row(json!({"id": null, "lat": 0, "lon": 0}), None),
        ];
        let collection = rows_to_features(rows, "lat", "lon");
        let ids: Vec<&Value> = collection.features.iter().map(|f| &f.properties["id"]).collect();
        assert_eq!(ids, [&json!("42"), &json!("abc"), &Value::Null]);
    }

    #[test]
    fn output_is_capped_and_keeps_row_order() {
        let rows: Vec<RawRow> = (0..60_000)
            .map(|i| row(json!({"n": i, "lat": 0.0, "lon": 0.0}), None))
            .collect();
        let collection = rows_to_features(rows, "lat", "lon");
        assert_eq!(collection.len(), MAX_ROWS);
        assert!(collection
            .features
            .iter()
            .enumerate()
            .all(|(i, f)| f.properties["n"] == json!(i)));
    }

    #[test]
    fn coordinates_must_be_finite_numbers() {
        assert_eq!(parse_coordinate(&json!(12)), Some(12.0));
        assert_eq!(parse_coordinate(&json!("1e2")), Some(100.0));
        assert_eq!(parse_coordinate(&json!("infinity")), None);
        assert_eq!(parse_coordinate(&json!("1e400")), None);
        assert_eq!(parse_coordinate(&json!(true)), None);
        assert_eq!(parse_coordinate(&json!("")), None);
    }
}
