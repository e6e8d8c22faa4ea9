//! Quoting of caller-supplied PostgreSQL identifiers and construction of the
//! bounded fetch query.
//!
//! Schema, table and column names cannot be bound as parameters, so they are
//! validated and written as delimited identifiers. Every other value that
//! reaches PostgreSQL is a bound parameter.

use crate::error::ProxyError;
use std::fmt;

/// PostgreSQL truncates identifiers past `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

pub const DEFAULT_SCHEMA: &str = "public";

/// Upper bound on rows requested from an external table.
pub const MAX_ROWS: usize = 50_000;

const ROW_ALIAS: &str = "\"_geolayers_row\"";

/// Decimal literals that `float8` parses to a finite, in-range value.
///
/// At most 15 integer digits, 30 fraction digits and a two-digit exponent keep
/// every match between 1e-129 and 1e115, so the cast cannot overflow or
/// underflow. `NaN`, `Infinity` and longer literals are left to the row
/// fallback.
const NUMERIC_PATTERN: &str =
    r"^\s*[-+]?([0-9]{1,15}(\.[0-9]{0,30})?|\.[0-9]{1,30})([eE][-+]?[0-9]{1,2})?\s*$";

/// Returns `name` as a delimited identifier.
///
/// Embedded `"` characters are doubled, so the result is always exactly one
/// identifier. Empty names, names over 63 bytes and names containing control
/// characters are rejected.
pub fn quote_identifier(name: &str) -> Result<String, ProxyError> {
    let reject = |reason| ProxyError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(reject("empty identifier"));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(reject("longer than 63 bytes"));
    }
    if name.chars().any(char::is_control) {
        return Err(reject("contains a control character"));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Schema name to use for lookups, `public` when absent or blank.
pub fn schema_or_default(schema: Option<&str>) -> &str {
    match schema {
        Some(s) if !s.trim().is_empty() => s,
        _ => DEFAULT_SCHEMA,
    }
}

/// `"schema"."table"`, defaulting the schema to `public`.
pub fn qualified_table(schema: Option<&str>, table: &str) -> Result<String, ProxyError> {
    Ok(format!(
        "{}.{}",
        quote_identifier(schema_or_default(schema))?,
        quote_identifier(table)?
    ))
}

/// Quoted names of everything a fetch touches. Built before any connection is
/// opened, so bad input never reaches the database.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTarget {
    pub table: String,
    pub lat: String,
    pub lon: String,
}

impl FetchTarget {
    pub fn new(
        schema: Option<&str>,
        table: &str,
        lat_col: &str,
        lon_col: &str,
    ) -> Result<Self, ProxyError> {
        Ok(Self {
            table: qualified_table(schema, table)?,
            lat: quote_identifier(lat_col)?,
            lon: quote_identifier(lon_col)?,
        })
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.table, self.lat, self.lon)
    }
}

/// Selects every row as a JSON object plus, with PostGIS, a GeoJSON point
/// computed from the coordinate columns.
///
/// The `::float` casts only run on values that look numeric; anything else
/// yields a NULL geometry and is handled by the row fallback instead of
/// failing the whole query. Without PostGIS the geometry column is always
/// NULL.
pub fn fetch_layer_query(target: &FetchTarget, postgis: bool) -> String {
    let geometry = if postgis {
        let lon = format!("{ROW_ALIAS}.{}::text", target.lon);
        let lat = format!("{ROW_ALIAS}.{}::text", target.lat);
        format!(
            "CASE WHEN {lon} ~ '{NUMERIC_PATTERN}' AND {lat} ~ '{NUMERIC_PATTERN}' \
             THEN ST_AsGeoJSON(ST_SetSRID(ST_MakePoint({lon}::float, {lat}::float), 4326)) \
             END"
        )
    } else {
        "NULL::text".to_string()
    };
    format!(
        "SELECT to_json({ROW_ALIAS}) AS properties, {geometry} AS geometry \
         FROM {} AS {ROW_ALIAS} LIMIT {MAX_ROWS}",
        target.table
    )
}
