//! Types and pure logic shared by the layer server and its clients.
//!
//! - `model`: GeoJSON features, persisted collections, groups, styles and the
//!   runtime `Layer` projection.
//! - `requests`: JSON payloads exchanged over the HTTP API.
//! - `classification`: deterministic value-to-color assignment for categorized styles.
//! - `map_state`: the in-memory layer/group tree and its `update` reducer.

pub mod classification;
pub mod map_state;
pub mod model;
pub mod requests;
