pub mod collection;
pub mod connection;
pub mod geojson;
pub mod group;
pub mod layer;
pub mod style;
