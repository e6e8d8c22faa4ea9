//! HTTP services.
//!
//! ## Sub-modules:
//! - `proxy`: query proxy to external PostgreSQL databases.
//! - `layers`: saved layers.
//! - `groups`: layer groups.
//! - `cache`: local layer cache maintenance.

pub mod cache;
pub mod groups;
pub mod layers;
pub mod proxy;
