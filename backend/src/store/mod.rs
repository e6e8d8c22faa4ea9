//! Persistence store for collections, features and layer groups.
//!
//! Normalizes a GeoJSON `FeatureCollection` into one `collections` row plus one
//! `features` row per feature, and reconstructs layers on read with help from
//! the [`LayerCache`].
//!
//! Each operation opens its own SQLite connection on the blocking thread pool,
//! so independent operations (e.g. the per-collection fetches of
//! `get_saved_layers`) run concurrently.
//!
//! ## Sub-modules:
//! - `schema`: table definitions and per-connection pragmas.
//! - `collections`: collection and feature rows.
//! - `groups`: layer group rows.
//! - `layers`: reconciliation of stored collections with cached layers.

mod collections;
mod groups;
mod layers;
mod schema;

use crate::cache::LayerCache;
use crate::error::StoreError;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct LayerStore {
    path: Arc<PathBuf>,
    cache: LayerCache,
}

impl LayerStore {
    /// Opens (creating if needed) the store at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>, cache: LayerCache) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = connect(&path)?;
        schema::migrate(&conn)?;
        info!("Persistence store ready at {}", path.display());
        Ok(Self {
            path: Arc::new(path),
            cache,
        })
    }

    pub fn cache(&self) -> &LayerCache {
        &self.cache
    }

    /// Runs `f` against a fresh connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || {
            let mut conn = connect(&path)?;
            f(&mut conn)
        })
        .await?
    }
}

fn connect(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    schema::configure(&conn)?;
    Ok(conn)
}

/// Transaction holding the write lock from its first statement. Every
/// read-then-write path must use it: under WAL a deferred transaction that
/// read first cannot wait on the busy timeout when it later writes.
fn write_transaction(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

/// Maps "no row" to `NotFound` for the given entity description.
fn not_found(what: &str, id: &str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    let label = format!("{what} {id}");
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(label),
        other => StoreError::Sqlite(other),
    }
}
