//! Persistent layer cache.
//!
//! A single SQLite table keyed by collection id holding the full `Layer`
//! projection (features included) so reloads skip refetching geometry from the
//! store. The cache is never authoritative: readers must tolerate misses and
//! errors, and the store overwrites group and style on every read.
//!
//! Store mutations reach the cache only through [`LayerCache::invalidate`],
//! which swallows and logs failures.

use crate::error::CacheError;
use common::model::layer::Layer;
use common::model::style::Style;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS layers (
    id   TEXT PRIMARY KEY,
    data TEXT NOT NULL
)";

/// What happened to a collection, as far as its cache entry is concerned.
#[derive(Debug, Clone)]
pub enum CacheChange {
    /// A fresh projection; replaces any existing entry.
    Stored(Layer),
    Removed,
    /// Only the style changed; cached features are kept.
    Style(Style),
    Group(Option<String>),
    Renamed(String),
}

#[derive(Clone)]
pub struct LayerCache {
    path: Arc<PathBuf>,
}

impl LayerCache {
    /// Does not touch the disk; the table is created on first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Layer>, CacheError> {
        let id = id.to_string();
        self.run(move |conn| read_entry(conn, &id)).await
    }

    pub async fn set(&self, layer: &Layer) -> Result<(), CacheError> {
        let id = layer.id.clone();
        let data = serde_json::to_string(layer)?;
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO layers (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                params![id, data],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn remove(&self, id: &str) -> Result<(), CacheError> {
        let id = id.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM layers WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }

    /// Drops every entry. Backs the manual cache reset.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.run(|conn| {
            conn.execute("DELETE FROM layers", [])?;
            Ok(())
        })
        .await
    }

    pub async fn ids(&self) -> Result<Vec<String>, CacheError> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM layers ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(ids)
        })
        .await
    }

    /// Deletes entries whose id is not in `live`. Returns how many were evicted.
    pub async fn retain(&self, live: &[String]) -> Result<usize, CacheError> {
        let live: HashSet<String> = live.iter().cloned().collect();
        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let stale: Vec<String> = {
                let mut stmt = tx.prepare("SELECT id FROM layers")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids.into_iter().filter(|id| !live.contains(id)).collect()
            };
            for id in &stale {
                tx.execute("DELETE FROM layers WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(stale.len())
        })
        .await
    }

    /// Applies a store mutation to the cached entry of `id`.
    ///
    /// Partial changes (style, group, name) patch an existing entry and are
    /// skipped when there is none. Errors are logged, never returned.
    pub async fn invalidate(&self, id: &str, change: CacheChange) {
        let result = match change {
            CacheChange::Stored(layer) => self.set(&layer).await,
            CacheChange::Removed => self.remove(id).await,
            CacheChange::Style(style) => self.patch(id, |layer| layer.apply_style(Some(style))).await,
            CacheChange::Group(group_id) => self.patch(id, |layer| layer.group_id = group_id).await,
            CacheChange::Renamed(name) => self.patch(id, |layer| layer.name = name).await,
        };
        if let Err(e) = result {
            warn!("Cache update for layer {} failed: {}", id, e);
        }
    }

    async fn patch<F>(&self, id: &str, apply: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut Layer),
    {
        match self.get(id).await? {
            Some(mut layer) => {
                apply(&mut layer);
                self.set(&layer).await
            }
            None => {
                debug!("No cache entry for layer {}, patch skipped", id);
                Ok(())
            }
        }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, CacheError> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(path.as_path())?;
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch(SCHEMA)?;
            f(&mut conn)
        })
        .await?
    }
}

fn read_entry(conn: &mut Connection, id: &str) -> Result<Option<Layer>, CacheError> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM layers WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    match data {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}
