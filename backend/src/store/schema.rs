use rusqlite::Connection;
use std::time::Duration;

/// Relational shape of the persistence store.
///
/// Features cascade with their collection; deleting a group detaches its
/// collections instead of deleting them.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS layer_groups (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    collapsed  INTEGER NOT NULL DEFAULT 0,
    visible    INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS collections (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    metadata   TEXT NOT NULL DEFAULT '{}',
    group_id   TEXT REFERENCES layer_groups(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS features (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    geom          TEXT NOT NULL,
    properties    TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS features_collection_id ON features(collection_id);
CREATE INDEX IF NOT EXISTS collections_group_id ON collections(group_id);
";

/// Per-connection settings. Foreign keys are off by default in SQLite.
pub fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", true)
}

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.execute_batch(SCHEMA)
}
