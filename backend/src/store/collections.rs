//! Collection and feature rows.
//!
//! Synchronous helpers run inside `LayerStore::run`, plus the async store
//! operations that combine them with cache invalidation.

use super::{not_found, write_transaction, LayerStore};
use crate::cache::CacheChange;
use crate::error::StoreError;
use common::model::collection::{Collection, CollectionMetadata};
use common::model::geojson::{Feature, FeatureCollection, Geometry, Properties};
use common::model::layer::Layer;
use common::model::style::Style;
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use serde_json::{Map, Value};
use uuid::Uuid;

const SELECT_COLLECTION: &str =
    "SELECT id, name, metadata, group_id, created_at FROM collections";

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<(Collection, String)> {
    let metadata: String = row.get(2)?;
    Ok((
        Collection {
            id: row.get(0)?,
            name: row.get(1)?,
            metadata: CollectionMetadata::default(),
            group_id: row.get(3)?,
            created_at: row.get(4)?,
        },
        metadata,
    ))
}

fn with_metadata((mut collection, metadata): (Collection, String)) -> Result<Collection, StoreError> {
    collection.metadata = serde_json::from_str(&metadata)?;
    Ok(collection)
}

/// All collections, newest first. Insertion order breaks timestamp ties.
pub(super) fn list(conn: &Connection) -> Result<Vec<Collection>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLLECTION} ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map([], collection_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(with_metadata).collect()
}

pub(super) fn find(conn: &Connection, id: &str) -> Result<Collection, StoreError> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLLECTION} WHERE id = ?1"),
            params![id],
            collection_from_row,
        )
        .map_err(not_found("collection", id))?;
    with_metadata(row)
}

/// Rebuilds the feature collection of `collection_id` in insertion order.
pub(super) fn load_features(
    conn: &Connection,
    collection_id: &str,
) -> Result<FeatureCollection, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT geom, properties FROM features WHERE collection_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![collection_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let features = rows
        .into_iter()
        .map(|(geom, properties)| {
            let geometry: Geometry = serde_json::from_str(&geom)?;
            let properties: Option<Properties> = serde_json::from_str(&properties)?;
            Ok(Feature::new(geometry, properties.unwrap_or_default()))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok(FeatureCollection::new(features))
}

/// Inserts the collection row and its features in one transaction.
fn insert(
    conn: &mut Connection,
    name: &str,
    data: &FeatureCollection,
    metadata: &CollectionMetadata,
    group_id: Option<&str>,
) -> Result<Collection, StoreError> {
    let tx = write_transaction(conn)?;

    if let Some(group_id) = group_id {
        super::groups::ensure_exists(&tx, group_id)?;
    }

    let id = Uuid::new_v4().to_string();
    tx.execute(
        "INSERT INTO collections (id, name, metadata, group_id) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, serde_json::to_string(metadata)?, group_id],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO features (collection_id, geom, properties) VALUES (?1, ?2, ?3)",
        )?;
        for feature in &data.features {
            stmt.execute(params![
                id,
                serde_json::to_string(&feature.geometry)?,
                serde_json::to_string(&feature.properties)?,
            ])?;
        }
    }

    let created_at: String = tx.query_row(
        "SELECT created_at FROM collections WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    tx.commit()?;

    Ok(Collection {
        id,
        name: name.to_string(),
        metadata: metadata.clone(),
        group_id: group_id.map(String::from),
        created_at,
    })
}

/// Shallow-merges `style` into the stored metadata object.
fn write_style(conn: &mut Connection, id: &str, style: &Style) -> Result<(), StoreError> {
    let tx = write_transaction(conn)?;
    let raw: String = tx
        .query_row(
            "SELECT metadata FROM collections WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .map_err(not_found("collection", id))?;

    let mut metadata = match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    metadata.insert("style".to_string(), serde_json::to_value(style)?);

    tx.execute(
        "UPDATE collections SET metadata = ?1 WHERE id = ?2",
        params![Value::Object(metadata).to_string(), id],
    )?;
    tx.commit()?;
    Ok(())
}

fn expect_updated(changed: usize, id: &str) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound(format!("collection {id}")))
    } else {
        Ok(())
    }
}

fn require_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

impl LayerStore {
    /// Persists a feature collection and caches its layer projection.
    ///
    /// The collection row and all feature rows are written in one transaction:
    /// a failure leaves nothing behind.
    pub async fn save_layer(
        &self,
        name: &str,
        data: FeatureCollection,
        metadata: CollectionMetadata,
        group_id: Option<String>,
    ) -> Result<Collection, StoreError> {
        let name = require_name(name)?;
        if let Some(style) = &metadata.style {
            style.validate()?;
        }

        let (collection, data) = self
            .run(move |conn| {
                let collection = insert(conn, &name, &data, &metadata, group_id.as_deref())?;
                Ok((collection, data))
            })
            .await?;
        info!(
            "Saved collection {} ({}) with {} features",
            collection.id,
            collection.name,
            data.len()
        );

        let layer = Layer::from_collection(&collection, data);
        self.cache
            .invalidate(&collection.id, CacheChange::Stored(layer))
            .await;
        Ok(collection)
    }

    pub async fn get_collection(&self, id: &str) -> Result<Collection, StoreError> {
        let id = id.to_string();
        self.run(move |conn| find(conn, &id)).await
    }

    /// Deletes a collection; its features go with it. Cache cleanup failures
    /// are logged only.
    pub async fn delete_layer(&self, id: &str) -> Result<(), StoreError> {
        let owned = id.to_string();
        self.run(move |conn| {
            let changed = conn.execute("DELETE FROM collections WHERE id = ?1", params![owned])?;
            expect_updated(changed, &owned)
        })
        .await?;
        info!("Deleted collection {}", id);

        self.cache.invalidate(id, CacheChange::Removed).await;
        Ok(())
    }

    pub async fn update_layer_style(&self, id: &str, style: Style) -> Result<(), StoreError> {
        style.validate()?;
        let owned = id.to_string();
        let stored = style.clone();
        self.run(move |conn| write_style(conn, &owned, &stored))
            .await?;
        debug!("Updated style of collection {}", id);

        self.cache.invalidate(id, CacheChange::Style(style)).await;
        Ok(())
    }

    pub async fn rename_layer(&self, id: &str, name: &str) -> Result<(), StoreError> {
        let name = require_name(name)?;
        let owned = id.to_string();
        let stored = name.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE collections SET name = ?1 WHERE id = ?2",
                params![stored, owned],
            )?;
            expect_updated(changed, &owned)
        })
        .await?;

        self.cache.invalidate(id, CacheChange::Renamed(name)).await;
        Ok(())
    }

    /// Moves a collection into `group_id`, or to the root when `None`.
    pub async fn update_layer_group(
        &self,
        id: &str,
        group_id: Option<String>,
    ) -> Result<(), StoreError> {
        let owned = id.to_string();
        let target = group_id.clone();
        self.run(move |conn| {
            let tx = write_transaction(conn)?;
            if let Some(group_id) = &target {
                super::groups::ensure_exists(&tx, group_id)?;
            }
            let changed = tx.execute(
                "UPDATE collections SET group_id = ?1 WHERE id = ?2",
                params![target, owned],
            )?;
            expect_updated(changed, &owned)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        self.cache.invalidate(id, CacheChange::Group(group_id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{parks, store};
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;
    use tempfile::TempDir;

    #[actix_web::test]
    async fn save_then_load_round_trips_features() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let collection = store
            .save_layer("parks", parks(), CollectionMetadata::default(), None)
            .await
            .unwrap();

        let id = collection.id.clone();
        let loaded = store.run(move |conn| load_features(conn, &id)).await.unwrap();
        assert_eq!(loaded, parks());
    }

    #[actix_web::test]
    async fn save_rejects_blank_name_and_bad_style() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store
            .save_layer("  ", parks(), CollectionMetadata::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));

        let metadata = CollectionMetadata::with_style(Style::Simple {
            color: "blue".into(),
            weight: 2.0,
        });
        let err = store.save_layer("parks", parks(), metadata, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Style(_)));
    }

    #[actix_web::test]
    async fn save_into_unknown_group_leaves_no_collection() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store
            .save_layer(
                "parks",
                parks(),
                CollectionMetadata::default(),
                Some("missing".into()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.run(|conn| list(conn)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn style_update_merges_into_existing_metadata() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut metadata = CollectionMetadata::default();
        metadata
            .extra
            .insert("savedAt".into(), json!("2024-05-01T10:00:00Z"));
        let collection = store.save_layer("parks", parks(), metadata, None).await.unwrap();

        let style = Style::BorderOnly {
            color: "#10b981".into(),
            weight: 1.5,
        };
        store
            .update_layer_style(&collection.id, style.clone())
            .await
            .unwrap();

        let reloaded = store.get_collection(&collection.id).await.unwrap();
        assert_eq!(reloaded.metadata.style, Some(style));
        assert_eq!(reloaded.metadata.extra["savedAt"], "2024-05-01T10:00:00Z");
    }

    #[actix_web::test]
    async fn mutations_on_unknown_ids_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let style = Style::Simple {
            color: "#fff".into(),
            weight: 1.0,
        };

        assert!(matches!(
            store.update_layer_style("nope", style).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_layer("nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.rename_layer("nope", "x").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_layer_group("nope", None).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn delete_cascades_to_features() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let collection = store
            .save_layer("parks", parks(), CollectionMetadata::default(), None)
            .await
            .unwrap();
        store.delete_layer(&collection.id).await.unwrap();

        let remaining: i64 = store
            .run(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[actix_web::test]
    async fn listing_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for name in ["first", "second", "third"] {
            store
                .save_layer(name, parks(), CollectionMetadata::default(), None)
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .run(|conn| list(conn))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["third", "second", "first"]);
    }
}
