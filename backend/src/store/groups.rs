use super::{not_found, write_transaction, LayerStore};
use crate::cache::CacheChange;
use crate::error::StoreError;
use common::model::group::Group;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        collapsed: row.get(2)?,
        visible: row.get(3)?,
    })
}

pub(super) fn ensure_exists(conn: &Connection, id: &str) -> Result<(), StoreError> {
    conn.query_row(
        "SELECT 1 FROM layer_groups WHERE id = ?1",
        params![id],
        |_| Ok(()),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("group {id}")))
}

fn find(conn: &Connection, id: &str) -> Result<Group, StoreError> {
    conn.query_row(
        "SELECT id, name, collapsed, visible FROM layer_groups WHERE id = ?1",
        params![id],
        group_from_row,
    )
    .map_err(not_found("group", id))
}

impl LayerStore {
    /// All groups in creation order.
    pub async fn get_groups(&self) -> Result<Vec<Group>, StoreError> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, collapsed, visible FROM layer_groups
                 ORDER BY created_at, rowid",
            )?;
            let groups = stmt
                .query_map([], group_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(groups)
        })
        .await
    }

    pub async fn create_group(&self, name: &str) -> Result<Group, StoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Invalid("group name must not be empty".to_string()));
        }
        let group = Group::new(Uuid::new_v4().to_string(), name);
        let stored = group.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO layer_groups (id, name, collapsed, visible) VALUES (?1, ?2, ?3, ?4)",
                params![stored.id, stored.name, stored.collapsed, stored.visible],
            )?;
            Ok(())
        })
        .await?;
        info!("Created group {} ({})", group.id, group.name);
        Ok(group)
    }

    /// Persists the collapse/visibility toggles; `None` keeps the stored value.
    pub async fn update_group(
        &self,
        id: &str,
        collapsed: Option<bool>,
        visible: Option<bool>,
    ) -> Result<Group, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE layer_groups
                 SET collapsed = COALESCE(?2, collapsed), visible = COALESCE(?3, visible)
                 WHERE id = ?1",
                params![id, collapsed, visible],
            )?;
            find(conn, &id)
        })
        .await
    }

    /// Deletes a group. Its collections move to the root, in the store and in
    /// their cache entries.
    pub async fn delete_group(&self, id: &str) -> Result<(), StoreError> {
        let owned = id.to_string();
        let members = self
            .run(move |conn| {
                let tx = write_transaction(conn)?;
                let members = {
                    let mut stmt = tx.prepare("SELECT id FROM collections WHERE group_id = ?1")?;
                    let ids = stmt
                        .query_map(params![owned], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, _>>()?;
                    ids
                };
                tx.execute(
                    "UPDATE collections SET group_id = NULL WHERE group_id = ?1",
                    params![owned],
                )?;
                let deleted = tx.execute("DELETE FROM layer_groups WHERE id = ?1", params![owned])?;
                if deleted == 0 {
                    return Err(StoreError::NotFound(format!("group {owned}")));
                }
                tx.commit()?;
                Ok(members)
            })
            .await?;
        info!("Deleted group {}, {} layers moved to root", id, members.len());

        for member in members {
            self.cache.invalidate(&member, CacheChange::Group(None)).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{parks, store};
    use crate::error::StoreError;
    use common::model::collection::CollectionMetadata;
    use tempfile::TempDir;

    #[actix_web::test]
    async fn create_and_list_groups() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let a = store.create_group("Transport").await.unwrap();
        let b = store.create_group(" Parks ").await.unwrap();

        assert_eq!(b.name, "Parks");
        assert!(b.visible);
        assert!(!b.collapsed);
        assert_eq!(store.get_groups().await.unwrap(), vec![a, b]);
    }

    #[actix_web::test]
    async fn blank_group_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).create_group("   ").await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[actix_web::test]
    async fn update_group_changes_only_given_flags() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let group = store.create_group("Parks").await.unwrap();

        let updated = store.update_group(&group.id, None, Some(false)).await.unwrap();
        assert!(!updated.visible);
        assert!(!updated.collapsed);

        let updated = store.update_group(&group.id, Some(true), None).await.unwrap();
        assert!(!updated.visible);
        assert!(updated.collapsed);

        assert!(matches!(
            store.update_group("missing", Some(true), None).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn deleting_group_detaches_collections_in_store_and_cache() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let group = store.create_group("Parks").await.unwrap();
        let collection = store
            .save_layer(
                "parks",
                parks(),
                CollectionMetadata::default(),
                Some(group.id.clone()),
            )
            .await
            .unwrap();
        let cached = store.cache().get(&collection.id).await.unwrap().unwrap();
        assert_eq!(cached.group_id.as_deref(), Some(group.id.as_str()));

        store.delete_group(&group.id).await.unwrap();

        let reloaded = store.get_collection(&collection.id).await.unwrap();
        assert_eq!(reloaded.group_id, None);
        let cached = store.cache().get(&collection.id).await.unwrap().unwrap();
        assert_eq!(cached.group_id, None);
        assert!(store.get_groups().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn deleting_unknown_group_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            store(&dir).delete_group("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
