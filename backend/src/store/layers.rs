//! Reconciliation of stored collections with cached layers.
//!
//! The store is the source of truth for which collections exist, their name,
//! group and style. The cache only saves refetching features: a cached layer is
//! used as-is for its geometry, but group and style are always overwritten
//! from the collection row.

use super::{collections, LayerStore};
use crate::cache::CacheChange;
use crate::error::StoreError;
use common::model::collection::Collection;
use common::model::geojson::FeatureCollection;
use common::model::layer::Layer;
use futures_util::future::join_all;
use log::{debug, error, info, warn};

impl LayerStore {
    /// Loads every saved layer, newest collection first.
    ///
    /// One task per collection checks the cache and falls back to the store;
    /// all tasks run concurrently and the result keeps the listing order.
    /// Collections whose features cannot be loaded are logged and left out.
    /// Cache entries without a matching collection are evicted first.
    pub async fn get_saved_layers(&self) -> Result<Vec<Layer>, StoreError> {
        let collections = self.run(|conn| collections::list(conn)).await?;

        // A collection saved after the listing may lose its fresh entry here;
        // the next load rebuilds it from the store.
        let live: Vec<String> = collections.iter().map(|c| c.id.clone()).collect();
        match self.cache.retain(&live).await {
            Ok(0) => {}
            Ok(evicted) => info!("Evicted {} stale cache entries", evicted),
            Err(e) => warn!("Cache sweep failed: {}", e),
        }

        let tasks = collections
            .into_iter()
            .map(|collection| self.reconcile(collection));
        let layers: Vec<Layer> = join_all(tasks).await.into_iter().flatten().collect();
        debug!("Loaded {} saved layers", layers.len());
        Ok(layers)
    }

    /// Loads one saved layer the same way `get_saved_layers` does.
    pub async fn get_layer(&self, id: &str) -> Result<Layer, StoreError> {
        let collection = self.get_collection(id).await?;
        match self.cached_layer(&collection).await {
            Some(layer) => Ok(layer),
            None => {
                let owned = collection.id.clone();
                let data = self
                    .run(move |conn| collections::load_features(conn, &owned))
                    .await?;
                Ok(self.store_projection(&collection, data).await)
            }
        }
    }

    async fn reconcile(&self, collection: Collection) -> Option<Layer> {
        if let Some(layer) = self.cached_layer(&collection).await {
            return Some(layer);
        }

        let id = collection.id.clone();
        match self
            .run(move |conn| collections::load_features(conn, &id))
            .await
        {
            Ok(data) => Some(self.store_projection(&collection, data).await),
            Err(e) => {
                error!("Error fetching features for collection {}: {}", collection.id, e);
                None
            }
        }
    }

    /// Cached layer refreshed from `collection`, or `None` on miss or cache error.
    async fn cached_layer(&self, collection: &Collection) -> Option<Layer> {
        let mut layer = match self.cache.get(&collection.id).await {
            Ok(Some(layer)) => layer,
            Ok(None) => return None,
            Err(e) => {
                warn!(
                    "Cache read for layer {} failed, falling back to the store: {}",
                    collection.id, e
                );
                return None;
            }
        };

        if layer.style != collection.metadata.style {
            debug!("Cached style of layer {} is stale", collection.id);
        }
        layer.group_id = collection.group_id.clone();
        layer.name = collection.name.clone();
        layer.apply_style(collection.metadata.style.clone());
        layer.visible = true;
        Some(layer)
    }

    async fn store_projection(
        &self,
        collection: &Collection,
        data: FeatureCollection,
    ) -> Layer {
        let layer = Layer::from_collection(collection, data);
        self.cache
            .invalidate(&layer.id, CacheChange::Stored(layer.clone()))
            .await;
        layer
    }
}
