//! DataLoader utilities for batch loading
//!
//! A loader lives for one executed request. It batches the document lookups
//! a query fans out into (friend lists mostly) and caches them so the same
//! character is fetched once per request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::id::DocumentId;
use crate::store::{Document, SharedStore};

/// Batch loader trait for loading multiple items at once
#[async_trait]
pub trait BatchLoader<K, V>: Send + Sync
where
    K: Send + Sync + Clone + Eq + Hash,
    V: Send + Sync + Clone,
{
    /// Load batch of items by keys
    ///
    /// Keys with no value are left out of the returned map.
    async fn load_batch(&self, keys: &[K]) -> crate::Result<HashMap<K, V>>;
}

/// DataLoader with caching and batching
pub struct DataLoader<K, V, L>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
    L: BatchLoader<K, V> + 'static,
{
    loader: Arc<L>,
    cache: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V, L> DataLoader<K, V, L>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
    L: BatchLoader<K, V> + 'static,
{
    /// Create new DataLoader with a batch loader
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load a single item by key
    pub async fn load(&self, key: K) -> crate::Result<Option<V>> {
        let mut results = self.load_many(vec![key.clone()]).await?;
        Ok(results.remove(&key))
    }

    /// Load multiple items by keys
    ///
    /// Batches keys that aren't in cache and loads them together. Duplicate
    /// keys are fetched once.
    pub async fn load_many(&self, keys: Vec<K>) -> crate::Result<HashMap<K, V>> {
        let mut result = HashMap::new();
        let mut uncached_keys = Vec::new();

        {
            let cache = self.cache.lock().await;
            for key in keys {
                if let Some(value) = cache.get(&key) {
                    result.insert(key, value.clone());
                } else if !uncached_keys.contains(&key) {
                    uncached_keys.push(key);
                }
            }
        }

        if !uncached_keys.is_empty() {
            let batch_results = self.loader.load_batch(&uncached_keys).await?;

            let mut cache = self.cache.lock().await;
            for (k, v) in batch_results {
                cache.insert(k.clone(), v.clone());
                result.insert(k, v);
            }
        }

        Ok(result)
    }

    /// Prime the cache with a value already fetched another way
    pub async fn prime(&self, key: K, value: V) {
        self.cache.lock().await.insert(key, value);
    }
}

/// Loads documents by id from the shared store
pub struct StoreBatchLoader {
    store: SharedStore,
}

impl StoreBatchLoader {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BatchLoader<DocumentId, Document> for StoreBatchLoader {
    async fn load_batch(&self, keys: &[DocumentId]) -> crate::Result<HashMap<DocumentId, Document>> {
        debug!(count = keys.len(), "loading document batch");
        let mut found = HashMap::with_capacity(keys.len());
        for id in keys {
            if let Some(document) = self.store.get(id).await? {
                found.insert(*id, document);
            }
        }
        Ok(found)
    }
}

/// Request-scoped document loader
pub type DocumentLoader = DataLoader<DocumentId, Document, StoreBatchLoader>;

impl DocumentLoader {
    /// Fresh loader with an empty cache over `store`
    pub fn for_store(store: SharedStore) -> Self {
        DataLoader::new(StoreBatchLoader::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::Variant;
    use crate::store::{DocumentStore, MemoryStore};

    #[derive(Default)]
    struct CountingLoader {
        batches: AtomicUsize,
    }

    #[async_trait]
    impl BatchLoader<String, String> for Arc<CountingLoader> {
        async fn load_batch(&self, keys: &[String]) -> crate::Result<HashMap<String, String>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            Ok(keys
                .iter()
                .filter(|k| !k.starts_with("missing"))
                .map(|k| (k.clone(), format!("value-{}", k)))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_dataloader_single_load() {
        let loader = DataLoader::new(Arc::new(CountingLoader::default()));
        let value = loader.load("key1".to_string()).await.unwrap();
        assert_eq!(value, Some("value-key1".to_string()));
    }

    #[tokio::test]
    async fn test_dataloader_caching() {
        let counter = Arc::new(CountingLoader::default());
        let loader = DataLoader::new(counter.clone());

        loader.load("key1".to_string()).await.unwrap();
        let value = loader.load("key1".to_string()).await.unwrap();

        assert_eq!(value, Some("value-key1".to_string()));
        assert_eq!(counter.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dataloader_batch_load() {
        let counter = Arc::new(CountingLoader::default());
        let loader = DataLoader::new(counter.clone());

        let keys = vec![
            "key1".to_string(),
            "key2".to_string(),
            "key1".to_string(),
            "missing".to_string(),
        ];
        let results = loader.load_many(keys).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.get("key1"), Some(&"value-key1".to_string()));
        assert_eq!(results.get("key2"), Some(&"value-key2".to_string()));
        assert_eq!(counter.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dataloader_prime_skips_batch() {
        let counter = Arc::new(CountingLoader::default());
        let loader = DataLoader::new(counter.clone());

        loader.prime("key1".to_string(), "custom-value".to_string()).await;
        let value = loader.load("key1".to_string()).await.unwrap();
        assert_eq!(value, Some("custom-value".to_string()));
        assert_eq!(counter.batches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_document_loader_reads_store() {
        let store = Arc::new(MemoryStore::new());
        let id = store
            .insert(Variant::Droid, serde_json::Map::new())
            .await
            .unwrap();

        let loader = DocumentLoader::for_store(store);
        let found = loader.load(id).await.unwrap();
        assert_eq!(found.map(|doc| doc.id()), Some(id));

        let missing = DocumentId::new(Variant::Human);
        assert!(loader.load(missing).await.unwrap().is_none());
    }
}
