//! Lock-free typed collection built on `scc::HashMap`.
//!
//! Every write goes through a per-entry closure, so updates to a single
//! document are atomic and the collection never takes a global lock.
//! Reads and writes do not contend with each other.

use std::sync::Arc;

use scc::hash_map::Entry;
use scc::HashMap as SccHashMap;

use super::StoreError;

/// A named collection of documents keyed by string id.
pub struct Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    name: &'static str,
    map: Arc<SccHashMap<String, T>>,
}

impl<T> Clone for Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self { name: self.name, map: Arc::clone(&self.map) }
    }
}

impl<T> Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self { name, map: Arc::new(SccHashMap::new()) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a new document. Fails with [`StoreError::Conflict`] when the
    /// id already exists.
    pub async fn insert(&self, id: String, value: T) -> Result<(), StoreError> {
        self.map
            .insert_async(id.clone(), value)
            .await
            .map_err(|_| StoreError::Conflict { collection: self.name, id })
    }

    /// Insert or replace a document.
    pub async fn put(&self, id: String, value: T) {
        match self.map.entry_async(id).await {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() = value;
            }
            Entry::Vacant(entry) => {
                entry.insert_entry(value);
            }
        }
    }

    /// Read a document by id.
    pub async fn get(&self, id: &str) -> Option<T> {
        self.map.read_async(id, |_, v| v.clone()).await
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.map.contains_async(id).await
    }

    /// Atomically mutate a document in place. The closure runs under the
    /// entry lock, which is what gives compare-and-swap semantics to
    /// callers mutating sets or counters inside the document.
    pub async fn update<R, F>(&self, id: &str, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.map
            .update_async(id, |_, v| f(v))
            .await
            .ok_or_else(|| StoreError::NotFound { collection: self.name, id: id.to_string() })
    }

    /// Atomically mutate a document, inserting `default` first when the id
    /// is absent.
    pub async fn upsert_with<R, F>(&self, id: String, default: T, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        match self.map.entry_async(id).await {
            Entry::Occupied(mut entry) => f(entry.get_mut()),
            Entry::Vacant(entry) => {
                let mut occupied = entry.insert_entry(default);
                f(occupied.get_mut())
            }
        }
    }

    pub async fn remove(&self, id: &str) -> Option<T> {
        self.map.remove_async(id).await.map(|(_, v)| v)
    }

    /// Snapshot every document. Documents inserted or removed while the
    /// scan runs may or may not be observed; each observed document is a
    /// consistent copy.
    pub async fn scan(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.map.len());
        self.map
            .retain_async(|_, v| {
                out.push(v.clone());
                true
            })
            .await;
        out
    }

    /// Snapshot every (id, document) pair.
    pub async fn scan_entries(&self) -> Vec<(String, T)> {
        let mut out = Vec::with_capacity(self.map.len());
        self.map
            .retain_async(|k, v| {
                out.push((k.clone(), v.clone()));
                true
            })
            .await;
        out
    }

    /// Snapshot the documents matching a predicate.
    pub async fn scan_filter<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut out = Vec::new();
        self.map
            .retain_async(|_, v| {
                if pred(v) {
                    out.push(v.clone());
                }
                true
            })
            .await;
        out
    }

    /// Count documents matching a predicate without cloning them.
    pub async fn count_filter<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut count = 0usize;
        self.map
            .retain_async(|_, v| {
                if pred(v) {
                    count += 1;
                }
                true
            })
            .await;
        count
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub async fn clear(&self) {
        self.map.clear_async().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_conflicts_on_duplicate() {
        let coll = Collection::<u32>::new("numbers");
        coll.insert("a".to_string(), 1).await.unwrap();
        let err = coll.insert("a".to_string(), 2).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { collection: "numbers", .. }));
        assert_eq!(coll.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let coll = Collection::<u32>::new("numbers");
        coll.put("a".to_string(), 1).await;
        coll.put("a".to_string(), 2).await;
        assert_eq!(coll.get("a").await, Some(2));
        assert_eq!(coll.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let coll = Collection::<u32>::new("numbers");
        let err = coll.update("ghost", |v| *v += 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_with_inserts_then_mutates() {
        let coll = Collection::<u32>::new("numbers");
        let v = coll.upsert_with("a".to_string(), 0, |v| {
            *v += 5;
            *v
        })
        .await;
        assert_eq!(v, 5);
        let v = coll.upsert_with("a".to_string(), 0, |v| {
            *v += 5;
            *v
        })
        .await;
        assert_eq!(v, 10);
    }

    #[tokio::test]
    async fn test_scan_filter_and_count() {
        let coll = Collection::<u32>::new("numbers");
        for i in 0..10u32 {
            coll.insert(format!("k{i}"), i).await.unwrap();
        }
        let even = coll.scan_filter(|v| v % 2 == 0).await;
        assert_eq!(even.len(), 5);
        assert_eq!(coll.count_filter(|v| *v > 6).await, 3);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_atomic() {
        let coll = Collection::<u64>::new("counters");
        coll.insert("hits".to_string(), 0).await.unwrap();

        let mut handles = vec![];
        for _ in 0..50 {
            let coll = coll.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..20 {
                    coll.update("hits", |v| *v += 1).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(coll.get("hits").await, Some(1000));
    }
}
