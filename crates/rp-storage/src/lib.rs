use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be reached at all (e.g. private browsing).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation failed: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key-value store for small wizard progress values
/// (step index, contact email). Synchronous: the browser implementation
/// is localStorage, which blocks on write.
pub trait ProgressStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Async key-value store for large photo payloads. Keyed by slot id,
/// put overwrites, clear drops every entry. `?Send` because the browser
/// implementation (IndexedDB) lives on a single-threaded wasm target.
#[async_trait(?Send)]
pub trait PhotoCache {
    async fn put(&self, id: &str, data: &str) -> StorageResult<()>;
    async fn get(&self, id: &str) -> StorageResult<Option<String>>;
    async fn clear(&self) -> StorageResult<()>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

#[async_trait(?Send)]
impl<T: PhotoCache + ?Sized> PhotoCache for &T {
    async fn put(&self, id: &str, data: &str) -> StorageResult<()> {
        (**self).put(id, data).await
    }

    async fn get(&self, id: &str) -> StorageResult<Option<String>> {
        (**self).get(id).await
    }

    async fn clear(&self) -> StorageResult<()> {
        (**self).clear().await
    }
}

#[async_trait(?Send)]
impl<T: PhotoCache + ?Sized> PhotoCache for Box<T> {
    async fn put(&self, id: &str, data: &str) -> StorageResult<()> {
        (**self).put(id, data).await
    }

    async fn get(&self, id: &str) -> StorageResult<Option<String>> {
        (**self).get(id).await
    }

    async fn clear(&self) -> StorageResult<()> {
        (**self).clear().await
    }
}

#[derive(Default)]
pub struct InMemoryProgressStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryProgressStore {
    pub fn len(&self) -> usize {
        self.values.lock().expect("progress store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self.values.lock().expect("progress store poisoned");
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self.values.lock().expect("progress store poisoned");
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self.values.lock().expect("progress store poisoned");
        guard.remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPhotoCache {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryPhotoCache {
    pub fn len(&self) -> usize {
        self.entries.lock().expect("photo cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait(?Send)]
impl PhotoCache for InMemoryPhotoCache {
    async fn put(&self, id: &str, data: &str) -> StorageResult<()> {
        let mut guard = self.entries.lock().expect("photo cache poisoned");
        guard.insert(id.to_owned(), data.to_owned());
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<String>> {
        let guard = self.entries.lock().expect("photo cache poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn clear(&self) -> StorageResult<()> {
        let mut guard = self.entries.lock().expect("photo cache poisoned");
        guard.clear();
        Ok(())
    }
}

/// Cache that stores nothing. Used when the browser store cannot be
/// opened: the wizard keeps working, only resume-after-reload is lost.
#[derive(Default)]
pub struct NoopPhotoCache;

#[async_trait(?Send)]
impl PhotoCache for NoopPhotoCache {
    async fn put(&self, _id: &str, _data: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn get(&self, _id: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    async fn clear(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_store_roundtrip_and_remove() {
        let store = InMemoryProgressStore::default();
        assert_eq!(store.get("rp_verify_step").unwrap(), None);

        store.set("rp_verify_step", "2").unwrap();
        assert_eq!(store.get("rp_verify_step").unwrap().as_deref(), Some("2"));

        store.set("rp_verify_step", "3").unwrap();
        assert_eq!(store.get("rp_verify_step").unwrap().as_deref(), Some("3"));

        store.remove("rp_verify_step").unwrap();
        assert_eq!(store.get("rp_verify_step").unwrap(), None);
        // Removing a missing key is idempotent.
        store.remove("rp_verify_step").unwrap();
    }

    #[tokio::test]
    async fn photo_cache_last_write_wins() {
        let cache = InMemoryPhotoCache::default();
        cache.put("idPhoto", "data:image/png;base64,AAAA").await.unwrap();
        cache.put("idPhoto", "data:image/png;base64,BBBB").await.unwrap();

        let stored = cache.get("idPhoto").await.unwrap();
        assert_eq!(stored.as_deref(), Some("data:image/png;base64,BBBB"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn photo_cache_clear_drops_every_entry() {
        let cache = InMemoryPhotoCache::default();
        cache.put("idPhoto", "a").await.unwrap();
        cache.put("selfiePhoto", "b").await.unwrap();

        cache.clear().await.unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.get("idPhoto").await.unwrap(), None);
        assert_eq!(cache.get("selfiePhoto").await.unwrap(), None);
    }

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopPhotoCache;
        cache.put("idPhoto", "a").await.unwrap();
        assert_eq!(cache.get("idPhoto").await.unwrap(), None);
        cache.clear().await.unwrap();
    }
}
