use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    Cors,
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin responses are written to the cache at fetch
    /// time.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }
}

/// A single named cache, keyed by absolute request URL.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: BTreeMap<String, FetchResponse>,
}

impl Cache {
    pub fn get(&self, url: &str) -> Option<&FetchResponse> {
        self.entries.get(url)
    }

    pub fn put(&mut self, url: String, response: FetchResponse) {
        self.entries.insert(url, response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub name: String,
    pub entries: usize,
}

/// Named caches shared between the worker and anything inspecting it.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: RwLock<BTreeMap<String, Cache>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the named cache if it does not exist yet.
    pub async fn open(&self, name: &str) {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    pub async fn put(&self, name: &str, url: String, response: FetchResponse) {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .put(url, response);
    }

    /// Stores every entry under a single lock, so readers see all or none.
    pub async fn put_all(&self, name: &str, entries: Vec<(String, FetchResponse)>) {
        let mut caches = self.caches.write().await;
        let cache = caches.entry(name.to_string()).or_default();
        for (url, response) in entries {
            cache.put(url, response);
        }
    }

    pub async fn match_in(&self, name: &str, url: &str) -> Option<FetchResponse> {
        self.caches
            .read()
            .await
            .get(name)
            .and_then(|cache| cache.get(url))
            .cloned()
    }

    /// Looks `url` up in every cache.
    pub async fn match_any(&self, url: &str) -> Option<FetchResponse> {
        self.caches
            .read()
            .await
            .values()
            .find_map(|cache| cache.get(url))
            .cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    pub async fn delete(&self, name: &str) -> bool {
        self.caches.write().await.remove(name).is_some()
    }

    pub async fn summary(&self) -> Vec<CacheSummary> {
        self.caches
            .read()
            .await
            .iter()
            .map(|(name, cache)| CacheSummary {
                name: name.clone(),
                entries: cache.len(),
            })
            .collect()
    }
}
