use crate::defaults;
use crate::error::{CatalogError, Result};
use crate::models::{Category, Resource};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CATEGORIES_KEY: &str = "categories";
pub const RESOURCES_KEY: &str = "resources";

/// String-keyed document storage, the catalog's stand-in for browser local
/// storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| CatalogError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let io_err = |source| CatalogError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }
}

/// In-memory storage with an optional byte quota across all entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(CatalogError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// In-memory mirror of the persisted categories and resources.
pub struct PersistentStore<S> {
    backend: S,
    categories: Vec<Category>,
    resources: Vec<Resource>,
}

impl<S: KeyValueStore> PersistentStore<S> {
    /// Reads both collections, substituting the default dataset for any that
    /// is missing or unreadable. Defaults are written back immediately so
    /// seeding happens once per storage lifetime.
    pub fn load(backend: S) -> Result<Self> {
        let categories: Option<Vec<Category>> = read_collection(&backend, CATEGORIES_KEY);
        let resources: Option<Vec<Resource>> = read_collection(&backend, RESOURCES_KEY);
        let seeded = categories.is_none() || resources.is_none();

        let mut store = Self {
            categories: categories.unwrap_or_else(defaults::categories),
            resources: resources.unwrap_or_else(|| defaults::resources(Utc::now())),
            backend,
        };

        if seeded {
            info!(
                categories = store.categories.len(),
                resources = store.resources.len(),
                "Seeding catalog storage with defaults"
            );
            store.save()?;
        }

        Ok(store)
    }

    pub fn save(&mut self) -> Result<()> {
        let categories = serde_json::to_string_pretty(&self.categories).map_err(|source| {
            CatalogError::Serialize {
                what: CATEGORIES_KEY,
                source,
            }
        })?;
        let resources = serde_json::to_string_pretty(&self.resources).map_err(|source| {
            CatalogError::Serialize {
                what: RESOURCES_KEY,
                source,
            }
        })?;

        self.backend.set(CATEGORIES_KEY, &categories)?;
        self.backend.set(RESOURCES_KEY, &resources)?;
        debug!(
            categories = self.categories.len(),
            resources = self.resources.len(),
            "Catalog saved"
        );
        Ok(())
    }

    /// Applies `mutate` and persists. If saving fails the in-memory state is
    /// restored, so callers never observe an unsaved mutation.
    pub fn transact<T>(
        &mut self,
        mutate: impl FnOnce(&mut Vec<Category>, &mut Vec<Resource>) -> T,
    ) -> Result<T> {
        let snapshot = (self.categories.clone(), self.resources.clone());
        let out = mutate(&mut self.categories, &mut self.resources);
        if let Err(e) = self.save() {
            (self.categories, self.resources) = snapshot;
            return Err(e);
        }
        Ok(out)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

fn read_collection<T: DeserializeOwned, S: KeyValueStore>(backend: &S, key: &str) -> Option<Vec<T>> {
    match backend.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(key, error = %e, "Stored data is corrupted, falling back to defaults");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored data, falling back to defaults");
            None
        }
    }
}
