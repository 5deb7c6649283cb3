use chrono::Utc;
use std::cmp::Ordering;

use crate::error::Result;
use crate::models::{
    Category, NewCategory, NewResource, Resource, ResourcePatch, SortOrder, Statistics,
};
use crate::storage::{KeyValueStore, PersistentStore};

/// The catalog of categories and resources. Every mutation is persisted
/// through the underlying [`PersistentStore`] before it returns.
pub struct Catalog<S> {
    store: PersistentStore<S>,
}

impl<S: KeyValueStore> Catalog<S> {
    pub fn load(backend: S) -> Result<Self> {
        Ok(Self {
            store: PersistentStore::load(backend)?,
        })
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn into_backend(self) -> S {
        self.store.into_backend()
    }

    pub fn list_categories(&self) -> &[Category] {
        self.store.categories()
    }

    pub fn list_resources(&self) -> &[Resource] {
        self.store.resources()
    }

    pub fn resources_by_category(&self, category_id: &str) -> Vec<Resource> {
        self.store
            .resources()
            .iter()
            .filter(|r| r.category == category_id)
            .cloned()
            .collect()
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Category> {
        self.store.categories().iter().find(|c| c.id == id)
    }

    pub fn resource_by_id(&self, id: &str) -> Option<&Resource> {
        self.store.resources().iter().find(|r| r.id == id)
    }

    pub fn add_category(&mut self, input: NewCategory) -> Result<Category> {
        self.store.transact(|categories, _| {
            let category = Category {
                id: next_id(categories.iter().map(|c| c.id.as_str()), now_millis()),
                name: input.name,
                color: input.color,
            };
            categories.push(category.clone());
            category
        })
    }

    /// Appends a resource. Required-field validation is the caller's job
    /// (see [`crate::models::ResourceForm::validate`]).
    pub fn add_resource(&mut self, input: NewResource) -> Result<Resource> {
        self.store.transact(|_, resources| {
            let id = next_id(resources.iter().map(|r| r.id.as_str()), now_millis());
            let resource = input.into_resource(id, Utc::now());
            resources.push(resource.clone());
            resource
        })
    }

    pub fn update_resource(&mut self, id: &str, patch: ResourcePatch) -> Result<Option<Resource>> {
        if self.resource_by_id(id).is_none() {
            return Ok(None);
        }
        self.store.transact(|_, resources| {
            resources.iter_mut().find(|r| r.id == id).map(|resource| {
                patch.apply(resource);
                resource.clone()
            })
        })
    }

    /// Removes the resource if present. Absent ids are not an error and the
    /// store is still rewritten.
    pub fn delete_resource(&mut self, id: &str) -> Result<()> {
        self.store
            .transact(|_, resources| resources.retain(|r| r.id != id))
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
        if self.resource_by_id(id).is_none() {
            return Ok(None);
        }
        self.store.transact(|_, resources| {
            resources.iter_mut().find(|r| r.id == id).map(|resource| {
                resource.favorite = !resource.favorite;
                resource.favorite
            })
        })
    }

    /// Case-insensitive substring match over title, description and the raw
    /// tag string.
    pub fn search(&self, query: &str) -> Vec<Resource> {
        let needle = query.to_lowercase();
        self.store
            .resources()
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
                    || r.tags.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn sort(&self, order: SortOrder) -> Vec<Resource> {
        sort_resources(self.store.resources().to_vec(), order)
    }

    /// Category filter (`None` or `"all"` keeps everything) followed by sort.
    pub fn browse(&self, category: Option<&str>, order: SortOrder) -> Vec<Resource> {
        let filtered = match category {
            None | Some("all") | Some("") => self.store.resources().to_vec(),
            Some(id) => self.resources_by_category(id),
        };
        sort_resources(filtered, order)
    }

    pub fn statistics(&self) -> Statistics {
        let resources = self.store.resources();
        Statistics {
            total_resources: resources.len(),
            total_categories: self.store.categories().len(),
            total_favorites: resources.iter().filter(|r| r.favorite).count(),
        }
    }
}

pub fn sort_resources(mut resources: Vec<Resource>, order: SortOrder) -> Vec<Resource> {
    match order {
        SortOrder::DateDesc => resources.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::DateAsc => resources.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::NameAsc => resources.sort_by(|a, b| locale_cmp(&a.title, &b.title)),
        SortOrder::NameDesc => resources.sort_by(|a, b| locale_cmp(&b.title, &a.title)),
        SortOrder::Stored => {}
    }
    resources
}

/// Dictionary-style ordering: case-insensitive first, then lowercase before
/// uppercase for words that differ only in case.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Timestamp-derived id, bumped past the largest numeric id already in use so
/// two records created in the same millisecond never collide.
fn next_id<'a>(existing: impl Iterator<Item = &'a str>, now_ms: i64) -> String {
    let max_existing = existing.filter_map(|id| id.parse::<i64>().ok()).max();
    match max_existing {
        Some(max) if max >= now_ms => (max + 1).to_string(),
        _ => now_ms.to_string(),
    }
}
