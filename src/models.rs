use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Kind of learning material. Unknown values read from storage are kept
/// verbatim in `Custom` so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Video,
    Document,
    Project,
    Other,
    Custom(String),
}

impl ResourceType {
    pub const KNOWN: [ResourceType; 4] = [
        ResourceType::Video,
        ResourceType::Document,
        ResourceType::Project,
        ResourceType::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Video => "video",
            ResourceType::Document => "document",
            ResourceType::Project => "project",
            ResourceType::Other => "other",
            ResourceType::Custom(raw) => raw,
        }
    }
}

impl From<String> for ResourceType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "video" => ResourceType::Video,
            "document" => ResourceType::Document,
            "project" => ResourceType::Project,
            "other" => ResourceType::Other,
            _ => ResourceType::Custom(raw),
        }
    }
}

impl From<ResourceType> for String {
    fn from(kind: ResourceType) -> Self {
        match kind {
            ResourceType::Custom(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty level, with the same pass-through behaviour as [`ResourceType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Custom(String),
}

impl Level {
    pub const KNOWN: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Custom(raw) => raw,
        }
    }
}

impl From<String> for Level {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "beginner" => Level::Beginner,
            "intermediate" => Level::Intermediate,
            "advanced" => Level::Advanced,
            _ => Level::Custom(raw),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        match level {
            Level::Custom(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub level: Level,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResource {
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub level: Level,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub tags: String,
}

impl NewResource {
    pub fn into_resource(self, id: String, created_at: DateTime<Utc>) -> Resource {
        Resource {
            id,
            title: self.title,
            category: self.category,
            kind: self.kind,
            level: self.level,
            description: self.description,
            link: self.link,
            tags: self.tags,
            favorite: false,
            created_at,
        }
    }
}

/// Partial update. Fields left as `None` keep their stored value; `id`,
/// `createdAt` and `favorite` cannot be patched. Favorites only change
/// through a toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl ResourcePatch {
    pub fn apply(self, resource: &mut Resource) {
        if let Some(title) = self.title {
            resource.title = title;
        }
        if let Some(category) = self.category {
            resource.category = category;
        }
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        if let Some(level) = self.level {
            resource.level = level;
        }
        if let Some(description) = self.description {
            resource.description = description;
        }
        if let Some(link) = self.link {
            resource.link = link;
        }
        if let Some(tags) = self.tags {
            resource.tags = tags;
        }
    }

    /// Rejects patches that would blank out a required field.
    pub fn validate(&self) -> Result<()> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.title) {
            missing.push("title");
        }
        if blank(&self.category) {
            missing.push("category");
        }
        if self.kind.as_ref().is_some_and(|k| k.as_str().trim().is_empty()) {
            missing.push("type");
        }
        if self.level.as_ref().is_some_and(|l| l.as_str().trim().is_empty()) {
            missing.push("level");
        }
        if blank(&self.link) {
            missing.push("link");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Validation(format!(
                "required fields cannot be empty: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Raw add/edit form input as submitted by a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: String,
}

impl ResourceForm {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            category: resource.category.clone(),
            kind: resource.kind.to_string(),
            level: resource.level.to_string(),
            description: resource.description.clone(),
            link: resource.link.clone(),
            tags: resource.tags.clone(),
        }
    }

    /// Trims every field and checks that title, category, type, level and
    /// link are present.
    pub fn validate(self) -> Result<NewResource> {
        let title = self.title.trim().to_string();
        let category = self.category.trim().to_string();
        let kind = self.kind.trim().to_string();
        let level = self.level.trim().to_string();
        let link = self.link.trim().to_string();

        let missing: Vec<&str> = [
            ("title", &title),
            ("category", &category),
            ("type", &kind),
            ("level", &level),
            ("link", &link),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(CatalogError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(NewResource {
            title,
            category,
            kind: ResourceType::from(kind),
            level: Level::from(level),
            description: self.description.trim().to_string(),
            link,
            tags: self.tags.trim().to_string(),
        })
    }
}

impl From<NewResource> for ResourcePatch {
    fn from(input: NewResource) -> Self {
        Self {
            title: Some(input.title),
            category: Some(input.category),
            kind: Some(input.kind),
            level: Some(input.level),
            description: Some(input.description),
            link: Some(input.link),
            tags: Some(input.tags),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl CategoryForm {
    pub fn validate(self) -> Result<NewCategory> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::Validation("category name cannot be empty".to_string()));
        }
        let color = match self.color.trim() {
            "" => "#3B82F6".to_string(),
            c => c.to_string(),
        };
        Ok(NewCategory { name, color })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_resources: usize,
    pub total_categories: usize,
    pub total_favorites: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
    /// Any unrecognised key: leave resources in store order.
    Stored,
}

impl SortOrder {
    pub const KNOWN: [SortOrder; 4] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::NameAsc,
        SortOrder::NameDesc,
    ];

    pub fn parse(key: &str) -> Self {
        match key {
            "date-desc" => SortOrder::DateDesc,
            "date-asc" => SortOrder::DateAsc,
            "name-asc" => SortOrder::NameAsc,
            "name-desc" => SortOrder::NameDesc,
            _ => SortOrder::Stored,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
            SortOrder::Stored => "stored",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceListResponse {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub id: String,
    pub favorite: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesResponse {
    pub statistics: Statistics,
    pub recent: Vec<Resource>,
}
