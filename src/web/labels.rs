//! Display strings and style classes for enumerated resource fields.
//! Values outside the known set are shown as stored.

use chrono::{DateTime, Local, Utc};

use crate::models::{Level, ResourceType, SortOrder};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

pub fn type_label(kind: &ResourceType) -> &str {
    match kind {
        ResourceType::Video => "Video Tutorial",
        ResourceType::Document => "Document",
        ResourceType::Project => "Project Files",
        ResourceType::Other => "Other",
        ResourceType::Custom(raw) => raw,
    }
}

pub fn level_label(level: &Level) -> &str {
    match level {
        Level::Beginner => "Beginner",
        Level::Intermediate => "Intermediate",
        Level::Advanced => "Advanced",
        Level::Custom(raw) => raw,
    }
}

pub fn level_class(level: &Level) -> &'static str {
    match level {
        Level::Beginner => "text-green-600",
        Level::Intermediate => "text-blue-600",
        Level::Advanced => "text-purple-600",
        Level::Custom(_) => "",
    }
}

pub fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::DateDesc => "Newest first",
        SortOrder::DateAsc => "Oldest first",
        SortOrder::NameAsc => "Title A-Z",
        SortOrder::NameDesc => "Title Z-A",
        SortOrder::Stored => "As added",
    }
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
