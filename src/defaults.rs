//! Sample data seeded into an empty store.

use chrono::{DateTime, Utc};

use crate::models::{Category, Level, Resource, ResourceType};

pub fn categories() -> Vec<Category> {
    [
        ("1", "Fundamentals", "#3B82F6"),
        ("2", "Character Animation", "#10B981"),
        ("3", "Visual Effects", "#8B5CF6"),
        ("4", "Materials & Rendering", "#F59E0B"),
        ("5", "Rigging", "#EC4899"),
        ("6", "Project Showcases", "#14B8A6"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

pub fn resources(now: DateTime<Utc>) -> Vec<Resource> {
    vec![
        Resource {
            id: "1".to_string(),
            title: "Maya 2024 Getting Started".to_string(),
            category: "1".to_string(),
            kind: ResourceType::Video,
            level: Level::Beginner,
            description: "A tour of the Maya 2024 interface and core workflows for newcomers"
                .to_string(),
            link: "https://example.com/maya-basics".to_string(),
            tags: "basics,getting started,Maya 2024".to_string(),
            favorite: false,
            created_at: now,
        },
        Resource {
            id: "2".to_string(),
            title: "Character Animation Principles in Practice".to_string(),
            category: "2".to_string(),
            kind: ResourceType::Document,
            level: Level::Intermediate,
            description: "The core principles of character animation and how to apply them"
                .to_string(),
            link: "https://example.com/character-animation".to_string(),
            tags: "character animation,principles,practice".to_string(),
            favorite: true,
            created_at: now,
        },
        Resource {
            id: "3".to_string(),
            title: "Fluid Effects Workshop".to_string(),
            category: "3".to_string(),
            kind: ResourceType::Video,
            level: Level::Advanced,
            description: "Building convincing fluid simulations with Maya".to_string(),
            link: "https://example.com/fluid-effects".to_string(),
            tags: "effects,fluids,advanced".to_string(),
            favorite: false,
            created_at: now,
        },
    ]
}
