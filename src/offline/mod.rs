//! Offline cache worker.
//!
//! Mirrors the install / activate / fetch lifecycle of a browser service
//! worker: a fixed asset manifest is cached up front, stale cache versions
//! are dropped on activation, and requests are answered cache-first with a
//! network fallback.

pub mod cache;
pub mod clients;
pub mod network;
pub mod worker;

pub use cache::{Cache, CacheStorage, CacheSummary, FetchResponse, ResponseType};
pub use clients::{ClientMessage, Clients, Notification, Subscription};
pub use network::{FetchRequest, HttpNetwork, Network};
pub use worker::{OfflineWorker, WorkerConfig, WorkerState};

use thiserror::Error;

pub const DEFAULT_CACHE_NAME: &str = "maya-resource-app-v1";

/// Document served for HTML requests that cannot reach the network.
pub const OFFLINE_DOCUMENT: &str = "/index.html";

pub const SYNC_RESOURCES_TAG: &str = "sync-resources";
pub const FETCH_UPDATES_TAG: &str = "fetch-updates";
pub const UPDATES_PATH: &str = "/api/updates";

pub const TAILWIND_URL: &str = "https://cdn.tailwindcss.com";
pub const FONT_AWESOME_URL: &str =
    "https://cdn.jsdelivr.net/npm/font-awesome@4.7.0/css/font-awesome.min.css";

/// Assets cached at install time. Must match what the server actually serves.
pub fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/app.js",
        "/offline.js",
        "/styles.css",
        "/manifest.json",
        TAILWIND_URL,
        FONT_AWESOME_URL,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Install failed while caching {url}: {reason}")]
    Install { url: String, reason: String },

    #[error("{url} is not available offline")]
    NotCached { url: String },
}

/// Resolves `url` against `origin`; absolute URLs are returned unchanged.
pub fn resolve_url(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", origin.trim_end_matches('/'), url)
    }
}

pub fn is_same_origin(origin: &str, url: &str) -> bool {
    let origin = origin.trim_end_matches('/');
    url == origin || url.starts_with(&format!("{origin}/"))
}
