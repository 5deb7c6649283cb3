pub mod api;
pub mod assets;
pub mod handlers;
pub mod labels;
pub mod offline;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::offline::OfflineWorker;
use crate::storage::KeyValueStore;

pub type SharedCatalog = Catalog<Box<dyn KeyValueStore>>;

pub struct AppState {
    pub catalog: RwLock<SharedCatalog>,
    /// Resource most recently opened in the detail view; edit and delete act
    /// on it.
    pub current_resource: RwLock<Option<String>>,
    pub worker: Arc<OfflineWorker>,
}

impl AppState {
    pub fn new(catalog: SharedCatalog, worker: Arc<OfflineWorker>) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            current_resource: RwLock::new(None),
            worker,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/index.html", get(handlers::home))
        .route("/resources", post(handlers::add_resource))
        .route("/resources/:id", get(handlers::show_resource))
        .route("/resources/:id/update", post(handlers::save_resource))
        .route("/resources/:id/favorite", post(handlers::toggle_favorite))
        .route("/current/edit", get(handlers::edit_current))
        .route(
            "/current/delete",
            get(handlers::confirm_delete).post(handlers::delete_current),
        )
        .route("/categories", post(handlers::add_category))
        .route("/app.js", get(assets::app_js))
        .route("/offline.js", get(assets::offline_js))
        .route("/styles.css", get(assets::styles_css))
        .route("/manifest.json", get(assets::web_manifest))
        .route("/offline/fetch", get(offline::fetch))
        .route("/offline/status", get(offline::status))
        .route("/offline/messages", get(offline::messages))
        .route("/offline/sync/:tag", post(offline::sync))
        .route("/offline/periodic-sync/:tag", post(offline::periodic_sync))
        .route("/offline/push", post(offline::push))
        .route("/offline/notification-click", post(offline::notification_click))
        .nest("/api", api::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
