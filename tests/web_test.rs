//! Drives the router end to end against an in-memory catalog.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use resource_catalog::models::{Level, NewResource, ResourceType};
use resource_catalog::offline::{
    default_manifest, FetchRequest, FetchResponse, Network, OfflineError, OfflineWorker,
    ResponseType, WorkerConfig, TAILWIND_URL,
};
use resource_catalog::storage::{KeyValueStore, MemoryStore};
use resource_catalog::web::{self, AppState};
use resource_catalog::{Catalog, CatalogError};

const ORIGIN: &str = "http://localhost:3000";

/// Network that is never reachable.
struct Unreachable;

#[async_trait]
impl Network for Unreachable {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, OfflineError> {
        Err(OfflineError::Network {
            url: request.url.clone(),
            reason: "offline".to_string(),
        })
    }
}

/// Memory store whose writes fail while `failing` is set.
struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<AtomicBool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> resource_catalog::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> resource_catalog::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::QuotaExceeded {
                key: key.to_string(),
                needed: value.len(),
                quota: 0,
            });
        }
        self.inner.set(key, value)
    }
}

fn state_with(store: Box<dyn KeyValueStore>, manifest: Vec<String>) -> Arc<AppState> {
    let catalog = Catalog::load(store).unwrap();
    let worker = OfflineWorker::new(
        WorkerConfig {
            cache_name: "test-cache".to_string(),
            origin: ORIGIN.to_string(),
            manifest,
        },
        Arc::new(Unreachable),
    );
    Arc::new(AppState::new(catalog, Arc::new(worker)))
}

fn test_state() -> Arc<AppState> {
    state_with(Box::new(MemoryStore::new()), Vec::new())
}

fn app(state: &Arc<AppState>) -> Router {
    web::router(state.clone())
}

async fn send(app: Router, method: Method, uri: &str, content_type: &str, body: String) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    send(
        app,
        Method::POST,
        uri,
        "application/x-www-form-urlencoded",
        body.to_string(),
    )
    .await
}

async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response {
    send(app, method, uri, "application/json", body.to_string()).await
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
}

#[tokio::test]
async fn home_renders_seeded_catalog() {
    let state = test_state();
    let response = get(app(&state), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Maya 2024 Getting Started"));
    assert!(html.contains("Character Animation"));
    assert!(html.contains("Video Tutorial"));
}

#[tokio::test]
async fn home_search_with_no_hits_says_so() {
    let state = test_state();
    let html = body_text(get(app(&state), "/?q=houdini").await).await;
    assert!(html.contains("No matching resources"));
}

#[tokio::test]
async fn add_resource_form_redirects_and_persists() {
    let state = test_state();
    let response = post_form(
        app(&state),
        "/resources",
        "title=Blend+Shapes&category=5&type=video&level=intermediate&link=https%3A%2F%2Fexample.com%2Fbs&description=&tags=rig",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let catalog = state.catalog.read().await;
    assert_eq!(catalog.list_resources().len(), 4);
    let added = catalog.list_resources().last().unwrap();
    assert_eq!(added.title, "Blend Shapes");
    assert!(!added.favorite);
}

#[tokio::test]
async fn incomplete_form_is_rejected_without_mutation() {
    let state = test_state();
    let response = post_form(
        app(&state),
        "/resources",
        "title=++&category=1&type=video&level=beginner&link=x",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("Please fill in all required fields"));
    assert_eq!(state.catalog.read().await.list_resources().len(), 3);
}

#[tokio::test]
async fn blank_category_name_is_ignored() {
    let state = test_state();
    let response = post_form(app(&state), "/categories", "name=+++&color=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.catalog.read().await.list_categories().len(), 6);

    post_form(app(&state), "/categories", "name=Lighting&color=").await;
    let catalog = state.catalog.read().await;
    let added = catalog.list_categories().last().unwrap();
    assert_eq!(added.name, "Lighting");
    assert_eq!(added.color, "#3B82F6");
}

#[tokio::test]
async fn favorite_form_redirects_back() {
    let state = test_state();
    let response = post_form(
        app(&state),
        "/resources/1/favorite",
        "back=%2F%3Fcategory%3D1%26sort%3Dname-asc",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?category=1&sort=name-asc");
    assert!(state.catalog.read().await.resource_by_id("1").unwrap().favorite);
}

#[tokio::test]
async fn details_then_delete_current_resource() {
    let state = test_state();

    let response = get(app(&state), "/resources/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.current_resource.read().await.as_deref(), Some("1"));

    let confirm = body_text(get(app(&state), "/current/delete").await).await;
    assert!(confirm.contains("Maya 2024 Getting Started"));

    let response = send(
        app(&state),
        Method::POST,
        "/current/delete",
        "application/x-www-form-urlencoded",
        String::new(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.current_resource.read().await.is_none());
    assert!(state.catalog.read().await.resource_by_id("1").is_none());

    // Nothing is selected any more.
    let response = get(app(&state), "/current/edit").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn failed_delete_keeps_current_resource() {
    let failing = Arc::new(AtomicBool::new(false));
    let state = state_with(
        Box::new(FlakyStore {
            inner: MemoryStore::new(),
            failing: failing.clone(),
        }),
        Vec::new(),
    );
    get(app(&state), "/resources/1").await;

    failing.store(true, Ordering::SeqCst);
    let response = post_form(app(&state), "/current/delete", "").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.current_resource.read().await.as_deref(), Some("1"));
    assert!(state.catalog.read().await.resource_by_id("1").is_some());

    failing.store(false, Ordering::SeqCst);
    let response = post_form(app(&state), "/current/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.current_resource.read().await.is_none());
    assert!(state.catalog.read().await.resource_by_id("1").is_none());
}

#[tokio::test]
async fn unknown_resource_page_is_404() {
    let state = test_state();
    let response = get(app(&state), "/resources/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(state.current_resource.read().await.is_none());
}

#[tokio::test]
async fn edit_form_saves_changes() {
    let state = test_state();
    get(app(&state), "/resources/2").await;

    let form = body_text(get(app(&state), "/current/edit").await).await;
    assert!(form.contains("/resources/2/update"));

    let response = post_form(
        app(&state),
        "/resources/2/update",
        "title=Animation+Principles&category=2&type=document&level=advanced&link=https%3A%2F%2Fexample.com%2Fa&description=&tags=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let catalog = state.catalog.read().await;
    let updated = catalog.resource_by_id("2").unwrap();
    assert_eq!(updated.title, "Animation Principles");
    assert!(updated.favorite);
}

#[tokio::test]
async fn unchanged_edit_keeps_custom_type_and_level() {
    let state = test_state();
    let id = state
        .catalog
        .write()
        .await
        .add_resource(NewResource {
            title: "Rigging Podcast".to_string(),
            category: "5".to_string(),
            kind: ResourceType::Custom("podcast".to_string()),
            level: Level::Custom("expert".to_string()),
            description: String::new(),
            link: "https://example.com/podcast".to_string(),
            tags: String::new(),
        })
        .unwrap()
        .id;

    get(app(&state), &format!("/resources/{id}")).await;
    let form = body_text(get(app(&state), "/current/edit").await).await;
    assert!(form.contains(r#"<option value="podcast" selected>podcast</option>"#));
    assert!(form.contains(r#"<option value="expert" selected>expert</option>"#));

    // Submit exactly what the form shows.
    let response = post_form(
        app(&state),
        &format!("/resources/{id}/update"),
        "title=Rigging+Podcast&category=5&type=podcast&level=expert&link=https%3A%2F%2Fexample.com%2Fpodcast&description=&tags=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let catalog = state.catalog.read().await;
    let saved = catalog.resource_by_id(&id).unwrap();
    assert_eq!(saved.kind, ResourceType::Custom("podcast".to_string()));
    assert_eq!(saved.level, Level::Custom("expert".to_string()));
}

#[tokio::test]
async fn api_patch_cannot_change_favorite() {
    let state = test_state();

    let response = send_json(
        app(&state),
        Method::PATCH,
        "/api/resources/1",
        json!({ "favorite": true, "title": "Maya 2024 Basics" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await;
    assert_eq!(patched["title"], "Maya 2024 Basics");
    assert_eq!(patched["favorite"], false);

    let stats = body_json(get(app(&state), "/api/statistics").await).await;
    assert_eq!(stats["totalFavorites"], 1);
}

#[tokio::test]
async fn api_resource_lifecycle() {
    let state = test_state();

    let response = send_json(
        app(&state),
        Method::POST,
        "/api/resources",
        json!({
            "title": "UV Layout",
            "category": "4",
            "type": "project",
            "level": "beginner",
            "link": "https://example.com/uv",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["favorite"], false);

    let response = send_json(
        app(&state),
        Method::PATCH,
        &format!("/api/resources/{id}"),
        json!({ "title": "UV Layout Basics" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "UV Layout Basics");

    let response = send_json(
        app(&state),
        Method::PATCH,
        &format!("/api/resources/{id}"),
        json!({ "link": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        app(&state),
        Method::POST,
        &format!("/api/resources/{id}/favorite"),
        "application/json",
        String::new(),
    )
    .await;
    assert_eq!(body_json(response).await["favorite"], true);

    let response = send(
        app(&state),
        Method::DELETE,
        &format!("/api/resources/{id}"),
        "application/json",
        String::new(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app(&state), &format!("/api/resources/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_rejects_incomplete_resource() {
    let state = test_state();
    let response = send_json(
        app(&state),
        Method::POST,
        "/api/resources",
        json!({ "title": "No link", "category": "1", "type": "video", "level": "beginner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("link"));
}

#[tokio::test]
async fn api_search_and_browse() {
    let state = test_state();

    let found = body_json(get(app(&state), "/api/resources?q=MAYA").await).await;
    assert_eq!(found["resources"].as_array().unwrap().len(), 2);

    let listed = body_json(get(app(&state), "/api/resources?category=all&sort=name-asc").await).await;
    let titles: Vec<&str> = listed["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Character Animation Principles in Practice",
            "Fluid Effects Workshop",
            "Maya 2024 Getting Started",
        ]
    );

    let filtered = body_json(get(app(&state), "/api/resources?category=3").await).await;
    assert_eq!(filtered["resources"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn api_statistics_and_updates() {
    let state = test_state();

    let stats = body_json(get(app(&state), "/api/statistics").await).await;
    assert_eq!(
        stats,
        json!({ "totalResources": 3, "totalCategories": 6, "totalFavorites": 1 })
    );

    let updates = body_json(get(app(&state), "/api/updates").await).await;
    assert_eq!(updates["statistics"]["totalResources"], 3);
    assert_eq!(updates["recent"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn static_assets_are_served() {
    let state = test_state();
    for path in ["/app.js", "/offline.js", "/styles.css", "/manifest.json"] {
        let response = get(app(&state), path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn offline_fetch_serves_cached_assets() {
    let state = test_state();
    let url = format!("{ORIGIN}/styles.css");
    state
        .worker
        .caches()
        .put(
            "test-cache",
            url.clone(),
            FetchResponse {
                url,
                status: 200,
                response_type: ResponseType::Basic,
                content_type: Some("text/css".to_string()),
                body: b"body {}".to_vec(),
            },
        )
        .await;

    let response = get(app(&state), "/offline/fetch?url=%2Fstyles.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    assert_eq!(body_text(response).await, "body {}");
}

#[tokio::test]
async fn offline_fetch_reports_unreachable_assets() {
    let state = test_state();

    let response = get(app(&state), "/offline/fetch?url=%2Fapp.js").await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let response = get(
        app(&state),
        "/offline/fetch?url=%2Fmissing&accept=text%2Fhtml",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn offline_fetch_refuses_foreign_urls() {
    let state = state_with(Box::new(MemoryStore::new()), default_manifest());

    for url in [
        "http%3A%2F%2F127.0.0.1%3A9%2Fsecret",
        "http%3A%2F%2Flocalhost%3A3000%40evil.example%2F",
        "https%3A%2F%2Fcdn.example.com%2Flib.js",
    ] {
        let response = get(app(&state), &format!("/offline/fetch?url={url}")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{url}");
    }
    assert!(state.worker.caches().summary().await.is_empty());

    // Manifest assets on other origins still go through the worker.
    let response = get(
        app(&state),
        &format!("/offline/fetch?url={}", urlencoding::encode(TAILWIND_URL)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn offline_messages_stream_worker_events() {
    let state = test_state();

    let response = get(app(&state), "/offline/messages").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(state.worker.clients().len().await, 1);

    let response_sync = send(
        app(&state),
        Method::POST,
        "/offline/sync/sync-resources",
        "application/json",
        String::new(),
    )
    .await;
    assert_eq!(response_sync.status(), StatusCode::ACCEPTED);

    let mut events = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let frame = String::from_utf8(frame.to_vec()).unwrap();
    assert!(frame.starts_with("data: "), "{frame}");
    assert!(frame.contains(r#""type":"SYNC_COMPLETE""#), "{frame}");

    drop(events);
    for _ in 0..10 {
        if state.worker.clients().is_empty().await {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(state.worker.clients().is_empty().await);
}

#[tokio::test]
async fn offline_status_and_hooks() {
    let state = test_state();
    let (_id, mut rx) = state.worker.clients().register().await;

    let status = body_json(get(app(&state), "/offline/status").await).await;
    assert_eq!(status["state"], "parsed");
    assert_eq!(status["cacheName"], "test-cache");
    assert_eq!(status["clients"], 1);

    let response = send(
        app(&state),
        Method::POST,
        "/offline/sync/sync-resources",
        "application/json",
        String::new(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let message = serde_json::to_value(rx.recv().await.unwrap()).unwrap();
    assert_eq!(message["type"], "SYNC_COMPLETE");

    send_json(
        app(&state),
        Method::POST,
        "/offline/notification-click",
        json!({}),
    )
    .await;
    let message = serde_json::to_value(rx.recv().await.unwrap()).unwrap();
    assert_eq!(message["type"], "OPEN_WINDOW");
    assert_eq!(message["url"], "/");
}
