use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::handlers::HomeQuery;
use super::AppState;
use crate::catalog::sort_resources;
use crate::error::CatalogError;
use crate::models::{
    Category, CategoryForm, CategoryListResponse, FavoriteResponse, Resource, ResourceForm,
    ResourceListResponse, ResourcePatch, SortOrder, Statistics, UpdatesResponse,
};

const RECENT_LIMIT: usize = 5;

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/resources", get(list_resources).post(create_resource))
        .route(
            "/resources/:id",
            get(get_resource).patch(update_resource).delete(delete_resource),
        )
        .route("/resources/:id/favorite", post(toggle_favorite))
        .route("/statistics", get(statistics))
        .route("/updates", get(updates))
}

fn bad_request(e: CatalogError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn save_failed(e: CatalogError) -> (StatusCode, String) {
    tracing::error!(error = %e, "Failed to save catalog");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to save catalog: {}", e),
    )
}

fn resource_not_found(id: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Resource {} not found", id))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoryListResponse> {
    let catalog = state.catalog.read().await;
    Json(CategoryListResponse {
        categories: catalog.list_categories().to_vec(),
    })
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryForm>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let input = payload.validate().map_err(bad_request)?;
    let category = state
        .catalog
        .write()
        .await
        .add_category(input)
        .map_err(save_failed)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// A non-empty `q` searches; otherwise the category filter and sort apply.
async fn list_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
) -> Json<ResourceListResponse> {
    let catalog = state.catalog.read().await;
    let order = query
        .sort
        .as_deref()
        .map(SortOrder::parse)
        .unwrap_or_default();
    let search = query.q.as_deref().map(str::trim).unwrap_or("");

    let resources = if search.is_empty() {
        catalog.browse(query.category.as_deref(), order)
    } else {
        catalog.search(search)
    };
    Json(ResourceListResponse { resources })
}

async fn create_resource(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResourceForm>,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    let input = payload.validate().map_err(bad_request)?;
    let resource = state
        .catalog
        .write()
        .await
        .add_resource(input)
        .map_err(save_failed)?;
    Ok((StatusCode::CREATED, Json(resource)))
}

async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Resource>> {
    let catalog = state.catalog.read().await;
    catalog
        .resource_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| resource_not_found(&id))
}

async fn update_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ResourcePatch>,
) -> ApiResult<Json<Resource>> {
    patch.validate().map_err(bad_request)?;
    state
        .catalog
        .write()
        .await
        .update_resource(&id, patch)
        .map_err(save_failed)?
        .map(Json)
        .ok_or_else(|| resource_not_found(&id))
}

async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .catalog
        .write()
        .await
        .delete_resource(&id)
        .map_err(save_failed)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<FavoriteResponse>> {
    let favorite = state
        .catalog
        .write()
        .await
        .toggle_favorite(&id)
        .map_err(save_failed)?
        .ok_or_else(|| resource_not_found(&id))?;
    Ok(Json(FavoriteResponse { id, favorite }))
}

async fn statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    Json(state.catalog.read().await.statistics())
}

async fn updates(State(state): State<Arc<AppState>>) -> Json<UpdatesResponse> {
    let catalog = state.catalog.read().await;
    let mut recent = sort_resources(catalog.list_resources().to_vec(), SortOrder::DateDesc);
    recent.truncate(RECENT_LIMIT);
    Json(UpdatesResponse {
        statistics: catalog.statistics(),
        recent,
    })
}
