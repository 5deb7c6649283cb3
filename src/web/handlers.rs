use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{pages, AppState};
use crate::error::CatalogError;
use crate::models::{CategoryForm, ResourceForm, ResourcePatch, SortOrder};

const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

type PageResult = Result<Response, (StatusCode, Html<String>)>;

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackForm {
    #[serde(default)]
    pub back: String,
}

fn storage_failure(e: CatalogError) -> (StatusCode, Html<String>) {
    error!(error = %e, "Failed to save catalog");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::error(&format!("Failed to save changes: {e}"))),
    )
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
}

/// Only same-site relative paths are followed after a form post.
fn safe_back(back: &str) -> &str {
    let ok = back.starts_with('/')
        && !back.starts_with("//")
        && back.bytes().all(|b| b.is_ascii_graphic());
    if ok {
        back
    } else {
        "/"
    }
}

pub async fn home(State(state): State<Arc<AppState>>, Query(query): Query<HomeQuery>) -> Html<String> {
    let catalog = state.catalog.read().await;
    let category = query.category.as_deref().unwrap_or("all");
    let order = query
        .sort
        .as_deref()
        .map(SortOrder::parse)
        .unwrap_or_default();
    let search = query.q.as_deref().unwrap_or("").trim();
    Html(pages::home(&catalog, category, order, search))
}

pub async fn add_resource(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResourceForm>,
) -> PageResult {
    let input = match form.validate() {
        Ok(input) => input,
        Err(_) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(pages::alert(REQUIRED_FIELDS_MESSAGE)),
            )
                .into_response())
        }
    };

    let created = state
        .catalog
        .write()
        .await
        .add_resource(input)
        .map_err(storage_failure)?;
    info!(id = %created.id, title = %created.title, "Resource added");
    Ok(Redirect::to("/").into_response())
}

pub async fn add_category(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CategoryForm>,
) -> PageResult {
    // A blank name is ignored rather than reported.
    if let Ok(input) = form.validate() {
        let created = state
            .catalog
            .write()
            .await
            .add_category(input)
            .map_err(storage_failure)?;
        info!(id = %created.id, name = %created.name, "Category added");
    }
    Ok(Redirect::to("/").into_response())
}

pub async fn show_resource(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let catalog = state.catalog.read().await;
    let Some(resource) = catalog.resource_by_id(&id) else {
        return not_found();
    };
    *state.current_resource.write().await = Some(resource.id.clone());
    Html(pages::details(resource, catalog.category_by_id(&resource.category))).into_response()
}

pub async fn edit_current(State(state): State<Arc<AppState>>) -> Response {
    let current = state.current_resource.read().await.clone();
    let catalog = state.catalog.read().await;
    match current.as_deref().and_then(|id| catalog.resource_by_id(id)) {
        Some(resource) => Html(pages::edit_form(resource, catalog.list_categories())).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

pub async fn save_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<ResourceForm>,
) -> PageResult {
    let input = match form.validate() {
        Ok(input) => input,
        Err(_) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(pages::alert(REQUIRED_FIELDS_MESSAGE)),
            )
                .into_response())
        }
    };

    let updated = state
        .catalog
        .write()
        .await
        .update_resource(&id, ResourcePatch::from(input))
        .map_err(storage_failure)?;
    match updated {
        Some(resource) => {
            info!(id = %resource.id, "Resource updated");
            Ok(Redirect::to("/").into_response())
        }
        None => Ok(not_found()),
    }
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<BackForm>,
) -> PageResult {
    let toggled = state
        .catalog
        .write()
        .await
        .toggle_favorite(&id)
        .map_err(storage_failure)?;
    match toggled {
        Some(_) => Ok(Redirect::to(safe_back(&form.back)).into_response()),
        None => Ok(not_found()),
    }
}

pub async fn confirm_delete(State(state): State<Arc<AppState>>) -> Response {
    let current = state.current_resource.read().await.clone();
    let catalog = state.catalog.read().await;
    match current.as_deref().and_then(|id| catalog.resource_by_id(id)) {
        Some(resource) => Html(pages::confirm_delete(resource)).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

pub async fn delete_current(State(state): State<Arc<AppState>>) -> PageResult {
    let Some(id) = state.current_resource.read().await.clone() else {
        return Ok(Redirect::to("/").into_response());
    };
    state
        .catalog
        .write()
        .await
        .delete_resource(&id)
        .map_err(storage_failure)?;

    // Cleared only once the delete is saved; a failed save keeps it current.
    let mut current = state.current_resource.write().await;
    if current.as_deref() == Some(id.as_str()) {
        *current = None;
    }
    info!(%id, "Resource deleted");
    Ok(Redirect::to("/").into_response())
}
