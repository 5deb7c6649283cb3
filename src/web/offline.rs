use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::AppState;
use crate::offline::{CacheSummary, FetchRequest, OfflineError, Subscription, WorkerState};

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub url: String,
    pub accept: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationClick {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineStatus {
    pub state: WorkerState,
    pub cache_name: String,
    pub caches: Vec<CacheSummary>,
    pub clients: usize,
}

/// Answers a request through the offline worker. Only our own URLs and the
/// manifest assets are fetched; anything else is refused.
pub async fn fetch(State(state): State<Arc<AppState>>, Query(query): Query<FetchQuery>) -> Response {
    let url = state.worker.resolve(&query.url);
    if !state.worker.serves(&url) {
        warn!(%url, "Refusing offline fetch outside origin and manifest");
        return (StatusCode::FORBIDDEN, format!("{} is not served offline", url)).into_response();
    }

    let mut request = FetchRequest::new(url);
    if let Some(accept) = query.accept {
        request = request.with_accept(accept);
    }

    match state.worker.fetch(&request).await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = response
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            (status, [(header::CONTENT_TYPE, content_type)], response.body).into_response()
        }
        Err(e @ OfflineError::NotCached { .. }) => {
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::GATEWAY_TIMEOUT, e.to_string()).into_response(),
    }
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<OfflineStatus> {
    let worker = &state.worker;
    Json(OfflineStatus {
        state: worker.state().await,
        cache_name: worker.config().cache_name.clone(),
        caches: worker.caches().summary().await,
        clients: worker.clients().len().await,
    })
}

/// Server-sent event feed of worker messages for one page. The client stays
/// registered until the connection closes.
pub async fn messages(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = Subscription::open(state.worker.clients().clone()).await;
    debug!(client = %subscription.id(), "Client subscribed to worker messages");

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        Some((Event::default().json_data(&message), subscription))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn sync(State(state): State<Arc<AppState>>, Path(tag): Path<String>) -> StatusCode {
    state.worker.sync(&tag).await;
    StatusCode::ACCEPTED
}

pub async fn periodic_sync(State(state): State<Arc<AppState>>, Path(tag): Path<String>) -> StatusCode {
    state.worker.periodic_sync(&tag).await;
    StatusCode::ACCEPTED
}

pub async fn push(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    state.worker.push(&String::from_utf8_lossy(&body)).await;
    StatusCode::ACCEPTED
}

pub async fn notification_click(
    State(state): State<Arc<AppState>>,
    Json(click): Json<NotificationClick>,
) -> StatusCode {
    state.worker.notification_click(click.url.as_deref()).await;
    StatusCode::ACCEPTED
}
