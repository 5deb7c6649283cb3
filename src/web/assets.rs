//! Static assets embedded in the binary. Every local entry of the offline
//! manifest is served from here.

use axum::{http::header, response::IntoResponse};

const APP_JS: &str = include_str!("../../static/app.js");
const OFFLINE_JS: &str = include_str!("../../static/offline.js");
const STYLES_CSS: &str = include_str!("../../static/styles.css");
const WEB_MANIFEST: &str = include_str!("../../static/manifest.json");

pub async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

pub async fn offline_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], OFFLINE_JS)
}

pub async fn styles_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLES_CSS)
}

pub async fn web_manifest() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/manifest+json")], WEB_MANIFEST)
}
