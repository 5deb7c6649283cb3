use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::cache::{FetchResponse, ResponseType};
use super::{is_same_origin, OfflineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL.
    pub url: String,
    pub accept: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept: None,
        }
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("text/html"))
    }
}

/// Outbound transport used by the worker on cache misses.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, OfflineError>;
}

/// `reqwest`-backed network. Responses from `origin` are tagged
/// [`ResponseType::Basic`], everything else [`ResponseType::Cors`].
pub struct HttpNetwork {
    client: reqwest::Client,
    origin: String,
}

impl HttpNetwork {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into(),
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, OfflineError> {
        let network_err = |e: reqwest::Error| OfflineError::Network {
            url: request.url.clone(),
            reason: e.to_string(),
        };

        let mut builder = self.client.get(&request.url);
        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        let response = builder.send().await.map_err(network_err)?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(network_err)?.to_vec();

        let response_type = if is_same_origin(&self.origin, &url) {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };

        Ok(FetchResponse {
            url,
            status,
            response_type,
            content_type,
            body,
        })
    }
}
