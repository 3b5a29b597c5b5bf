use std::future::Future;
use std::time::Duration;

use graphview::GraphData;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::envelope::{PostDetail, parse_envelope, parse_graph_response};
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Relative to `base_url`.
    pub graph_path: String,
    /// Relative to `base_url`; the `{slug}` segment is replaced. Without one
    /// the slug is appended.
    pub post_path: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            graph_path: "posts/graph".to_string(),
            post_path: "posts/{slug}".to_string(),
            timeout_ms: 10_000,
        }
    }
}

const SLUG_PLACEHOLDER: &str = "{slug}";

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Runs `request`, giving up after `limit`. The request future is dropped on
/// expiry, which aborts it.
pub async fn with_timeout<T, F>(limit: Duration, request: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

/// Client for the content platform's REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn graph_url(&self) -> Result<Url, FetchError> {
        Ok(self.base.join(&self.config.graph_path)?)
    }

    pub fn post_url(&self, slug: &str) -> Result<Url, FetchError> {
        let template = self.config.post_path.as_str();
        let (head, tail) = template
            .split_once(SLUG_PLACEHOLDER)
            .unwrap_or((template, ""));
        let mut url = self.base.join(head)?;
        // Segments pushed here are percent-encoded by `url`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(slug);
            segments.extend(tail.split('/').filter(|s| !s.is_empty()));
            if tail.ends_with('/') {
                segments.push("");
            }
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// The whole post graph.
    pub async fn fetch_graph(&self) -> Result<GraphData, FetchError> {
        let url = self.graph_url()?;
        let text = with_timeout(self.config.timeout(), self.get_text(url)).await?;
        let data = parse_graph_response(&text)?;
        info!(
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "fetched graph"
        );
        Ok(data)
    }

    /// Detail of one post for the quick view.
    pub async fn fetch_post(&self, slug: &str) -> Result<PostDetail, FetchError> {
        let url = self.post_url(slug)?;
        let text = with_timeout(self.config.timeout(), self.get_text(url)).await?;
        parse_envelope(&text)
    }
}
