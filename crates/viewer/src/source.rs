use std::path::PathBuf;

use anyhow::{Context as _, Result};
use api_client::{ApiClient, FetchError, PostDetail, parse_graph_response};
use graphview::GraphData;
use tokio::runtime::Handle;
use tracing::info;

/// Where the graph comes from. Post details are only available over HTTP.
#[derive(Debug, Clone)]
pub enum GraphSource {
    Api(ApiClient),
    File(PathBuf),
}

impl GraphSource {
    pub fn describe(&self) -> String {
        match self {
            GraphSource::Api(client) => client
                .graph_url()
                .map(|url| url.to_string())
                .unwrap_or_else(|_| client.config().base_url.clone()),
            GraphSource::File(path) => path.display().to_string(),
        }
    }

    pub fn client(&self) -> Option<&ApiClient> {
        match self {
            GraphSource::Api(client) => Some(client),
            GraphSource::File(_) => None,
        }
    }

    pub async fn fetch_graph(&self) -> Result<GraphData, FetchError> {
        match self {
            GraphSource::Api(client) => client.fetch_graph().await,
            GraphSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?;
                let data = parse_graph_response(&text)?;
                info!(path = %path.display(), nodes = data.nodes.len(), "loaded graph file");
                Ok(data)
            }
        }
    }

    /// Blocking fetch for the headless commands.
    pub fn fetch_graph_blocking(&self, runtime: &Handle) -> Result<GraphData> {
        runtime
            .block_on(self.fetch_graph())
            .with_context(|| format!("failed to load graph from {}", self.describe()))
    }
}

/// Post detail fetch run on the tokio runtime; the returned handle can be
/// awaited from the UI executor.
pub fn spawn_post_fetch(
    runtime: &Handle,
    client: ApiClient,
    slug: String,
) -> tokio::task::JoinHandle<Result<PostDetail, FetchError>> {
    runtime.spawn(async move { client.fetch_post(&slug).await })
}

pub fn spawn_graph_fetch(
    runtime: &Handle,
    source: GraphSource,
) -> tokio::task::JoinHandle<Result<GraphData, FetchError>> {
    runtime.spawn(async move { source.fetch_graph().await })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_bare_documents() {
        let path = std::env::temp_dir().join("dss-mindmap-source-test.json");
        std::fs::write(
            &path,
            r#"{"nodes": [{"id": 1, "title": "Energy"}], "edges": []}"#,
        )
        .unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = GraphSource::File(path.clone());
        let data = source.fetch_graph_blocking(runtime.handle()).unwrap();
        assert_eq!(data.nodes.len(), 1);
        assert!(source.client().is_none());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_names_the_source() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = GraphSource::File(PathBuf::from("/nonexistent/graph.json"));
        let err = source.fetch_graph_blocking(runtime.handle()).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/graph.json"));
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Io { .. })
        ));
    }
}
