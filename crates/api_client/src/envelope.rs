//! Response envelopes: `{status: "success", data}` or `{status: "error", message}`.

use graphview::{GraphData, NodeId, Tag};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Unwraps an envelope; any status other than `success` is an error.
pub fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<T, FetchError> {
    let envelope: Envelope<T> = serde_json::from_str(text)?;
    if envelope.status != "success" {
        return Err(FetchError::Api(
            envelope
                .message
                .unwrap_or_else(|| format!("request failed with status `{}`", envelope.status)),
        ));
    }
    envelope
        .data
        .ok_or_else(|| FetchError::Api("response has no data".to_string()))
}

/// Graph payload from either an envelope or a bare `{nodes, edges}` document.
pub fn parse_graph_response(text: &str) -> Result<GraphData, FetchError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("status").is_some() {
        parse_envelope(text)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedPost {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

/// Post detail for the quick view. Body blocks are rendered elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub related: Vec<RelatedPost>,
    #[serde(default)]
    pub blocks: serde_json::Value,
}
