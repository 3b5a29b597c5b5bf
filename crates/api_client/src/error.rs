use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered with HTTP {status}")]
    Http { status: u16 },
    #[error("server reported an error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fetch task ended early: {0}")]
    Aborted(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Text shown to the user in place of the graph or post.
    pub fn user_message(&self) -> String {
        if self.is_timeout() {
            return "Request timed out".to_string();
        }
        match self {
            FetchError::Api(message) => message.clone(),
            FetchError::Http { status } => format!("Could not load data (HTTP {status})"),
            _ => "Could not load data".to_string(),
        }
    }
}
