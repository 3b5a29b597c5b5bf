use std::path::Path;

use anyhow::{Context as _, Result};
use api_client::ClientConfig;
use graphview::MindMapConfig;
use serde::{Deserialize, Serialize};

/// Everything the viewer reads from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub client: ClientConfig,
    pub mindmap: MindMapConfig,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.mindmap.validate()?;
        if self.client.timeout_ms == 0 {
            anyhow::bail!("client.timeout_ms must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphview::Orientation;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(ViewerConfig::parse("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn sections_override_independently() {
        let config = ViewerConfig::parse(
            r#"{
                "client": {"base_url": "https://dss.example/api", "timeout_ms": 2500},
                "mindmap": {"layout": {"orientation": "left-to-right"}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.client.base_url, "https://dss.example/api");
        assert_eq!(config.client.graph_path, "posts/graph");
        assert_eq!(config.client.timeout_ms, 2500);
        assert_eq!(config.mindmap.layout.orientation, Orientation::LeftToRight);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ViewerConfig::parse(r#"{"client": {"timeout_ms": 0}}"#).is_err());
        assert!(
            ViewerConfig::parse(r#"{"mindmap": {"viewport": {"zoom_factor": 0.5}}}"#).is_err()
        );
        assert!(ViewerConfig::parse("[1, 2]").is_err());
    }
}
