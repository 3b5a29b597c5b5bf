use mindmap_layout::LayoutResult;
use thiserror::Error;

use crate::outline::Outline;
use crate::viewport::ViewportState;
use crate::visible::VisibleGraph;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("viewport zoom must be positive, got {0}")]
    InvalidZoom(f64),
}

/// A drawing back-end for one laid-out visible graph.
pub trait GraphRenderer {
    type Output;

    fn render(
        &mut self,
        visible: &VisibleGraph,
        layout: &LayoutResult,
        viewport: &ViewportState,
    ) -> Result<Self::Output, RenderError>;
}

/// Plain-text list view; ignores geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl GraphRenderer for OutlineRenderer {
    type Output = String;

    fn render(
        &mut self,
        visible: &VisibleGraph,
        _layout: &LayoutResult,
        _viewport: &ViewportState,
    ) -> Result<String, RenderError> {
        Ok(Outline::from_visible(visible).to_text())
    }
}
