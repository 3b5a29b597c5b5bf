//! Mind-map engine: turns a flat post graph into a lazily expandable, laid-out
//! diagram and keeps the viewport stable across user-driven updates.

pub mod expansion;
pub mod index;
pub mod model;
pub mod outline;
pub mod palette;
pub mod render;
pub mod scene;
pub mod session;
pub mod svg_renderer;
pub mod viewport;
pub mod visible;

pub use expansion::{ExpansionController, ExpansionPath, ExpansionSet};
pub use index::{GraphIndex, IndexedEdge};
pub use model::{Edge, EdgeFilter, EdgeKind, GraphData, NodeId, PostNode, Tag};
pub use outline::{Outline, OutlineEntry};
pub use palette::{CATEGORY10, ColorParseError, Rgb, SectionStyle};
pub use render::{GraphRenderer, OutlineRenderer, RenderError};
pub use scene::{Hit, Marker, Scene, SceneEdge, SceneNode, SceneStyle};
pub use session::{ConfigError, MindMap, MindMapConfig, ViewStatus};
pub use svg_renderer::SvgRenderer;
pub use viewport::{
    ViewportAnimation, ViewportConfig, ViewportController, ViewportMode, ViewportState,
    ZoomControls,
};
pub use visible::{VisibleEdge, VisibleGraph, VisibleNode, compute_visible_graph};

pub use mindmap_layout::{HierarchicalLayout, LayoutResult, Orientation, Position, Rect, Size};
