use mindmap_layout::{HierarchicalLayout, LayoutError, LayoutResult, Orientation, Position, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::expansion::{ExpansionController, ExpansionPath, ExpansionSet};
use crate::index::GraphIndex;
use crate::model::{EdgeFilter, EdgeKind, GraphData, NodeId};
use crate::outline::Outline;
use crate::scene::{Hit, Scene, SceneStyle};
use crate::viewport::{ViewportConfig, ViewportController, ViewportMode, ViewportState, ZoomControls};
use crate::visible::{VisibleGraph, compute_visible_graph};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("zoom limits must satisfy 0 < min <= max-fit <= max, got {min}, {max_fit}, {max}")]
    ZoomLimits { min: f64, max_fit: f64, max: f64 },
    #[error("zoom factor must be greater than 1, got {0}")]
    ZoomFactor(f64),
    #[error("viewport padding must be non-negative, got {0}")]
    Padding(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindMapConfig {
    pub layout: HierarchicalLayout,
    pub viewport: ViewportConfig,
    pub style: SceneStyle,
    pub edge_filter: EdgeFilter,
    /// Root used when no node qualifies as one.
    pub fallback_root: Option<NodeId>,
}

impl MindMapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        let vp = &self.viewport;
        if !(vp.min_zoom > 0.0 && vp.min_zoom <= vp.max_fit_zoom && vp.max_fit_zoom <= vp.max_zoom) {
            return Err(ConfigError::ZoomLimits {
                min: vp.min_zoom,
                max_fit: vp.max_fit_zoom,
                max: vp.max_zoom,
            });
        }
        if !(vp.zoom_factor > 1.0) {
            return Err(ConfigError::ZoomFactor(vp.zoom_factor));
        }
        if vp.padding < 0.0 {
            return Err(ConfigError::Padding(vp.padding));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing requested yet.
    Idle,
    Loading,
    Ready,
    /// Loaded, but the dataset has no nodes.
    NoData,
    Error(String),
}

/// One mounted mind-map view: dataset, expansion, filters, layout and
/// viewport, recomputed together.
///
/// Every state change runs exactly one pass of visible graph, layout and
/// viewport decision.
pub struct MindMap {
    config: MindMapConfig,
    index: GraphIndex,
    expansion: ExpansionController,
    filter: EdgeFilter,
    viewport: ViewportController,
    visible: VisibleGraph,
    layout: LayoutResult,
    scene: Scene,
    status: ViewStatus,
    current: Option<String>,
    passes: u64,
    on_select: Option<Box<dyn FnMut(&str)>>,
    on_expand: Option<Box<dyn FnMut(&ExpansionPath)>>,
}

impl MindMap {
    pub fn new(config: MindMapConfig) -> Self {
        Self {
            index: GraphIndex::default(),
            expansion: ExpansionController::new(),
            filter: config.edge_filter,
            viewport: ViewportController::new(config.viewport.clone()),
            visible: VisibleGraph::default(),
            layout: LayoutResult::empty(config.layout.orientation),
            scene: Scene::default(),
            status: ViewStatus::Idle,
            current: None,
            passes: 0,
            on_select: None,
            on_expand: None,
            config,
        }
    }

    /// Called with the slug of a node whose label was clicked.
    pub fn on_select(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    /// Called with the path of a node whose expand marker was clicked.
    pub fn on_expand(&mut self, callback: impl FnMut(&ExpansionPath) + 'static) {
        self.on_expand = Some(Box::new(callback));
    }

    pub fn config(&self) -> &MindMapConfig {
        &self.config
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn visible(&self) -> &VisibleGraph {
        &self.visible
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn expansion(&self) -> &ExpansionSet {
        self.expansion.set()
    }

    pub fn edge_filter(&self) -> EdgeFilter {
        self.filter
    }

    pub fn orientation(&self) -> Orientation {
        self.config.layout.orientation
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn outline(&self) -> Outline {
        Outline::from_visible(&self.visible)
    }

    /// Number of layout passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn begin_loading(&mut self) {
        self.status = ViewStatus::Loading;
    }

    /// Replaces the dataset. Everything starts collapsed and the view refits.
    pub fn load(&mut self, data: GraphData) {
        self.index = GraphIndex::new(data, self.config.fallback_root.as_ref());
        self.expansion.reset();
        self.status = if self.index.is_empty() {
            ViewStatus::NoData
        } else {
            ViewStatus::Ready
        };
        info!(
            nodes = self.index.len(),
            edges = self.index.edges().len(),
            roots = self.index.roots().len(),
            "loaded graph"
        );
        self.recompute();
    }

    /// Fetch failure: no partial graph, expansion and viewport reset.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "graph unavailable");
        self.index = GraphIndex::default();
        self.expansion.reset();
        self.viewport.reset();
        self.status = ViewStatus::Error(message);
        self.recompute();
    }

    /// Expand marker clicked.
    pub fn toggle(&mut self, path: &ExpansionPath) {
        self.viewport.mark_interaction();
        let expanded = self.expansion.toggle(path);
        debug!(%path, expanded, "toggled node");
        if let Some(callback) = self.on_expand.as_mut() {
            callback(path);
        }
        self.recompute();
    }

    /// Expands every path in a single pass and refits. Already expanded paths
    /// stay expanded.
    pub fn expand_paths<'a>(&mut self, paths: impl IntoIterator<Item = &'a ExpansionPath>) {
        for path in paths {
            self.expansion.expand(path);
        }
        self.recompute();
    }

    /// Label clicked: the node becomes current and the caller is told.
    pub fn select(&mut self, slug: &str) {
        self.viewport.mark_interaction();
        self.current = Some(slug.to_string());
        if let Some(callback) = self.on_select.as_mut() {
            callback(slug);
        }
        self.recompute();
    }

    /// Dispatches a click at a screen point. Returns what was hit.
    pub fn click(&mut self, screen: Position) -> Option<Hit> {
        let world = self.viewport.screen_to_world(screen);
        let hit = self.scene.hit_test(world)?;
        match &hit {
            Hit::Toggle(path) => self.toggle(path),
            Hit::Select(slug) => self.select(slug),
        }
        Some(hit)
    }

    /// Highlights the post shown elsewhere; layout and viewport stay as they are.
    pub fn set_current(&mut self, slug: Option<&str>) {
        self.current = slug.map(str::to_string);
        self.scene = Scene::build(
            &self.visible,
            &self.layout,
            &self.config.style,
            self.current.as_deref(),
        );
    }

    /// Expands whatever it takes for `slug` to be drawn, makes it current and
    /// refits. Returns false when the post is unknown or no visible node leads
    /// to it.
    ///
    /// Each step expands the collapsed visible node nearest to the target, so
    /// the expansion follows the path the traversal actually emits the post
    /// at, which may go through related edges of an earlier root.
    pub fn reveal(&mut self, slug: &str) -> bool {
        let Some(target) = self.index.position_by_slug(slug) else {
            return false;
        };
        let target_id = self.index.node(target).id.clone();
        let distance = self.index.distances_to(target, self.filter.related);

        let mut visible = compute_visible_graph(&self.index, self.expansion.set(), self.filter);
        while !visible.contains(&target_id) {
            let nearest = visible
                .nodes
                .iter()
                .filter(|node| !node.expanded)
                .filter_map(|node| Some((distance[self.index.position(&node.id)?]?, &node.path)))
                .min_by_key(|(hops, _)| *hops);
            let Some((_, path)) = nearest else {
                warn!(%slug, "post cannot be reached from the roots");
                return false;
            };
            let path = path.clone();
            self.expansion.expand(&path);
            visible = compute_visible_graph(&self.index, self.expansion.set(), self.filter);
        }

        self.current = Some(slug.to_string());
        self.recompute();
        true
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.config.layout.orientation != orientation {
            self.config.layout.orientation = orientation;
            self.recompute();
        }
    }

    pub fn toggle_orientation(&mut self) {
        self.set_orientation(self.orientation().toggled());
    }

    pub fn set_edge_filter(&mut self, filter: EdgeFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.recompute();
        }
    }

    pub fn toggle_edge_kind(&mut self, kind: EdgeKind) {
        self.set_edge_filter(self.filter.toggled(kind));
    }

    pub fn resize(&mut self, container: Size) {
        self.viewport.resize(container);
    }

    /// Visible graph, layout and viewport decision for the current state.
    fn recompute(&mut self) -> ViewportMode {
        self.visible = compute_visible_graph(&self.index, self.expansion.set(), self.filter);
        self.layout =
            self.config
                .layout
                .layout(&self.visible.nodes, &self.visible.edges, &self.visible.roots);
        let mode = self.viewport.on_layout(self.layout.bounds());
        self.scene = Scene::build(
            &self.visible,
            &self.layout,
            &self.config.style,
            self.current.as_deref(),
        );
        self.passes += 1;
        debug!(
            pass = self.passes,
            nodes = self.visible.nodes.len(),
            edges = self.visible.edges.len(),
            ?mode,
            "recomputed mind map"
        );
        mode
    }
}

impl ZoomControls for MindMap {
    fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    fn fit_view(&mut self) {
        self.viewport.fit_to_content();
    }
}

impl Default for MindMap {
    fn default() -> Self {
        Self::new(MindMapConfig::default())
    }
}
