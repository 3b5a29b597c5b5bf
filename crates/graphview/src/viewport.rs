use std::time::Duration;

use mindmap_layout::{Position, Rect, Size};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pan/zoom transform: `screen = world * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewportState {
    pub fn world_to_screen(&self, p: Position) -> Position {
        Position::new(p.x * self.zoom + self.x, p.y * self.zoom + self.y)
    }

    pub fn screen_to_world(&self, p: Position) -> Position {
        Position::new((p.x - self.x) / self.zoom, (p.y - self.y) / self.zoom)
    }

    fn lerp(&self, to: &ViewportState, t: f64) -> ViewportState {
        ViewportState {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Space kept free around fitted content, in screen pixels.
    pub padding: f64,
    pub zoom_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fitting never zooms in beyond this.
    pub max_fit_zoom: f64,
    pub animation_ms: u64,
    /// Container size until the first resize arrives.
    pub container: Size,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            zoom_factor: 1.2,
            min_zoom: 0.1,
            max_zoom: 3.0,
            max_fit_zoom: 2.0,
            animation_ms: 300,
            container: Size::new(1280.0, 800.0),
        }
    }
}

/// What a layout pass did to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    Fitting,
    Preserving,
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Transition between two viewport states for the interactive view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportAnimation {
    pub from: ViewportState,
    pub to: ViewportState,
    pub duration: Duration,
}

impl ViewportAnimation {
    pub fn sample(&self, elapsed: Duration) -> ViewportState {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(&self.to, ease_out_cubic(t))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.duration.is_zero() || elapsed >= self.duration
    }
}

/// Imperative zoom handle for toolbars.
pub trait ZoomControls {
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
    fn fit_view(&mut self);
}

/// Decides on every layout pass whether to refit or keep the transform.
///
/// Expand and select handlers call [`ViewportController::mark_interaction`]
/// before triggering the pass; the next [`ViewportController::on_layout`]
/// consumes the flag.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    container: Size,
    content: Option<Rect>,
    interaction: bool,
    laid_out: bool,
    animation: Option<ViewportAnimation>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            container: config.container,
            config,
            state: ViewportState::default(),
            content: None,
            interaction: false,
            laid_out: false,
            animation: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn interaction_pending(&self) -> bool {
        self.interaction
    }

    /// Flags the next layout pass as caused by a direct user action.
    pub fn mark_interaction(&mut self) {
        self.interaction = true;
    }

    /// Handles one layout pass over content with the given world bounds.
    pub fn on_layout(&mut self, content: Option<Rect>) -> ViewportMode {
        self.content = content;
        let interaction = std::mem::take(&mut self.interaction);
        let first = !self.laid_out;
        self.laid_out = true;

        if first || !interaction {
            self.fit_to_content();
            ViewportMode::Fitting
        } else {
            debug!(zoom = self.state.zoom, "preserving viewport");
            ViewportMode::Preserving
        }
    }

    /// Frames the current content, or resets when there is none.
    pub fn fit_to_content(&mut self) {
        let target = match self.content {
            Some(bounds) => self.fitted(bounds),
            None => ViewportState::default(),
        };
        debug!(x = target.x, y = target.y, zoom = target.zoom, "fitting viewport");
        self.animate_to(target);
    }

    fn fitted(&self, bounds: Rect) -> ViewportState {
        let padding = self.config.padding;
        let available_width = self.container.width - padding * 2.0;
        let available_height = self.container.height - padding * 2.0;

        let zoom_x = available_width / bounds.width.max(1.0);
        let zoom_y = available_height / bounds.height.max(1.0);
        let zoom = zoom_x
            .min(zoom_y)
            .clamp(self.config.min_zoom, self.config.max_fit_zoom);

        let center = bounds.center();
        ViewportState {
            x: self.container.width / 2.0 - center.x * zoom,
            y: self.container.height / 2.0 - center.y * zoom,
            zoom,
        }
    }

    fn animate_to(&mut self, target: ViewportState) {
        if target != self.state {
            self.animation = Some(ViewportAnimation {
                from: self.state,
                to: target,
                duration: Duration::from_millis(self.config.animation_ms),
            });
        }
        self.state = target;
    }

    /// Pending transition, handed out once.
    pub fn take_animation(&mut self) -> Option<ViewportAnimation> {
        self.animation.take()
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.state.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.animation = None;
    }

    /// Multiplies zoom by the configured factor; pan is unchanged.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom * self.config.zoom_factor);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom / self.config.zoom_factor);
    }

    /// Zooms by `factor` keeping the world point under `screen` in place.
    pub fn zoom_at(&mut self, screen: Position, factor: f64) {
        let world = self.state.screen_to_world(screen);
        self.set_zoom(self.state.zoom * factor);
        self.state.x = screen.x - world.x * self.state.zoom;
        self.state.y = screen.y - world.y * self.state.zoom;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.state.x += dx;
        self.state.y += dy;
        self.animation = None;
    }

    /// New container size; the content is refitted.
    pub fn resize(&mut self, container: Size) {
        if container == self.container {
            return;
        }
        self.container = container;
        if self.laid_out {
            self.fit_to_content();
        }
    }

    /// Back to the freshly-mounted state: identity transform, no content, the
    /// next pass fits.
    pub fn reset(&mut self) {
        self.state = ViewportState::default();
        self.content = None;
        self.interaction = false;
        self.laid_out = false;
        self.animation = None;
    }

    pub fn screen_to_world(&self, p: Position) -> Position {
        self.state.screen_to_world(p)
    }

    pub fn world_to_screen(&self, p: Position) -> Position {
        self.state.world_to_screen(p)
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ZoomControls for ViewportController {
    fn zoom_in(&mut self) {
        ViewportController::zoom_in(self);
    }

    fn zoom_out(&mut self) {
        ViewportController::zoom_out(self);
    }

    fn fit_view(&mut self) {
        self.fit_to_content();
    }
}
