use std::time::Instant;

use api_client::{FetchError, QuickView, QuickViewState};
use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui::{Context, IntoElement, ParentElement, Render, Styled, Window, canvas, div};
use graphview::{
    EdgeKind, ExpansionPath, MindMap, Orientation, Position as WorldPoint, Rgb, SceneNode,
    Size as WorldSize, ViewStatus, ViewportAnimation, ViewportState, ZoomControls,
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::paint::{DASH, GAP, dash_polyline, push_segment, to_point};
use crate::source::{GraphSource, spawn_graph_fetch, spawn_post_fetch};

const PANEL_BG: u32 = 0x2a2e37;
const PANEL_BORDER: u32 = 0x4a4f5b;
const BUTTON_BG: u32 = 0x353a45;
const BUTTON_ACTIVE_BG: u32 = 0x3d5a8a;
const LINK: u32 = 0x7fb2ff;

/// Pixels per second the related-edge dashes travel.
const DASH_SPEED: f32 = 24.0;

/// Emitted when a node label is clicked or a related post is opened.
#[derive(Clone, Debug)]
pub struct NodeSelected {
    pub slug: String,
}

/// Emitted when an expand marker is clicked.
#[derive(Clone, Debug)]
pub struct NodeExpanded {
    pub path: ExpansionPath,
}

pub struct MindMapView {
    map: MindMap,
    source: GraphSource,
    runtime: Handle,
    quick_view: QuickView,
    /// Paths opened once the first dataset arrives.
    initial_expand: Vec<ExpansionPath>,
    animation: Option<(ViewportAnimation, Instant)>,
    started: Instant,
    container_offset: Point<Pixels>,
    is_panning: bool,
    pan_last: Point<Pixels>,
    _graph_task: Option<Task<()>>,
    _post_task: Option<Task<()>>,
}

impl EventEmitter<NodeSelected> for MindMapView {}
impl EventEmitter<NodeExpanded> for MindMapView {}

fn rgb_of(color: Rgb) -> Rgba {
    rgb(color.0)
}

fn button<F>(
    label: impl Into<SharedString>,
    active: bool,
    cx: &mut Context<MindMapView>,
    on_press: F,
) -> Div
where
    F: Fn(&mut MindMapView, &mut Context<MindMapView>) + 'static,
{
    div()
        .child(label.into())
        .px(px(8.0))
        .py(px(4.0))
        .bg(if active { rgb(BUTTON_ACTIVE_BG) } else { rgb(BUTTON_BG) })
        .border(px(1.0))
        .border_color(rgb(PANEL_BORDER))
        .rounded(px(4.0))
        .cursor_pointer()
        .on_mouse_down(
            MouseButton::Left,
            cx.listener(move |this, _e: &MouseDownEvent, _w, cx| {
                cx.stop_propagation();
                on_press(this, cx);
            }),
        )
}

impl MindMapView {
    pub fn new(
        map: MindMap,
        source: GraphSource,
        runtime: Handle,
        initial_expand: Vec<ExpansionPath>,
        cx: &mut Context<Self>,
    ) -> Self {
        let mut view = Self {
            map,
            source,
            runtime,
            quick_view: QuickView::new(),
            initial_expand,
            animation: None,
            started: Instant::now(),
            container_offset: point(px(0.0), px(0.0)),
            is_panning: false,
            pan_last: point(px(0.0), px(0.0)),
            _graph_task: None,
            _post_task: None,
        };
        view.reload(cx);
        view
    }

    /// (Re)fetches the graph. A result arriving after the view is gone is
    /// dropped.
    pub fn reload(&mut self, cx: &mut Context<Self>) {
        self.map.begin_loading();
        self.quick_view.close();
        let fetch = spawn_graph_fetch(&self.runtime, self.source.clone());
        self._graph_task = Some(cx.spawn(async move |this, cx| {
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) => Err(FetchError::Aborted(err.to_string())),
            };
            this.update(cx, |view, cx| {
                match result {
                    Ok(data) => {
                        view.map.load(data);
                        if !view.initial_expand.is_empty() {
                            let paths = std::mem::take(&mut view.initial_expand);
                            view.map.expand_paths(&paths);
                        }
                    }
                    Err(err) => view.map.fail(err.user_message()),
                }
                view.start_animation();
                cx.notify();
            })
            .ok();
        }));
        cx.notify();
    }

    fn start_animation(&mut self) {
        if let Some(animation) = self.map.viewport_mut().take_animation() {
            self.animation = Some((animation, Instant::now()));
        }
    }

    /// Transform to draw with this frame, and whether another frame is due.
    fn displayed_viewport(&mut self) -> (ViewportState, bool) {
        if let Some((animation, start)) = self.animation {
            let elapsed = start.elapsed();
            if !animation.is_finished(elapsed) {
                return (animation.sample(elapsed), true);
            }
            self.animation = None;
        }
        (self.map.viewport_state(), false)
    }

    fn toggle(&mut self, path: ExpansionPath, cx: &mut Context<Self>) {
        self.map.toggle(&path);
        self.start_animation();
        cx.emit(NodeExpanded { path });
        cx.notify();
    }

    fn select(&mut self, slug: String, cx: &mut Context<Self>) {
        self.map.select(&slug);
        self.start_animation();
        self.open_quick_view(slug.clone(), cx);
        cx.emit(NodeSelected { slug });
        cx.notify();
    }

    /// Related post opened from the quick view: reveal it in the map, then
    /// select it.
    fn navigate(&mut self, slug: String, cx: &mut Context<Self>) {
        if !self.map.reveal(&slug) {
            debug!(%slug, "related post cannot be shown in the map");
            return;
        }
        self.start_animation();
        self.open_quick_view(slug.clone(), cx);
        cx.emit(NodeSelected { slug });
        cx.notify();
    }

    fn open_quick_view(&mut self, slug: String, cx: &mut Context<Self>) {
        let Some(client) = self.source.client().cloned() else {
            return;
        };
        let ticket = self.quick_view.open(&slug);
        let fetch = spawn_post_fetch(&self.runtime, client, slug);
        self._post_task = Some(cx.spawn(async move |this, cx| {
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) => Err(FetchError::Aborted(err.to_string())),
            };
            this.update(cx, |view, cx| {
                if view.quick_view.resolve(&ticket, result) {
                    cx.notify();
                }
            })
            .ok();
        }));
    }

    fn close_quick_view(&mut self, cx: &mut Context<Self>) {
        self.quick_view.close();
        self._post_task = None;
        cx.notify();
    }

    fn zoom(&mut self, cx: &mut Context<Self>, apply: impl FnOnce(&mut MindMap)) {
        self.animation = None;
        apply(&mut self.map);
        self.start_animation();
        cx.notify();
    }

    fn track_bounds(&mut self, bounds: Bounds<Pixels>, cx: &mut Context<Self>) {
        self.container_offset = bounds.origin;
        let size = WorldSize::new(
            f64::from(bounds.size.width / px(1.0)),
            f64::from(bounds.size.height / px(1.0)),
        );
        if size.width <= 0.0 || size.height <= 0.0 || size == self.map.viewport().container() {
            return;
        }
        self.map.resize(size);
        self.start_animation();
        cx.notify();
    }

    fn local(&self, position: Point<Pixels>) -> WorldPoint {
        WorldPoint::new(
            f64::from((position.x - self.container_offset.x) / px(1.0)),
            f64::from((position.y - self.container_offset.y) / px(1.0)),
        )
    }

    fn start_pan(&mut self, position: Point<Pixels>, cx: &mut Context<Self>) {
        self.is_panning = true;
        self.pan_last = position;
        cx.notify();
    }

    fn end_pan(&mut self, cx: &mut Context<Self>) {
        self.is_panning = false;
        cx.notify();
    }

    fn drag_pan(&mut self, position: Point<Pixels>, cx: &mut Context<Self>) {
        if !self.is_panning {
            return;
        }
        let dx = f64::from((position.x - self.pan_last.x) / px(1.0));
        let dy = f64::from((position.y - self.pan_last.y) / px(1.0));
        self.pan_last = position;
        self.animation = None;
        self.map.viewport_mut().pan_by(dx, dy);
        cx.notify();
    }

    fn wheel_zoom(&mut self, event: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let dy = event.delta.pixel_delta(px(16.0)).y;
        if dy == px(0.0) {
            return;
        }
        let step = self.map.config().viewport.zoom_factor;
        let factor = if dy > px(0.0) { step } else { 1.0 / step };
        let at = self.local(event.position);
        self.animation = None;
        self.map.viewport_mut().zoom_at(at, factor);
        cx.notify();
    }

    fn node_element(&self, node: &SceneNode, state: ViewportState, cx: &mut Context<Self>) -> Div {
        let zoom = state.zoom as f32;
        let origin = state.world_to_screen(WorldPoint::new(node.rect.x, node.rect.y));
        let text = self.map.config().style.text;

        let slug = node.slug.clone();
        let label = div()
            .flex_1()
            .h_full()
            .flex()
            .items_center()
            .justify_center()
            .px(px(8.0 * zoom))
            .overflow_hidden()
            .cursor_pointer()
            .child(node.title.clone())
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, _e: &MouseDownEvent, _w, cx| {
                    cx.stop_propagation();
                    this.select(slug.clone(), cx);
                }),
            );

        let marker = node.marker.zip(node.marker_rect).map(|(marker, rect)| {
            let path = node.path.clone();
            div()
                .absolute()
                .left(px(((rect.x - node.rect.x) * state.zoom) as f32))
                .top(px(((rect.y - node.rect.y) * state.zoom) as f32))
                .w(px((rect.width * state.zoom) as f32))
                .h(px((rect.height * state.zoom) as f32))
                .rounded(px(3.0 * zoom))
                .bg(rgb(PANEL_BG))
                .border(px(1.0))
                .border_color(rgb_of(node.border))
                .flex()
                .items_center()
                .justify_center()
                .text_size(px(12.0 * zoom))
                .cursor_pointer()
                .child(marker.glyph())
                .on_mouse_down(
                    MouseButton::Left,
                    cx.listener(move |this, _e: &MouseDownEvent, _w, cx| {
                        cx.stop_propagation();
                        this.toggle(path.clone(), cx);
                    }),
                )
        });

        let ring = node.decision_ring.map(|ring| {
            let inset = px(((node.border_width + 1.0) * state.zoom) as f32);
            div()
                .absolute()
                .top(inset)
                .left(inset)
                .right(inset)
                .bottom(inset)
                .rounded(px(4.0 * zoom))
                .border(px((2.0 * zoom).max(1.0)))
                .border_color(rgb_of(ring))
        });

        div()
            .absolute()
            .left(px(origin.x as f32))
            .top(px(origin.y as f32))
            .w(px((node.rect.width * state.zoom) as f32))
            .h(px((node.rect.height * state.zoom) as f32))
            .bg(rgb_of(node.fill))
            .border(px(((node.border_width * state.zoom) as f32).max(1.0)))
            .border_color(rgb_of(node.border))
            .rounded(px(6.0 * zoom))
            .shadow_sm()
            .text_color(rgb_of(text))
            .text_size(px(13.0 * zoom))
            .flex()
            .children(ring)
            .child(label)
            .children(marker)
    }

    fn controls_panel(&self, cx: &mut Context<Self>) -> Div {
        let zoom_percent = (self.map.viewport_state().zoom * 100.0).round() as i32;
        let filter = self.map.edge_filter();
        let orientation = match self.map.orientation() {
            Orientation::TopToBottom => "Top-down",
            Orientation::LeftToRight => "Left-right",
        };

        let zoom_out = button("-", false, cx, |this, cx| {
            this.zoom(cx, |map| map.zoom_out());
        });
        let zoom_in = button("+", false, cx, |this, cx| {
            this.zoom(cx, |map| map.zoom_in());
        });
        let fit = button("Fit", false, cx, |this, cx| {
            this.zoom(cx, |map| map.fit_view());
        });
        let layout = button(format!("Layout: {orientation}"), false, cx, |this, cx| {
            this.zoom(cx, MindMap::toggle_orientation);
        });
        let parent_child = button("Hierarchy", filter.parent_child, cx, |this, cx| {
            this.zoom(cx, |map| map.toggle_edge_kind(EdgeKind::ParentChild));
        });
        let related = button("Related", filter.related, cx, |this, cx| {
            this.zoom(cx, |map| map.toggle_edge_kind(EdgeKind::Related));
        });

        div()
            .absolute()
            .top(px(8.0))
            .left(px(8.0))
            .text_color(rgb_of(self.map.config().style.text))
            .bg(rgb(PANEL_BG))
            .border(px(1.0))
            .border_color(rgb(PANEL_BORDER))
            .rounded(px(6.0))
            .p(px(8.0))
            .flex()
            .items_center()
            .gap_2()
            .child(zoom_out)
            .child(format!("{zoom_percent}%"))
            .child(zoom_in)
            .child(div().w(px(8.0)))
            .child(fit)
            .child(layout)
            .child(div().w(px(8.0)))
            .child(parent_child)
            .child(related)
    }

    fn status_overlay(&self, cx: &mut Context<Self>) -> Option<Div> {
        let content = match self.map.status() {
            ViewStatus::Idle | ViewStatus::Ready => return None,
            ViewStatus::Loading => div().child("Loading mind map\u{2026}"),
            ViewStatus::NoData => div().child("No posts to show"),
            ViewStatus::Error(message) => div()
                .flex()
                .flex_col()
                .items_center()
                .gap_2()
                .child(message.clone())
                .child(button("Retry", false, cx, |this, cx| this.reload(cx))),
        };
        Some(
            div()
                .absolute()
                .size_full()
                .flex()
                .items_center()
                .justify_center()
                .text_color(rgb_of(self.map.config().style.text))
                .child(content),
        )
    }

    fn quick_view_panel(&self, cx: &mut Context<Self>) -> Option<Div> {
        let body = match self.quick_view.state() {
            QuickViewState::Closed => return None,
            QuickViewState::Loading { slug } => div().child(format!("Loading {slug}\u{2026}")),
            QuickViewState::Loaded(post) => {
                let tags = post
                    .tags
                    .iter()
                    .map(|tag| tag.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let related = post
                    .related
                    .iter()
                    .map(|related| {
                        let slug = related.slug.clone();
                        div()
                            .text_color(rgb(LINK))
                            .cursor_pointer()
                            .child(related.title.clone())
                            .on_mouse_down(
                                MouseButton::Left,
                                cx.listener(move |this, _e: &MouseDownEvent, _w, cx| {
                                    cx.stop_propagation();
                                    this.navigate(slug.clone(), cx);
                                }),
                            )
                    })
                    .collect::<Vec<_>>();
                div()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .child(div().text_size(px(16.0)).child(post.title.clone()))
                    .when(!tags.is_empty(), |this| this.child(tags))
                    .when(!related.is_empty(), |this| {
                        this.child(div().mt(px(4.0)).child("Related")).children(related)
                    })
            }
            QuickViewState::Failed {
                slug,
                message,
                timed_out,
            } => {
                let slug = slug.clone();
                div()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .child(message.clone())
                    .when(*timed_out, |this| {
                        this.child(button("Retry", false, cx, move |this, cx| {
                            this.open_quick_view(slug.clone(), cx);
                            cx.notify();
                        }))
                    })
            }
        };

        let close = button("\u{d7}", false, cx, |this, cx| this.close_quick_view(cx));
        Some(
            div()
                .absolute()
                .top(px(8.0))
                .right(px(8.0))
                .w(px(280.0))
                .p(px(10.0))
                .text_color(rgb_of(self.map.config().style.text))
                .bg(rgb(PANEL_BG))
                .border(px(1.0))
                .border_color(rgb(PANEL_BORDER))
                .rounded(px(6.0))
                .flex()
                .flex_col()
                .gap_2()
                // Clicks inside the panel must not start a pan.
                .on_mouse_down(
                    MouseButton::Left,
                    cx.listener(|_this, _e: &MouseDownEvent, _w, cx| cx.stop_propagation()),
                )
                .child(div().flex().justify_end().child(close))
                .child(body),
        )
    }
}

impl Render for MindMapView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let (state, animating) = self.displayed_viewport();
        let style = self.map.config().style.clone();
        let edges = self.map.scene().edges.clone();
        let has_dashes = edges.iter().any(|edge| edge.dashed);
        if animating || has_dashes {
            window.request_animation_frame();
        }

        let entity = cx.entity();
        let bounds_tracker = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, _window, cx| {
                cx.update_entity(&entity, |view, cx| view.track_bounds(bounds, cx));
            },
        )
        .absolute()
        .size_full();

        let phase = -self.started.elapsed().as_secs_f32() * DASH_SPEED;
        let edge_labels = edges
            .iter()
            .filter_map(|edge| {
                let label = edge.label?;
                let at = state.world_to_screen(edge.midpoint()?);
                Some(
                    div()
                        .absolute()
                        .left(px(at.x as f32 + 4.0))
                        .top(px(at.y as f32 - 14.0))
                        .text_size(px(10.0 * state.zoom as f32))
                        .text_color(rgb_of(edge.stroke))
                        .child(label),
                )
            })
            .collect::<Vec<_>>();

        let edges_canvas = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, window, _cx| {
                let offset = bounds.origin;
                let zoom = state.zoom as f32;
                for edge in &edges {
                    let points = edge
                        .points
                        .iter()
                        .map(|p| {
                            let s = state.world_to_screen(*p);
                            (s.x as f32, s.y as f32)
                        })
                        .collect::<Vec<_>>();
                    let pieces = if edge.dashed {
                        dash_polyline(&points, DASH * zoom.max(0.5), GAP * zoom.max(0.5), phase)
                    } else {
                        points.windows(2).map(|pair| (pair[0], pair[1])).collect()
                    };
                    if pieces.is_empty() {
                        continue;
                    }
                    let half_thickness = (edge.width as f32 * zoom / 2.0).max(0.5);
                    let mut path = gpui::Path::new(offset);
                    for (a, b) in pieces {
                        push_segment(
                            &mut path,
                            to_point(offset, a),
                            to_point(offset, b),
                            half_thickness,
                        );
                    }
                    window.paint_path(path, rgb_of(edge.stroke));
                }
            },
        )
        .absolute()
        .size_full();

        let nodes = self
            .map
            .scene()
            .nodes
            .iter()
            .map(|node| self.node_element(node, state, cx))
            .collect::<Vec<_>>();

        let graph_canvas = div()
            .relative()
            .size_full()
            .child(bounds_tracker)
            .child(edges_canvas)
            .children(edge_labels)
            .children(nodes);

        let controls = self.controls_panel(cx);
        let overlay = self.status_overlay(cx);
        let quick_view = self.quick_view_panel(cx);

        div()
            .size_full()
            .relative()
            .overflow_hidden()
            .bg(rgb_of(style.background))
            .when(self.is_panning, |this| this.cursor_grabbing())
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, e: &MouseDownEvent, _w, cx| this.start_pan(e.position, cx)),
            )
            .on_mouse_down(
                MouseButton::Middle,
                cx.listener(|this, e: &MouseDownEvent, _w, cx| this.start_pan(e.position, cx)),
            )
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _e: &MouseUpEvent, _w, cx| this.end_pan(cx)),
            )
            .on_mouse_up(
                MouseButton::Middle,
                cx.listener(|this, _e: &MouseUpEvent, _w, cx| this.end_pan(cx)),
            )
            .on_mouse_move(
                cx.listener(|this, e: &MouseMoveEvent, _w, cx| this.drag_pan(e.position, cx)),
            )
            .on_scroll_wheel(
                cx.listener(|this, e: &ScrollWheelEvent, _w, cx| this.wheel_zoom(e, cx)),
            )
            .child(graph_canvas)
            .child(controls)
            .children(overlay)
            .children(quick_view)
    }
}
