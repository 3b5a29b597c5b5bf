use std::cell::RefCell;
use std::rc::Rc;

use graphview::*;
use tracing_test::traced_test;

fn end_to_end_data() -> GraphData {
    GraphData {
        nodes: vec![
            PostNode::new(1, "Root A"),
            PostNode::new(2, "Root B"),
            PostNode::new(3, "Child of A"),
        ],
        edges: vec![Edge::parent_child(1, 3)],
    }
}

fn ids(visible: &VisibleGraph) -> Vec<&str> {
    visible.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn edge_triples(visible: &VisibleGraph) -> Vec<(&str, &str, EdgeKind)> {
    visible
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.kind))
        .collect()
}

fn loaded(data: GraphData) -> MindMap {
    let mut map = MindMap::new(MindMapConfig::default());
    map.load(data);
    map
}

#[test]
fn end_to_end_expand_scenario() {
    let mut map = loaded(end_to_end_data());
    assert_eq!(ids(map.visible()), ["1", "2"]);
    assert!(map.visible().edges.is_empty());

    map.toggle(&ExpansionPath::from("1"));
    assert_eq!(ids(map.visible()), ["1", "3", "2"]);
    assert_eq!(
        edge_triples(map.visible()),
        [("1", "3", EdgeKind::ParentChild)]
    );
}

#[test]
fn toggling_twice_is_a_no_op() {
    let mut map = loaded(end_to_end_data());
    let before = map.visible().clone();
    let set_before = map.expansion().clone();

    map.toggle(&ExpansionPath::from("1"));
    map.toggle(&ExpansionPath::from("1"));

    assert_eq!(map.visible(), &before);
    assert_eq!(map.expansion(), &set_before);
}

#[test]
fn nodes_reachable_twice_are_emitted_once() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Root"),
            PostNode::new(2, "Left"),
            PostNode::new(3, "Right"),
            PostNode::new(4, "Shared"),
        ],
        edges: vec![
            Edge::parent_child(1, 2),
            Edge::parent_child(1, 3),
            Edge::parent_child(2, 4),
            Edge::related(3, 4),
            Edge::related(1, 4),
        ],
    };
    let mut map = loaded(data);
    for path in ["1", "1-2", "1-3"] {
        map.toggle(&ExpansionPath::from(path));
        let count = map
            .visible()
            .nodes
            .iter()
            .filter(|n| n.id.as_str() == "4")
            .count();
        assert!(count <= 1, "node 4 emitted {count} times after {path}");
    }
    assert!(map.visible().contains(&NodeId::from(4)));
}

#[test]
fn collapsed_parents_contribute_no_edges() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Root"),
            PostNode::new(2, "Mid"),
            PostNode::new(3, "Leaf"),
        ],
        edges: vec![
            Edge::parent_child(1, 2),
            Edge::parent_child(2, 3),
            Edge::related(1, 3),
        ],
    };
    let mut map = loaded(data);
    map.toggle(&ExpansionPath::from("1"));

    // Leaf is visible through the related edge, but Mid is collapsed.
    assert!(map.visible().contains(&NodeId::from(3)));
    assert!(
        !map.visible()
            .edges
            .iter()
            .any(|e| e.source.as_str() == "2" && e.kind == EdgeKind::ParentChild)
    );
    let mid = map.visible().node(&NodeId::from(2)).unwrap();
    assert!(mid.has_collapsed_children());
}

#[test]
fn roots_are_ordered_by_title_ignoring_case() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Zeta"),
            PostNode::new(2, "alpha"),
            PostNode::new(3, "Beta"),
        ],
        edges: vec![],
    };
    let mut map = loaded(data);
    let titles: Vec<&str> = map.visible().nodes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["alpha", "Beta", "Zeta"]);
    assert_eq!(map.visible().root_ids().collect::<Vec<_>>(), ["2", "3", "1"]);

    map.set_orientation(Orientation::LeftToRight);
    let layout = map.layout();
    let grid: Vec<Position> = ["2", "3", "1"]
        .iter()
        .map(|id| layout.position(id).unwrap())
        .collect();
    // Three isolated roots go on a two-column grid in title order.
    assert!(grid[0].x < grid[1].x);
    assert_eq!(grid[0].y, grid[1].y);
    assert!(grid[2].y > grid[0].y);
}

#[test]
fn layout_is_deterministic_across_maps() {
    let first = loaded(end_to_end_data());
    let second = loaded(end_to_end_data());
    let bits = |map: &MindMap| -> Vec<(u64, u64)> {
        map.layout()
            .nodes
            .iter()
            .map(|n| (n.position.x.to_bits(), n.position.y.to_bits()))
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn expanding_preserves_the_viewport() {
    let mut map = loaded(end_to_end_data());
    let fitted = map.viewport_state();

    map.toggle(&ExpansionPath::from("1"));
    assert_eq!(map.visible().nodes.len(), 3);
    assert_eq!(map.viewport_state(), fitted);
    assert!(!map.viewport().interaction_pending());
}

#[test]
fn selecting_preserves_the_viewport() {
    let mut map = loaded(end_to_end_data());
    map.viewport_mut().pan_by(25.0, 10.0);
    let before = map.viewport_state();
    map.select("2");
    assert_eq!(map.viewport_state(), before);
    assert_eq!(map.current(), Some("2"));
}

#[test]
fn new_data_refits_the_viewport() {
    let mut map = loaded(end_to_end_data());
    map.viewport_mut().pan_by(500.0, 500.0);
    map.viewport_mut().set_zoom(0.3);
    let stale = map.viewport_state();

    let many: Vec<PostNode> = (1..=12)
        .map(|i| PostNode::new(i, format!("Post {i:02}")))
        .collect();
    let edges: Vec<Edge> = (2..=12).map(|i| Edge::parent_child(1, i)).collect();
    map.load(GraphData { nodes: many, edges });
    map.toggle(&ExpansionPath::from("1"));
    map.toggle_edge_kind(EdgeKind::Related);

    let state = map.viewport_state();
    assert_ne!(state, stale);

    let container = map.viewport().container();
    for node in &map.layout().nodes {
        let rect = node.rect();
        let top_left = state.world_to_screen(Position::new(rect.x, rect.y));
        let bottom_right = state.world_to_screen(Position::new(rect.right(), rect.bottom()));
        assert!(top_left.x >= -1e-6 && top_left.y >= -1e-6, "{} off screen", node.id);
        assert!(bottom_right.x <= container.width + 1e-6);
        assert!(bottom_right.y <= container.height + 1e-6);
    }
}

#[test]
fn interaction_flag_does_not_leak() {
    let mut map = loaded(end_to_end_data());
    map.toggle(&ExpansionPath::from("1"));
    map.viewport_mut().pan_by(300.0, 0.0);
    let panned = map.viewport_state();

    // A filter change right after an expand must still refit.
    map.toggle_edge_kind(EdgeKind::Related);
    assert_ne!(map.viewport_state(), panned);
}

#[test]
fn section_colours_are_stable() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "One").with_tag("Section: Water"),
            PostNode::new(2, "Two").with_tag("misc").with_tag("Section: Water"),
            PostNode::new(3, "Three"),
        ],
        edges: vec![],
    };
    let mut map = loaded(data.clone());
    let fills = |map: &MindMap| -> Vec<Rgb> {
        [1, 2, 3]
            .into_iter()
            .map(|id| map.scene().node(&NodeId::from(id)).unwrap().fill)
            .collect()
    };
    let first = fills(&map);
    assert_eq!(first[0], first[1]);
    assert_eq!(first[2], SectionStyle::default().neutral);

    map.toggle_orientation();
    assert_eq!(fills(&map), first);
    map.load(data);
    assert_eq!(fills(&map), first);
}

#[test]
fn clicks_reach_the_right_surface() {
    let selected = Rc::new(RefCell::new(Vec::new()));
    let expanded = Rc::new(RefCell::new(Vec::new()));
    let mut map = loaded(end_to_end_data());
    {
        let selected = selected.clone();
        map.on_select(move |slug| selected.borrow_mut().push(slug.to_string()));
        let expanded = expanded.clone();
        map.on_expand(move |path| expanded.borrow_mut().push(path.clone()));
    }

    let root = map.scene().node(&NodeId::from(1)).unwrap().clone();
    let marker = map.viewport().world_to_screen(root.marker_rect.unwrap().center());
    assert_eq!(
        map.click(marker),
        Some(Hit::Toggle(ExpansionPath::from("1")))
    );
    assert_eq!(*expanded.borrow(), [ExpansionPath::from("1")]);
    assert!(selected.borrow().is_empty());

    // The root moved when its child appeared; take its new box.
    let root = map.scene().node(&NodeId::from(1)).unwrap().clone();
    let label = map
        .viewport()
        .world_to_screen(Position::new(root.rect.x + 8.0, root.rect.center().y));
    assert_eq!(map.click(label), Some(Hit::Select("1".to_string())));
    assert_eq!(*selected.borrow(), ["1".to_string()]);
    assert_eq!(expanded.borrow().len(), 1);
}

#[test]
fn each_change_runs_one_pass() {
    let mut map = loaded(end_to_end_data());
    let start = map.passes();
    map.toggle(&ExpansionPath::from("1"));
    map.toggle_edge_kind(EdgeKind::Related);
    map.toggle_orientation();
    assert_eq!(map.passes(), start + 3);

    map.set_current(Some("3"));
    assert_eq!(map.passes(), start + 3);
    assert!(map.scene().node(&NodeId::from(3)).unwrap().is_current);
}

#[test]
fn restoring_expansion_runs_one_pass() {
    let mut map = loaded(end_to_end_data());
    let start = map.passes();
    let paths = [ExpansionPath::from("1"), ExpansionPath::from("1")];
    map.expand_paths(&paths);
    assert_eq!(map.passes(), start + 1);
    assert_eq!(ids(map.visible()), ["1", "3", "2"]);

    // Expanding again keeps the node open.
    map.expand_paths(&paths[..1]);
    assert_eq!(ids(map.visible()), ["1", "3", "2"]);
}

#[test]
fn reveal_expands_ancestors() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Root").with_slug("root"),
            PostNode::new(2, "Mid").with_slug("mid"),
            PostNode::new(3, "Deep").with_slug("deep"),
        ],
        edges: vec![Edge::parent_child(1, 2), Edge::parent_child(2, 3)],
    };
    let mut map = loaded(data);
    assert!(map.reveal("deep"));
    assert!(map.visible().node_by_slug("deep").is_some());
    assert_eq!(map.current(), Some("deep"));
    assert!(map.expansion().contains("1"));
    assert!(map.expansion().contains("1-2"));
    assert!(!map.reveal("missing"));
}

#[test]
fn reveal_follows_the_occurrence_the_traversal_emits() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Alpha"),
            PostNode::new(2, "Beta"),
            PostNode::new(3, "Shared"),
            PostNode::new(4, "Target").with_slug("target"),
        ],
        edges: vec![
            Edge::related(1, 3),
            Edge::parent_child(2, 3),
            Edge::parent_child(3, 4),
        ],
    };
    let mut map = loaded(data);
    map.toggle(&ExpansionPath::from("1"));
    assert_eq!(ids(map.visible()), ["1", "3", "2"]);

    assert!(map.reveal("target"));
    let target = map.visible().node_by_slug("target").unwrap();
    assert_eq!(target.path.as_str(), "1-3-4");
    assert!(map.expansion().contains("1-3"));
    assert!(!map.expansion().contains("2"));
    assert_eq!(map.current(), Some("target"));
}

#[test]
#[traced_test]
fn reveal_refuses_posts_no_visible_node_leads_to() {
    let data = GraphData {
        nodes: vec![
            PostNode::new(1, "Alpha"),
            PostNode::new(2, "Loop A"),
            PostNode::new(3, "Loop B").with_slug("loop-b"),
        ],
        edges: vec![Edge::parent_child(2, 3), Edge::parent_child(3, 2)],
    };
    let mut map = loaded(data);
    let passes = map.passes();
    assert!(!map.reveal("loop-b"));
    assert_eq!(map.current(), None);
    assert_eq!(map.passes(), passes);
    assert!(logs_contain("post cannot be reached from the roots"));
}

#[test]
#[traced_test]
fn failures_clear_the_view() {
    let mut map = loaded(end_to_end_data());
    map.toggle(&ExpansionPath::from("1"));
    map.fail("Request timed out");

    assert_eq!(
        map.status(),
        &ViewStatus::Error("Request timed out".to_string())
    );
    assert!(map.visible().is_empty());
    assert!(map.expansion().is_empty());
    assert_eq!(map.viewport_state(), ViewportState::default());
    assert!(logs_contain("graph unavailable"));
}

#[test]
fn empty_dataset_is_not_an_error() {
    let mut map = loaded(GraphData::default());
    assert_eq!(map.status(), &ViewStatus::NoData);
    assert!(map.scene().is_empty());
    map.zoom_in();
    assert!((map.viewport_state().zoom - 1.2).abs() < 1e-12);
    map.fit_view();
    assert_eq!(map.viewport_state(), ViewportState::default());
}

#[test]
fn renderers_share_one_interface() {
    let mut map = loaded(end_to_end_data());
    map.toggle(&ExpansionPath::from("1"));
    let viewport = map.viewport_state();

    let mut renderers: (SvgRenderer, OutlineRenderer) = (
        SvgRenderer::new(SceneStyle::default(), map.viewport().container()),
        OutlineRenderer,
    );
    let svg = renderers
        .0
        .render(map.visible(), map.layout(), &viewport)
        .unwrap();
    let text = renderers
        .1
        .render(map.visible(), map.layout(), &viewport)
        .unwrap();
    assert!(svg.contains("Child of A"));
    assert_eq!(text, map.outline().to_text());
}
