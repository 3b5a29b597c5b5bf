use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in layout (world) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_position(position: Position, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Midpoint of the given side.
    pub fn anchor(&self, side: Side) -> Position {
        let c = self.center();
        match side {
            Side::Top => Position::new(c.x, self.y),
            Side::Bottom => Position::new(c.x, self.bottom()),
            Side::Left => Position::new(self.x, c.y),
            Side::Right => Position::new(self.right(), c.y),
        }
    }
}

/// Direction in which ranks are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    TopToBottom,
    LeftToRight,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::TopToBottom => Orientation::LeftToRight,
            Orientation::LeftToRight => Orientation::TopToBottom,
        }
    }

    /// Sides used by an edge that points from a lower rank to a higher one.
    pub fn forward_sides(self) -> (Side, Side) {
        match self {
            Orientation::TopToBottom => (Side::Bottom, Side::Top),
            Orientation::LeftToRight => (Side::Right, Side::Left),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::TopToBottom => f.write_str("tb"),
            Orientation::LeftToRight => f.write_str("lr"),
        }
    }
}

impl FromStr for Orientation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tb" | "td" | "top-to-bottom" => Ok(Orientation::TopToBottom),
            "lr" | "left-to-right" => Ok(Orientation::LeftToRight),
            _ => Err(LayoutError::UnknownOrientation(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("node size must be positive, got {width}x{height}")]
    InvalidNodeSize { width: f64, height: f64 },
    #[error("spacing must be non-negative, got node_sep={node_sep} rank_sep={rank_sep}")]
    NegativeSpacing { node_sep: f64, rank_sep: f64 },
    #[error("root grid pitch {column}x{row} is smaller than the node box")]
    GridPitchTooSmall { column: f64, row: f64 },
    #[error("unknown orientation `{0}` (expected `tb` or `lr`)")]
    UnknownOrientation(String),
}

/// Trait for layout-compatible node structures
pub trait LayoutNode {
    fn id(&self) -> &str;
}

/// Trait for layout-compatible edge structures
pub trait LayoutEdge {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
}

impl LayoutNode for &str {
    fn id(&self) -> &str {
        self
    }
}

impl LayoutNode for String {
    fn id(&self) -> &str {
        self
    }
}

impl LayoutEdge for (&str, &str) {
    fn source(&self) -> &str {
        self.0
    }

    fn target(&self) -> &str {
        self.1
    }
}

impl LayoutEdge for (String, String) {
    fn source(&self) -> &str {
        &self.0
    }

    fn target(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    pub id: String,
    /// Top-left corner of the node box.
    pub position: Position,
    pub size: Size,
    pub rank: usize,
    pub order: usize,
    /// False when the engine could not place the node and fell back to the origin.
    pub placed: bool,
}

impl NodePlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_position(self.position, self.size)
    }

    pub fn center(&self) -> Position {
        self.rect().center()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    /// Index into `LayoutResult::nodes`.
    pub source: usize,
    pub target: usize,
    pub source_side: Side,
    pub target_side: Side,
    pub points: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vec<NodePlacement>,
    pub edges: Vec<EdgeRoute>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub orientation: Orientation,
    lookup: HashMap<String, usize>,
}

impl LayoutResult {
    pub(crate) fn new(
        nodes: Vec<NodePlacement>,
        edges: Vec<EdgeRoute>,
        orientation: Orientation,
    ) -> Self {
        let mut lookup = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            lookup.entry(node.id.clone()).or_insert(i);
        }
        let canvas_width = nodes
            .iter()
            .map(|n| n.rect().right())
            .fold(0.0f64, f64::max);
        let canvas_height = nodes
            .iter()
            .map(|n| n.rect().bottom())
            .fold(0.0f64, f64::max);
        Self {
            nodes,
            edges,
            canvas_width,
            canvas_height,
            orientation,
            lookup,
        }
    }

    pub fn empty(orientation: Orientation) -> Self {
        Self::new(Vec::new(), Vec::new(), orientation)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn placement(&self, id: &str) -> Option<&NodePlacement> {
        self.lookup.get(id).map(|&i| &self.nodes[i])
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.placement(id).map(|p| p.position)
    }

    /// Bounding box of every node box, `None` when nothing was laid out.
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.nodes.iter().map(NodePlacement::rect);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(&r)))
    }
}
