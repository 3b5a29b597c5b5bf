//! Deterministic layered layout for mind-map graphs.
//!
//! The pipeline follows the classic layered drawing phases: back edges are
//! ignored for ranking, nodes get longest-path ranks with the roots pinned,
//! barycenter sweeps reduce crossings and a balancing pass assigns
//! coordinates. Forests of mostly isolated roots are put on a grid instead.

mod graph;
mod grid;
mod layout;
mod order;
mod position;
mod rank;
mod route;
mod types;

pub use grid::{GridPitch, root_grid_center, wants_root_grid};
pub use layout::{HierarchicalLayout, Spacing};
pub use route::{anchor_sides, facing_side};
pub use types::*;
