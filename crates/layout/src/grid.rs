use serde::{Deserialize, Serialize};

use crate::types::{Position, Size};

/// Row/column pitch of the grid used for forests of mostly unconnected roots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPitch {
    pub column: f64,
    pub row: f64,
}

impl Default for GridPitch {
    fn default() -> Self {
        Self {
            column: 280.0,
            row: 120.0,
        }
    }
}

/// Whether the layered result is replaced by a grid for the roots.
///
/// Layered layout of a forest whose roots are mostly isolated degenerates into
/// a single long rank (or a staircase of ranks); fewer edges than roots is the
/// signal for that shape.
pub fn wants_root_grid(root_count: usize, edge_count: usize) -> bool {
    root_count > 1 && edge_count < root_count
}

/// Centre of the `index`-th root on a grid with `ceil(sqrt(count))` columns.
pub fn root_grid_center(index: usize, count: usize, pitch: GridPitch, node: Size) -> Position {
    let columns = (count as f64).sqrt().ceil().max(1.0) as usize;
    let col = index % columns;
    let row = index / columns;
    Position::new(
        col as f64 * pitch.column + node.width / 2.0,
        row as f64 * pitch.row + node.height / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_only_for_sparse_forests() {
        assert!(!wants_root_grid(1, 0));
        assert!(wants_root_grid(3, 0));
        assert!(wants_root_grid(3, 2));
        assert!(!wants_root_grid(3, 3));
    }

    #[test]
    fn five_roots_use_three_columns() {
        let node = Size::new(200.0, 60.0);
        let pitch = GridPitch {
            column: 250.0,
            row: 100.0,
        };
        let centers: Vec<Position> = (0..5)
            .map(|i| root_grid_center(i, 5, pitch, node))
            .collect();
        assert_eq!(centers[0], Position::new(100.0, 30.0));
        assert_eq!(centers[2], Position::new(600.0, 30.0));
        assert_eq!(centers[3], Position::new(100.0, 130.0));
        assert_eq!(centers[4], Position::new(350.0, 130.0));
    }
}
