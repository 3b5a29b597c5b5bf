use crate::types::{EdgeRoute, NodePlacement, Orientation, Position, Side};

/// Side of `from` that faces `to`, judged by the dominant axis between centres.
pub fn facing_side(from: Position, to: Position) -> Side {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > dy.abs() {
        if dx > 0.0 { Side::Right } else { Side::Left }
    } else if dy > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Sides an edge between two placed nodes attaches to. Edges running down the
/// hierarchy use the orientation's sides; anything else leaves from the side
/// facing its peer.
pub fn anchor_sides(
    source: &NodePlacement,
    target: &NodePlacement,
    orientation: Orientation,
) -> (Side, Side) {
    if target.rank > source.rank {
        orientation.forward_sides()
    } else {
        (
            facing_side(source.center(), target.center()),
            facing_side(target.center(), source.center()),
        )
    }
}

/// Anchor hints for every edge.
pub(crate) fn route_edges(
    placements: &[NodePlacement],
    edges: &[(usize, usize)],
    orientation: Orientation,
) -> Vec<EdgeRoute> {
    edges
        .iter()
        .map(|&(s, t)| {
            let source = &placements[s];
            let target = &placements[t];
            let (source_side, target_side) = anchor_sides(source, target, orientation);
            EdgeRoute {
                source: s,
                target: t,
                source_side,
                target_side,
                points: vec![
                    source.rect().anchor(source_side),
                    target.rect().anchor(target_side),
                ],
            }
        })
        .collect()
}
