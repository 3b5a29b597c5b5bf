use gpui::{Pixels, Point, point, px};

/// Screen-space segment in pixels.
pub type Segment = ((f32, f32), (f32, f32));

pub const DASH: f32 = 6.0;
pub const GAP: f32 = 4.0;

/// Pieces of a dashed polyline. `phase` shifts the pattern along the line and
/// is carried across corners so the dashes stay continuous.
pub fn dash_polyline(points: &[(f32, f32)], dash: f32, gap: f32, phase: f32) -> Vec<Segment> {
    let period = dash + gap;
    let mut out = Vec::new();
    if period <= 0.0 {
        return out;
    }
    let mut offset = phase.rem_euclid(period);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= 0.0001 {
            continue;
        }
        let at = |t: f32| (a.0 + dx * t / len, a.1 + dy * t / len);

        // Position along this segment where the current pattern period began.
        let mut start = -offset;
        while start < len {
            let from = start.max(0.0);
            let to = (start + dash).min(len);
            if to > from {
                out.push((at(from), at(to)));
            }
            start += period;
        }
        offset = (offset + len).rem_euclid(period);
    }
    out
}

/// Pushes a thick line from `p1` to `p2` as two triangles.
pub fn push_segment(
    path: &mut gpui::Path<Pixels>,
    p1: Point<Pixels>,
    p2: Point<Pixels>,
    half_thickness: f32,
) {
    let dir = point(p2.x - p1.x, p2.y - p1.y);
    let len = dir.magnitude() as f32;
    if len <= 0.0001 {
        return;
    }
    let normal = point(-dir.y, dir.x) * (half_thickness / len);

    let p1a = point(p1.x + normal.x, p1.y + normal.y);
    let p1b = point(p1.x - normal.x, p1.y - normal.y);
    let p2a = point(p2.x + normal.x, p2.y + normal.y);
    let p2b = point(p2.x - normal.x, p2.y - normal.y);

    let st = (point(0., 1.), point(0., 1.), point(0., 1.));
    path.push_triangle((p1a, p1b, p2a), st);
    path.push_triangle((p2a, p1b, p2b), st);
}

/// Container-relative pixel coordinates to window coordinates.
pub fn to_point(origin: Point<Pixels>, p: (f32, f32)) -> Point<Pixels> {
    point(origin.x + px(p.0), origin.y + px(p.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_is_split_into_dashes() {
        let dashes = dash_polyline(&[(0.0, 0.0), (20.0, 0.0)], 6.0, 4.0, 0.0);
        assert_eq!(
            dashes,
            [((0.0, 0.0), (6.0, 0.0)), ((10.0, 0.0), (16.0, 0.0))]
        );
    }

    #[test]
    fn phase_shifts_the_pattern() {
        let dashes = dash_polyline(&[(0.0, 0.0), (10.0, 0.0)], 6.0, 4.0, 3.0);
        assert_eq!(dashes, [((0.0, 0.0), (3.0, 0.0)), ((7.0, 0.0), (10.0, 0.0))]);
    }

    #[test]
    fn pattern_continues_around_corners() {
        let dashes = dash_polyline(&[(0.0, 0.0), (8.0, 0.0), (8.0, 10.0)], 6.0, 4.0, 0.0);
        assert_eq!(
            dashes,
            [
                ((0.0, 0.0), (6.0, 0.0)),
                ((8.0, 2.0), (8.0, 8.0)),
            ]
        );
    }

    #[test]
    fn degenerate_input_yields_nothing() {
        assert!(dash_polyline(&[(1.0, 1.0)], 6.0, 4.0, 0.0).is_empty());
        assert!(dash_polyline(&[(1.0, 1.0), (1.0, 1.0)], 6.0, 4.0, 0.0).is_empty());
        assert!(dash_polyline(&[(0.0, 0.0), (5.0, 0.0)], 0.0, 0.0, 0.0).is_empty());
    }
}
