use egui::{Pos2, Rect, Vec2, pos2};

/// Radius of the selection handles drawn at the corners and center
pub const HANDLE_RADIUS: f32 = 4.0;

/// Segments used to approximate an ellipse outline
pub const ELLIPSE_SEGMENTS: usize = 64;

pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab: Vec2 = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Even-odd rule, matching how filled paths are painted
pub fn point_in_polygon(p: Pos2, polygon: &[Pos2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closed outline of the ellipse inscribed in `rect`
pub fn ellipse_polyline(rect: Rect) -> Vec<Pos2> {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let angle = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            pos2(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

/// Index of the first handle within [`HANDLE_RADIUS`] of `pos`
pub fn handle_at(pos: Pos2, handles: &[Pos2]) -> Option<usize> {
    handles
        .iter()
        .position(|handle| pos.distance(*handle) <= HANDLE_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_distance() {
        let d = distance_to_segment(pos2(5.0, 3.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert_relative_eq!(d, 3.0);
        let past_end = distance_to_segment(pos2(13.0, 4.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert_relative_eq!(past_end, 5.0);
    }

    #[test]
    fn triangle_contains_centroid() {
        let triangle = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 10.0)];
        assert!(point_in_polygon(pos2(5.0, 3.0), &triangle));
        assert!(!point_in_polygon(pos2(0.5, 9.0), &triangle));
    }

    #[test]
    fn ellipse_touches_its_bounds() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(20.0, 10.0));
        let outline = ellipse_polyline(rect);
        assert_eq!(outline.len(), ELLIPSE_SEGMENTS);
        assert_relative_eq!(outline[0].x, 20.0);
        assert_relative_eq!(outline[0].y, 5.0);
    }

    #[test]
    fn handle_lookup() {
        let handles = [pos2(0.0, 0.0), pos2(50.0, 50.0)];
        assert_eq!(handle_at(pos2(49.0, 52.0), &handles), Some(1));
        assert_eq!(handle_at(pos2(20.0, 20.0), &handles), None);
    }
}
