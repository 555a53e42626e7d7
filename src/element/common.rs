use egui::{Pos2, Rect};

// Common constants for all element types
pub const HIT_TOLERANCE: f32 = 4.0;
pub const MIN_SEGMENT_LENGTH: f32 = 0.5;

/// Calculate distance from a point to a line segment (used for stroke, line and outline hit testing)
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Even-odd point-in-polygon test
pub(crate) fn polygon_contains(points: &[Pos2], pos: Pos2) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > pos.y) != (b.y > pos.y) {
            let x_cross = (b.x - a.x) * (pos.y - a.y) / (b.y - a.y) + a.x;
            if pos.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when the two points are close enough to count as the same click
pub(crate) fn same_point(a: Pos2, b: Pos2) -> bool {
    (a - b).length() < MIN_SEGMENT_LENGTH
}
