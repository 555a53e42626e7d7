use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

mod common;

pub use common::HIT_TOLERANCE;
pub(crate) use common::{distance_to_line_segment, same_point};

/// A drawable scene element.
///
/// Positions are in canvas coordinates (origin at the canvas' top-left corner,
/// y pointing down). Widths are in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Freehand brush stroke
    Stroke {
        points: Vec<Pos2>,
        color: Color32,
        width: f32,
    },
    /// Straight segment
    Line {
        start: Pos2,
        end: Pos2,
        color: Color32,
        width: f32,
    },
    Rectangle {
        min: Pos2,
        size: Vec2,
        fill: Color32,
        stroke: Color32,
        width: f32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Color32,
        width: f32,
    },
    /// Closed polygon; the last point connects back to the first
    Polygon {
        points: Vec<Pos2>,
        fill: Color32,
        stroke: Color32,
        width: f32,
    },
    /// Editable text box
    Text {
        position: Pos2,
        content: String,
        font_size: f32,
        box_width: f32,
        color: Color32,
    },
}

impl Element {
    /// Get the element type as a string
    pub fn element_type(&self) -> &'static str {
        match self {
            Element::Stroke { .. } => "stroke",
            Element::Line { .. } => "line",
            Element::Rectangle { .. } => "rectangle",
            Element::Circle { .. } => "circle",
            Element::Polygon { .. } => "polygon",
            Element::Text { .. } => "text",
        }
    }

    /// Get the bounding rectangle for this element, including half the outline width
    pub fn rect(&self) -> Rect {
        match self {
            Element::Stroke { points, width, .. } => common::calculate_bounds(points, width / 2.0),
            Element::Line { start, end, width, .. } => {
                common::calculate_bounds(&[*start, *end], width / 2.0)
            }
            Element::Rectangle { min, size, width, .. } => {
                Rect::from_min_size(*min, *size).expand(width / 2.0)
            }
            Element::Circle { center, radius, width, .. } => {
                Rect::from_center_size(*center, Vec2::splat(radius * 2.0)).expand(width / 2.0)
            }
            Element::Polygon { points, width, .. } => common::calculate_bounds(points, width / 2.0),
            Element::Text { position, font_size, box_width, .. } => {
                Rect::from_min_size(*position, Vec2::new(*box_width, font_size * 1.2))
            }
        }
    }

    /// Test if the element contains the given position
    pub fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            Element::Stroke { points, width, .. } => {
                let reach = width / 2.0 + HIT_TOLERANCE;
                match points.as_slice() {
                    [] => false,
                    [only] => (pos - *only).length() <= reach,
                    _ => points
                        .windows(2)
                        .any(|w| distance_to_line_segment(pos, w[0], w[1]) <= reach),
                }
            }
            Element::Line { start, end, width, .. } => {
                distance_to_line_segment(pos, *start, *end) <= width / 2.0 + HIT_TOLERANCE
            }
            Element::Rectangle { .. } | Element::Circle { .. } | Element::Text { .. } => {
                self.rect().expand(HIT_TOLERANCE).contains(pos)
            }
            Element::Polygon { points, width, .. } => {
                let reach = width / 2.0 + HIT_TOLERANCE;
                common::polygon_contains(points, pos)
                    || closed_segments(points).any(|(a, b)| distance_to_line_segment(pos, a, b) <= reach)
            }
        }
    }

    /// Whether every point of the element, outline included, lies within
    /// `limit` of the origin on both axes
    pub fn is_within(&self, limit: f32) -> bool {
        let rect = self.rect();
        if rect == Rect::NOTHING {
            // No points at all
            return true;
        }
        [rect.min, rect.max]
            .iter()
            .all(|corner| corner.x.abs() <= limit && corner.y.abs() <= limit)
    }

    /// Outline colour of the element
    pub fn stroke_color(&self) -> Color32 {
        match self {
            Element::Stroke { color, .. } | Element::Line { color, .. } | Element::Text { color, .. } => *color,
            Element::Rectangle { stroke, .. }
            | Element::Circle { stroke, .. }
            | Element::Polygon { stroke, .. } => *stroke,
        }
    }
}

/// Iterate the edges of a closed polygon, including the closing edge
pub(crate) fn closed_segments(points: &[Pos2]) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
    let n = points.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| (points[i], points[(i + 1) % n]))
}

/// Factory functions for creating elements
pub mod factory {
    use super::*;

    pub const DEFAULT_RECT_SIZE: Vec2 = Vec2::new(100.0, 80.0);
    pub const DEFAULT_CIRCLE_RADIUS: f32 = 50.0;
    pub const DEFAULT_TEXT: &str = "Type here";
    pub const DEFAULT_FONT_SIZE: f32 = 20.0;
    pub const DEFAULT_TEXT_BOX_WIDTH: f32 = 200.0;

    /// Create a new freehand stroke element
    pub fn create_stroke(points: Vec<Pos2>, width: f32, color: Color32) -> Element {
        Element::Stroke { points, color, width }
    }

    /// Create a straight line element
    pub fn create_line(start: Pos2, end: Pos2, width: f32, color: Color32) -> Element {
        Element::Line { start, end, color, width }
    }

    /// Default-sized, unfilled rectangle with its top-left corner at `pos`
    pub fn create_rectangle(pos: Pos2, width: f32, color: Color32) -> Element {
        Element::Rectangle {
            min: pos,
            size: DEFAULT_RECT_SIZE,
            fill: Color32::TRANSPARENT,
            stroke: color,
            width,
        }
    }

    /// Default-sized, unfilled circle whose bounding box starts at `pos`
    pub fn create_circle(pos: Pos2, width: f32, color: Color32) -> Element {
        Element::Circle {
            center: pos + Vec2::splat(DEFAULT_CIRCLE_RADIUS),
            radius: DEFAULT_CIRCLE_RADIUS,
            fill: Color32::TRANSPARENT,
            stroke: color,
            width,
        }
    }

    /// Closed, unfilled polygon through `points`
    pub fn create_polygon(points: Vec<Pos2>, width: f32, color: Color32) -> Element {
        Element::Polygon {
            points,
            fill: Color32::TRANSPARENT,
            stroke: color,
            width,
        }
    }

    /// Editable text box with the default placeholder content
    pub fn create_text(pos: Pos2, color: Color32) -> Element {
        Element::Text {
            position: pos,
            content: DEFAULT_TEXT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            box_width: DEFAULT_TEXT_BOX_WIDTH,
            color,
        }
    }
}
