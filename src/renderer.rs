use eframe::egui::{self, Color32, Pos2, Rect, Shape, Stroke};
use egui::emath::RectTransform;

use crate::element::Element;
use crate::scene::{Document, Scene, TempKind};

/// Paints a [`Document`] onto an egui canvas.
///
/// Canvas coordinates are mapped into the screen rectangle the canvas was
/// allocated, so the document can be shown at any offset.
#[derive(Debug, Clone)]
pub struct Renderer {
    selection_color: Color32,
    preview_dash: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            selection_color: Color32::from_rgb(30, 144, 255),
            preview_dash: 6.0,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform from canvas coordinates to the screen rect at `origin`
    pub fn to_screen(document: &Document, origin: Pos2) -> RectTransform {
        let canvas = Rect::from_min_size(Pos2::ZERO, document.size());
        RectTransform::from_to(canvas, Rect::from_min_size(origin, document.size()))
    }

    /// Paint the background, every object, the selection outline and the
    /// freehand stroke still being drawn.
    pub fn render(
        &self,
        painter: &egui::Painter,
        document: &Document,
        origin: Pos2,
        freehand: &[Pos2],
    ) {
        let to_screen = Self::to_screen(document, origin);
        painter.rect_filled(*to_screen.to(), 0.0, document.background());

        for object in document.scene_objects() {
            match object.data.temp {
                Some(TempKind::Preview) => self.paint_preview(painter, to_screen, &object.element),
                _ => Self::paint_element(painter, to_screen, &object.element),
            }
        }

        if let Some(active) = document.active_object().and_then(|handle| document.object(handle)) {
            let bounds = to_screen.transform_rect(active.element.rect());
            painter.rect_stroke(bounds.expand(2.0), 2.0, Stroke::new(1.5, self.selection_color));
        }

        if freehand.len() > 1 {
            let brush = document.brush();
            let points = freehand.iter().map(|p| to_screen * *p).collect();
            painter.add(Shape::line(points, Stroke::new(brush.width, brush.color)));
        }
    }

    fn paint_preview(&self, painter: &egui::Painter, to_screen: RectTransform, element: &Element) {
        if let Element::Line { start, end, color, width } = element {
            let points = [to_screen * *start, to_screen * *end];
            painter.extend(Shape::dashed_line(
                &points,
                Stroke::new(*width, *color),
                self.preview_dash,
                self.preview_dash,
            ));
        } else {
            Self::paint_element(painter, to_screen, element);
        }
    }

    fn paint_element(painter: &egui::Painter, to_screen: RectTransform, element: &Element) {
        match element {
            Element::Stroke { points, color, width } => match points.as_slice() {
                [] => {}
                [only] => {
                    painter.circle_filled(to_screen * *only, width / 2.0, *color);
                }
                _ => {
                    let points = points.iter().map(|p| to_screen * *p).collect();
                    painter.add(Shape::line(points, Stroke::new(*width, *color)));
                }
            },
            Element::Line { start, end, color, width } => {
                painter.line_segment([to_screen * *start, to_screen * *end], Stroke::new(*width, *color));
            }
            Element::Rectangle { min, size, fill, stroke, width } => {
                let rect = to_screen.transform_rect(Rect::from_min_size(*min, *size));
                painter.rect_filled(rect, 0.0, *fill);
                painter.rect_stroke(rect, 0.0, Stroke::new(*width, *stroke));
            }
            Element::Circle { center, radius, fill, stroke, width } => {
                painter.circle(to_screen * *center, *radius, *fill, Stroke::new(*width, *stroke));
            }
            Element::Polygon { points, fill, stroke, width } => {
                let points: Vec<Pos2> = points.iter().map(|p| to_screen * *p).collect();
                if *fill != Color32::TRANSPARENT {
                    // egui only tessellates convex fills
                    painter.add(Shape::convex_polygon(points.clone(), *fill, Stroke::NONE));
                }
                painter.add(Shape::closed_line(points, Stroke::new(*width, *stroke)));
            }
            Element::Text { position, content, font_size, box_width, color } => {
                let galley = painter.layout(
                    content.clone(),
                    egui::FontId::proportional(*font_size),
                    *color,
                    *box_width,
                );
                painter.galley(to_screen * *position, galley, *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use crate::scene::ObjectData;

    #[test]
    fn test_to_screen_offsets_canvas() {
        let document = Document::default();
        let to_screen = Renderer::to_screen(&document, Pos2::new(100.0, 50.0));
        assert!((to_screen * Pos2::new(10.0, 10.0) - Pos2::new(110.0, 60.0)).length() < 1e-4);
        let back = to_screen.inverse() * Pos2::new(110.0, 60.0);
        assert!((back - Pos2::new(10.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_render_basics() {
        let mut document = Document::default();
        document.add_object(
            factory::create_text(Pos2::new(5.0, 5.0), Color32::BLACK),
            ObjectData::permanent(),
        );
        document.add_object(
            factory::create_line(Pos2::ZERO, Pos2::new(9.0, 9.0), 2.0, Color32::RED),
            ObjectData::preview(),
        );

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let layer_id = egui::LayerId::background();
            let rect = Rect::from_min_size(Pos2::ZERO, document.size());
            let painter = egui::Painter::new(ctx.clone(), layer_id, rect);
            Renderer::new().render(&painter, &document, Pos2::ZERO, &[Pos2::ZERO, Pos2::new(3.0, 3.0)]);
        });
    }
}
