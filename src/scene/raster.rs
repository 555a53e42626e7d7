//! Raster snapshots of a scene (catalog previews and PNG downloads).
//!
//! Elements are turned into tiny-skia paths and filled or stroked onto a
//! pixmap in canvas coordinates; the canvas-to-pixel scale lives in the
//! transform, so anything outside the canvas is clipped by the pixmap.
//! Text uses the outlines of egui's default proportional font.

use std::io::Cursor;
use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, OutlineCurve, PxScale, ScaleFont};
use egui::{Color32, Pos2};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use super::{Document, Scene, SceneResult};
use crate::element::Element;

/// Encoding of a raster snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    /// Lossy; `quality` in 1..=100
    Jpeg { quality: u8 },
}

/// Render the permanent objects of `document`, scaled by `scale`
pub fn rasterize(document: &Document, scale: f32) -> RgbaImage {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let width = ((document.size().x * scale).round() as u32).max(1);
    let height = ((document.size().y * scale).round() as u32).max(1);

    let Some(mut pixmap) = Pixmap::new(width, height) else {
        log::warn!("Cannot allocate a {}x{} raster", width, height);
        return RgbaImage::from_pixel(width, height, to_rgba(document.background()));
    };
    let [r, g, b, a] = document.background().to_srgba_unmultiplied();
    pixmap.fill(Color::from_rgba8(r, g, b, a));

    let transform = Transform::from_scale(scale, scale);
    for object in document.permanent_objects() {
        paint_element(&mut pixmap, &object.element, transform);
    }

    // tiny-skia keeps premultiplied pixels
    let pixels = pixmap.pixels();
    RgbaImage::from_fn(width, height, |x, y| {
        let color = pixels[(y * width + x) as usize].demultiply();
        Rgba([color.red(), color.green(), color.blue(), color.alpha()])
    })
}

/// Encode an image in the requested format
pub fn encode(image: &RgbaImage, format: RasterFormat) -> SceneResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        RasterFormat::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        RasterFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;
        }
    }
    Ok(bytes)
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Rgba([r, g, b, a])
}

fn paint_for(color: Color32) -> Option<Paint<'static>> {
    if color.a() == 0 {
        return None;
    }
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    Some(paint)
}

fn outline_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Open path through `points`; `None` for fewer than two points
fn polyline(points: &[Pos2], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn fill_and_stroke(
    pixmap: &mut Pixmap,
    path: &Path,
    fill: Color32,
    fill_rule: FillRule,
    stroke: Color32,
    width: f32,
    transform: Transform,
) {
    if let Some(paint) = paint_for(fill) {
        pixmap.fill_path(path, &paint, fill_rule, transform, None);
    }
    if width > 0.0 {
        if let Some(paint) = paint_for(stroke) {
            pixmap.stroke_path(path, &paint, &outline_stroke(width), transform, None);
        }
    }
}

fn paint_element(pixmap: &mut Pixmap, element: &Element, transform: Transform) {
    match element {
        Element::Stroke { points, color, width } => match points.as_slice() {
            [] => {}
            [only] => {
                if let (Some(paint), Some(dot)) =
                    (paint_for(*color), PathBuilder::from_circle(only.x, only.y, width / 2.0))
                {
                    pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
                }
            }
            _ => {
                if let (Some(paint), Some(path)) = (paint_for(*color), polyline(points, false)) {
                    pixmap.stroke_path(&path, &paint, &outline_stroke(*width), transform, None);
                }
            }
        },
        Element::Line { start, end, color, width } => {
            if let (Some(paint), Some(path)) = (paint_for(*color), polyline(&[*start, *end], false)) {
                pixmap.stroke_path(&path, &paint, &outline_stroke(*width), transform, None);
            }
        }
        Element::Rectangle { min, size, fill, stroke, width } => {
            if let Some(rect) = Rect::from_xywh(min.x, min.y, size.x, size.y) {
                let path = PathBuilder::from_rect(rect);
                fill_and_stroke(pixmap, &path, *fill, FillRule::Winding, *stroke, *width, transform);
            }
        }
        Element::Circle { center, radius, fill, stroke, width } => {
            if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                fill_and_stroke(pixmap, &path, *fill, FillRule::Winding, *stroke, *width, transform);
            }
        }
        Element::Polygon { points, fill, stroke, width } => {
            if let Some(path) = polyline(points, true) {
                fill_and_stroke(pixmap, &path, *fill, FillRule::EvenOdd, *stroke, *width, transform);
            }
        }
        Element::Text { position, content, font_size, box_width, color } => {
            if let (Some(font), Some(paint)) = (text_font(), paint_for(*color)) {
                paint_text(pixmap, font, &paint, *position, content, *font_size, *box_width, transform);
            }
        }
    }
}

/// First proportional font of egui's built-in font set
fn text_font() -> Option<&'static FontArc> {
    static FONT: OnceLock<Option<FontArc>> = OnceLock::new();
    FONT.get_or_init(|| {
        let definitions = egui::FontDefinitions::default();
        let name = definitions
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())?;
        let data = definitions.font_data.get(name)?;
        match FontArc::try_from_vec(data.font.to_vec()) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("Text will not appear in raster snapshots: {}", err);
                None
            }
        }
    })
    .as_ref()
}

/// Greedy word wrap into lines no wider than `box_width`
fn wrap_lines<F: Font>(font: &ab_glyph::PxScaleFont<F>, content: &str, box_width: f32) -> Vec<String> {
    let measure = |text: &str| -> f32 { text.chars().map(|c| font.h_advance(font.glyph_id(c))).sum() };

    let mut lines = Vec::new();
    for paragraph in content.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() { word.to_owned() } else { format!("{} {}", line, word) };
            if measure(&candidate) > box_width && !line.is_empty() {
                lines.push(std::mem::replace(&mut line, word.to_owned()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn paint_text(
    pixmap: &mut Pixmap,
    font: &FontArc,
    paint: &Paint,
    position: Pos2,
    content: &str,
    font_size: f32,
    box_width: f32,
    transform: Transform,
) {
    if font_size <= 0.0 {
        return;
    }
    let scaled = font.as_scaled(PxScale::from(font_size));
    // Outlines are in font units with y pointing up
    let units_x = scaled.h_scale_factor();
    let units_y = scaled.v_scale_factor();
    let line_height = scaled.height() + scaled.line_gap();

    for (row, line) in wrap_lines(&scaled, content, box_width).iter().enumerate() {
        let baseline = position.y + scaled.ascent() + row as f32 * line_height;
        let mut pen_x = position.x;
        let mut previous = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                pen_x += scaled.kern(previous, id);
            }
            previous = Some(id);

            if let Some(path) = font.outline(id).and_then(|outline| glyph_path(&outline.curves)) {
                let placement = Transform::from_row(units_x, 0.0, 0.0, -units_y, pen_x, baseline);
                pixmap.fill_path(&path, paint, FillRule::Winding, placement.post_concat(transform), None);
            }
            pen_x += scaled.h_advance(id);
        }
    }
}

fn glyph_path(curves: &[OutlineCurve]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    let mut cursor = None;
    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(p0, _) | OutlineCurve::Quad(p0, _, _) | OutlineCurve::Cubic(p0, _, _, _) => *p0,
        };
        // Contours are not delimited explicitly; a jump starts a new one
        if cursor != Some(start) {
            if cursor.is_some() {
                pb.close();
            }
            pb.move_to(start.x, start.y);
        }
        let end = match curve {
            OutlineCurve::Line(_, p1) => {
                pb.line_to(p1.x, p1.y);
                *p1
            }
            OutlineCurve::Quad(_, p1, p2) => {
                pb.quad_to(p1.x, p1.y, p2.x, p2.y);
                *p2
            }
            OutlineCurve::Cubic(_, p1, p2, p3) => {
                pb.cubic_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
                *p3
            }
        };
        cursor = Some(end);
    }
    if cursor.is_some() {
        pb.close();
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use crate::scene::ObjectData;
    use egui::Vec2;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn is_dark(pixel: &Rgba<u8>) -> bool {
        pixel.0[..3].iter().all(|channel| *channel < 64)
    }

    #[test]
    fn test_blank_document_is_background() {
        let doc = Document::new(Vec2::new(40.0, 30.0));
        let image = rasterize(&doc, 1.0);
        assert_eq!(image.dimensions(), (40, 30));
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_line_is_painted_and_scaled() {
        let mut doc = Document::new(Vec2::new(100.0, 100.0));
        doc.add_object(
            factory::create_line(Pos2::new(10.0, 50.0), Pos2::new(90.0, 50.0), 4.0, Color32::BLACK),
            ObjectData::permanent(),
        );

        let full = rasterize(&doc, 1.0);
        assert!(is_dark(full.get_pixel(50, 50)));
        assert_eq!(*full.get_pixel(50, 10), WHITE);

        let preview = rasterize(&doc, 0.25);
        assert_eq!(preview.dimensions(), (25, 25));
        assert!(is_dark(preview.get_pixel(12, 12)));
        assert_eq!(*preview.get_pixel(12, 2), WHITE);
    }

    #[test]
    fn test_filled_polygon() {
        let mut doc = Document::new(Vec2::new(50.0, 50.0));
        doc.add_object(
            Element::Polygon {
                points: vec![Pos2::new(10.0, 10.0), Pos2::new(40.0, 10.0), Pos2::new(25.0, 40.0)],
                fill: Color32::BLACK,
                stroke: Color32::BLACK,
                width: 1.0,
            },
            ObjectData::permanent(),
        );
        let image = rasterize(&doc, 1.0);
        assert!(is_dark(image.get_pixel(25, 20)));
        assert_eq!(*image.get_pixel(5, 45), WHITE);
    }

    #[test]
    fn test_text_leaves_ink_inside_its_box() {
        let mut doc = Document::new(Vec2::new(200.0, 60.0));
        doc.add_object(factory::create_text(Pos2::new(10.0, 10.0), Color32::BLACK), ObjectData::permanent());
        let image = rasterize(&doc, 1.0);
        assert!(image.enumerate_pixels().any(|(x, y, p)| *p != WHITE && x >= 10 && y >= 10));
        // Nothing above or left of the box
        assert!(image.enumerate_pixels().all(|(x, y, p)| *p == WHITE || (x >= 9 && y >= 9)));
    }

    #[test]
    fn test_far_off_geometry_is_clipped() {
        let mut doc = Document::new(Vec2::new(20.0, 20.0));
        doc.add_object(
            factory::create_line(Pos2::new(0.0, 10.0), Pos2::new(4.0e9, 10.0), 2.0, Color32::BLACK),
            ObjectData::permanent(),
        );
        let image = rasterize(&doc, 1.0);
        assert_eq!(image.dimensions(), (20, 20));
        assert_eq!(*image.get_pixel(10, 2), WHITE);
    }

    #[test]
    fn test_temp_objects_are_not_rasterized() {
        let mut doc = Document::new(Vec2::new(20.0, 20.0));
        doc.add_object(
            factory::create_line(Pos2::new(0.0, 10.0), Pos2::new(20.0, 10.0), 4.0, Color32::BLACK),
            ObjectData::preview(),
        );
        let image = rasterize(&doc, 1.0);
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_encode_png_signature() {
        let doc = Document::new(Vec2::new(8.0, 8.0));
        let png = encode(&rasterize(&doc, 1.0), RasterFormat::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let jpeg = encode(&rasterize(&doc, 1.0), RasterFormat::Jpeg { quality: 80 }).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
