use egui::{Color32, Pos2};

use super::{FreehandCapture, MultiClickShapeBuilder, Placement, ShapeKind, StrokeStyle, Tool};
use crate::scene::{Brush, ObjectHandle, Scene};

/// Owns the active tool and stroke style and routes pointer events to the
/// tool-specific construction logic.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    active: Tool,
    style: StrokeStyle,
    /// Armed one-shot placement, consumed by the next pointer-down
    placement: Option<Placement>,
    builder: MultiClickShapeBuilder,
    freehand: FreehandCapture,
}

impl ToolController {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn active_tool(&self) -> Tool {
        self.active
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn builder(&self) -> &MultiClickShapeBuilder {
        &self.builder
    }

    pub fn freehand(&self) -> &FreehandCapture {
        &self.freehand
    }

    pub fn armed_placement(&self) -> Option<Placement> {
        self.placement
    }

    /// True while a line or polygon is being traced
    pub fn is_constructing(&self) -> bool {
        self.builder.is_tracing()
    }

    /// Switch tools.
    ///
    /// Deselects the active object, abandons any unfinished line/polygon,
    /// arms the one-shot placement of Rectangle/Circle/Text and configures
    /// the scene's free-drawing brush.
    pub fn select_tool(&mut self, tool: Tool, scene: &mut dyn Scene) {
        log::info!("Tool selected: {}", tool.name());

        scene.discard_active_object();
        self.cancel_construction(scene);
        self.freehand.cancel();

        self.active = tool;
        self.placement = Placement::for_tool(tool);
        self.apply_brush(scene);
    }

    /// Switch tools by toolbar id. Unknown ids leave everything unchanged.
    pub fn select_tool_by_id(&mut self, id: &str, scene: &mut dyn Scene) -> bool {
        match Tool::from_id(id) {
            Some(tool) => {
                self.select_tool(tool, scene);
                true
            }
            None => {
                log::warn!("Ignoring unknown tool id: {}", id);
                false
            }
        }
    }

    /// Set the stroke width. The caller clamps to [1, 20]
    /// (see [`StrokeStyle::clamp_width`]).
    pub fn set_stroke_width(&mut self, width: u32, scene: &mut dyn Scene) {
        self.style.width = width;
        self.apply_brush(scene);
    }

    pub fn set_color(&mut self, color: Color32, scene: &mut dyn Scene) {
        self.style.color = color;
        self.apply_brush(scene);
    }

    /// Discard pending line/polygon points and their transient primitives
    pub fn cancel_construction(&mut self, scene: &mut dyn Scene) -> bool {
        self.builder.cancel(scene)
    }

    /// Returns the handle of an object committed by this press, if any
    pub fn pointer_down(&mut self, pos: Pos2, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        if let Some(placement) = self.placement.take() {
            return Some(placement.place(pos, &self.style, scene));
        }

        match self.active {
            Tool::Select => {
                let hit = scene.hit_test(pos);
                scene.set_active_object(hit);
                None
            }
            Tool::Pen | Tool::Freeform | Tool::Eraser => {
                self.freehand.pointer_down(pos);
                None
            }
            Tool::Line => {
                self.builder.pointer_down(ShapeKind::Line, pos);
                None
            }
            Tool::Polygon => {
                self.builder.pointer_down(ShapeKind::Polygon, pos);
                None
            }
            // Placement already consumed
            Tool::Rectangle | Tool::Circle | Tool::Text => None,
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2, scene: &mut dyn Scene) {
        if self.active.is_freehand() {
            self.freehand.pointer_move(pos);
        } else if self.active.is_multi_click() {
            self.builder.pointer_move(pos, &self.style, scene);
        }
    }

    /// Returns the handle of an object committed by this release, if any
    pub fn pointer_up(&mut self, pos: Pos2, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        if self.active.is_freehand() {
            self.freehand.pointer_up(pos, scene)
        } else if self.active.is_multi_click() {
            self.builder.pointer_up(pos, &self.style, scene)
        } else {
            None
        }
    }

    /// Returns the handle of a closed polygon, if one was committed
    pub fn double_click(&mut self, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        if self.active == Tool::Polygon {
            self.builder.double_click(&self.style, scene)
        } else {
            None
        }
    }

    /// Re-apply the style to the scene brush for the freehand tools
    fn apply_brush(&self, scene: &mut dyn Scene) {
        let freehand = self.active.is_freehand();
        scene.set_free_drawing(freehand);
        if !freehand {
            return;
        }

        let brush = if self.active == Tool::Eraser {
            // Paints background-coloured strokes rather than deleting objects
            Brush {
                color: scene.background(),
                width: self.style.width_f32() * 2.0,
            }
        } else {
            Brush {
                color: self.style.color,
                width: self.style.width_f32(),
            }
        };
        scene.set_brush(brush);
    }
}
