use egui::Color32;
use serde::{Deserialize, Serialize};

mod controller;
mod freehand;
mod placement;
mod shape_builder;

pub use controller::ToolController;
pub use freehand::FreehandCapture;
pub use placement::Placement;
pub use shape_builder::{ConstructionError, MultiClickShapeBuilder, ShapeKind, TraceState};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 20;

/// Enum representing all available tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    #[default]
    Pen,
    Freeform,
    Line,
    Polygon,
    Eraser,
    Rectangle,
    Circle,
    Text,
}

impl Tool {
    /// Toolbar order
    pub const ALL: [Tool; 9] = [
        Tool::Select,
        Tool::Pen,
        Tool::Freeform,
        Tool::Line,
        Tool::Polygon,
        Tool::Eraser,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
    ];

    /// Stable identifier used by the toolbar and settings
    pub fn id(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Pen => "pen",
            Tool::Freeform => "freeform",
            Tool::Line => "line",
            Tool::Polygon => "polygon",
            Tool::Eraser => "eraser",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Text => "text",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Pen => "Pen",
            Tool::Freeform => "Freeform",
            Tool::Line => "Line",
            Tool::Polygon => "Polygon",
            Tool::Eraser => "Eraser",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tool::Select => "⬉",
            Tool::Pen => "✒",
            Tool::Freeform => "✏",
            Tool::Line => "╱",
            Tool::Polygon => "⬡",
            Tool::Eraser => "⌫",
            Tool::Rectangle => "◻",
            Tool::Circle => "○",
            Tool::Text => "T",
        }
    }

    pub fn from_id(id: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.id() == id)
    }

    /// Pen, Freeform and Eraser paint through the scene's free-drawing brush
    pub fn is_freehand(&self) -> bool {
        matches!(self, Tool::Pen | Tool::Freeform | Tool::Eraser)
    }

    /// Line and Polygon are built over several pointer events
    pub fn is_multi_click(&self) -> bool {
        matches!(self, Tool::Line | Tool::Polygon)
    }
}

/// Colour and width applied to the next drawing operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color32,
    pub width: u32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 2,
        }
    }
}

impl StrokeStyle {
    /// Clamp a requested width into the supported range. Callers clamp before
    /// handing widths to the [`ToolController`], which does not re-validate.
    pub fn clamp_width(width: u32) -> u32 {
        width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
    }

    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    /// Parse a `#rrggbb` / `#rrggbbaa` colour
    pub fn parse_color(hex: &str) -> Option<Color32> {
        Color32::from_hex(hex.trim()).ok()
    }

    pub fn color_hex(&self) -> String {
        self.color.to_hex()
    }
}
