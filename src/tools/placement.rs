use egui::Pos2;

use super::{StrokeStyle, Tool};
use crate::element::{Element, factory};
use crate::scene::{ObjectData, ObjectHandle, Scene};

/// One-shot placement armed by selecting the Rectangle, Circle or Text tool.
///
/// The next pointer-down inserts a default-sized object at the click point
/// and consumes the placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Rectangle,
    Circle,
    Text,
}

impl Placement {
    pub fn for_tool(tool: Tool) -> Option<Placement> {
        match tool {
            Tool::Rectangle => Some(Placement::Rectangle),
            Tool::Circle => Some(Placement::Circle),
            Tool::Text => Some(Placement::Text),
            _ => None,
        }
    }

    pub fn element_at(&self, pos: Pos2, style: &StrokeStyle) -> Element {
        match self {
            Placement::Rectangle => factory::create_rectangle(pos, style.width_f32(), style.color),
            Placement::Circle => factory::create_circle(pos, style.width_f32(), style.color),
            Placement::Text => factory::create_text(pos, style.color),
        }
    }

    /// Insert the object and make it the scene's active object
    pub fn place(self, pos: Pos2, style: &StrokeStyle, scene: &mut dyn Scene) -> ObjectHandle {
        let handle = scene.add_object(self.element_at(pos, style), ObjectData::permanent());
        scene.set_active_object(Some(handle));
        log::debug!("Placed {:?} at {:?}", self, pos);
        handle
    }
}
