use egui::Pos2;

use crate::element::factory;
use crate::scene::{ObjectData, ObjectHandle, Scene};

/// Collects pointer positions into a freehand stroke using the scene brush.
///
/// The stroke is only added to the scene on pointer release, so the
/// in-progress points are never part of the scene.
#[derive(Debug, Clone, Default)]
pub struct FreehandCapture {
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<Vec<Pos2>>,
}

impl FreehandCapture {
    pub fn is_capturing(&self) -> bool {
        self.current_stroke.is_some()
    }

    /// Points of the stroke in progress, for preview rendering
    pub fn points(&self) -> &[Pos2] {
        self.current_stroke.as_deref().unwrap_or(&[])
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.current_stroke = Some(vec![pos]);
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        if let Some(points) = &mut self.current_stroke {
            if points.last() != Some(&pos) {
                points.push(pos);
            }
        }
    }

    /// Finish the stroke and add it to the scene with the current brush
    pub fn pointer_up(&mut self, pos: Pos2, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        let mut points = self.current_stroke.take()?;
        if points.last() != Some(&pos) {
            points.push(pos);
        }

        let brush = scene.brush();
        let stroke = factory::create_stroke(points, brush.width, brush.color);
        Some(scene.add_object(stroke, ObjectData::permanent()))
    }

    /// Drop the stroke in progress without committing it
    pub fn cancel(&mut self) {
        self.current_stroke = None;
    }
}
