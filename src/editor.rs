use std::path::{Path, PathBuf};

use egui::{Color32, Pos2};

use crate::command::HistoryStack;
use crate::file_handler;
use crate::persistence::{DrawingSummary, KeyValueStore, PersistenceManager, PersistenceResult};
use crate::scene::{Document, ObjectHandle, Scene};
use crate::tools::{StrokeStyle, Tool, ToolController};

/// Display name of a drawing that was never named
pub const DEFAULT_DRAWING_NAME: &str = "Untitled Drawing";

/// One editing session: a scene plus the tool, history and name state that
/// goes with it.
///
/// Every mutation of the scene made through the editor keeps the history
/// consistent; committed objects clear the redo list, and loads, imports
/// and clears reset it.
#[derive(Debug)]
pub struct DrawingEditor<S: Scene = Document> {
    scene: S,
    tools: ToolController,
    history: HistoryStack,
    name: String,
}

impl Default for DrawingEditor<Document> {
    fn default() -> Self {
        Self::new(Document::default(), StrokeStyle::default())
    }
}

impl<S: Scene> DrawingEditor<S> {
    pub fn new(scene: S, style: StrokeStyle) -> Self {
        let mut editor = Self {
            scene,
            tools: ToolController::new(style),
            history: HistoryStack::new(),
            name: DEFAULT_DRAWING_NAME.to_owned(),
        };
        editor.tools.select_tool(Tool::default(), &mut editor.scene);
        editor
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn active_tool(&self) -> Tool {
        self.tools.active_tool()
    }

    pub fn style(&self) -> &StrokeStyle {
        self.tools.style()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tools.select_tool(tool, &mut self.scene);
    }

    pub fn select_tool_by_id(&mut self, id: &str) -> bool {
        self.tools.select_tool_by_id(id, &mut self.scene)
    }

    /// Clamps to the allowed width range before applying
    pub fn set_stroke_width(&mut self, width: u32) {
        let width = StrokeStyle::clamp_width(width);
        self.tools.set_stroke_width(width, &mut self.scene);
    }

    pub fn set_color(&mut self, color: Color32) {
        self.tools.set_color(color, &mut self.scene);
    }

    pub fn cancel_construction(&mut self) -> bool {
        self.tools.cancel_construction(&mut self.scene)
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> Option<ObjectHandle> {
        let committed = self.tools.pointer_down(pos, &mut self.scene);
        self.record(committed)
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.tools.pointer_move(pos, &mut self.scene);
    }

    pub fn pointer_up(&mut self, pos: Pos2) -> Option<ObjectHandle> {
        let committed = self.tools.pointer_up(pos, &mut self.scene);
        self.record(committed)
    }

    pub fn double_click(&mut self) -> Option<ObjectHandle> {
        let committed = self.tools.double_click(&mut self.scene);
        self.record(committed)
    }

    fn record(&mut self, committed: Option<ObjectHandle>) -> Option<ObjectHandle> {
        if committed.is_some() {
            self.history.record_commit();
        }
        committed
    }

    /// Undo the last committed object. While a line or polygon is being
    /// traced this abandons the trace instead.
    pub fn undo(&mut self) -> bool {
        if self.tools.cancel_construction(&mut self.scene) {
            log::debug!("Undo cancelled the shape under construction");
            return true;
        }
        self.history.undo(&mut self.scene).is_some()
    }

    pub fn redo(&mut self) -> bool {
        if self.tools.is_constructing() {
            return false;
        }
        self.history.redo(&mut self.scene).is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.tools.is_constructing() || self.history.can_undo(&self.scene)
    }

    pub fn can_redo(&self) -> bool {
        !self.tools.is_constructing() && self.history.can_redo()
    }

    /// Remove every object and reset the background
    pub fn clear(&mut self) {
        self.tools.cancel_construction(&mut self.scene);
        self.scene.clear();
        self.history.clear();
        // The eraser paints with the background colour
        let tool = self.tools.active_tool();
        self.tools.select_tool(tool, &mut self.scene);
        log::debug!("Cleared scene and history");
    }

    /// Save under the current display name
    pub fn save_to<K: KeyValueStore>(
        &self,
        manager: &mut PersistenceManager<K>,
    ) -> PersistenceResult<DrawingSummary> {
        manager.save(&self.name, &self.scene)
    }

    /// Replace the scene with a saved drawing and adopt its name
    pub fn load_from<K: KeyValueStore>(
        &mut self,
        manager: &PersistenceManager<K>,
        id: &str,
    ) -> PersistenceResult<()> {
        let name = manager.load(id, &mut self.scene)?;
        self.after_replace(name);
        Ok(())
    }

    /// Write the scene into `dir` as `<slug of name>.json`
    pub fn export_file(&self, dir: &Path) -> PersistenceResult<PathBuf> {
        file_handler::export_to_file(&self.scene, &self.name, dir)
    }

    pub fn export_to_path(&self, path: &Path) -> PersistenceResult<()> {
        file_handler::export_to_path(&self.scene, path)
    }

    /// Import an exported drawing; the scene is unchanged on failure
    pub fn import_file(&mut self, path: &Path) -> PersistenceResult<()> {
        let name = file_handler::import_from_file(path, &mut self.scene)?;
        self.after_replace(name);
        Ok(())
    }

    /// Import contents already read from `path`
    pub fn import_text(&mut self, text: &str, path: &Path) -> PersistenceResult<()> {
        let name = file_handler::import_from_text(text, path, &mut self.scene)?;
        self.after_replace(name);
        Ok(())
    }

    pub fn download_png(&self, dir: &Path) -> PersistenceResult<PathBuf> {
        file_handler::download_png(&self.scene, dir)
    }

    pub fn write_png(&self, path: &Path) -> PersistenceResult<()> {
        file_handler::write_png(&self.scene, path)
    }

    /// The scene contents were swapped out underneath the tools
    fn after_replace(&mut self, name: String) {
        self.name = name;
        self.history.clear();
        // Reselecting drops the stale trace and re-derives the eraser brush
        let tool = self.tools.active_tool();
        self.tools.select_tool(tool, &mut self.scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TempKind;

    fn temp_count(editor: &DrawingEditor) -> usize {
        editor
            .scene()
            .scene_objects()
            .iter()
            .filter(|object| object.data.is_temp())
            .count()
    }

    #[test]
    fn test_new_editor_defaults() {
        let editor = DrawingEditor::default();
        assert_eq!(editor.active_tool(), Tool::Pen);
        assert_eq!(editor.name(), DEFAULT_DRAWING_NAME);
        assert!(editor.scene().is_free_drawing());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_while_tracing_cancels_trace() {
        let mut editor = DrawingEditor::default();
        editor.select_tool(Tool::Rectangle);
        editor.pointer_down(Pos2::new(5.0, 5.0));

        editor.select_tool(Tool::Polygon);
        editor.pointer_down(Pos2::new(0.0, 0.0));
        editor.pointer_up(Pos2::new(0.0, 0.0));
        editor.pointer_down(Pos2::new(10.0, 0.0));
        editor.pointer_up(Pos2::new(10.0, 0.0));
        editor.pointer_move(Pos2::new(10.0, 10.0));
        assert!(temp_count(&editor) > 0);

        assert!(editor.undo());
        assert_eq!(temp_count(&editor), 0);
        assert_eq!(editor.scene().object_count(), 1);
        assert!(!editor.tools().is_constructing());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut editor = DrawingEditor::default();
        editor.select_tool(Tool::Circle);
        editor.pointer_down(Pos2::new(5.0, 5.0));
        assert!(editor.undo());
        assert!(editor.can_redo());

        editor.select_tool(Tool::Circle);
        editor.pointer_down(Pos2::new(50.0, 50.0));
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut editor = DrawingEditor::default();
        editor.scene_mut().set_background(Color32::LIGHT_BLUE);
        editor.select_tool(Tool::Line);
        editor.pointer_down(Pos2::new(1.0, 1.0));
        editor.pointer_move(Pos2::new(9.0, 9.0));

        editor.clear();
        assert_eq!(editor.scene().object_count(), 0);
        assert_eq!(editor.scene().background(), Color32::WHITE);
        assert!(!editor.tools().is_constructing());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_eraser_tracks_background_after_clear() {
        let mut editor = DrawingEditor::default();
        editor.scene_mut().set_background(Color32::LIGHT_BLUE);
        editor.select_tool(Tool::Eraser);
        assert_eq!(editor.scene().brush().color, Color32::LIGHT_BLUE);

        editor.clear();
        assert_eq!(editor.scene().brush().color, Color32::WHITE);
    }

    #[test]
    fn test_width_is_clamped() {
        let mut editor = DrawingEditor::default();
        editor.set_stroke_width(50);
        assert_eq!(editor.style().width, 20);
        assert_eq!(editor.scene().brush().width, 20.0);
        editor.set_stroke_width(0);
        assert_eq!(editor.style().width, 1);
    }

    #[test]
    fn test_preview_is_tagged() {
        let mut editor = DrawingEditor::default();
        editor.select_tool(Tool::Line);
        editor.pointer_down(Pos2::new(1.0, 1.0));
        editor.pointer_move(Pos2::new(4.0, 4.0));
        let previews = editor
            .scene()
            .scene_objects()
            .iter()
            .filter(|object| object.data.temp == Some(TempKind::Preview))
            .count();
        assert_eq!(previews, 1);
    }
}
