use crate::element::Element;
use crate::scene::{ObjectData, ObjectHandle, Scene};

/// Linear undo over the scene's object stack.
///
/// Undo removes the most recently added object, whatever tool produced it;
/// there is no grouping below or above "one object". Redo re-adds objects in
/// reverse undo order until a new object is committed.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    /// Elements removed by undo, most recent last
    redo_stack: Vec<Element>,
}

impl HistoryStack {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self { redo_stack: Vec::new() }
    }

    /// Remove the last object in creation order. No-op on an empty scene.
    pub fn undo(&mut self, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        let last = scene.objects().last().copied()?;
        let removed = scene.remove_object(last)?;
        log::debug!("Undo removed {} {:?}", removed.element.element_type(), last);
        self.redo_stack.push(removed.element);
        Some(last)
    }

    /// Re-add the most recently undone object
    pub fn redo(&mut self, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        let element = self.redo_stack.pop()?;
        log::debug!("Redo restored {}", element.element_type());
        Some(scene.add_object(element, ObjectData::permanent()))
    }

    /// A new object was committed; undone objects can no longer be redone
    pub fn record_commit(&mut self) {
        self.redo_stack.clear();
    }

    /// Returns true if there is an object that can be undone
    pub fn can_undo(&self, scene: &dyn Scene) -> bool {
        scene.object_count() > 0
    }

    /// Returns true if there are objects that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.redo_stack.clear();
    }
}
