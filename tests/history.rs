use egui::{Color32, Pos2};
use manga_sketch::DrawingEditor;
use manga_sketch::element::{Element, factory};
use manga_sketch::scene::{ObjectData, Scene};
use manga_sketch::tools::Tool;

fn editor_with(n: usize) -> DrawingEditor {
    let mut editor = DrawingEditor::default();
    for i in 0..n {
        let x = 10.0 * i as f32;
        editor.scene_mut().add_object(
            factory::create_line(Pos2::new(x, 0.0), Pos2::new(x, 40.0), 2.0, Color32::BLACK),
            ObjectData::permanent(),
        );
    }
    editor
}

#[test]
fn test_undo_removes_the_new_rectangle() {
    let mut editor = editor_with(3);
    editor.select_tool(Tool::Rectangle);
    let rect = editor.pointer_down(Pos2::new(100.0, 100.0)).unwrap();
    assert_eq!(editor.scene().object_count(), 4);

    assert!(editor.undo());
    assert_eq!(editor.scene().object_count(), 3);
    assert!(editor.scene().object(rect).is_none());
    assert!(
        editor
            .scene()
            .scene_objects()
            .iter()
            .all(|object| !matches!(object.element, Element::Rectangle { .. }))
    );
}

#[test]
fn test_undo_on_empty_scene_is_noop() {
    let mut editor = editor_with(0);
    editor.select_tool(Tool::Rectangle);
    editor.pointer_down(Pos2::new(100.0, 100.0));

    assert!(editor.undo());
    assert_eq!(editor.scene().object_count(), 0);
    assert!(!editor.undo());
    assert_eq!(editor.scene().object_count(), 0);
}

#[test]
fn test_undo_follows_creation_order_across_tools() {
    let mut editor = editor_with(0);

    editor.select_tool(Tool::Circle);
    let circle = editor.pointer_down(Pos2::new(10.0, 10.0)).unwrap();

    editor.select_tool(Tool::Line);
    editor.pointer_down(Pos2::new(0.0, 0.0));
    let line = editor.pointer_up(Pos2::new(60.0, 0.0)).unwrap();

    editor.select_tool(Tool::Pen);
    editor.pointer_down(Pos2::new(5.0, 5.0));
    let stroke = editor.pointer_up(Pos2::new(9.0, 9.0)).unwrap();

    assert_eq!(editor.scene().objects(), vec![circle, line, stroke]);
    editor.undo();
    assert_eq!(editor.scene().objects(), vec![circle, line]);
    editor.undo();
    assert_eq!(editor.scene().objects(), vec![circle]);
}

#[test]
fn test_redo_restores_in_reverse_undo_order() {
    let mut editor = editor_with(0);
    editor.select_tool(Tool::Rectangle);
    editor.pointer_down(Pos2::new(0.0, 0.0));
    editor.select_tool(Tool::Circle);
    editor.pointer_down(Pos2::new(200.0, 0.0));

    editor.undo();
    editor.undo();
    assert!(editor.can_redo());

    assert!(editor.redo());
    assert!(matches!(
        editor.scene().scene_objects()[0].element,
        Element::Rectangle { .. }
    ));
    assert!(editor.redo());
    assert!(matches!(
        editor.scene().scene_objects()[1].element,
        Element::Circle { .. }
    ));
    assert!(!editor.redo());
}

#[test]
fn test_redo_is_blocked_while_tracing() {
    let mut editor = editor_with(1);
    editor.undo();
    editor.select_tool(Tool::Line);
    editor.pointer_down(Pos2::new(0.0, 0.0));

    assert!(!editor.can_redo());
    assert!(!editor.redo());
    assert!(editor.can_undo());
}
