use egui::{Color32, Pos2};
use manga_sketch::DrawingEditor;
use manga_sketch::persistence::{
    CATALOG_KEY, DEFAULT_QUOTA_BYTES, FileStore, KeyValueStore, MemoryStore, PersistenceError,
    PersistenceManager,
};
use manga_sketch::scene::{Document, RasterFormat, Scene};
use manga_sketch::tools::Tool;

fn sketch() -> DrawingEditor {
    let mut editor = DrawingEditor::default();
    editor.set_color(Color32::from_rgb(200, 30, 30));

    editor.select_tool(Tool::Rectangle);
    editor.pointer_down(Pos2::new(40.0, 40.0));

    editor.select_tool(Tool::Polygon);
    for pos in [Pos2::new(300.0, 100.0), Pos2::new(400.0, 120.0), Pos2::new(350.0, 220.0)] {
        editor.pointer_down(pos);
        editor.pointer_up(pos);
    }
    editor.double_click();

    editor.select_tool(Tool::Pen);
    editor.pointer_down(Pos2::new(100.0, 300.0));
    editor.pointer_move(Pos2::new(150.0, 320.0));
    editor.pointer_up(Pos2::new(200.0, 300.0));

    editor.set_name("Sketch A");
    editor
}

fn decoded(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

#[test]
fn test_serialize_round_trip_keeps_count_and_pixels() {
    let editor = sketch();
    let original = editor.scene();
    let blob = original.serialize().unwrap();

    let mut restored = Document::default();
    restored.deserialize(&blob).unwrap();

    assert_eq!(restored.object_count(), original.object_count());
    let before = decoded(&original.to_raster(RasterFormat::Png, 1.0).unwrap());
    let after = decoded(&restored.to_raster(RasterFormat::Png, 1.0).unwrap());
    assert_eq!(before.dimensions(), after.dimensions());
    assert!(before.pixels().zip(after.pixels()).all(|(a, b)| a == b));
}

#[test]
fn test_save_load_delete_consistency() {
    let editor = sketch();
    let mut manager = PersistenceManager::new(MemoryStore::new());

    let summary = editor.save_to(&mut manager).unwrap();
    let catalog = manager.catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Sketch A");
    assert_eq!(catalog[0].id, summary.id);
    assert!(!catalog[0].preview.is_empty());

    let mut reopened = DrawingEditor::default();
    reopened.load_from(&manager, &summary.id).unwrap();
    assert_eq!(reopened.name(), "Sketch A");
    assert_eq!(reopened.scene().snapshot(), editor.scene().snapshot());
    assert!(!reopened.can_redo());

    manager.delete(&summary.id).unwrap();
    assert!(manager.catalog().unwrap().is_empty());
    assert!(!manager.store().contains(&summary.id).unwrap());
    assert!(matches!(
        manager.record(&summary.id),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_load_missing_id_is_not_found_and_keeps_scene() {
    let manager = PersistenceManager::new(MemoryStore::new());
    let mut editor = sketch();
    let before = editor.scene().snapshot();

    let err = editor.load_from(&manager, "drawing-missing").unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(id) if id == "drawing-missing"));
    assert_eq!(editor.scene().snapshot(), before);
    assert_eq!(editor.name(), "Sketch A");
}

#[test]
fn test_saves_get_distinct_ids_in_catalog_order() {
    let mut editor = sketch();
    let mut manager = PersistenceManager::new(MemoryStore::new());

    let first = editor.save_to(&mut manager).unwrap();
    editor.set_name("Sketch B");
    let second = editor.save_to(&mut manager).unwrap();

    assert_ne!(first.id, second.id);
    assert!(first.id.starts_with("drawing-"));
    let names: Vec<_> = manager.catalog().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Sketch A", "Sketch B"]);
}

#[test]
fn test_quota_failure_leaves_editor_and_store_untouched() {
    let editor = sketch();
    let mut manager = PersistenceManager::new(MemoryStore::with_quota(64));
    let before = editor.scene().snapshot();

    let err = editor.save_to(&mut manager).unwrap_err();
    assert!(matches!(err, PersistenceError::StorageQuota { .. }));
    assert_eq!(editor.scene().snapshot(), before);
    assert_eq!(manager.store().keys().count(), 0);
    assert!(manager.catalog().unwrap().is_empty());
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let editor = sketch();

    let id = {
        let store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
        let mut manager = PersistenceManager::new(store);
        editor.save_to(&mut manager).unwrap().id
    };

    let store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
    assert!(store.contains(CATALOG_KEY).unwrap());
    let manager = PersistenceManager::new(store);
    let mut reopened = DrawingEditor::default();
    reopened.load_from(&manager, &id).unwrap();
    assert_eq!(reopened.scene().snapshot(), editor.scene().snapshot());
}

#[test]
fn test_reconcile_repairs_catalog_after_lost_record() {
    let editor = sketch();
    let mut manager = PersistenceManager::new(Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>);
    let kept = editor.save_to(&mut manager).unwrap();
    let lost = editor.save_to(&mut manager).unwrap();

    // Simulate a crash between the two writes of a delete
    let mut store = MemoryStore::new();
    for key in [CATALOG_KEY, kept.id.as_str()] {
        let value = manager.store().get(key).unwrap().unwrap();
        store.set(key, &value).unwrap();
    }
    let mut repaired = PersistenceManager::new(store);
    assert_eq!(repaired.catalog().unwrap().len(), 2);
    assert_eq!(repaired.reconcile().unwrap(), 1);

    let catalog = repaired.catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, kept.id);
    assert_ne!(catalog[0].id, lost.id);
}

#[test]
fn test_corrupt_catalog_never_strands_saved_drawings() {
    let mut editor = sketch();
    let mut manager = PersistenceManager::new(MemoryStore::new());
    let first = editor.save_to(&mut manager).unwrap();

    let mut store = MemoryStore::new();
    store.set(first.id.as_str(), &manager.store().get(&first.id).unwrap().unwrap()).unwrap();
    store.set(CATALOG_KEY, "[{\"id\": truncated").unwrap();
    let mut manager = PersistenceManager::new(store);

    editor.set_name("Sketch B");
    assert!(matches!(
        editor.save_to(&mut manager),
        Err(PersistenceError::CorruptCatalog(_))
    ));

    assert_eq!(manager.reconcile().unwrap(), 1);
    let second = editor.save_to(&mut manager).unwrap();
    let ids: Vec<_> = manager.catalog().unwrap().into_iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn test_reconcile_relists_records_missing_from_file_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let editor = sketch();
    let mut manager = PersistenceManager::new(FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap());
    let saved = editor.save_to(&mut manager).unwrap();

    // Catalog file lost while the record survived
    std::fs::remove_file(dir.path().join(format!("{}.json", CATALOG_KEY))).unwrap();
    assert!(manager.catalog().unwrap().is_empty());

    assert_eq!(manager.reconcile().unwrap(), 1);
    let catalog = manager.catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, saved.id);
    assert_eq!(catalog[0].name, "Sketch A");
}
