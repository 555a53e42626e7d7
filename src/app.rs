use std::collections::HashMap;

use eframe::egui;

use crate::editor::DrawingEditor;
use crate::file_handler::{self, FileHandler};
use crate::panels::{Notifications, central_panel, saved_drawings_window, tools_panel};
use crate::persistence::{
    DrawingSummary, FileStore, KeyValueStore, MemoryStore, PersistenceError, PersistenceManager,
};
use crate::renderer::Renderer;
use crate::scene::Document;
use crate::settings::{CanvasSize, EditorSettings};

type DrawingStore = Box<dyn KeyValueStore>;

/// The desktop drawing application
pub struct MangaSketchApp {
    settings: EditorSettings,
    editor: DrawingEditor,
    renderer: Renderer,
    persistence: PersistenceManager<DrawingStore>,
    file_handler: FileHandler,
    notifications: Notifications,
    show_saved_drawings: bool,
    catalog: Vec<DrawingSummary>,
    previews: HashMap<String, egui::TextureHandle>,
}

impl Default for MangaSketchApp {
    fn default() -> Self {
        Self::with_settings(EditorSettings::default())
    }
}

impl MangaSketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        let mut notifications = Notifications::default();
        let store: DrawingStore = match FileStore::open(settings.drawings_dir(), settings.storage_quota) {
            Ok(store) => Box::new(store),
            Err(err) => {
                notifications.error(format!("Saved drawings are unavailable this session: {}", err));
                Box::new(MemoryStore::with_quota(settings.storage_quota))
            }
        };

        let document = Document::new(settings.canvas_size.size());
        Self {
            editor: DrawingEditor::new(document, settings.stroke_style()),
            renderer: Renderer::new(),
            persistence: PersistenceManager::new(store).with_preview_scale(settings.preview_scale),
            file_handler: FileHandler::new(),
            notifications,
            show_saved_drawings: false,
            catalog: Vec::new(),
            previews: HashMap::new(),
            settings,
        }
    }

    pub fn editor(&self) -> &DrawingEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut DrawingEditor {
        &mut self.editor
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn catalog(&self) -> &[DrawingSummary] {
        &self.catalog
    }

    pub fn set_stroke_width(&mut self, width: u32) {
        self.editor.set_stroke_width(width);
        self.settings.stroke_width = self.editor.style().width;
    }

    pub fn set_color(&mut self, color: egui::Color32) {
        self.editor.set_color(color);
        self.settings.stroke_color = color;
    }

    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.settings.canvas_size = size;
        self.editor.scene_mut().set_size(size.size());
    }

    pub fn undo(&mut self) {
        if self.editor.undo() {
            self.notifications.info("Last action undone");
        }
    }

    pub fn redo(&mut self) {
        self.editor.redo();
    }

    pub fn clear_canvas(&mut self) {
        self.editor.clear();
        self.notifications.info("Canvas cleared");
    }

    pub fn save_drawing(&mut self) {
        let mut result = self.editor.save_to(&mut self.persistence);
        if let Err(PersistenceError::CorruptCatalog(_)) = &result {
            // Rebuild the catalog from the stored records, then try once more
            if let Err(err) = self.persistence.reconcile() {
                log::error!("Catalog repair failed: {}", err);
            }
            result = self.editor.save_to(&mut self.persistence);
        }
        match result {
            Ok(summary) => {
                self.notifications.success(format!("Saved \"{}\"", summary.name));
                self.refresh_catalog();
            }
            Err(err) => self.notifications.error(format!("Save failed: {}", err)),
        }
    }

    pub fn load_drawing(&mut self, id: &str) {
        match self.editor.load_from(&self.persistence, id) {
            Ok(()) => {
                self.notifications.success(format!("Loaded \"{}\"", self.editor.name()));
                self.show_saved_drawings = false;
            }
            Err(err) => self.notifications.error(format!("Load failed: {}", err)),
        }
    }

    pub fn delete_drawing(&mut self, id: &str) {
        match self.persistence.delete(id) {
            Ok(()) => {
                self.previews.remove(id);
                self.notifications.success("Drawing deleted");
            }
            Err(err) => self.notifications.error(format!("Delete failed: {}", err)),
        }
        self.refresh_catalog();
    }

    pub fn open_saved_drawings(&mut self) {
        match self.persistence.reconcile() {
            Ok(0) => {}
            Ok(changes) => log::warn!("Repaired {} drawing catalog entries", changes),
            Err(err) => log::error!("Catalog repair failed: {}", err),
        }
        self.refresh_catalog();
        self.show_saved_drawings = true;
    }

    pub fn close_saved_drawings(&mut self) {
        self.show_saved_drawings = false;
    }

    fn refresh_catalog(&mut self) {
        match self.persistence.catalog() {
            Ok(catalog) => self.catalog = catalog,
            Err(err) => self.notifications.error(format!("Could not list drawings: {}", err)),
        }
    }

    /// Texture of a catalog entry's preview, decoded on first use
    pub fn preview_texture(&mut self, ctx: &egui::Context, summary: &DrawingSummary) -> Option<egui::TextureHandle> {
        if let Some(texture) = self.previews.get(&summary.id) {
            return Some(texture.clone());
        }

        let image = match image::load_from_memory(&summary.preview) {
            Ok(image) => image.to_rgba8(),
            Err(err) => {
                log::warn!("Unreadable preview for {}: {}", summary.id, err);
                return None;
            }
        };
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let texture = ctx.load_texture(
            format!("preview-{}", summary.id),
            color_image,
            egui::TextureOptions::default(),
        );
        self.previews.insert(summary.id.clone(), texture.clone());
        Some(texture)
    }

    pub fn export_drawing(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Drawing", &[file_handler::EXPORT_EXTENSION])
            .set_file_name(file_handler::export_filename(self.editor.name()))
            .set_title("Export Drawing")
            .save_file()
        else {
            return;
        };

        match self.editor.export_to_path(&path) {
            Ok(()) => self.notifications.success(format!("Exported to {}", path.display())),
            Err(err) => self.notifications.error(format!("Export failed: {}", err)),
        }
    }

    pub fn import_drawing(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Drawing", &[file_handler::EXPORT_EXTENSION])
            .set_title("Import Drawing")
            .pick_file()
        else {
            return;
        };

        match self.editor.import_file(&path) {
            Ok(()) => self.notifications.success(format!("Imported \"{}\"", self.editor.name())),
            Err(err) => self.notifications.error(format!("Import failed: {}", err)),
        }
    }

    pub fn download_png(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(file_handler::png_filename())
            .set_title("Download as PNG")
            .save_file()
        else {
            return;
        };

        match self.editor.write_png(&path) {
            Ok(()) => self.notifications.success("Drawing downloaded"),
            Err(err) => self.notifications.error(format!("Download failed: {}", err)),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        for drop in self.file_handler.take_pending() {
            let result = match &drop {
                file_handler::DroppedDrawing::Path(path) => self.editor.import_file(path),
                file_handler::DroppedDrawing::Contents { name, text } => self.editor.import_text(text, name),
            };
            match result {
                Ok(()) => self.notifications.success(format!("Imported \"{}\"", self.editor.name())),
                Err(err) => self.notifications.error(format!("Import failed: {}", err)),
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (redo, undo, cancel) = ctx.input_mut(|i| {
            let redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
            let undo = i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            let cancel = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
            (redo, undo, cancel)
        });

        if redo {
            self.redo();
        } else if undo {
            self.undo();
        }
        if cancel {
            self.editor.cancel_construction();
        }
    }
}

impl eframe::App for MangaSketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        tools_panel(self, ctx);
        central_panel(self, ctx);

        if self.show_saved_drawings {
            saved_drawings_window(self, ctx);
        }
        self.notifications.show(ctx);
    }
}
