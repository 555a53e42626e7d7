use eframe::egui;

use crate::MangaSketchApp;
use crate::scene::Scene;
use crate::settings::CanvasSize;
use crate::tools::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, Tool};

pub fn tools_panel(app: &mut MangaSketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                drawing_section(app, ui);
                ui.separator();
                tool_section(app, ui);
                ui.separator();
                style_section(app, ui);
                ui.separator();
                history_section(app, ui);
                ui.separator();
                file_section(app, ui);
            });
        });
}

fn drawing_section(app: &mut MangaSketchApp, ui: &mut egui::Ui) {
    ui.heading("Drawing");

    let mut name = app.editor().name().to_owned();
    if ui.text_edit_singleline(&mut name).changed() {
        app.editor_mut().set_name(name);
    }

    let current = app.settings().canvas_size;
    let mut selected = current;
    egui::ComboBox::from_label("Canvas")
        .selected_text(current.label())
        .show_ui(ui, |ui| {
            for size in CanvasSize::ALL {
                ui.selectable_value(&mut selected, size, size.label());
            }
        });
    if selected != current {
        app.set_canvas_size(selected);
    }
}

fn tool_section(app: &mut MangaSketchApp, ui: &mut egui::Ui) {
    ui.heading("Tools");

    let active = app.editor().active_tool();
    egui::Grid::new("tool_grid").num_columns(3).show(ui, |ui| {
        for (index, tool) in Tool::ALL.iter().enumerate() {
            let label = format!("{} {}", tool.icon(), tool.name());
            if ui.selectable_label(active == *tool, label).clicked() {
                app.editor_mut().select_tool_by_id(tool.id());
            }
            if index % 3 == 2 {
                ui.end_row();
            }
        }
    });

    let hint = match active {
        Tool::Line => Some("Press, drag and release to draw a line"),
        Tool::Polygon => Some("Click to add points, double-click to close"),
        Tool::Rectangle | Tool::Circle | Tool::Text => Some("Click the canvas to place"),
        _ => None,
    };
    if let Some(hint) = hint {
        ui.small(hint);
    }

    // Text boxes are edited in place through the selection
    if active == Tool::Select {
        let scene = app.editor_mut().scene_mut();
        if let Some(handle) = scene.active_object() {
            if let Some(content) = scene.text_content_mut(handle) {
                ui.label("Text:");
                ui.text_edit_multiline(content);
            }
        }
    }
}

fn style_section(app: &mut MangaSketchApp, ui: &mut egui::Ui) {
    ui.heading("Stroke");

    let mut width = app.editor().style().width;
    ui.horizontal(|ui| {
        ui.label("Width:");
        if ui
            .add(egui::Slider::new(&mut width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH))
            .changed()
        {
            app.set_stroke_width(width);
        }
    });

    let mut color = app.editor().style().color;
    ui.horizontal(|ui| {
        ui.label("Color:");
        if egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::Opaque)
            .changed()
        {
            app.set_color(color);
        }
        ui.monospace(app.editor().style().color_hex());
    });
}

fn history_section(app: &mut MangaSketchApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        let can_undo = app.editor().can_undo();
        let can_redo = app.editor().can_redo();

        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            app.undo();
        }
        if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
            app.redo();
        }
        if ui.button("Clear").clicked() {
            app.clear_canvas();
        }
    });
    ui.label(format!("Objects: {}", app.editor().scene().object_count()));
}

fn file_section(app: &mut MangaSketchApp, ui: &mut egui::Ui) {
    ui.heading("File");

    ui.horizontal(|ui| {
        if ui.button("Save").clicked() {
            app.save_drawing();
        }
        if ui.button("Saved Drawings").clicked() {
            app.open_saved_drawings();
        }
    });
    ui.horizontal(|ui| {
        if ui.button("Export").clicked() {
            app.export_drawing();
        }
        if ui.button("Import").clicked() {
            app.import_drawing();
        }
    });
    if ui.button("Download PNG").clicked() {
        app.download_png();
    }
}
