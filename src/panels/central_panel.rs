use eframe::egui;
use egui::emath::RectTransform;

use crate::MangaSketchApp;
use crate::editor::DrawingEditor;
use crate::renderer::Renderer;

pub fn central_panel(app: &mut MangaSketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).fill(egui::Color32::from_gray(230)))
        .show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                let size = app.editor().scene().size();
                let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
                let origin = response.rect.min;

                let to_canvas = Renderer::to_screen(app.editor().scene(), origin).inverse();
                handle_input(app.editor_mut(), ui, &response, to_canvas);

                let editor = app.editor();
                app.renderer()
                    .render(&painter, editor.scene(), origin, editor.tools().freehand().points());
            });
        });
}

/// Route this frame's pointer activity on the canvas to the editor
fn handle_input(editor: &mut DrawingEditor, ui: &egui::Ui, response: &egui::Response, to_canvas: RectTransform) {
    let (pressed, released, moving, hover) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.is_moving(),
            i.pointer.hover_pos(),
        )
    });
    let Some(screen_pos) = hover.or_else(|| response.interact_pointer_pos()) else {
        return;
    };
    let pos = to_canvas * screen_pos;

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    if pressed && response.hovered() {
        editor.pointer_down(pos);
    }
    if moving && (response.hovered() || response.dragged()) {
        editor.pointer_move(pos);
    }
    // A drag that leaves the canvas still finishes where it was released
    if released && (response.hovered() || response.drag_stopped()) {
        editor.pointer_up(pos);
    }
    if response.double_clicked() {
        editor.double_click();
    }
}
