use eframe::egui;

use crate::MangaSketchApp;
use crate::util::time;

const THUMBNAIL_WIDTH: f32 = 160.0;

enum Action {
    Load(String),
    Delete(String),
    Close,
}

/// Grid of saved drawings; clicking a preview loads it
pub fn saved_drawings_window(app: &mut MangaSketchApp, ctx: &egui::Context) {
    let mut open = true;
    let mut action = None;
    let catalog = app.catalog().to_vec();

    egui::Window::new("Saved Drawings")
        .open(&mut open)
        .collapsible(false)
        .default_width(560.0)
        .show(ctx, |ui| {
            if catalog.is_empty() {
                ui.label("No saved drawings yet.");
                if ui.button("Close").clicked() {
                    action = Some(Action::Close);
                }
                return;
            }

            egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                egui::Grid::new("saved_drawings_grid")
                    .num_columns(3)
                    .spacing([12.0, 12.0])
                    .show(ui, |ui| {
                        // Newest first
                        for (index, summary) in catalog.iter().rev().enumerate() {
                            ui.vertical(|ui| {
                                let clicked = match app.preview_texture(ctx, summary) {
                                    Some(texture) => {
                                        let size = texture.size_vec2();
                                        let scale = THUMBNAIL_WIDTH / size.x.max(1.0);
                                        ui.add(
                                            egui::ImageButton::new((texture.id(), size * scale)),
                                        )
                                        .clicked()
                                    }
                                    None => ui.button("(no preview)").clicked(),
                                };
                                if clicked {
                                    action = Some(Action::Load(summary.id.clone()));
                                }

                                ui.strong(&summary.name);
                                ui.horizontal(|ui| {
                                    ui.small(time::format_millis(summary.last_modified));
                                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                        action = Some(Action::Delete(summary.id.clone()));
                                    }
                                });
                            });
                            if index % 3 == 2 {
                                ui.end_row();
                            }
                        }
                    });
            });
        });

    if !open {
        action = Some(Action::Close);
    }
    match action {
        Some(Action::Load(id)) => app.load_drawing(&id),
        Some(Action::Delete(id)) => app.delete_drawing(&id),
        Some(Action::Close) => app.close_saved_drawings(),
        None => {}
    }
}
