use crate::metadata::ImageMetadata;
use crate::record::ImageRecord;
use crate::state::Action;
use crate::summary::fit;
use crate::thumbnail::TextureStore;

const SIDEBAR: f32 = 240.0;

/// Fullscreen view of one record. Returns what the user asked for, if anything.
pub fn show(ctx: &egui::Context, record: &ImageRecord, textures: &TextureStore) -> Option<Action> {
    let key = record.handle_key();
    let screen = ctx.screen_rect();
    let mut action = None;

    let modal = egui::Modal::new(egui::Id::new("image_viewer"))
        .backdrop_color(egui::Color32::from_black_alpha(220))
        .show(ctx, |ui| {
            let size = egui::vec2(screen.width() * 0.9, screen.height() * 0.85);
            ui.set_min_size(size);
            ui.set_max_size(size);

            ui.horizontal(|ui| {
                let (image_rect, _) = ui.allocate_exact_size(
                    egui::vec2(size.x - SIDEBAR, size.y),
                    egui::Sense::hover(),
                );
                match textures.texture(key) {
                    Some(tex) => {
                        ui.painter().image(
                            tex.id(),
                            fit(tex.size_vec2(), image_rect),
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    None if textures.is_decoding(key) => {
                        let mut child = ui.new_child(egui::UiBuilder::new().max_rect(image_rect));
                        child.centered_and_justified(|ui| ui.spinner());
                    }
                    None => {
                        ui.painter().text(
                            image_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "Could not decode this image",
                            egui::FontId::proportional(16.0),
                            egui::Color32::GRAY,
                        );
                    }
                }

                ui.vertical(|ui| {
                    ui.set_width(SIDEBAR - 16.0);
                    ui.heading(&record.display_name);
                    ui.add_space(4.0);
                    egui::Grid::new("viewer_details")
                        .num_columns(2)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new("Dimensions").weak());
                            ui.label(textures.dimensions_label(key, record.dimensions));
                            ui.end_row();
                            ui.label(egui::RichText::new("Size").weak());
                            ui.label(record.size_label());
                            ui.end_row();
                            ui.label(egui::RichText::new("Type").weak());
                            ui.label(&record.mime_type);
                            ui.end_row();
                            ui.label(egui::RichText::new("Added").weak());
                            ui.label(record.added_at.format("%Y-%m-%d %H:%M").to_string());
                            ui.end_row();
                        });

                    if let Some(meta) = textures.metadata(key) {
                        ui.separator();
                        show_exif(ui, &meta);
                    }

                    ui.add_space(12.0);
                    if ui.button("⬇ Download").clicked() {
                        action = Some(Action::Download(record.id.clone()));
                    }
                    if ui.button("🔗 Copy link").clicked() {
                        action = Some(Action::Share(record.id.clone()));
                    }
                    if ui.button("🗑 Remove").clicked() {
                        action = Some(Action::RemoveById(record.id.clone()));
                    }
                    if ui.button("✖ Close").clicked() {
                        action = Some(Action::CloseViewer);
                    }
                });
            });
        });

    if modal.should_close() && action.is_none() {
        action = Some(Action::CloseViewer);
    }
    action
}

fn show_exif(ui: &mut egui::Ui, meta: &ImageMetadata) {
    ui.label(egui::RichText::new("EXIF").strong());
    ui.add_space(4.0);
    egui::Grid::new("exif_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            let mut row = |label: &str, value: Option<String>| {
                if let Some(v) = value {
                    ui.label(egui::RichText::new(label).weak());
                    ui.label(v);
                    ui.end_row();
                }
            };

            row("Camera", meta.camera());
            row("Lens", meta.lens.clone());
            row("Date", meta.date_taken.clone());
            row("Shutter", meta.shutter_speed.clone());
            row("Aperture", meta.aperture.clone());
            row("ISO", meta.iso.map(|v| v.to_string()));
            row("Focal length", meta.focal_length.clone());
        });
}
