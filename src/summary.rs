use chrono::{DateTime, Local};
use serde::Serialize;

use crate::record::{Dimensions, ImageId, ImageRecord, format_megabytes};
use crate::thumbnail::TextureStore;

const THUMB: f32 = 48.0;

#[derive(Debug, Serialize)]
/// Read-only description of a submitted collection.
pub struct Manifest<'a> {
    pub submitted_at: String,
    pub count: usize,
    pub total_bytes: u64,
    pub images: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry<'a> {
    pub id: &'a ImageId,
    pub name: &'a str,
    pub mime_type: &'a str,
    pub byte_size: u64,
    pub dimensions: Dimensions,
    pub added_at: String,
}

impl<'a> Manifest<'a> {
    pub fn new(records: &'a [ImageRecord], submitted_at: DateTime<Local>) -> Self {
        let images: Vec<ManifestEntry<'a>> = records
            .iter()
            .map(|r| ManifestEntry {
                id: &r.id,
                name: &r.display_name,
                mime_type: &r.mime_type,
                byte_size: r.byte_size,
                dimensions: r.dimensions,
                added_at: r.added_at.to_rfc3339(),
            })
            .collect();
        Self {
            submitted_at: submitted_at.to_rfc3339(),
            count: images.len(),
            total_bytes: images.iter().map(|e| e.byte_size).sum(),
            images,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub enum SummaryAction {
    Close,
    CopyManifest,
}

/// Modal listing every submitted image. Nothing in here mutates the gallery.
pub fn show(
    ctx: &egui::Context,
    records: &[ImageRecord],
    textures: &TextureStore,
) -> Option<SummaryAction> {
    let mut action = None;
    let modal = egui::Modal::new(egui::Id::new("submission_summary")).show(ctx, |ui| {
        ui.set_width(420.0);
        ui.heading("Submitted images");
        ui.label(
            egui::RichText::new(format!(
                "{} image(s), {}",
                records.len(),
                format_megabytes(records.iter().map(|r| r.byte_size).sum())
            ))
            .weak(),
        );
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("summary_scroll")
            .max_height(360.0)
            .show(ui, |ui| {
                for record in records {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(THUMB, THUMB), egui::Sense::hover());
                        match textures.texture(record.handle_key()) {
                            Some(tex) => {
                                let fitted = fit(tex.size_vec2(), rect);
                                ui.painter().image(
                                    tex.id(),
                                    fitted,
                                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                                    egui::Color32::WHITE,
                                );
                            }
                            None => {
                                ui.painter()
                                    .rect_filled(rect, 4.0, egui::Color32::from_gray(40));
                            }
                        }
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&record.display_name).strong());
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} · {}",
                                    record.size_label(),
                                    textures.dimensions_label(record.handle_key(), record.dimensions)
                                ))
                                .weak(),
                            );
                        });
                    });
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Copy summary").clicked() {
                action = Some(SummaryAction::CopyManifest);
            }
            if ui.button("Close").clicked() {
                action = Some(SummaryAction::Close);
            }
        });
    });
    if modal.should_close() && action.is_none() {
        action = Some(SummaryAction::Close);
    }
    action
}

/// Largest rect with the texture's aspect ratio that fits centered in `bounds`.
pub fn fit(size: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width() / size.x).min(bounds.height() / size.y);
    egui::Rect::from_center_size(bounds.center(), size * scale)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::handle::testing::CountingProvider;
    use crate::record::CandidateFile;

    #[test]
    fn manifest_lists_every_record_in_upload_order() {
        let (_c, provider) = CountingProvider::shared();
        let at = Local.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let records: Vec<ImageRecord> = [("b.png", 10), ("a.jpg", 30)]
            .into_iter()
            .enumerate()
            .map(|(i, (name, size))| {
                ImageRecord::acquire(
                    ImageId::from_raw(format!("img-{i}")),
                    CandidateFile::from_bytes(name, "image/png", vec![0u8; size]),
                    &provider,
                    at,
                )
                .unwrap()
            })
            .collect();

        let manifest = Manifest::new(&records, at);
        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(json["count"], 2);
        assert_eq!(json["total_bytes"], 40);
        assert_eq!(json["images"][0]["name"], "b.png");
        assert_eq!(json["images"][1]["id"], "img-1");
        assert_eq!(json["images"][0]["dimensions"]["width"], 0);
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let bounds = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 100.0));
        let fitted = fit(egui::vec2(200.0, 100.0), bounds);
        assert_eq!(fitted.size(), egui::vec2(100.0, 50.0));
        assert_eq!(fitted.center(), bounds.center());
    }
}
