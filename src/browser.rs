use std::path::PathBuf;

use crate::filter::{FilterType, SortKey};
use crate::ingest::{Origin, PICKER_EXTS, PendingFile};
use crate::record::ImageRecord;
use crate::state::{Action, Gallery};
use crate::summary::fit;
use crate::thumbnail::TextureStore;

const CELL: f32 = 170.0;
const DROP_ZONE_HEIGHT: f32 = 140.0;

/// Upload surface and gallery grid.
pub struct Browser {
    /// Where the picker opens next; persisted through the config.
    pub last_dir: Option<PathBuf>,
}

impl Browser {
    pub fn new(last_dir: Option<PathBuf>) -> Self {
        Self { last_dir }
    }

    /// Drop zone. Clicking opens the picker; while a batch is in flight the
    /// zone shows progress and takes no input.
    pub fn show_upload(&mut self, ui: &mut egui::Ui, uploading: bool, actions: &mut Vec<Action>) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let sense = if uploading {
            egui::Sense::hover()
        } else {
            egui::Sense::click()
        };
        let (rect, resp) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT), sense);

        let visuals = ui.visuals();
        let (fill, stroke) = if hovering && !uploading {
            (visuals.selection.bg_fill.gamma_multiply(0.3), visuals.selection.stroke.color)
        } else if resp.hovered() && !uploading {
            (visuals.widgets.hovered.bg_fill, visuals.widgets.hovered.fg_stroke.color)
        } else {
            (visuals.extreme_bg_color, visuals.widgets.noninteractive.bg_stroke.color)
        };
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, fill);
        painter.rect_stroke(rect, 8.0, egui::Stroke::new(1.5, stroke), egui::StrokeKind::Inside);

        if uploading {
            let inner = rect.shrink2(egui::vec2(rect.width() * 0.2, rect.height() * 0.35));
            let mut child = ui.new_child(egui::UiBuilder::new().max_rect(inner));
            child.vertical_centered(|ui| {
                ui.add(egui::ProgressBar::new(0.0).animate(true));
                ui.label("Processing...");
            });
            return;
        }

        let headline = if hovering {
            "Drop to add images"
        } else {
            "Drag & drop images here, or click to browse"
        };
        painter.text(
            rect.center() - egui::vec2(0.0, 10.0),
            egui::Align2::CENTER_CENTER,
            headline,
            egui::FontId::proportional(18.0),
            ui.visuals().text_color(),
        );
        painter.text(
            rect.center() + egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_CENTER,
            "JPG, PNG, GIF or WebP",
            egui::FontId::proportional(12.0),
            ui.visuals().weak_text_color(),
        );

        if resp.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
            if let Some(files) = self.pick() {
                actions.push(Action::Ingest {
                    origin: Origin::Picker,
                    files,
                });
            }
        }
    }

    fn pick(&mut self) -> Option<Vec<PendingFile>> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Add images")
            .add_filter("Images", PICKER_EXTS);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        let paths = dialog.pick_files()?;
        if let Some(parent) = paths.first().and_then(|p| p.parent()) {
            self.last_dir = Some(parent.to_path_buf());
        }
        tracing::debug!(count = paths.len(), "files picked");
        Some(paths.into_iter().map(PendingFile::from_path).collect())
    }

    /// Toolbar plus card grid over the filtered, sorted view.
    pub fn show_gallery(
        &self,
        ui: &mut egui::Ui,
        gallery: &Gallery,
        textures: &TextureStore,
        actions: &mut Vec<Action>,
    ) {
        let view = gallery.view();
        ui.horizontal(|ui| {
            ui.heading(format!("Gallery ({})", gallery.records().len()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear all").clicked() {
                    actions.push(Action::ClearAll);
                }
                let mut sort = view.sort;
                egui::ComboBox::from_id_salt("sort_key")
                    .selected_text(sort.label())
                    .show_ui(ui, |ui| {
                        for key in SortKey::ALL {
                            ui.selectable_value(&mut sort, key, key.label());
                        }
                    });
                if sort != view.sort {
                    actions.push(Action::SetSort(sort));
                }
                let mut filter = view.filter;
                egui::ComboBox::from_id_salt("filter_type")
                    .selected_text(filter.label())
                    .show_ui(ui, |ui| {
                        for kind in FilterType::ALL {
                            ui.selectable_value(&mut filter, kind, kind.label());
                        }
                    });
                if filter != view.filter {
                    actions.push(Action::SetFilter(filter));
                }
            });
        });
        ui.separator();

        let visible = gallery.visible();
        if visible.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No images match this filter");
            });
            return;
        }

        let cols = ((ui.available_width() / (CELL + 8.0)) as usize).max(1);
        egui::ScrollArea::vertical()
            .id_salt("gallery_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("image_grid")
                    .num_columns(cols)
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        for (i, record) in visible.iter().enumerate() {
                            if let Some(action) = draw_card(ui, i, record, textures) {
                                actions.push(action);
                            }
                            if (i + 1) % cols == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });
    }
}

/// One grid card. `index` is the card's position in the visible list, which is
/// what a remove request carries.
fn draw_card(
    ui: &mut egui::Ui,
    index: usize,
    record: &ImageRecord,
    textures: &TextureStore,
) -> Option<Action> {
    let mut action = None;
    ui.vertical(|ui| {
        ui.set_width(CELL);
        let (resp, painter) = ui.allocate_painter(egui::vec2(CELL, CELL), egui::Sense::click());
        let rect = resp.rect;

        match textures.texture(record.handle_key()) {
            Some(tex) => {
                painter.image(
                    tex.id(),
                    fit(tex.size_vec2(), rect),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                let glyph = if textures.is_failed(record.handle_key()) {
                    "⚠"
                } else {
                    "…"
                };
                painter.rect_filled(rect, 4.0, egui::Color32::from_gray(40));
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    glyph,
                    egui::FontId::proportional(22.0),
                    egui::Color32::GRAY,
                );
            }
        }
        if resp.hovered() {
            painter.rect_stroke(
                rect,
                4.0,
                ui.visuals().selection.stroke,
                egui::StrokeKind::Inside,
            );
        }
        if resp.on_hover_cursor(egui::CursorIcon::ZoomIn).clicked() {
            action = Some(Action::OpenViewer(record.id.clone()));
        }

        ui.add(egui::Label::new(egui::RichText::new(&record.display_name).small()).truncate());
        ui.label(
            egui::RichText::new(format!(
                "{} · {}",
                record.size_label(),
                textures.dimensions_label(record.handle_key(), record.dimensions)
            ))
                .small()
                .weak(),
        );

        ui.horizontal(|ui| {
            if ui.small_button("🔍").on_hover_text("View").clicked() {
                action = Some(Action::OpenViewer(record.id.clone()));
            }
            if ui.small_button("⬇").on_hover_text("Download").clicked() {
                action = Some(Action::Download(record.id.clone()));
            }
            if ui.small_button("🔗").on_hover_text("Copy link").clicked() {
                action = Some(Action::Share(record.id.clone()));
            }
            if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                action = Some(Action::Remove(index));
            }
        });
    });
    action
}
