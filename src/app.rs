use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, mpsc};
use std::time::Instant;

use crate::browser::Browser;
use crate::carousel::{Carousel, CarouselSettings, SlideEvent};
use crate::config::{AppConfig, Timings};
use crate::error::GalleryError;
use crate::handle::HandleProvider;
use crate::ingest::{self, IngestReport, Origin, PendingFile};
use crate::notice::{Notice, NotificationSink};
use crate::state::{Action, Effect, Gallery, Mode};
use crate::summary::{self, SummaryAction, fit};
use crate::thumbnail::TextureStore;
use crate::toast::Toasts;
use crate::viewer;

const SLIDE_HEIGHT: f32 = 0.62;
const STRIP_THUMB: f32 = 64.0;

/// A batch on its way back from the ingest worker.
struct InFlight {
    origin: Origin,
    rx: mpsc::Receiver<IngestReport>,
}

pub struct ShowcaseApp {
    gallery: Gallery,
    textures: Rc<TextureStore>,
    browser: Browser,
    toasts: Toasts,
    carousel: Carousel,
    settings: CarouselSettings,
    ingest: Option<InFlight>,
    /// Deadline and generation of the pending automatic switch to the carousel.
    auto_preview: Option<(Instant, u64)>,
    shown_mode: Mode,
    config: AppConfig,
}

impl ShowcaseApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, theme: egui::Theme) -> Self {
        cc.egui_ctx.set_theme(theme);
        let timings: Timings = config.timings();
        let textures = Rc::new(TextureStore::new(cc.egui_ctx.clone()));
        let provider: Rc<dyn HandleProvider> = textures.clone();
        let gallery = Gallery::new(provider, timings).with_view(config.filter(), config.sort());
        let settings = CarouselSettings::from(timings);
        Self {
            gallery,
            textures,
            browser: Browser::new(config.last_upload_dir.clone()),
            toasts: Toasts::default(),
            carousel: Carousel::new(settings, Instant::now()),
            settings,
            ingest: None,
            auto_preview: None,
            shown_mode: Mode::Upload,
            config,
        }
    }

    /// Apply actions in order, feeding any follow-ups an effect produces back
    /// through the reducer.
    fn dispatch(&mut self, ctx: &egui::Context, actions: Vec<Action>) {
        let mut queue: VecDeque<Action> = actions.into();
        while let Some(action) = queue.pop_front() {
            for effect in self.gallery.update(action) {
                if let Some(next) = self.run_effect(ctx, effect) {
                    queue.push_back(next);
                }
            }
        }
    }

    fn run_effect(&mut self, ctx: &egui::Context, effect: Effect) -> Option<Action> {
        let now = Instant::now();
        let len = self.gallery.records().len();
        match effect {
            Effect::Notify(notice) => self.toasts.notify(notice),
            Effect::StartIngest(job) => {
                let (tx, rx) = mpsc::channel();
                self.ingest = Some(InFlight {
                    origin: job.origin,
                    rx,
                });
                ingest::spawn(job, tx, ctx.clone());
            }
            Effect::ScheduleAutoPreview { generation, delay } => {
                self.auto_preview = Some((now + delay, generation));
                ctx.request_repaint_after(delay);
            }
            Effect::CarouselGoTo(index) => self.carousel.go_to(index, len, now),
            Effect::CarouselNext => self.carousel.next(len, now),
            Effect::CarouselPrevious => self.carousel.previous(len, now),
            Effect::CopyToClipboard(text) => ctx.copy_text(text),
            Effect::SaveCopy { name, contents } => {
                return save_copy(&name, &contents, self.browser.last_dir.as_deref())
                    .map(Action::DownloadFinished);
            }
        }
        None
    }

    fn poll_ingest(&mut self, actions: &mut Vec<Action>) {
        let Some(in_flight) = &self.ingest else {
            return;
        };
        let report = match in_flight.rx.try_recv() {
            Ok(report) => report,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => IngestReport {
                origin: in_flight.origin,
                result: Err(GalleryError::WorkerLost),
            },
        };
        self.ingest = None;
        actions.push(Action::IngestFinished(report));
    }

    fn poll_timers(&mut self, ctx: &egui::Context, now: Instant, actions: &mut Vec<Action>) {
        if let Some((due, generation)) = self.auto_preview {
            if now >= due {
                self.auto_preview = None;
                actions.push(Action::AutoPreviewDue { generation });
            } else {
                ctx.request_repaint_after(due - now);
            }
        }

        if self.gallery.mode() != Mode::Carousel {
            return;
        }
        if let Some(wait) = self.carousel.tick(self.gallery.records().len(), now) {
            ctx.request_repaint_after(wait);
        }
        actions.extend(self.carousel.take_events().into_iter().map(|event| match event {
            SlideEvent::BeforeChange { current, next } => Action::SlideChanging { current, next },
            SlideEvent::AfterChange { current } => Action::SlideChanged { current },
        }));
    }

    /// Entering the carousel starts a fresh widget on the first slide.
    fn sync_mode(&mut self, now: Instant, actions: &mut Vec<Action>) {
        let mode = self.gallery.mode();
        if mode == self.shown_mode {
            return;
        }
        self.shown_mode = mode;
        if mode == Mode::Carousel {
            self.carousel = Carousel::new(self.settings, now);
            actions.push(Action::SlideChanged { current: 0 });
        }
    }

    fn take_dropped(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        if !self.gallery.accepts_files() {
            tracing::debug!(count = dropped.len(), "drop ignored outside the upload surface");
            return;
        }
        let files: Vec<PendingFile> = dropped.iter().filter_map(PendingFile::from_dropped).collect();
        actions.push(Action::Ingest {
            origin: Origin::Drop,
            files,
        });
    }

    fn show_carousel(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let records = self.gallery.records();
        let textures = &self.textures;
        let height = ui.available_height() * SLIDE_HEIGHT;

        let resp = self
            .carousel
            .show(ui, records.len(), height, |painter, rect, index, alpha| {
                let Some(record) = records.get(index) else {
                    return;
                };
                let inner = rect.shrink(12.0);
                match textures.texture(record.handle_key()) {
                    Some(tex) => {
                        painter.image(
                            tex.id(),
                            fit(tex.size_vec2(), inner),
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE.gamma_multiply(alpha),
                        );
                    }
                    None => {
                        painter.text(
                            inner.center(),
                            egui::Align2::CENTER_CENTER,
                            "…",
                            egui::FontId::proportional(28.0),
                            egui::Color32::GRAY.gamma_multiply(alpha),
                        );
                    }
                }
            });
        if let Some(index) = resp.clicked {
            if let Some(record) = records.get(index) {
                actions.push(Action::OpenViewer(record.id.clone()));
            }
        }
        if let Some(drag) = resp.swipe {
            actions.push(Action::Swipe {
                dx: drag.x,
                dy: drag.y,
            });
        }

        let current = self.gallery.current_slide();
        if let Some(record) = records.get(current) {
            ui.add_space(6.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(&record.display_name).strong());
                ui.label(
                    egui::RichText::new(format!(
                        "{} · {}",
                        textures.dimensions_label(record.handle_key(), record.dimensions),
                        record.size_label()
                    ))
                        .weak(),
                );
            });
        }

        ui.add_space(8.0);
        egui::ScrollArea::horizontal()
            .id_salt("thumb_strip")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for (i, record) in records.iter().enumerate() {
                        let (rect, resp) = ui.allocate_exact_size(
                            egui::vec2(STRIP_THUMB, STRIP_THUMB),
                            egui::Sense::click(),
                        );
                        let painter = ui.painter();
                        painter.rect_filled(rect, 4.0, egui::Color32::from_gray(40));
                        if let Some(tex) = textures.texture(record.handle_key()) {
                            painter.image(
                                tex.id(),
                                fit(tex.size_vec2(), rect),
                                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                                egui::Color32::WHITE,
                            );
                        }
                        if i == current {
                            painter.rect_stroke(
                                rect,
                                4.0,
                                egui::Stroke::new(2.0, ui.visuals().selection.stroke.color),
                                egui::StrokeKind::Outside,
                            );
                        }
                        if resp.on_hover_text(&record.display_name).clicked() {
                            actions.push(Action::JumpToSlide(i));
                        }
                    }
                });
            });
    }
}

/// Ask where to put a copy of `name` and write it there. `None` when the user
/// cancels the dialog.
fn save_copy(
    name: &str,
    contents: &Arc<[u8]>,
    start_dir: Option<&std::path::Path>,
) -> Option<Result<PathBuf, GalleryError>> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save image")
        .set_file_name(name);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }
    let path = dialog.save_file()?;
    let result = std::fs::write(&path, contents)
        .map(|()| path.clone())
        .map_err(|source| GalleryError::Save { path, source });
    Some(result)
}

impl eframe::App for ShowcaseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window size for saving on exit
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        // Background results and timers land before this frame's UI
        let now = Instant::now();
        let mut actions = Vec::new();
        self.poll_ingest(&mut actions);
        actions.extend(
            self.textures
                .poll()
                .into_iter()
                .map(|(id, dimensions)| Action::DimensionsLoaded { id, dimensions }),
        );
        self.poll_timers(ctx, now, &mut actions);
        self.take_dropped(ctx, &mut actions);
        self.dispatch(ctx, actions);

        let mut actions = Vec::new();
        self.sync_mode(now, &mut actions);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Product Showcase");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.gallery.is_empty() {
                        return;
                    }
                    let label = match self.gallery.mode() {
                        Mode::Upload => "Preview Carousel",
                        Mode::Carousel => "Back to Upload Mode",
                    };
                    if ui.button(label).clicked() {
                        actions.push(Action::ToggleMode);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let submitted = self.gallery.is_submitted();
                let label = if submitted {
                    "Submitted ✓"
                } else {
                    "Submit Images"
                };
                let button = egui::Button::new(egui::RichText::new(label).strong())
                    .min_size(egui::vec2(160.0, 32.0));
                if ui.add(button).clicked() {
                    actions.push(Action::Submit);
                }
                ui.label(
                    egui::RichText::new(format!(
                        "{} image(s) in collection",
                        self.gallery.records().len()
                    ))
                    .weak(),
                );
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.gallery.mode() {
            Mode::Upload => {
                self.browser
                    .show_upload(ui, self.gallery.is_uploading(), &mut actions);
                if !self.gallery.is_empty() {
                    ui.add_space(12.0);
                    self.browser
                        .show_gallery(ui, &self.gallery, &self.textures, &mut actions);
                }
            }
            Mode::Carousel => self.show_carousel(ui, &mut actions),
        });

        if let Some(record) = self.gallery.viewing() {
            actions.extend(viewer::show(ctx, record, &self.textures));
        }

        if self.gallery.view().summary_open {
            match summary::show(ctx, self.gallery.records(), &self.textures) {
                Some(SummaryAction::Close) => actions.push(Action::CloseSummary),
                Some(SummaryAction::CopyManifest) => match self.gallery.manifest().to_json() {
                    Ok(json) => {
                        ctx.copy_text(json);
                        self.toasts.notify(Notice::info("Summary copied to clipboard"));
                    }
                    Err(err) => tracing::warn!(%err, "could not serialize summary"),
                },
                None => {}
            }
        }

        self.toasts.show(ctx);
        self.dispatch(ctx, actions);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let released = self.gallery.teardown();
        tracing::debug!(released, remaining = self.textures.live(), "display handles released");
        self.config.last_upload_dir = self.browser.last_dir.clone();
        self.config.default_filter = Some(self.gallery.view().filter.as_str().to_string());
        self.config.default_sort = Some(self.gallery.view().sort.as_str().to_string());
        self.config.save();
    }
}
