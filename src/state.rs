use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::config::Timings;
use crate::error::GalleryError;
use crate::filter::{self, FilterType, SortKey};
use crate::handle::HandleProvider;
use crate::ingest::{self, IngestJob, IngestReport, Origin, PendingFile};
use crate::notice::Notice;
use crate::record::{Dimensions, IdGenerator, ImageId, ImageRecord};
use crate::summary::Manifest;

const NO_VALID_IMAGES: &str = "No valid image files found. Please upload JPG, PNG, or GIF files.";
const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Upload,
    Carousel,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Ephemeral UI state. Nothing here outlives the session.
pub struct ViewState {
    pub mode: Mode,
    pub filter: FilterType,
    pub sort: SortKey,
    /// Slide highlighted in the thumbnail strip.
    pub current_slide: usize,
    pub summary_open: bool,
    /// Record shown fullscreen. Held by id so removal can't leave it dangling.
    pub viewing: Option<ImageId>,
}

#[derive(Debug)]
pub enum Action {
    Ingest {
        origin: Origin,
        files: Vec<PendingFile>,
    },
    IngestFinished(IngestReport),
    DimensionsLoaded {
        id: ImageId,
        dimensions: Dimensions,
    },
    AutoPreviewDue {
        generation: u64,
    },
    /// Index into the filtered, sorted view.
    Remove(usize),
    RemoveById(ImageId),
    ClearAll,
    ToggleMode,
    SetFilter(FilterType),
    SetSort(SortKey),
    SlideChanging {
        current: usize,
        next: usize,
    },
    SlideChanged {
        current: usize,
    },
    JumpToSlide(usize),
    Swipe {
        dx: f32,
        dy: f32,
    },
    OpenViewer(ImageId),
    CloseViewer,
    Download(ImageId),
    DownloadFinished(Result<PathBuf, GalleryError>),
    Share(ImageId),
    Submit,
    CloseSummary,
}

#[derive(Debug)]
/// Work the shell must carry out after a transition.
pub enum Effect {
    Notify(Notice),
    StartIngest(IngestJob),
    ScheduleAutoPreview { generation: u64, delay: Duration },
    CarouselGoTo(usize),
    CarouselNext,
    CarouselPrevious,
    CopyToClipboard(String),
    SaveCopy { name: String, contents: Arc<[u8]> },
}

/// The image collection and everything derived from it.
///
/// All mutation goes through [`Gallery::update`], which applies one action and
/// returns the effects the shell has to run, in order.
pub struct Gallery {
    records: Vec<ImageRecord>,
    view: ViewState,
    uploading: bool,
    submitted: bool,
    /// Bumped on every mode write. A scheduled automatic switch only lands if
    /// nothing else wrote the mode in between.
    mode_generation: u64,
    ids: IdGenerator,
    provider: Rc<dyn HandleProvider>,
    timings: Timings,
}

impl Gallery {
    pub fn new(provider: Rc<dyn HandleProvider>, timings: Timings) -> Self {
        Self {
            records: Vec::new(),
            view: ViewState::default(),
            uploading: false,
            submitted: false,
            mode_generation: 0,
            ids: IdGenerator::default(),
            provider,
            timings,
        }
    }

    pub fn with_view(mut self, filter: FilterType, sort: SortKey) -> Self {
        self.view.filter = filter;
        self.view.sort = sort;
        self
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn record(&self, id: &ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// What the grid shows right now.
    pub fn visible(&self) -> Vec<&ImageRecord> {
        filter::derive(&self.records, self.view.filter, self.view.sort)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> Mode {
        self.view.mode
    }

    pub fn current_slide(&self) -> usize {
        self.view.current_slide
    }

    pub fn viewing(&self) -> Option<&ImageRecord> {
        self.view.viewing.as_ref().and_then(|id| self.record(id))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn manifest(&self) -> Manifest<'_> {
        Manifest::new(&self.records, Local::now())
    }

    /// Files are only taken from the upload surface, and one batch at a time.
    /// That surface is also where progress is shown.
    pub fn accepts_files(&self) -> bool {
        !self.uploading && self.view.mode == Mode::Upload
    }

    /// Release every handle. Returns how many were released.
    pub fn teardown(&mut self) -> usize {
        let released = self.records.drain(..).count();
        self.view.viewing = None;
        self.view.current_slide = 0;
        self.view.summary_open = false;
        self.set_mode(Mode::Upload);
        tracing::info!(released, "gallery torn down");
        released
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Ingest { origin, files } => self.begin_ingest(origin, files),
            Action::IngestFinished(report) => self.finish_ingest(report),
            Action::DimensionsLoaded { id, dimensions } => {
                match self.records.iter_mut().find(|r| r.id == id) {
                    Some(record) => record.dimensions = dimensions,
                    None => tracing::debug!(%id, "ignoring dimensions for removed image"),
                }
                Vec::new()
            }
            Action::AutoPreviewDue { generation } => {
                if generation == self.mode_generation && !self.records.is_empty() {
                    self.set_mode(Mode::Carousel);
                } else {
                    tracing::debug!(generation, current = self.mode_generation, "auto preview superseded");
                }
                Vec::new()
            }
            Action::Remove(display_index) => {
                let id = self.visible().get(display_index).map(|r| r.id.clone());
                match id {
                    Some(id) => self.remove(&id),
                    None => {
                        tracing::debug!(display_index, "remove index out of range");
                        Vec::new()
                    }
                }
            }
            Action::RemoveById(id) => self.remove(&id),
            Action::ClearAll => self.clear(),
            Action::ToggleMode => {
                if !self.records.is_empty() {
                    let next = match self.view.mode {
                        Mode::Upload => Mode::Carousel,
                        Mode::Carousel => Mode::Upload,
                    };
                    self.set_mode(next);
                }
                Vec::new()
            }
            Action::SetFilter(filter) => {
                self.view.filter = filter;
                Vec::new()
            }
            Action::SetSort(sort) => {
                self.view.sort = sort;
                Vec::new()
            }
            Action::SlideChanging { current, next } => {
                tracing::trace!(current, next, "slide changing");
                self.highlight(next);
                Vec::new()
            }
            Action::SlideChanged { current } => {
                self.highlight(current);
                Vec::new()
            }
            Action::JumpToSlide(index) => {
                if index < self.records.len() {
                    self.view.current_slide = index;
                    vec![Effect::CarouselGoTo(index)]
                } else {
                    Vec::new()
                }
            }
            Action::Swipe { dx, dy } => {
                if dx.abs() <= dy.abs() {
                    Vec::new()
                } else if dx > SWIPE_THRESHOLD {
                    vec![Effect::CarouselPrevious]
                } else if dx < -SWIPE_THRESHOLD {
                    vec![Effect::CarouselNext]
                } else {
                    Vec::new()
                }
            }
            Action::OpenViewer(id) => {
                if self.record(&id).is_some() {
                    self.view.viewing = Some(id);
                }
                Vec::new()
            }
            Action::CloseViewer => {
                self.view.viewing = None;
                Vec::new()
            }
            Action::Download(id) => match self.record(&id) {
                Some(record) => vec![Effect::SaveCopy {
                    name: record.display_name.clone(),
                    contents: record.contents.clone(),
                }],
                None => Vec::new(),
            },
            Action::DownloadFinished(result) => match result {
                Ok(path) => {
                    let name = path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .into_owned();
                    vec![Effect::Notify(Notice::success(format!("Saved {name}")).lasting(2000))]
                }
                Err(err) => {
                    tracing::warn!(%err, "download failed");
                    vec![Effect::Notify(Notice::error(format!("Could not save image: {err}")))]
                }
            },
            Action::Share(id) => match self.record(&id) {
                Some(record) => vec![
                    Effect::CopyToClipboard(record.handle_key().to_string()),
                    Effect::Notify(Notice::success("Image URL copied to clipboard!").lasting(2000)),
                ],
                None => Vec::new(),
            },
            Action::Submit => self.submit(),
            Action::CloseSummary => {
                self.view.summary_open = false;
                Vec::new()
            }
        }
    }

    fn begin_ingest(&mut self, origin: Origin, files: Vec<PendingFile>) -> Vec<Effect> {
        if !self.accepts_files() {
            tracing::debug!(uploading = self.uploading, mode = ?self.view.mode, "ignoring new files");
            return Vec::new();
        }
        let files = match origin {
            Origin::Drop => ingest::accept_images(files),
            Origin::Picker => files,
        };
        if files.is_empty() {
            return match origin {
                Origin::Drop => vec![Effect::Notify(Notice::warning(NO_VALID_IMAGES))],
                Origin::Picker => Vec::new(),
            };
        }
        self.uploading = true;
        vec![Effect::StartIngest(IngestJob {
            origin,
            files,
            delay: self.timings.ingest_delay,
        })]
    }

    fn finish_ingest(&mut self, report: IngestReport) -> Vec<Effect> {
        self.uploading = false;
        let IngestReport { origin, result } = report;
        let failure = move || vec![Effect::Notify(Notice::error(origin.failure_message()))];

        let files = match result {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(%err, "ingest failed");
                return failure();
            }
        };

        let added_at = Local::now();
        let batch: Result<Vec<ImageRecord>, GalleryError> = files
            .into_iter()
            .map(|file| ImageRecord::acquire(self.ids.next_id(), file, &self.provider, added_at))
            .collect();
        // On error the records built so far are dropped here, releasing their handles.
        let batch = match batch {
            Ok(batch) if !batch.is_empty() => batch,
            Ok(_) => return Vec::new(),
            Err(err) => {
                tracing::warn!(%err, "could not build image records");
                return failure();
            }
        };

        let was_empty = self.records.is_empty();
        let count = batch.len();
        self.records.extend(batch);
        tracing::info!(count, total = self.records.len(), "images added");

        let noun = if count == 1 { "image" } else { "images" };
        let mut effects = vec![Effect::Notify(Notice::success(format!(
            "Successfully added {count} {noun}!"
        )))];
        if was_empty {
            effects.push(Effect::ScheduleAutoPreview {
                generation: self.mode_generation,
                delay: self.timings.auto_preview_delay,
            });
        }
        effects
    }

    fn remove(&mut self, id: &ImageId) -> Vec<Effect> {
        let Some(pos) = self.records.iter().position(|r| &r.id == id) else {
            tracing::debug!(%id, "remove of unknown image");
            return Vec::new();
        };
        let removed = self.records.remove(pos);
        tracing::info!(id = %removed.id, name = %removed.display_name, "image removed");
        drop(removed);

        if self.view.viewing.as_ref() == Some(id) {
            self.view.viewing = None;
        }
        if self.records.is_empty() {
            self.view.current_slide = 0;
            self.set_mode(Mode::Upload);
        } else {
            self.view.current_slide = self.view.current_slide.min(self.records.len() - 1);
        }
        vec![Effect::Notify(Notice::info("Image removed"))]
    }

    fn clear(&mut self) -> Vec<Effect> {
        if self.records.is_empty() {
            return Vec::new();
        }
        let released = self.records.drain(..).count();
        tracing::info!(released, "all images removed");
        self.view.viewing = None;
        self.view.current_slide = 0;
        self.set_mode(Mode::Upload);
        vec![Effect::Notify(Notice::info("All images removed"))]
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.records.is_empty() {
            return vec![Effect::Notify(
                Notice::error("Please upload at least one image before submitting").prominent(),
            )];
        }
        self.submitted = true;
        self.view.summary_open = true;
        tracing::info!(count = self.records.len(), "images submitted");
        vec![Effect::Notify(
            Notice::success("Images submitted successfully!").prominent(),
        )]
    }

    fn highlight(&mut self, index: usize) {
        if let Some(last) = self.records.len().checked_sub(1) {
            self.view.current_slide = index.min(last);
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode_generation += 1;
        if self.view.mode != mode {
            tracing::debug!(?mode, generation = self.mode_generation, "mode changed");
            self.view.mode = mode;
        }
    }
}
