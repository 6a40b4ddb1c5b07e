use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::error::GalleryError;
use crate::record::CandidateFile;

/// Extensions offered by the picker dialog. The picker is the only gate for
/// that source.
pub static PICKER_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Picker,
    Drop,
}

impl Origin {
    pub fn failure_message(self) -> &'static str {
        match self {
            Origin::Picker => "Failed to process images. Please try again.",
            Origin::Drop => "Failed to process dropped images. Please try again.",
        }
    }
}

#[derive(Clone, Debug)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

#[derive(Clone, Debug)]
/// A file the user offered, before its bytes have been read.
pub struct PendingFile {
    pub name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl PendingFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let mime_type = guess_mime(&path).unwrap_or(UNKNOWN_MIME).to_string();
        Self {
            name,
            mime_type,
            source: FileSource::Path(path),
        }
    }

    /// Native drops usually carry a path, web drops carry bytes and a mime
    /// type. Entries with neither are skipped.
    pub fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        let source = match (&file.bytes, &file.path) {
            (Some(bytes), _) => FileSource::Bytes(bytes.clone()),
            (None, Some(path)) => FileSource::Path(path.clone()),
            (None, None) => return None,
        };
        let name = if file.name.is_empty() {
            file.path
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            file.name.clone()
        };
        let mime_type = if file.mime.is_empty() {
            guess_mime(Path::new(&name)).unwrap_or(UNKNOWN_MIME).to_string()
        } else {
            file.mime.clone()
        };
        Some(Self {
            name,
            mime_type,
            source,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    fn load(self) -> Result<CandidateFile, GalleryError> {
        let contents: Arc<[u8]> = match self.source {
            FileSource::Bytes(bytes) => bytes,
            FileSource::Path(path) => std::fs::read(&path)
                .map_err(|source| GalleryError::Read {
                    name: self.name.clone(),
                    source,
                })?
                .into(),
        };
        if contents.is_empty() {
            return Err(GalleryError::EmptyPayload(self.name));
        }
        Ok(CandidateFile::from_bytes(self.name, self.mime_type, contents))
    }
}

const UNKNOWN_MIME: &str = "application/octet-stream";

/// Mime type from the file extension, `None` for anything `image` can't name.
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Keep only entries whose type says they are images.
pub fn accept_images(files: Vec<PendingFile>) -> Vec<PendingFile> {
    files.into_iter().filter(PendingFile::is_image).collect()
}

#[derive(Debug)]
pub struct IngestJob {
    pub origin: Origin,
    pub files: Vec<PendingFile>,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct IngestReport {
    pub origin: Origin,
    pub result: Result<Vec<CandidateFile>, GalleryError>,
}

/// Read every file in input order. The first failure fails the whole batch.
pub fn load_all(files: Vec<PendingFile>) -> Result<Vec<CandidateFile>, GalleryError> {
    files.into_iter().map(PendingFile::load).collect()
}

/// Runs a batch on a worker thread: simulated processing latency, then the
/// reads. Exactly one report is sent back.
pub fn spawn(job: IngestJob, tx: mpsc::Sender<IngestReport>, ctx: egui::Context) {
    std::thread::spawn(move || {
        let IngestJob {
            origin,
            files,
            delay,
        } = job;
        tracing::debug!(count = files.len(), ?origin, "ingest batch started");
        std::thread::sleep(delay);
        let result = load_all(files);
        if let Err(err) = &result {
            tracing::warn!(%err, "ingest batch failed");
        }
        let _ = tx.send(IngestReport { origin, result });
        ctx.request_repaint();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(name: &str, mime: &str, bytes: &[u8]) -> PendingFile {
        PendingFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            source: FileSource::Bytes(bytes.to_vec().into()),
        }
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(guess_mime(Path::new("b.jpg")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("c.gif")), Some("image/gif"));
        assert_eq!(guess_mime(Path::new("notes.txt")), None);
    }

    #[test]
    fn from_path_falls_back_to_octet_stream() {
        let file = PendingFile::from_path(PathBuf::from("/tmp/readme.txt"));
        assert_eq!(file.name, "readme.txt");
        assert_eq!(file.mime_type, UNKNOWN_MIME);
        assert!(!file.is_image());
    }

    #[test]
    fn accept_images_drops_non_images_in_order() {
        let files = vec![
            pending("a.png", "image/png", b"a"),
            pending("notes.txt", "text/plain", b"n"),
            pending("b.gif", "image/gif", b"b"),
        ];

        let names: Vec<String> = accept_images(files).into_iter().map(|f| f.name).collect();

        assert_eq!(names, ["a.png", "b.gif"]);
    }

    #[test]
    fn load_all_keeps_order_and_sizes() {
        let loaded = load_all(vec![
            pending("a.png", "image/png", b"abc"),
            pending("b.png", "image/png", b"de"),
        ])
        .unwrap();

        assert_eq!(loaded[0].name, "a.png");
        assert_eq!(loaded[0].byte_size, 3);
        assert_eq!(loaded[1].name, "b.png");
        assert_eq!(loaded[1].byte_size, 2);
    }

    #[test]
    fn load_all_fails_whole_batch_on_missing_file() {
        let missing = PendingFile::from_path(PathBuf::from(
            "/definitely/not/here/product-showcase-missing.png",
        ));

        let err = load_all(vec![pending("ok.png", "image/png", b"x"), missing]).unwrap_err();

        assert!(matches!(err, GalleryError::Read { ref name, .. } if name == "product-showcase-missing.png"));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = load_all(vec![pending("blank.png", "image/png", b"")]).unwrap_err();
        assert!(matches!(err, GalleryError::EmptyPayload(name) if name == "blank.png"));
    }

    #[test]
    fn reads_bytes_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "product-showcase-ingest-{}.png",
            std::process::id()
        ));
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let loaded = load_all(vec![PendingFile::from_path(path.clone())]).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded[0].mime_type, "image/png");
        assert_eq!(&*loaded[0].contents, &[1, 2, 3, 4]);
    }

    #[test]
    fn dropped_file_without_mime_is_guessed_from_name() {
        let dropped = egui::DroppedFile {
            name: "shoe.webp".to_string(),
            bytes: Some(vec![9u8; 4].into()),
            ..Default::default()
        };

        let file = PendingFile::from_dropped(&dropped).unwrap();

        assert_eq!(file.mime_type, "image/webp");
        assert!(file.is_image());
    }

    #[test]
    fn dropped_file_without_content_is_skipped() {
        let dropped = egui::DroppedFile {
            name: "ghost.png".to_string(),
            ..Default::default()
        };
        assert!(PendingFile::from_dropped(&dropped).is_none());
    }
}
