use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::Rng;
use serde::Serialize;

use crate::error::GalleryError;
use crate::handle::{DisplayHandle, HandleKey, HandleProvider};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Identity of an uploaded image, stable for the record's lifetime.
pub struct ImageId(String);

#[cfg(test)]
impl ImageId {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces `img-<millis>-<suffix>` ids.
///
/// The millisecond part never repeats within one generator: when the clock has
/// not moved since the last id it is bumped by one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: i64,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> ImageId {
        self.next_id_at(Local::now())
    }

    pub fn next_id_at(&mut self, now: DateTime<Local>) -> ImageId {
        let millis = now.timestamp_millis().max(self.last_millis + 1);
        self.last_millis = millis;

        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        ImageId(format!("img-{}-{}", millis, suffix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
/// Pixel size of a decoded image. `{0, 0}` means the decode has not finished.
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const PENDING: Dimensions = Dimensions {
        width: 0,
        height: 0,
    };

    /// Both sides must be known; a half-set size is not representable.
    pub fn known(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn is_pending(&self) -> bool {
        *self == Self::PENDING
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pending() {
            f.write_str("loading…")
        } else {
            write!(f, "{} × {}", self.width, self.height)
        }
    }
}

#[derive(Debug, Clone)]
/// A file offered for ingestion, bytes already in memory.
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub contents: Arc<[u8]>,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        let contents = contents.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size: contents.len() as u64,
            contents,
        }
    }
}

/// One uploaded image in the collection.
#[derive(Debug)]
pub struct ImageRecord {
    pub id: ImageId,
    pub display_name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub added_at: DateTime<Local>,
    pub dimensions: Dimensions,
    pub contents: Arc<[u8]>,
    handle: DisplayHandle,
}

impl ImageRecord {
    /// Builds a record and acquires its display handle. The handle goes back to
    /// the provider when the record is dropped.
    pub fn acquire(
        id: ImageId,
        file: CandidateFile,
        provider: &Rc<dyn HandleProvider>,
        added_at: DateTime<Local>,
    ) -> Result<Self, GalleryError> {
        let handle =
            DisplayHandle::acquire(provider, &id, &file).map_err(|err| GalleryError::Handle {
                name: file.name.clone(),
                reason: format!("{err:#}"),
            })?;
        Ok(Self {
            id,
            display_name: file.name,
            mime_type: file.mime_type,
            byte_size: file.byte_size,
            added_at,
            dimensions: Dimensions::PENDING,
            contents: file.contents,
            handle,
        })
    }

    pub fn handle_key(&self) -> &HandleKey {
        self.handle.key()
    }

    pub fn size_label(&self) -> String {
        format_megabytes(self.byte_size)
    }
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;
    use crate::handle::testing::CountingProvider;

    #[test]
    fn ids_are_unique_even_when_the_clock_stands_still() {
        let mut ids = IdGenerator::default();
        let frozen = Local.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let generated: HashSet<ImageId> = (0..500).map(|_| ids.next_id_at(frozen)).collect();

        assert_eq!(generated.len(), 500);
    }

    #[test]
    fn id_has_time_and_random_suffix() {
        let mut ids = IdGenerator::default();
        let at = Local.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = ids.next_id_at(at);

        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts[0], "img");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn dimensions_are_all_or_nothing() {
        assert_eq!(Dimensions::known(0, 480), None);
        assert_eq!(Dimensions::known(640, 0), None);
        assert_eq!(
            Dimensions::known(640, 480),
            Some(Dimensions {
                width: 640,
                height: 480
            })
        );
        assert!(Dimensions::default().is_pending());
    }

    #[test]
    fn megabytes_use_two_decimals() {
        assert_eq!(format_megabytes(1_572_864), "1.50 MB");
        assert_eq!(format_megabytes(0), "0.00 MB");
    }

    #[test]
    fn acquire_failure_maps_to_handle_error() {
        let (counter, provider) = CountingProvider::shared();
        counter.fail_on_call(0);
        let file = CandidateFile::from_bytes("bag.png", "image/png", vec![1]);

        let err = ImageRecord::acquire(ImageId::from_raw("img-1-x"), file, &provider, Local::now())
            .unwrap_err();

        assert!(matches!(err, GalleryError::Handle { ref name, .. } if name == "bag.png"));
    }

    #[test]
    fn new_record_starts_with_pending_dimensions() {
        let (_counter, provider) = CountingProvider::shared();
        let file = CandidateFile::from_bytes("bag.png", "image/png", vec![1, 2]);

        let record =
            ImageRecord::acquire(ImageId::from_raw("img-1-x"), file, &provider, Local::now())
                .unwrap();

        assert!(record.dimensions.is_pending());
        assert_eq!(record.byte_size, 2);
        assert_eq!(record.handle_key().as_str(), "bytes://img-1-x/bag.png");
    }
}
