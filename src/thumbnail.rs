use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use image::DynamicImage;

use crate::handle::{HandleKey, HandleProvider};
use crate::metadata::ImageMetadata;
use crate::record::{CandidateFile, Dimensions, ImageId};

/// Downscale decoded images to this longest-edge size for display.
pub const PREVIEW_MAX: u32 = 1920;

enum Slot {
    Decoding,
    Ready {
        texture: egui::TextureHandle,
        metadata: Option<ImageMetadata>,
    },
    Failed,
}

struct Entry {
    id: ImageId,
    slot: Slot,
}

pub struct DecodedImage {
    pub rgba: Vec<u8>,
    pub size: [usize; 2],
    /// Size of the original, not of the downscaled preview.
    pub dimensions: Dimensions,
    pub metadata: Option<ImageMetadata>,
}

struct DecodeResult {
    key: HandleKey,
    result: anyhow::Result<DecodedImage>,
}

/// egui-backed display handles.
///
/// Acquiring registers the bytes and starts a background decode; the texture
/// is uploaded on the UI thread by [`TextureStore::poll`]. Releasing drops the
/// entry together with its texture, and any decode still in flight for it is
/// discarded when it arrives.
pub struct TextureStore {
    ctx: egui::Context,
    entries: RefCell<HashMap<HandleKey, Entry>>,
    tx: mpsc::Sender<DecodeResult>,
    rx: mpsc::Receiver<DecodeResult>,
}

impl TextureStore {
    pub fn new(ctx: egui::Context) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            ctx,
            entries: RefCell::new(HashMap::new()),
            tx,
            rx,
        }
    }

    /// Upload finished decodes. Returns the sizes learned this frame.
    pub fn poll(&self) -> Vec<(ImageId, Dimensions)> {
        let results: Vec<DecodeResult> = self.rx.try_iter().collect();
        results
            .into_iter()
            .filter_map(|result| self.apply(result))
            .collect()
    }

    fn apply(&self, DecodeResult { key, result }: DecodeResult) -> Option<(ImageId, Dimensions)> {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(&key) else {
            tracing::debug!(%key, "dropping decode for released handle");
            return None;
        };
        match result {
            Ok(decoded) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(decoded.size, &decoded.rgba);
                let texture = self
                    .ctx
                    .load_texture(key.as_str(), image, egui::TextureOptions::LINEAR);
                entry.slot = Slot::Ready {
                    texture,
                    metadata: decoded.metadata,
                };
                Some((entry.id.clone(), decoded.dimensions))
            }
            Err(err) => {
                tracing::warn!(%key, "could not decode image: {err:#}");
                entry.slot = Slot::Failed;
                None
            }
        }
    }

    pub fn texture(&self, key: &HandleKey) -> Option<egui::TextureHandle> {
        match &self.entries.borrow().get(key)?.slot {
            Slot::Ready { texture, .. } => Some(texture.clone()),
            _ => None,
        }
    }

    pub fn metadata(&self, key: &HandleKey) -> Option<ImageMetadata> {
        match &self.entries.borrow().get(key)?.slot {
            Slot::Ready { metadata, .. } => metadata.clone(),
            _ => None,
        }
    }

    pub fn is_decoding(&self, key: &HandleKey) -> bool {
        matches!(
            self.entries.borrow().get(key).map(|e| &e.slot),
            Some(Slot::Decoding)
        )
    }

    pub fn is_failed(&self, key: &HandleKey) -> bool {
        matches!(
            self.entries.borrow().get(key).map(|e| &e.slot),
            Some(Slot::Failed)
        )
    }

    /// Size caption for a record. A failed decode never resolves to a size, so
    /// it reads "unavailable" instead of loading forever.
    pub fn dimensions_label(&self, key: &HandleKey, dimensions: Dimensions) -> String {
        if dimensions.is_pending() && self.is_failed(key) {
            "unavailable".to_string()
        } else {
            dimensions.to_string()
        }
    }

    pub fn live(&self) -> usize {
        self.entries.borrow().len()
    }

    fn spawn_decode(&self, key: HandleKey, bytes: Arc<[u8]>) {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        std::thread::spawn(move || {
            let result = decode(&bytes);
            let _ = tx.send(DecodeResult { key, result });
            ctx.request_repaint();
        });
    }
}

impl HandleProvider for TextureStore {
    fn acquire(&self, id: &ImageId, file: &CandidateFile) -> anyhow::Result<HandleKey> {
        if file.contents.is_empty() {
            anyhow::bail!("empty image payload");
        }
        let key = HandleKey::new(id, &file.name);
        {
            let mut entries = self.entries.borrow_mut();
            if entries.contains_key(&key) {
                anyhow::bail!("{key} is already registered");
            }
            entries.insert(
                key.clone(),
                Entry {
                    id: id.clone(),
                    slot: Slot::Decoding,
                },
            );
        }
        self.spawn_decode(key.clone(), file.contents.clone());
        Ok(key)
    }

    fn release(&self, key: &HandleKey) {
        if self.entries.borrow_mut().remove(key).is_none() {
            tracing::warn!(%key, "release of unknown display handle");
        }
    }
}

/// Decode for display: full-size dimensions, downscaled RGBA pixels and EXIF.
pub fn decode(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    let img = image::load_from_memory(bytes)?;
    let dimensions = Dimensions::known(img.width(), img.height())
        .ok_or_else(|| anyhow::anyhow!("image has no pixels"))?;
    let preview = downscale(img);
    let rgba = preview.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedImage {
        rgba: rgba.into_raw(),
        size,
        dimensions,
        metadata: crate::metadata::read(bytes).ok(),
    })
}

fn downscale(img: DynamicImage) -> DynamicImage {
    if img.width() > PREVIEW_MAX || img.height() > PREVIEW_MAX {
        img.thumbnail(PREVIEW_MAX, PREVIEW_MAX)
    } else {
        img
    }
}
