use std::path::PathBuf;

/// Failures surfaced by the gallery. None of these are fatal; each one ends up
/// as a transient notice.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image payload for {0} is empty")]
    EmptyPayload(String),

    #[error("could not acquire a display handle for {name}: {reason}")]
    Handle { name: String, reason: String },

    #[error("ingest worker exited before reporting")]
    WorkerLost,

    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
