//! Error types for the aerial-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the aerial library.
#[derive(Error, Debug)]
pub enum AerialError {
    /// Color conversion error.
    #[error("color error: {0}")]
    Color(#[from] ColorError),

    /// Dominant color extraction error.
    #[error("kmeans error: {0}")]
    Kmeans(#[from] KmeansError),

    /// Page rasterization error.
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Notification error.
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// External tool error.
    #[error("exec error: {0}")]
    Exec(#[from] aerial_exec::ExecError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to color conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The input is not a six digit hex color or a valid channel list.
    #[error("invalid color format: {0:?}")]
    InvalidColorFormat(String),
}

/// Errors related to invoking the clustering tool.
#[derive(Error, Debug)]
pub enum KmeansError {
    /// The image is not readable yet.
    #[error("cannot access {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No image paths were given.
    #[error("no input images")]
    NoInput,

    /// Standard output did not have the expected two-line shape.
    #[error("malformed kmeans_colors output: {0}")]
    MalformedOutput(String),

    /// A color token could not be converted.
    #[error(transparent)]
    Color(#[from] ColorError),

    /// The tool itself failed.
    #[error(transparent)]
    Exec(#[from] aerial_exec::ExecError),
}

/// Errors related to page rasterization.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Failed to open/parse the PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The renderer ran but did not produce the expected page image.
    #[error("no image generated for page {page}")]
    MissingPage { page: u32 },

    /// Document to PDF conversion failed.
    #[error("document conversion failed: {0}")]
    Conversion(String),

    /// The artifact's mimetype cannot be rasterized.
    #[error("unsupported mimetype: {0}")]
    UnsupportedMimetype(String),

    /// The renderer or converter failed.
    #[error(transparent)]
    Exec(#[from] aerial_exec::ExecError),

    /// PDF inspection panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Failed to read or write the snapshot file.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Errors related to completion notifications.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Publishing to the broker failed.
    #[error("failed to publish to {queue}: {reason}")]
    Publish { queue: String, reason: String },

    /// Connecting to the broker failed.
    #[error("failed to connect to broker: {0}")]
    Connect(String),
}

/// Result type for the aerial library.
pub type Result<T> = std::result::Result<T, AerialError>;
