//! Core library for aerial dominant color extraction.
//!
//! This crate provides:
//! - Hex / RGB / CMYK color conversion
//! - Dominant colors through the external `kmeans_colors` tool
//! - Page rasterization of images, PDFs and word processor documents
//! - CMYK ink coverage aggregation per page
//! - The collection extraction job with its persistence and notification seams
//! - Intake of submitted files and retention of old collections

pub mod color;
pub mod error;
pub mod ink;
pub mod intake;
pub mod job;
pub mod kmeans;
pub mod models;
pub mod notify;
pub mod raster;
pub mod retention;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use color::{Cmyk, Rgb, hex_to_cmyk, hex_to_rgb, rgb_to_cmyk};
pub use error::{AerialError, ColorError, KmeansError, NotifyError, RasterError, Result, StoreError};
pub use ink::{InkCoverage, PageCoverage, summarize_page, summarize_pages};
pub use intake::{Intake, StagedCollection};
pub use job::{ArtifactOutcome, ArtifactStage, BatchReport, ColorExtractionJob};
pub use kmeans::KmeansColorsTool;
pub use models::{
    AerialConfig, Artifact, ArtifactCollection, ArtifactKind, CmykRecord, ColorRecord,
    KmeansColors, Mimetype,
};
pub use notify::{CompletionEvent, MemoryQueue, Notifier, PushChannels, QueuePublisher};
#[cfg(feature = "amqp")]
pub use notify::AmqpPublisher;
pub use raster::{DocumentConverter, LibreOfficeConverter, PageRasterizer, PdfRenderer};
pub use retention::Retention;
pub use storage::StorageLayout;
pub use store::{CollectionStore, MemoryStore};

/// Re-export execution types.
pub use aerial_exec::{CommandRunner, ExecError, SystemRunner};
