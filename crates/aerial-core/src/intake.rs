//! Staging of submitted files into a new collection.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::artifact::{
    Artifact, ArtifactCollection, ArtifactKind, Mimetype, NewArtifact,
};
use crate::storage::StorageLayout;
use crate::store::{CollectionStore, new_id, prefix};

/// A collection ready to be handed to the extraction job.
#[derive(Debug, Clone)]
pub struct StagedCollection {
    pub collection: ArtifactCollection,
    pub artifacts: Vec<Artifact>,
    /// Files that were not staged, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Creates collections from files on disk.
pub struct Intake {
    store: Arc<dyn CollectionStore>,
    layout: StorageLayout,
    image_height: u32,
}

impl Intake {
    pub fn new(store: Arc<dyn CollectionStore>, layout: StorageLayout) -> Self {
        Self {
            store,
            layout,
            image_height: 240,
        }
    }

    /// Height images are resized to.
    pub fn with_image_height(mut self, height: u32) -> Self {
        self.image_height = height.max(1);
        self
    }

    /// Create a collection labeled `label` holding `files`.
    ///
    /// Images are normalized to a white-backed PNG page; documents are
    /// copied as-is. Files of unknown type or that fail to decode are
    /// skipped.
    pub async fn stage(&self, label: &str, files: &[PathBuf]) -> Result<StagedCollection> {
        let collection = self.store.create_collection(label).await?;
        tokio::fs::create_dir_all(self.layout.collection_dir(&collection.id)).await?;

        let mut artifacts = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for file in files {
            let Some(mimetype) = file
                .extension()
                .and_then(|e| Mimetype::from_extension(&e.to_string_lossy()))
            else {
                warn!("Skipping {}: unsupported file type", file.display());
                skipped.push((file.clone(), "unsupported file type".to_string()));
                continue;
            };

            match self.stage_file(&collection.id, file, mimetype).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    skipped.push((file.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Staged collection {} with {} artifacts ({} skipped)",
            collection.id,
            artifacts.len(),
            skipped.len()
        );

        Ok(StagedCollection {
            collection,
            artifacts,
            skipped,
        })
    }

    /// Write the artifact's file, then record it. Nothing is recorded for a
    /// file that could not be written.
    async fn stage_file(
        &self,
        collection_id: &str,
        file: &Path,
        mimetype: Mimetype,
    ) -> Result<Artifact> {
        let data = tokio::fs::read(file).await?;
        let id = new_id(prefix::ARTIFACT);

        let (target, new) = match mimetype.kind() {
            ArtifactKind::Image => {
                let height = self.image_height;
                let png =
                    tokio::task::spawn_blocking(move || normalize_image(&data, height)).await??;
                let target = self.layout.page_path(collection_id, &id, 1);
                tokio::fs::write(&target, png).await?;
                (
                    target,
                    NewArtifact {
                        id: Some(id),
                        label: png_label(file),
                        mimetype: Mimetype::ImagePng,
                        kind: ArtifactKind::Image,
                    },
                )
            }
            ArtifactKind::Document => {
                let target = self
                    .layout
                    .source_path(collection_id, &id, mimetype.extension());
                tokio::fs::write(&target, data).await?;
                (
                    target,
                    NewArtifact {
                        id: Some(id),
                        label: file_label(file),
                        mimetype,
                        kind: ArtifactKind::Document,
                    },
                )
            }
        };

        match self.store.create_artifact(collection_id, new).await {
            Ok(artifact) => {
                debug!("Staged {} as {}", file.display(), target.display());
                Ok(artifact)
            }
            Err(e) => {
                if let Err(remove) = tokio::fs::remove_file(&target).await {
                    debug!("Could not remove {}: {}", target.display(), remove);
                }
                Err(e.into())
            }
        }
    }
}

/// Decode an image, resize it to `height` keeping its aspect ratio, drop
/// any transparency onto white and encode it as PNG.
pub fn normalize_image(data: &[u8], height: u32) -> std::result::Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let resized = img.resize(u32::MAX, height, FilterType::Lanczos3);
    let flattened = flatten_onto_white(&resized);

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(flattened).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| {
            let (c, a) = (u32::from(c), u32::from(a));
            ((c * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn file_label(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn png_label(file: &Path) -> String {
    file.file_stem()
        .map(|s| format!("{}.png", s.to_string_lossy()))
        .unwrap_or_else(|| "image.png".to_string())
}
