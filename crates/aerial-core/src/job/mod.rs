//! Color extraction job.
//!
//! A run takes one collection and drives every artifact through
//! rasterize, cluster, aggregate and persist. Artifacts are independent:
//! they interleave on the job's task and one failing leaves the others
//! alone. Pages of a single document are handled strictly in order.

mod report;

pub use report::{ArtifactOutcome, ArtifactStage, BatchReport};

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AerialError, Result};
use crate::ink::summarize_pages;
use crate::kmeans::KmeansColorsTool;
use crate::models::artifact::{Artifact, ArtifactKind, ArtifactUpdate, CollectionUpdate, Mimetype};
use crate::models::color::ColorRecord;
use crate::notify::{CompletionEvent, Notifier};
use crate::raster::PageRasterizer;
use crate::storage::StorageLayout;
use crate::store::CollectionStore;

/// A stage failure, before it is turned into an outcome.
struct StageError {
    stage: ArtifactStage,
    error: AerialError,
}

trait AtStage<T> {
    fn at(self, stage: ArtifactStage) -> std::result::Result<T, StageError>;
}

impl<T, E: Into<AerialError>> AtStage<T> for std::result::Result<T, E> {
    fn at(self, stage: ArtifactStage) -> std::result::Result<T, StageError> {
        self.map_err(|e| StageError {
            stage,
            error: e.into(),
        })
    }
}

/// Orchestrates extraction for whole collections.
///
/// All collaborators are shared; one job can serve any number of runs.
pub struct ColorExtractionJob {
    store: Arc<dyn CollectionStore>,
    rasterizer: Arc<PageRasterizer>,
    kmeans: Arc<KmeansColorsTool>,
    notifier: Arc<Notifier>,
    layout: StorageLayout,
}

impl ColorExtractionJob {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        rasterizer: Arc<PageRasterizer>,
        kmeans: Arc<KmeansColorsTool>,
        notifier: Arc<Notifier>,
        layout: StorageLayout,
    ) -> Self {
        Self {
            store,
            rasterizer,
            kmeans,
            notifier,
            layout,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Run the job for `collection_id` in the background.
    pub fn enqueue(self: &Arc<Self>, collection_id: impl Into<String>) -> JoinHandle<Result<BatchReport>> {
        let job = Arc::clone(self);
        let collection_id = collection_id.into();
        tokio::spawn(async move { job.run(&collection_id).await })
    }

    /// Process every artifact of a collection, mark it processed and
    /// announce it.
    ///
    /// Only a missing collection or a failure to mark it processed fails
    /// the run; artifact failures are reported in the returned
    /// [`BatchReport`] and stored on the artifact.
    pub async fn run(&self, collection_id: &str) -> Result<BatchReport> {
        let start = Instant::now();
        let found = self.store.find_collection(collection_id).await?;
        info!(
            "Processing collection {} ({} artifacts)",
            collection_id,
            found.artifacts.len()
        );

        let outcomes = join_all(
            found
                .artifacts
                .iter()
                .map(|artifact| self.process_artifact(artifact)),
        )
        .await;

        let collection = self
            .store
            .update_collection(
                collection_id,
                CollectionUpdate {
                    processed: Some(true),
                },
            )
            .await?;

        let report = BatchReport {
            collection_id: collection.id.clone(),
            label: collection.label.clone(),
            outcomes,
            elapsed: start.elapsed(),
        };
        info!(
            "Collection {} processed in {:.2}s: {} succeeded, {} skipped, {} failed",
            collection_id,
            report.elapsed.as_secs_f64(),
            report.succeeded(),
            report.skipped(),
            report.failed()
        );

        let event = CompletionEvent::processed(
            &collection,
            report.succeeded(),
            report.skipped(),
            report.failed(),
        );
        self.notifier.collection_processed(&collection, event).await;

        Ok(report)
    }

    async fn process_artifact(&self, artifact: &Artifact) -> ArtifactOutcome {
        if artifact.has_results() {
            debug!("Artifact {} already processed, skipping", artifact.id);
            return ArtifactOutcome::Skipped {
                artifact_id: artifact.id.clone(),
            };
        }

        let start = Instant::now();
        match self.extract(artifact).await {
            Ok(outcome) => {
                if let ArtifactOutcome::Processed { pages, .. } = &outcome {
                    let elapsed = start.elapsed().as_secs_f64();
                    info!(
                        "Extracted colors of {} in {:.2}s ({:.2} pages/s)",
                        artifact.label,
                        elapsed,
                        f64::from(*pages) / elapsed.max(f64::EPSILON)
                    );
                }
                outcome
            }
            Err(StageError { stage, error }) => {
                let reason = error.to_string();
                warn!("Artifact {} failed at {}: {}", artifact.id, stage, reason);

                if let Err(e) = self
                    .store
                    .record_artifact_failure(&artifact.id, &format!("{stage}: {reason}"))
                    .await
                {
                    warn!("Could not record failure of {}: {}", artifact.id, e);
                }

                ArtifactOutcome::Failed {
                    artifact_id: artifact.id.clone(),
                    stage,
                    reason,
                }
            }
        }
    }

    async fn extract(&self, artifact: &Artifact) -> std::result::Result<ArtifactOutcome, StageError> {
        let folder = self.layout.collection_dir(&artifact.collection_id);

        let raster = self
            .rasterizer
            .rasterize(artifact, &folder)
            .await
            .at(ArtifactStage::Rasterize)?;

        let mut colors: Vec<Vec<ColorRecord>> = Vec::with_capacity(raster.pages.len());
        for (index, page) in raster.pages.iter().enumerate() {
            let page_colors = self
                .kmeans
                .dominant_colors(page)
                .await
                .at(ArtifactStage::Cluster)?;
            debug!(
                "Page {} of {}: {} colors",
                index + 1,
                artifact.id,
                page_colors.len()
            );
            colors.push(page_colors);
        }

        let coverage = summarize_pages(&colors);

        let kmeans_colors = self
            .store
            .create_kmeans_colors(&artifact.id, colors)
            .await
            .at(ArtifactStage::Persist)?;
        let cmyk = self
            .store
            .create_cmyk(&artifact.id, coverage)
            .await
            .at(ArtifactStage::Persist)?;

        let pages = raster.page_count();
        self.store
            .update_artifact(
                &artifact.id,
                ArtifactUpdate {
                    url: Some(self.public_url(artifact)),
                    pages: Some(pages),
                    kmeans_colors_id: Some(kmeans_colors.id.clone()),
                    cmyk_id: Some(cmyk.id.clone()),
                },
            )
            .await
            .at(ArtifactStage::Persist)?;

        Ok(ArtifactOutcome::Processed {
            artifact_id: artifact.id.clone(),
            pages,
            kmeans_colors_id: kmeans_colors.id,
            cmyk_id: cmyk.id,
        })
    }

    /// Images are served as their page, documents as their PDF.
    fn public_url(&self, artifact: &Artifact) -> String {
        match artifact.kind {
            ArtifactKind::Image => self.layout.page_url(&artifact.collection_id, &artifact.id, 1),
            ArtifactKind::Document => self.layout.source_url(
                &artifact.collection_id,
                &artifact.id,
                Mimetype::ApplicationPdf.extension(),
            ),
        }
    }
}
