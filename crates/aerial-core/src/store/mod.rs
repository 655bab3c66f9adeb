//! Persistence of collections, artifacts and their results.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::ink::InkCoverage;
use crate::models::artifact::{
    Artifact, ArtifactCollection, ArtifactUpdate, CollectionUpdate, CollectionWithArtifacts,
    NewArtifact,
};
use crate::models::color::{CmykRecord, ColorRecord, KmeansColors};

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Identifier prefixes of the stored entities.
pub mod prefix {
    pub const COLLECTION: &str = "artc_";
    pub const ARTIFACT: &str = "art_";
    pub const KMEANS_COLORS: &str = "kc_";
    pub const CMYK: &str = "cmyk_";
}

/// Fresh identifier with the given prefix.
pub fn new_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

/// Storage of collections and everything hanging off them.
///
/// Result records are created once and never updated; they go away only
/// when their collection is deleted.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Create an empty, unprocessed collection.
    async fn create_collection(&self, label: &str) -> Result<ArtifactCollection>;

    /// Add an artifact to an existing collection.
    async fn create_artifact(&self, collection_id: &str, artifact: NewArtifact) -> Result<Artifact>;

    /// Load a collection with its artifacts in insertion order.
    async fn find_collection(&self, id: &str) -> Result<CollectionWithArtifacts>;

    /// Every collection, oldest first.
    async fn collections(&self) -> Result<Vec<ArtifactCollection>>;

    /// Store the per-page dominant colors of an artifact.
    async fn create_kmeans_colors(
        &self,
        artifact_id: &str,
        pages: Vec<Vec<ColorRecord>>,
    ) -> Result<KmeansColors>;

    /// Store the ink coverage of an artifact.
    async fn create_cmyk(&self, artifact_id: &str, info: InkCoverage) -> Result<CmykRecord>;

    async fn kmeans_colors(&self, id: &str) -> Result<Option<KmeansColors>>;

    async fn cmyk(&self, id: &str) -> Result<Option<CmykRecord>>;

    /// Apply the set fields of `update` to an artifact. An artifact that
    /// ends up with both result ids loses its failure reason.
    async fn update_artifact(&self, id: &str, update: ArtifactUpdate) -> Result<Artifact>;

    /// Remember why an artifact could not be processed.
    async fn record_artifact_failure(&self, id: &str, reason: &str) -> Result<Artifact>;

    async fn update_collection(
        &self,
        id: &str,
        update: CollectionUpdate,
    ) -> Result<ArtifactCollection>;

    /// Collections created strictly before `cutoff`.
    async fn collections_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ArtifactCollection>>;

    /// Delete a collection, its artifacts and their result records.
    async fn delete_collection(&self, id: &str) -> Result<()>;
}
