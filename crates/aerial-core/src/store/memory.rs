//! In-memory store with an optional JSON snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{CollectionStore, Result, new_id, prefix};
use crate::error::StoreError;
use crate::ink::InkCoverage;
use crate::models::artifact::{
    Artifact, ArtifactCollection, ArtifactUpdate, CollectionUpdate, CollectionWithArtifacts,
    NewArtifact,
};
use crate::models::color::{CmykRecord, ColorRecord, KmeansColors};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct State {
    collections: Vec<ArtifactCollection>,
    artifacts: Vec<Artifact>,
    kmeans_colors: BTreeMap<String, KmeansColors>,
    cmyk: BTreeMap<String, CmykRecord>,
}

impl State {
    fn collection_mut(&mut self, id: &str) -> Result<&mut ArtifactCollection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("collection", id))
    }

    fn artifact_mut(&mut self, id: &str) -> Result<&mut Artifact> {
        self.artifacts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("artifact", id))
    }

    fn ensure_artifact(&self, id: &str) -> Result<()> {
        if self.artifacts.iter().any(|a| a.id == id) {
            Ok(())
        } else {
            Err(StoreError::not_found("artifact", id))
        }
    }
}

/// Store keeping everything behind a tokio `RwLock`.
///
/// With a snapshot path, the whole state is written as JSON after every
/// change and read back by [`MemoryStore::open`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Empty store that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisted to `path`, loading it if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| StoreError::Snapshot(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => return Err(e.into()),
        };

        debug!("Opened store snapshot {}", path.display());
        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Apply `change` to a copy of the state and swap it in once the
    /// snapshot holds it. A failed change or write leaves the store as it was.
    async fn commit<T>(&self, change: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(out)
    }

    async fn persist(&self, state: &State) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let data =
            serde_json::to_vec_pretty(state).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn create_collection(&self, label: &str) -> Result<ArtifactCollection> {
        let now = Utc::now();
        let collection = ArtifactCollection {
            id: new_id(prefix::COLLECTION),
            label: label.to_string(),
            processed: false,
            created_at: now,
            updated_at: now,
        };

        self.commit(|state| {
            state.collections.push(collection.clone());
            Ok(collection)
        })
        .await
    }

    async fn create_artifact(&self, collection_id: &str, artifact: NewArtifact) -> Result<Artifact> {
        self.commit(|state| {
            state.collection_mut(collection_id)?;

            let now = Utc::now();
            let artifact = Artifact {
                id: artifact.id.unwrap_or_else(|| new_id(prefix::ARTIFACT)),
                collection_id: collection_id.to_string(),
                label: artifact.label,
                mimetype: artifact.mimetype,
                kind: artifact.kind,
                pages: None,
                url: None,
                kmeans_colors_id: None,
                cmyk_id: None,
                failure: None,
                created_at: now,
                updated_at: now,
            };
            state.artifacts.push(artifact.clone());
            Ok(artifact)
        })
        .await
    }

    async fn find_collection(&self, id: &str) -> Result<CollectionWithArtifacts> {
        let state = self.state.read().await;
        let collection = state
            .collections
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("collection", id))?;
        let artifacts = state
            .artifacts
            .iter()
            .filter(|a| a.collection_id == id)
            .cloned()
            .collect();

        Ok(CollectionWithArtifacts {
            collection,
            artifacts,
        })
    }

    async fn collections(&self) -> Result<Vec<ArtifactCollection>> {
        Ok(self.state.read().await.collections.clone())
    }

    async fn create_kmeans_colors(
        &self,
        artifact_id: &str,
        pages: Vec<Vec<ColorRecord>>,
    ) -> Result<KmeansColors> {
        self.commit(|state| {
            state.ensure_artifact(artifact_id)?;

            let record = KmeansColors {
                id: new_id(prefix::KMEANS_COLORS),
                artifact_id: artifact_id.to_string(),
                colors: pages,
                created_at: Utc::now(),
            };
            state.kmeans_colors.insert(record.id.clone(), record.clone());
            Ok(record)
        })
        .await
    }

    async fn create_cmyk(&self, artifact_id: &str, info: InkCoverage) -> Result<CmykRecord> {
        self.commit(|state| {
            state.ensure_artifact(artifact_id)?;

            let record = CmykRecord {
                id: new_id(prefix::CMYK),
                artifact_id: artifact_id.to_string(),
                info,
                created_at: Utc::now(),
            };
            state.cmyk.insert(record.id.clone(), record.clone());
            Ok(record)
        })
        .await
    }

    async fn kmeans_colors(&self, id: &str) -> Result<Option<KmeansColors>> {
        Ok(self.state.read().await.kmeans_colors.get(id).cloned())
    }

    async fn cmyk(&self, id: &str) -> Result<Option<CmykRecord>> {
        Ok(self.state.read().await.cmyk.get(id).cloned())
    }

    async fn update_artifact(&self, id: &str, update: ArtifactUpdate) -> Result<Artifact> {
        self.commit(|state| {
            let artifact = state.artifact_mut(id)?;

            if let Some(url) = update.url {
                artifact.url = Some(url);
            }
            if let Some(pages) = update.pages {
                artifact.pages = Some(pages);
            }
            if let Some(kc) = update.kmeans_colors_id {
                artifact.kmeans_colors_id = Some(kc);
            }
            if let Some(cmyk) = update.cmyk_id {
                artifact.cmyk_id = Some(cmyk);
            }
            if artifact.has_results() {
                artifact.failure = None;
            }
            artifact.updated_at = Utc::now();

            Ok(artifact.clone())
        })
        .await
    }

    async fn record_artifact_failure(&self, id: &str, reason: &str) -> Result<Artifact> {
        self.commit(|state| {
            let artifact = state.artifact_mut(id)?;
            artifact.failure = Some(reason.to_string());
            artifact.updated_at = Utc::now();
            Ok(artifact.clone())
        })
        .await
    }

    async fn update_collection(
        &self,
        id: &str,
        update: CollectionUpdate,
    ) -> Result<ArtifactCollection> {
        self.commit(|state| {
            let collection = state.collection_mut(id)?;

            if let Some(processed) = update.processed {
                collection.processed = processed;
            }
            collection.updated_at = Utc::now();

            Ok(collection.clone())
        })
        .await
    }

    async fn collections_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ArtifactCollection>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .iter()
            .filter(|c| c.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn delete_collection(&self, id: &str) -> Result<()> {
        self.commit(|state| {
            state.collection_mut(id)?;

            let artifact_ids: Vec<String> = state
                .artifacts
                .iter()
                .filter(|a| a.collection_id == id)
                .map(|a| a.id.clone())
                .collect();

            state
                .kmeans_colors
                .retain(|_, record| !artifact_ids.contains(&record.artifact_id));
            state
                .cmyk
                .retain(|_, record| !artifact_ids.contains(&record.artifact_id));
            state.artifacts.retain(|a| a.collection_id != id);
            state.collections.retain(|c| c.id != id);

            debug!("Deleted collection {} with {} artifacts", id, artifact_ids.len());
            Ok(())
        })
        .await
    }
}
