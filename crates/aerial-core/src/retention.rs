//! Removal of old collections.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::StorageLayout;
use crate::store::CollectionStore;

/// Deletes processed collections and their folders.
pub struct Retention {
    store: Arc<dyn CollectionStore>,
    layout: StorageLayout,
}

impl Retention {
    pub fn new(store: Arc<dyn CollectionStore>, layout: StorageLayout) -> Self {
        Self { store, layout }
    }

    /// Delete every processed collection created before `before`.
    ///
    /// Unprocessed collections are left alone since a job may still be
    /// working on them. Returns the number of collections removed.
    pub async fn clean(&self, before: DateTime<Utc>) -> Result<usize> {
        let candidates = self.store.collections_created_before(before).await?;

        let mut removed = 0;
        let mut kept = 0;
        for collection in candidates {
            if !collection.processed {
                debug!("Keeping unprocessed collection {}", collection.id);
                kept += 1;
                continue;
            }

            let dir = self.layout.collection_dir(&collection.id);
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => debug!("Removed {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            self.store.delete_collection(&collection.id).await?;
            removed += 1;
        }

        info!(
            "Performed cleaning of {} collection(s) created before {} ({} unprocessed kept)",
            removed, before, kept
        );
        Ok(removed)
    }
}
