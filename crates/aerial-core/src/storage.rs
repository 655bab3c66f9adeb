//! On-disk layout of collections and their public URLs.

use std::path::{Path, PathBuf};

use crate::models::config::StorageConfig;

const AERIAL_DIR: &str = "aerial";

/// Resolves where a collection's files live and how they are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    public_prefix: String,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.root, &config.public_prefix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/aerial/{collection}`
    pub fn collection_dir(&self, collection_id: &str) -> PathBuf {
        self.root.join(AERIAL_DIR).join(collection_id)
    }

    /// `{root}/aerial/{collection}/{artifact}_{page}.png`, pages 1-indexed.
    pub fn page_path(&self, collection_id: &str, artifact_id: &str, page: u32) -> PathBuf {
        self.collection_dir(collection_id)
            .join(page_file_name(artifact_id, page))
    }

    /// `{root}/aerial/{collection}/{artifact}{ext}`, `ext` with its leading dot.
    pub fn source_path(&self, collection_id: &str, artifact_id: &str, ext: &str) -> PathBuf {
        self.collection_dir(collection_id)
            .join(format!("{artifact_id}{ext}"))
    }

    /// Public URL of a page image.
    pub fn page_url(&self, collection_id: &str, artifact_id: &str, page: u32) -> String {
        format!(
            "{}/{}/{}/{}",
            self.public_prefix,
            AERIAL_DIR,
            collection_id,
            page_file_name(artifact_id, page)
        )
    }

    /// Public URL of an artifact's source file.
    pub fn source_url(&self, collection_id: &str, artifact_id: &str, ext: &str) -> String {
        format!(
            "{}/{}/{}/{}{}",
            self.public_prefix, AERIAL_DIR, collection_id, artifact_id, ext
        )
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

/// File name of a rendered page inside a collection folder.
pub fn page_file_name(artifact_id: &str, page: u32) -> String {
    format!("{artifact_id}_{page}.png")
}
