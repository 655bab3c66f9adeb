//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration for the aerial pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AerialConfig {
    /// Storage layout configuration.
    pub storage: StorageConfig,

    /// External tool configuration.
    pub tools: ToolsConfig,

    /// Page rasterization configuration.
    pub raster: RasterConfig,

    /// Upload staging configuration.
    pub intake: IntakeConfig,

    /// Completion notification configuration.
    pub notify: NotifyConfig,

    /// Collection retention configuration.
    pub retention: RetentionConfig,
}

/// Where artifacts live on disk and how they are exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root; collections go under `{root}/aerial/{collection}`.
    pub root: PathBuf,

    /// URL prefix the storage root is served under.
    pub public_prefix: String,

    /// JSON file persisting collections between runs (in-memory if unset).
    pub snapshot: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
            public_prefix: "/storage".to_string(),
            snapshot: Some(PathBuf::from("storage/aerial.json")),
        }
    }
}

/// Paths of the external tools and their deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Dominant color clustering binary.
    pub kmeans_colors: PathBuf,

    /// PDF page renderer.
    pub pdftoppm: PathBuf,

    /// Office suite used to convert word documents to PDF.
    pub libreoffice: PathBuf,

    /// Seconds any single tool invocation may run (0 = no deadline).
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            kmeans_colors: PathBuf::from("kmeans_colors"),
            pdftoppm: PathBuf::from("pdftoppm"),
            libreoffice: default_libreoffice_path(),
            timeout_secs: 300,
        }
    }
}

impl ToolsConfig {
    /// Deadline for a single invocation.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_libreoffice_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/usr/local/bin/soffice")
    } else {
        PathBuf::from("/usr/bin/libreoffice")
    }
}

/// Page rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Scale applied to the page's native 72 DPI size.
    ///
    /// Lower values bound processing time and storage at the cost of
    /// cluster fidelity.
    pub scale: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { scale: 0.5 }
    }
}

impl RasterConfig {
    /// Render resolution for the configured scale.
    pub fn dpi(&self) -> u32 {
        ((72.0 * self.scale).round() as u32).max(1)
    }
}

/// Upload staging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Height images are resized to before clustering.
    pub image_height: u32,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self { image_height: 240 }
    }
}

/// Completion notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Queue receiving one message per finished collection.
    pub queue: String,

    /// AMQP broker URL (requires the `amqp` feature).
    pub amqp_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            queue: "aerial:job-queue".to_string(),
            amqp_url: None,
        }
    }
}

/// Collection retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Processed collections older than this are removed by `clean`.
    pub max_age_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { max_age_days: 7 }
    }
}

impl AerialConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
