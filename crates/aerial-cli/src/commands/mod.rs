//! CLI subcommands and the wiring they share.

pub mod clean;
pub mod cluster;
pub mod colors;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use aerial_core::models::config::AerialConfig;
use aerial_core::{CommandRunner, MemoryStore, Notifier, SystemRunner};

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aerial")
        .join("config.json")
}

/// Config file in effect: the `--config` argument, else the default path.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load the configuration, falling back to defaults when the default file
/// has not been created. An explicit `--config` must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AerialConfig> {
    if let Some(path) = config_path {
        return AerialConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        AerialConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Ok(AerialConfig::default())
    }
}

/// Runner for the external tools, bounded by the configured deadline.
pub fn tool_runner(config: &AerialConfig) -> Arc<dyn CommandRunner> {
    let runner = match config.tools.timeout() {
        Some(timeout) => SystemRunner::new().with_timeout(timeout),
        None => SystemRunner::new(),
    };
    Arc::new(runner)
}

/// Open the collection store, from the snapshot file when one is configured.
pub async fn open_store(config: &AerialConfig) -> anyhow::Result<Arc<MemoryStore>> {
    let store = match &config.storage.snapshot {
        Some(path) => MemoryStore::open(path)
            .await
            .with_context(|| format!("Failed to open store at {}", path.display()))?,
        None => MemoryStore::new(),
    };
    Ok(Arc::new(store))
}

/// Notifier publishing to the configured broker, if any.
pub async fn notifier(config: &AerialConfig) -> Notifier {
    let notifier = Notifier::new(config.notify.queue.clone());

    let Some(url) = &config.notify.amqp_url else {
        return notifier;
    };

    #[cfg(feature = "amqp")]
    {
        match aerial_core::AmqpPublisher::connect(url).await {
            Ok(publisher) => return notifier.with_publisher(Arc::new(publisher)),
            Err(e) => warn!("Broker unavailable, completion will not be queued: {}", e),
        }
    }

    #[cfg(not(feature = "amqp"))]
    warn!(
        "Ignoring broker {}: built without the amqp feature",
        url
    );

    notifier
}
