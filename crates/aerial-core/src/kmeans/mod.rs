//! Dominant color extraction through the external `kmeans_colors` tool.
//!
//! The tool clusters an image's pixels and, with the flags used here,
//! prints two lines on stdout:
//!
//! ```text
//! ffffff,1f3b6e,d81e2c
//! 0.6250,0.2500,0.1250
//! ```
//!
//! The first line holds the cluster centroids as hex without `#`, sorted by
//! prevalence; the second the share of pixels of each, aligned by position.

mod output;

pub use output::parse_output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aerial_exec::{CommandRunner, Flags, Invocation};
use tracing::{debug, instrument};

use crate::error::KmeansError;
use crate::models::color::ColorRecord;

/// Result type for clustering operations.
pub type Result<T> = std::result::Result<T, KmeansError>;

/// Flags the pipeline always passes to `kmeans_colors`.
///
/// Several inputs are joined with commas into a single `--input`.
pub fn default_flags<P: AsRef<Path>>(inputs: &[P]) -> Flags {
    let input = inputs
        .iter()
        .map(|p| p.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(",");

    Flags::new()
        .switch("no-file")
        .switch("print")
        .switch("rgb")
        .switch("sort")
        .switch("pct")
        .value("input", input)
}

/// Clustering tool service, built once and shared.
pub struct KmeansColorsTool {
    binary: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl KmeansColorsTool {
    pub fn new(binary: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Dominant colors of one image.
    pub async fn dominant_colors(&self, image: &Path) -> Result<Vec<ColorRecord>> {
        self.dominant_colors_batch(&[image]).await
    }

    /// Dominant colors of several images clustered in one call.
    ///
    /// Every image must be readable before the tool is started; an
    /// unreadable one fails the call without running anything.
    #[instrument(skip(self, images), fields(count = images.len()))]
    pub async fn dominant_colors_batch<P: AsRef<Path>>(
        &self,
        images: &[P],
    ) -> Result<Vec<ColorRecord>> {
        if images.is_empty() {
            return Err(KmeansError::NoInput);
        }

        for image in images {
            ensure_readable(image.as_ref()).await?;
        }

        let invocation = Invocation::new(&self.binary, default_flags(images));
        let stdout = self.runner.run(&invocation).await?;
        let colors = parse_output(&stdout)?;

        debug!("kmeans_colors returned {} colors", colors.len());
        Ok(colors)
    }
}

/// The renderer may still be flushing a page when clustering starts, so the
/// file has to open before the tool sees it.
async fn ensure_readable(path: &Path) -> Result<()> {
    tokio::fs::File::open(path)
        .await
        .map(drop)
        .map_err(|source| KmeansError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Cmyk;
    use crate::testing::ScriptedRunner;
    use pretty_assertions::assert_eq;

    fn strings(flags: &Flags) -> Vec<String> {
        flags
            .to_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_flags() {
        let flags = default_flags(&["/tmp/a_1.png"]);
        assert_eq!(
            strings(&flags),
            vec!["--no-file", "--print", "--rgb", "--sort", "--pct", "--input", "/tmp/a_1.png"]
        );
    }

    #[test]
    fn test_default_flags_batch() {
        let flags = default_flags(&["a.png", "b.png", "c.png"]);
        assert_eq!(
            flags.get("input").map(|v| v.to_string_lossy().into_owned()),
            Some("a.png,b.png,c.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_dominant_colors() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(&image, b"png").unwrap();

        let runner = Arc::new(ScriptedRunner::new().kmeans_stdout("ffffff,000000\n0.75,0.25\n"));
        let tool = KmeansColorsTool::new("kmeans_colors", runner.clone());

        let colors = tool.dominant_colors(&image).await.unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].hex, "#ffffff");
        assert_eq!(colors[0].percentage, 75.0);
        assert_eq!(colors[1].cmyk, Cmyk::new(0, 0, 0, 100));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program(), "kmeans_colors");
    }

    #[tokio::test]
    async fn test_unreadable_image_skips_tool() {
        let runner = Arc::new(ScriptedRunner::new());
        let tool = KmeansColorsTool::new("kmeans_colors", runner.clone());

        let err = tool
            .dominant_colors(Path::new("/nonexistent/page.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, KmeansError::Unreadable { .. }));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let tool = KmeansColorsTool::new("kmeans_colors", Arc::new(ScriptedRunner::new()));
        let err = tool.dominant_colors_batch::<&Path>(&[]).await.unwrap_err();
        assert!(matches!(err, KmeansError::NoInput));
    }

    #[tokio::test]
    async fn test_tool_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(&image, b"png").unwrap();

        let runner = Arc::new(ScriptedRunner::new().fail_kmeans_for("page.png"));
        let tool = KmeansColorsTool::new("kmeans_colors", runner);

        let err = tool.dominant_colors(&image).await.unwrap_err();
        assert!(matches!(err, KmeansError::Exec(aerial_exec::ExecError::Failed { .. })));
    }
}
