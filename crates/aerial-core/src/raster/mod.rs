//! Page rasterization.
//!
//! Every artifact ends up as one PNG per page inside its collection folder,
//! named `{artifact}_{page}.png`:
//! - images are normalized to `{artifact}_1.png` at intake, nothing to do
//! - PDFs are rendered page by page with `pdftoppm`
//! - word processor documents are converted to `{artifact}.pdf` first

mod convert;
pub mod pdf;

pub use convert::{DocumentConverter, LibreOfficeConverter};
pub use pdf::{PdfRenderer, page_count};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::RasterError;
use crate::models::artifact::{Artifact, ArtifactKind, Mimetype};
use crate::storage::page_file_name;

/// Result type for rasterization.
pub type Result<T> = std::result::Result<T, RasterError>;

/// Page images of a rasterized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedPages {
    /// Page images in ascending page order.
    pub pages: Vec<PathBuf>,
}

impl RasterizedPages {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Turns artifacts into per-page PNGs.
pub struct PageRasterizer {
    renderer: PdfRenderer,
    converter: Arc<dyn DocumentConverter>,
}

impl PageRasterizer {
    pub fn new(renderer: PdfRenderer, converter: Arc<dyn DocumentConverter>) -> Self {
        Self {
            renderer,
            converter,
        }
    }

    /// Produce the page images of `artifact`, whose files live in `folder`.
    pub async fn rasterize(&self, artifact: &Artifact, folder: &Path) -> Result<RasterizedPages> {
        match artifact.kind {
            ArtifactKind::Image => Ok(RasterizedPages {
                pages: vec![folder.join(page_file_name(&artifact.id, 1))],
            }),
            ArtifactKind::Document => match artifact.mimetype {
                mimetype if mimetype.is_pdf() => self.rasterize_pdf(&artifact.id, folder).await,
                mimetype if mimetype.is_word() => {
                    self.convert_word(&artifact.id, mimetype, folder).await?;
                    self.rasterize_pdf(&artifact.id, folder).await
                }
                mimetype => Err(RasterError::UnsupportedMimetype(mimetype.as_mime().to_string())),
            },
        }
    }

    /// Render every page of `{folder}/{id}.pdf`, one after the other.
    async fn rasterize_pdf(&self, id: &str, folder: &Path) -> Result<RasterizedPages> {
        let pdf_path = folder.join(format!("{id}{}", Mimetype::ApplicationPdf.extension()));
        let data = tokio::fs::read(&pdf_path).await?;
        let count = tokio::task::spawn_blocking(move || page_count(&data)).await??;

        let start = Instant::now();
        let mut pages = Vec::with_capacity(count as usize);
        for page in 1..=count {
            let output = folder.join(page_file_name(id, page));
            self.renderer.render_page(&pdf_path, page, &output).await?;
            debug!("Rendered page {}/{} of {}", page, count, id);
            pages.push(output);
        }

        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "Rendered {} pages of {} in {:.2}s ({:.1} pages/s)",
            count,
            id,
            elapsed,
            count as f64 / elapsed.max(f64::EPSILON)
        );

        Ok(RasterizedPages { pages })
    }

    /// Write `{folder}/{id}.pdf` from the stored word processor document.
    async fn convert_word(&self, id: &str, mimetype: Mimetype, folder: &Path) -> Result<()> {
        let ext = mimetype.extension();
        let source = folder.join(format!("{id}{ext}"));
        let data = tokio::fs::read(&source).await?;

        let pdf = self.converter.to_pdf(&data, ext).await?;
        let target = folder.join(format!("{id}{}", Mimetype::ApplicationPdf.extension()));
        tokio::fs::write(&target, pdf).await?;

        debug!("Converted {} to {}", source.display(), target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRunner, artifact, pdf_with_pages};
    use pretty_assertions::assert_eq;

    fn rasterizer(runner: Arc<ScriptedRunner>) -> PageRasterizer {
        PageRasterizer::new(
            PdfRenderer::new("pdftoppm", runner.clone(), 36),
            Arc::new(LibreOfficeConverter::new("libreoffice", runner)),
        )
    }

    #[tokio::test]
    async fn test_image_is_single_page_noop() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let art = artifact("art_img", Mimetype::ImagePng);

        let pages = rasterizer(runner.clone())
            .rasterize(&art, dir.path())
            .await
            .unwrap();

        assert_eq!(pages.pages, vec![dir.path().join("art_img_1.png")]);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_pages_render_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("art_doc.pdf"), pdf_with_pages(3)).unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let art = artifact("art_doc", Mimetype::ApplicationPdf);

        let pages = rasterizer(runner.clone())
            .rasterize(&art, dir.path())
            .await
            .unwrap();

        assert_eq!(pages.page_count(), 3);
        for (i, page) in pages.pages.iter().enumerate() {
            assert_eq!(page, &dir.path().join(format!("art_doc_{}.png", i + 1)));
            assert!(page.exists());
        }
        assert_eq!(
            runner.events(),
            vec!["render:art_doc_1", "render:art_doc_2", "render:art_doc_3"]
        );
    }

    #[tokio::test]
    async fn test_word_document_goes_through_pdf() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("art_word.docx"), b"docx").unwrap();
        let runner = Arc::new(ScriptedRunner::new().converted_pages(2));
        let art = artifact("art_word", Mimetype::ApplicationDocx);

        let pages = rasterizer(runner.clone())
            .rasterize(&art, dir.path())
            .await
            .unwrap();

        assert_eq!(pages.page_count(), 2);
        assert!(dir.path().join("art_word.pdf").exists());
        assert_eq!(
            runner.events(),
            vec!["convert:.docx", "render:art_word_1", "render:art_word_2"]
        );
    }

    #[tokio::test]
    async fn test_missing_pdf_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let art = artifact("art_gone", Mimetype::ApplicationPdf);

        let err = rasterizer(Arc::new(ScriptedRunner::new()))
            .rasterize(&art, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::Io(_)));
    }

    #[tokio::test]
    async fn test_document_with_image_mimetype_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let mut art = artifact("art_odd", Mimetype::ImageGif);
        art.kind = ArtifactKind::Document;

        let err = rasterizer(Arc::new(ScriptedRunner::new()))
            .rasterize(&art, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedMimetype(_)));
    }
}
