//! Word processor document to PDF conversion.

use std::path::PathBuf;
use std::sync::Arc;

use aerial_exec::{CommandRunner, Flags, Invocation};
use async_trait::async_trait;
use tracing::debug;

use super::Result;
use crate::error::RasterError;

/// Converts document bytes into PDF bytes.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert `data`, whose format is given by `ext` (e.g. `.docx`).
    async fn to_pdf(&self, data: &[u8], ext: &str) -> Result<Vec<u8>>;
}

/// Converter backed by a headless LibreOffice.
pub struct LibreOfficeConverter {
    binary: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl LibreOfficeConverter {
    pub fn new(binary: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }
}

#[async_trait]
impl DocumentConverter for LibreOfficeConverter {
    async fn to_pdf(&self, data: &[u8], ext: &str) -> Result<Vec<u8>> {
        // Each conversion gets its own directory; LibreOffice names the output
        // after the input.
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join(format!("document{ext}"));
        let output = workdir.path().join("document.pdf");

        tokio::fs::write(&input, data).await?;

        let flags = Flags::new()
            .switch("headless")
            .value("convert-to", "pdf")
            .value("outdir", workdir.path())
            .positional(&input);
        self.runner
            .run(&Invocation::new(&self.binary, flags).in_dir(workdir.path()))
            .await?;

        let pdf = tokio::fs::read(&output).await.map_err(|e| {
            RasterError::Conversion(format!("no PDF produced for {}: {}", input.display(), e))
        })?;

        debug!("Converted {} byte {} document to {} byte PDF", data.len(), ext, pdf.len());
        Ok(pdf)
    }
}
