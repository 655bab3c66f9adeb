//! PDF inspection and page rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aerial_exec::{CommandRunner, Flags, Invocation};
use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::RasterError;

/// Number of pages in a PDF.
///
/// PDFs encrypted with an empty user password are decrypted; anything else
/// that is encrypted is rejected.
pub fn page_count(data: &[u8]) -> Result<u32> {
    let mut doc = Document::load_mem(data).map_err(|e| RasterError::Parse(e.to_string()))?;

    // Handle PDFs with empty password encryption
    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(RasterError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");
    }

    let count = doc.get_pages().len() as u32;
    if count == 0 {
        return Err(RasterError::NoPages);
    }

    Ok(count)
}

/// Renders single PDF pages to PNG with poppler's `pdftoppm`.
pub struct PdfRenderer {
    binary: PathBuf,
    runner: Arc<dyn CommandRunner>,
    dpi: u32,
}

impl PdfRenderer {
    pub fn new(binary: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            runner,
            dpi,
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Flags rendering `page` (1-indexed) of `pdf` to `{output}.png`.
    pub fn flags(&self, pdf: &Path, page: u32, output: &Path) -> Flags {
        let page = page.to_string();
        Flags::single_dash()
            .switch("png")
            .value("r", self.dpi.to_string())
            .value("f", page.clone())
            .value("l", page)
            .switch("singlefile")
            .positional(pdf)
            .positional(output.with_extension(""))
    }

    /// Render one page to exactly `output`, which must end in `.png`.
    pub async fn render_page(&self, pdf: &Path, page: u32, output: &Path) -> Result<()> {
        let invocation = Invocation::new(&self.binary, self.flags(pdf, page, output));
        self.runner.run(&invocation).await?;

        if tokio::fs::try_exists(output).await? {
            Ok(())
        } else {
            Err(RasterError::MissingPage { page })
        }
    }
}
