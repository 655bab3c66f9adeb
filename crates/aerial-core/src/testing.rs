//! Test doubles for the external tools.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aerial_exec::{CommandRunner, ExecError, Flag, Invocation};
use async_trait::async_trait;
use chrono::Utc;
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use crate::models::artifact::{Artifact, Mimetype};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const DEFAULT_KMEANS: &str = "ffffff,000000\n0.5,0.5\n";

/// Emulates `pdftoppm`, `kmeans_colors` and LibreOffice.
///
/// Every call is recorded; `events` gives a compact trace of what ran in
/// which order.
pub struct ScriptedRunner {
    kmeans_default: String,
    kmeans_by_input: Vec<(String, String)>,
    kmeans_failures: Mutex<Vec<String>>,
    kmeans_delay: Option<Duration>,
    converted_pages: usize,
    render_output: bool,
    convert_output: bool,
    calls: Mutex<Vec<Invocation>>,
    events: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            kmeans_default: DEFAULT_KMEANS.to_string(),
            kmeans_by_input: Vec::new(),
            kmeans_failures: Mutex::new(Vec::new()),
            kmeans_delay: None,
            converted_pages: 1,
            render_output: true,
            convert_output: true,
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Stdout for every clustering call without a more specific script.
    pub fn kmeans_stdout(mut self, stdout: &str) -> Self {
        self.kmeans_default = stdout.to_string();
        self
    }

    /// Stdout for clustering calls whose input contains `needle`.
    pub fn kmeans_stdout_for(mut self, needle: &str, stdout: &str) -> Self {
        self.kmeans_by_input
            .push((needle.to_string(), stdout.to_string()));
        self
    }

    /// Fail clustering calls whose input contains `needle`.
    pub fn fail_kmeans_for(self, needle: &str) -> Self {
        self.fail_kmeans(needle);
        self
    }

    /// Same as [`Self::fail_kmeans_for`], once the runner is shared.
    pub fn fail_kmeans(&self, needle: &str) {
        self.kmeans_failures.lock().unwrap().push(needle.to_string());
    }

    /// Keep every clustering call in flight for `delay`.
    pub fn kmeans_delay(mut self, delay: Duration) -> Self {
        self.kmeans_delay = Some(delay);
        self
    }

    /// Page count of PDFs produced by the converter.
    pub fn converted_pages(mut self, pages: usize) -> Self {
        self.converted_pages = pages;
        self
    }

    /// Renderer exits successfully without writing anything.
    pub fn silent_renderer(mut self) -> Self {
        self.render_output = false;
        self
    }

    /// Converter exits successfully without writing anything.
    pub fn silent_converter(mut self) -> Self {
        self.convert_output = false;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Highest number of clustering calls observed running at once.
    pub fn max_concurrent_kmeans(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn event(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    async fn pdftoppm(&self, invocation: &Invocation) -> aerial_exec::Result<String> {
        let positionals = positionals(invocation);
        let prefix = positionals.last().cloned().unwrap_or_default();
        self.event(format!("render:{}", file_name(Path::new(&prefix))));

        if self.render_output {
            let mut output = prefix;
            output.push(".png");
            tokio::fs::write(&output, PNG_MAGIC).await?;
        }
        Ok(String::new())
    }

    async fn libreoffice(&self, invocation: &Invocation) -> aerial_exec::Result<String> {
        let input = PathBuf::from(positionals(invocation).pop().unwrap_or_default());
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        self.event(format!("convert:{ext}"));

        if self.convert_output {
            let outdir = invocation
                .flags
                .get("outdir")
                .map(PathBuf::from)
                .unwrap_or_default();
            let stem = input.file_stem().unwrap_or_default();
            let output = outdir.join(stem).with_extension("pdf");
            tokio::fs::write(&output, pdf_with_pages(self.converted_pages)).await?;
        }
        Ok(String::new())
    }

    async fn kmeans(&self, invocation: &Invocation) -> aerial_exec::Result<String> {
        let input = invocation
            .flags
            .get("input")
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();
        let names: Vec<String> = input
            .split(',')
            .map(|p| file_name(Path::new(p)))
            .collect();
        self.event(format!("cluster:{}", names.join(",")));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        match self.kmeans_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let fails = self
            .kmeans_failures
            .lock()
            .unwrap()
            .iter()
            .any(|n| input.contains(n.as_str()));
        if fails {
            return Err(ExecError::Failed {
                binary: invocation.program(),
                status: "exit status: 1".to_string(),
                stderr: format!("failed to decode {input}"),
            });
        }

        let stdout = self
            .kmeans_by_input
            .iter()
            .find(|(needle, _)| input.contains(needle.as_str()))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_else(|| self.kmeans_default.clone());
        Ok(stdout)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> aerial_exec::Result<String> {
        self.calls.lock().unwrap().push(invocation.clone());

        let program = invocation.program();
        match program.as_str() {
            "pdftoppm" => self.pdftoppm(invocation).await,
            "kmeans_colors" => self.kmeans(invocation).await,
            "libreoffice" | "soffice" => self.libreoffice(invocation).await,
            _ => Err(ExecError::NotFound { binary: program }),
        }
    }
}

fn positionals(invocation: &Invocation) -> Vec<OsString> {
    invocation
        .flags
        .iter()
        .filter_map(|flag| match flag {
            Flag::Positional(value) => Some(value.clone()),
            _ => None,
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Artifact of the given type in collection `artc_test`.
pub fn artifact(id: &str, mimetype: Mimetype) -> Artifact {
    let now = Utc::now();
    Artifact {
        id: id.to_string(),
        collection_id: "artc_test".to_string(),
        label: format!("{id}{}", mimetype.extension()),
        mimetype,
        kind: mimetype.kind(),
        pages: None,
        url: None,
        kmeans_colors_id: None,
        cmyk_id: None,
        failure: None,
        created_at: now,
        updated_at: now,
    }
}

/// A blank A4 PDF with `pages` pages.
pub fn pdf_with_pages(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}
