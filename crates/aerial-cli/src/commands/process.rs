//! Process command - extract dominant colors and ink coverage.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use aerial_core::models::color::ColorRecord;
use aerial_core::raster::PdfRenderer;
use aerial_core::{
    Artifact, ArtifactOutcome, BatchReport, CollectionStore, ColorExtractionJob, InkCoverage,
    Intake, KmeansColorsTool, LibreOfficeConverter, PageRasterizer, StorageLayout,
};

use super::{load_config, notifier, open_store, tool_runner};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Collection label (defaults to a timestamp)
    #[arg(short, long)]
    label: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per page
    Csv,
    /// Plain text summary
    Text,
}

/// One artifact with its stored results.
#[derive(Serialize)]
struct ArtifactResult {
    artifact: Artifact,
    outcome: Option<ArtifactOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<Vec<Vec<ColorRecord>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverage: Option<InkCoverage>,
}

#[derive(Serialize)]
struct ProcessOutput {
    report: BatchReport,
    artifacts: Vec<ArtifactResult>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No files matched the given inputs");
    }

    let label = args
        .label
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string());

    let layout = StorageLayout::from_config(&config.storage);
    let store = open_store(&config).await?;
    let runner = tool_runner(&config);

    let intake = Intake::new(store.clone(), layout.clone())
        .with_image_height(config.intake.image_height);
    let staged = intake.stage(&label, &files).await?;
    for (path, reason) in &staged.skipped {
        eprintln!(
            "{} Skipped {}: {}",
            style("!").yellow(),
            path.display(),
            reason
        );
    }
    if staged.artifacts.is_empty() {
        warn!("Collection {} has nothing to process", staged.collection.id);
    }

    let rasterizer = PageRasterizer::new(
        PdfRenderer::new(&config.tools.pdftoppm, runner.clone(), config.raster.dpi()),
        Arc::new(LibreOfficeConverter::new(&config.tools.libreoffice, runner.clone())),
    );
    let job = Arc::new(ColorExtractionJob::new(
        store.clone(),
        Arc::new(rasterizer),
        Arc::new(KmeansColorsTool::new(&config.tools.kmeans_colors, runner)),
        Arc::new(notifier(&config).await),
        layout,
    ));

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Processing {} artifact(s) in {}",
        staged.artifacts.len(),
        staged.collection.id
    ));

    let report = job.enqueue(staged.collection.id.clone()).await??;
    pb.finish_with_message("Done");

    info!(
        "Collection {} done: {} succeeded, {} skipped, {} failed",
        report.collection_id,
        report.succeeded(),
        report.skipped(),
        report.failed()
    );

    let results = collect_results(store.as_ref(), &report).await?;
    let output = ProcessOutput {
        report,
        artifacts: results,
    };

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&output)?,
        OutputFormat::Csv => format_csv(&output)?,
        OutputFormat::Text => format_text(&output),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    if output.report.failed() > 0 {
        eprintln!(
            "{} {} artifact(s) failed",
            style("✗").red(),
            output.report.failed()
        );
    }

    Ok(())
}

/// Expand glob patterns; a pattern matching nothing is taken as a literal
/// path if it exists.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let matched: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();

        if matched.is_empty() {
            let path = PathBuf::from(input);
            if path.is_file() {
                files.push(path);
            } else {
                warn!("No files match {}", input);
            }
        } else {
            files.extend(matched);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

async fn collect_results(
    store: &dyn CollectionStore,
    report: &BatchReport,
) -> anyhow::Result<Vec<ArtifactResult>> {
    let found = store.find_collection(&report.collection_id).await?;

    let mut results = Vec::with_capacity(found.artifacts.len());
    for artifact in found.artifacts {
        let colors = match &artifact.kmeans_colors_id {
            Some(id) => store.kmeans_colors(id).await?.map(|k| k.colors),
            None => None,
        };
        let coverage = match &artifact.cmyk_id {
            Some(id) => store.cmyk(id).await?.map(|c| c.info),
            None => None,
        };
        results.push(ArtifactResult {
            outcome: report.outcome(&artifact.id).cloned(),
            artifact,
            colors,
            coverage,
        });
    }
    Ok(results)
}

fn format_csv(output: &ProcessOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "artifact_id",
        "label",
        "page",
        "white_space",
        "colored_space",
        "total",
        "c",
        "m",
        "y",
        "k",
        "failure",
    ])?;

    for result in &output.artifacts {
        let artifact = &result.artifact;
        let Some(coverage) = result.coverage.as_ref().filter(|c| !c.is_empty()) else {
            wtr.write_record([
                artifact.id.as_str(),
                artifact.label.as_str(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                artifact.failure.as_deref().unwrap_or(""),
            ])?;
            continue;
        };

        for index in 0..coverage.len() {
            let Some(page) = coverage.page(index) else {
                continue;
            };
            let [c, m, y, k] = page.summary.values();
            wtr.write_record([
                artifact.id.clone(),
                artifact.label.clone(),
                (index + 1).to_string(),
                page.white_space.to_string(),
                page.colored_space.to_string(),
                page.total.to_string(),
                c.to_string(),
                m.to_string(),
                y.to_string(),
                k.to_string(),
                String::new(),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(output: &ProcessOutput) -> String {
    let report = &output.report;
    let mut text = String::new();

    text.push_str(&format!(
        "Collection: {} ({})\n",
        report.collection_id, report.label
    ));
    text.push_str(&format!(
        "Artifacts: {} succeeded, {} skipped, {} failed in {:.2}s\n",
        report.succeeded(),
        report.skipped(),
        report.failed(),
        report.elapsed.as_secs_f64()
    ));

    for result in &output.artifacts {
        let artifact = &result.artifact;
        text.push('\n');
        text.push_str(&format!("{} [{}]\n", artifact.label, artifact.id));

        if !artifact.has_results() {
            let reason = artifact.failure.as_deref().unwrap_or("not processed");
            text.push_str(&format!("  Failed: {}\n", reason));
            continue;
        }
        if let Some(url) = &artifact.url {
            text.push_str(&format!("  URL: {}\n", url));
        }

        let pages = result.colors.as_deref().unwrap_or_default();
        for (index, colors) in pages.iter().enumerate() {
            text.push_str(&format!("  Page {}:\n", index + 1));
            for color in colors {
                text.push_str(&format!(
                    "    {}  {:>6.2}%  cmyk({})\n",
                    color.hex, color.percentage, color.cmyk
                ));
            }

            if let Some(page) = result.coverage.as_ref().and_then(|c| c.page(index)) {
                let [c, m, y, k] = page.summary.values();
                text.push_str(&format!(
                    "    White: {:.2}%  Colored: {:.2}%  C {:.2} M {:.2} Y {:.2} K {:.2}\n",
                    page.white_space, page.colored_space, c, m, y, k
                ));
            }
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs_literal_and_glob() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.pdf");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let pattern = dir.path().join("*.png").to_string_lossy().into_owned();
        let literal = b.to_string_lossy().into_owned();
        let missing = dir.path().join("nope.jpg").to_string_lossy().into_owned();

        let files = expand_inputs(&[pattern, literal.clone(), literal, missing]).unwrap();
        assert_eq!(files, vec![a, b]);
    }
}
