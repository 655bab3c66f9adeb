//! Cluster command - dominant colors of a single image.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use aerial_core::models::color::ColorRecord;
use aerial_core::{KmeansColorsTool, PageCoverage, summarize_page};

use super::{load_config, tool_runner};

/// Arguments for the cluster command.
#[derive(Args)]
pub struct ClusterArgs {
    /// Image to cluster
    #[arg(required = true)]
    image: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ClusterOutput {
    colors: Vec<ColorRecord>,
    coverage: PageCoverage,
}

pub async fn run(args: ClusterArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }

    let tool = KmeansColorsTool::new(&config.tools.kmeans_colors, tool_runner(&config));
    let colors = tool.dominant_colors(&args.image).await?;
    let coverage = summarize_page(&colors);

    if args.json {
        let output = ClusterOutput { colors, coverage };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", style(args.image.display()).bold());
    for color in &colors {
        println!(
            "  {}  {:>6.2}%  rgb({})  cmyk({})",
            color.hex, color.percentage, color.rgb, color.cmyk
        );
    }

    let [c, m, y, k] = coverage.summary.values();
    println!();
    println!(
        "White space: {:.2}%  Colored space: {:.2}%",
        coverage.white_space, coverage.colored_space
    );
    println!("Average ink: C {:.2}  M {:.2}  Y {:.2}  K {:.2}", c, m, y, k);

    Ok(())
}
