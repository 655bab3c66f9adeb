//! CLI application for aerial dominant color and ink coverage extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{clean, cluster, colors, config, process};

/// Aerial - dominant colors and CMYK ink coverage of images and documents
#[derive(Parser)]
#[command(name = "aerial")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract colors and ink coverage from images and documents
    Process(process::ProcessArgs),

    /// Convert hex colors to RGB and CMYK
    Colors(colors::ColorsArgs),

    /// Find the dominant colors of a single image
    Cluster(cluster::ClusterArgs),

    /// Remove old processed collections
    Clean(clean::CleanArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let result = match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Colors(args) => colors::run(args).await,
        Commands::Cluster(args) => cluster::run(args, cli.config.as_deref()).await,
        Commands::Clean(args) => clean::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
