//! Clean command - remove old processed collections.

use clap::Args;
use console::style;

use aerial_core::{Retention, StorageLayout};

use super::{load_config, open_store};

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Remove collections older than this many days (defaults to the configured retention)
    #[arg(short, long)]
    days: Option<u32>,
}

pub async fn run(args: CleanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let days = args.days.unwrap_or(config.retention.max_age_days);

    let store = open_store(&config).await?;
    let retention = Retention::new(store, StorageLayout::from_config(&config.storage));

    let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(days));
    let removed = retention.clean(cutoff).await?;

    println!(
        "{} Removed {} collection(s) older than {} day(s)",
        style("✓").green(),
        removed,
        days
    );

    Ok(())
}
