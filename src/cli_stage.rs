//! Drops a booking event into the panel's staging area.
//!
//! Meant for producers on the same machine as the panel: the panel picks the
//! event up on its next staging drain.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crm_notification_panel::config::{resolve_staging_dir, FileConfig};
use crm_notification_panel::notifications::IncomingEvent;
use crm_notification_panel::staging::{FileStagingArea, StagingArea, DEFAULT_STAGING_DIR};

#[derive(Parser, Debug)]
struct CliArgs {
    /// The panel's TOML config file. Its staging_dir overrides --staging-dir.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the panel's staging file.
    #[clap(long, default_value = DEFAULT_STAGING_DIR)]
    pub staging_dir: PathBuf,

    /// JSON file with one raw or canonical event. Reads stdin when omitted.
    pub event_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let content = match &cli_args.event_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {:?}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };

    let event: serde_json::Value =
        serde_json::from_str(&content).context("Event is not valid JSON")?;
    // Refuse events the panel would skip anyway.
    let kind = match IncomingEvent::classify(event.clone()).context("Event has an unknown shape")? {
        IncomingEvent::Raw(_) => "raw",
        IncomingEvent::Canonical(_) => "canonical",
    };

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose()?;
    let staging_dir = resolve_staging_dir(&cli_args.staging_dir, file_config.as_ref());
    let staging = FileStagingArea::in_dir(&staging_dir);
    staging.stage(event)?;
    info!("Staged {} event in {:?}", kind, staging.path());
    Ok(())
}
