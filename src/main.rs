use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crm_notification_panel::config::{AppConfig, CliConfig, CredentialSource, FileConfig};
use crm_notification_panel::crm::{CrmClient, DEFAULT_TOKEN_ENV_VAR};
use crm_notification_panel::panel::{HtmlDisplay, NotificationPanel};
use crm_notification_panel::scheduler::{PanelScheduler, RemotePollTask, StagingDrainTask};
use crm_notification_panel::server::{run_server, ServerConfig, ServerState};
use crm_notification_panel::staging::{FileStagingArea, DEFAULT_STAGING_DIR};
use crm_notification_panel::RequestsLoggingLevel;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the CRM notification service.
    #[clap(long, default_value = "http://localhost:5001")]
    pub crm_url: String,

    /// The port the panel is served on.
    #[clap(short, long, default_value_t = 5002)]
    pub port: u16,

    /// The level of logging to perform on each panel request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Milliseconds between two full refreshes from the CRM.
    #[clap(long, default_value_t = 3000)]
    pub poll_interval_ms: u64,

    /// Milliseconds between two drains of the staging area.
    #[clap(long, default_value_t = 5000)]
    pub staging_interval_ms: u64,

    /// Directory holding the staging file.
    #[clap(long, default_value = DEFAULT_STAGING_DIR)]
    pub staging_dir: PathBuf,

    /// Timeout in seconds for CRM requests. Unset keeps the transport default.
    #[clap(long)]
    pub request_timeout_sec: Option<u64>,

    /// Environment variable holding the CRM bearer token.
    #[clap(long, default_value = DEFAULT_TOKEN_ENV_VAR)]
    pub bearer_token_env: String,

    /// File whose first line is the CRM bearer token.
    #[clap(long)]
    pub bearer_token_file: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            crm_url: self.crm_url.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            poll_interval_ms: self.poll_interval_ms,
            staging_interval_ms: self.staging_interval_ms,
            staging_dir: self.staging_dir.clone(),
            request_timeout_sec: self.request_timeout_sec,
            bearer_token_env: self.bearer_token_env.clone(),
            bearer_token_file: self.bearer_token_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    if let CredentialSource::Static(_) = config.credentials {
        warn!("Using a literal bearer token from the config file, prefer bearer_token_file or an env var");
    }
    let credentials = config.credentials.provider();
    info!("CRM credentials from {}", credentials.describe());
    if let Err(e) = credentials.bearer_token() {
        warn!("CRM credentials not available yet: {}", e);
    }

    let crm_client = CrmClient::new(config.crm_url.clone(), credentials, config.request_timeout)
        .context("Failed to create CRM client")?;
    match crm_client.health_check().await {
        Ok(()) => info!("CRM service reachable at {}", crm_client.base_url()),
        Err(e) => warn!("CRM health check against {} failed: {}", crm_client.base_url(), e),
    }

    let staging = FileStagingArea::in_dir(&config.staging_dir);
    info!("Staging area at {:?}", staging.path());

    let display = Arc::new(HtmlDisplay::new());
    let panel = Arc::new(NotificationPanel::new(
        display.clone(),
        display.clone(),
        Arc::new(crm_client),
        Arc::new(staging),
    ));
    panel.render();

    let shutdown_token = CancellationToken::new();

    let mut scheduler = PanelScheduler::new(shutdown_token.clone());
    scheduler.register_task(Arc::new(RemotePollTask::new(
        panel.clone(),
        config.poll_interval,
    )));
    scheduler.register_task(Arc::new(StagingDrainTask::new(
        panel.clone(),
        config.staging_interval,
    )));
    let scheduler_handle = tokio::spawn(async move { scheduler.run().await });

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received ctrl-c, shutting down"),
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
        signal_token.cancel();
    });

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
    };
    let state = ServerState::new(server_config, panel, display);
    let server_result = run_server(state, shutdown_token.clone()).await;

    shutdown_token.cancel();
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }
    server_result
}
