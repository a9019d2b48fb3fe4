#![forbid(unsafe_code)]

//! `survey-bot` — webhook receiver for survey submissions.
//!
//! Loads configuration and credentials, opens the flat-file records,
//! connects the Slack and bin-storage clients, and serves
//! `POST /slack/events` until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use survey_bot::config::GlobalConfig;
use survey_bot::logging::{init_tracing, LogFormat};
use survey_bot::records::ResponseLog;
use survey_bot::slack::client::SlackService;
use survey_bot::storage::BinStorage;
use survey_bot::webhook::{self, AppState};
use survey_bot::{AppError, Result};

#[derive(Debug, Parser)]
#[command(name = "survey-bot", about = "Survey submission webhook", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("survey-bot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config.load_slack_credentials().await?;
    config.load_storage_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    let records = ResponseLog::open(&config.log_dir)?;
    let slack = Arc::new(SlackService::new(&config.slack)?);
    let storage = BinStorage::new(&config.storage);
    info!(endpoint = storage.endpoint(), "storage client ready");

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        records,
        slack: Some(slack),
        storage: Some(storage),
    });

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let mut server = tokio::spawn(webhook::serve(state, server_ct));

    tokio::select! {
        outcome = &mut server => {
            return outcome
                .map_err(|err| AppError::Io(format!("webhook task panicked: {err}")))?;
        }
        () = shutdown_signal() => {}
    }
    info!("shutdown signal received");
    ct.cancel();

    server
        .await
        .map_err(|err| AppError::Io(format!("webhook task panicked: {err}")))??;
    info!("survey-bot shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}
