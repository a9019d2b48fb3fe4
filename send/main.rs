#![forbid(unsafe_code)]

//! `survey-send` — posts the survey to a list of users.
//!
//! Recipients come from `--user`, `--all-users`, or the configured
//! recipients file. Users already in the sent ledger are skipped, so the
//! command can be re-run safely after a partial failure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use survey_bot::config::GlobalConfig;
use survey_bot::logging::{init_tracing, LogFormat};
use survey_bot::records::ledger::SentLedger;
use survey_bot::sender::{self, Outreach, SlackOutreach};
use survey_bot::slack::client::SlackService;
use survey_bot::{AppError, Result};

#[derive(Debug, Parser)]
#[command(name = "survey-send", about = "Send the survey to Slack users", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Send to this user ID instead of the recipients file (repeatable).
    #[arg(long = "user", value_name = "USER_ID", conflicts_with = "all_users")]
    users: Vec<String>,

    /// Send to every active, non-bot member of the workspace.
    #[arg(long)]
    all_users: bool,

    /// Send this plain-text message instead of the survey form.
    #[arg(long)]
    message: Option<String>,

    /// Override the pause between sends, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_slack_credentials().await?;

    let slack = Arc::new(SlackService::new(&config.slack)?);

    let recipients = if args.all_users {
        slack
            .list_active_users()
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect()
    } else if args.users.is_empty() {
        sender::load_recipients(&config.sender.recipients_file)?
    } else {
        sender::parse_recipients(&args.users.join("\n"))
    };
    info!(count = recipients.len(), "recipients loaded");

    let mut ledger = SentLedger::open(config.ledger_path())?;
    let outreach = args.message.map_or(Outreach::SurveyForm, Outreach::Text);
    let delivery = SlackOutreach::new(slack, outreach);
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(config.sender.delay_ms));

    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping after the current send");
            signal_ct.cancel();
        }
    });

    let report = sender::run_campaign(&delivery, &recipients, &mut ledger, delay, &ct).await?;
    info!(
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        ledger = %ledger.path().display(),
        "survey-send done"
    );
    Ok(())
}
