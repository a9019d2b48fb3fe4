//! Outbound survey campaign.
//!
//! Walks a recipient list, skips anyone already in the [`SentLedger`],
//! delivers to everyone else with a fixed pause between sends, and
//! records each success so a re-run picks up where the last one stopped.

use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::records::ledger::SentLedger;
use crate::slack::client::SlackService;
use crate::{AppError, Result};

/// Read recipient user IDs, one per line.
///
/// Blank lines and `#` comments are skipped; duplicates are dropped,
/// keeping first-seen order.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be read.
pub fn load_recipients(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::Io(format!("failed to read recipients {}: {e}", path.display()))
    })?;
    Ok(parse_recipients(&raw))
}

/// Parse recipient IDs from file contents. See [`load_recipients`].
#[must_use]
pub fn parse_recipients(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_owned)
        .collect()
}

/// Something that can put the survey in front of one user.
pub trait SurveyDelivery: Send + Sync {
    /// Deliver to `user_id`.
    fn deliver<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// What the campaign sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outreach {
    /// The interactive survey form.
    SurveyForm,
    /// A plain-text message.
    Text(String),
}

/// [`SurveyDelivery`] over Slack direct messages.
pub struct SlackOutreach {
    slack: Arc<SlackService>,
    outreach: Outreach,
}

impl SlackOutreach {
    /// Deliver `outreach` through `slack`.
    #[must_use]
    pub fn new(slack: Arc<SlackService>, outreach: Outreach) -> Self {
        Self { slack, outreach }
    }
}

impl SurveyDelivery for SlackOutreach {
    fn deliver<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            match self.outreach {
                Outreach::SurveyForm => self.slack.send_survey(user_id).await?,
                Outreach::Text(ref text) => self.slack.send_text(user_id, text).await?,
            };
            Ok(())
        })
    }
}

/// Outcome counts of one campaign run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Delivered and recorded in this run.
    pub sent: usize,
    /// Already in the ledger.
    pub skipped: usize,
    /// Delivery failed; will be retried on the next run.
    pub failed: usize,
}

/// Deliver to every recipient not yet in `ledger`.
///
/// Waits `delay` between consecutive delivery attempts. Delivery failures
/// are logged and counted; the loop moves on. Cancelling `ct` stops the
/// run before the next recipient.
///
/// # Errors
///
/// Returns `AppError::Io` if a successful send cannot be written to the
/// ledger, since continuing would lose track of who was reached.
pub async fn run_campaign<D: SurveyDelivery + ?Sized>(
    delivery: &D,
    recipients: &[String],
    ledger: &mut SentLedger,
    delay: Duration,
    ct: &CancellationToken,
) -> Result<SendReport> {
    let mut report = SendReport::default();
    let mut attempted = false;

    for user_id in recipients {
        if ct.is_cancelled() {
            warn!("campaign cancelled");
            break;
        }

        if ledger.contains(user_id) {
            info!(user_id, "already sent; skipping");
            report.skipped += 1;
            continue;
        }

        if attempted && !delay.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = ct.cancelled() => {
                    warn!("campaign cancelled");
                    break;
                }
            }
        }
        attempted = true;

        match delivery.deliver(user_id).await {
            Ok(()) => {
                ledger.record(user_id)?;
                info!(user_id, "survey sent");
                report.sent += 1;
            }
            Err(err) => {
                warn!(%err, user_id, "failed to send survey");
                report.failed += 1;
            }
        }
    }

    info!(
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "campaign finished"
    );
    Ok(report)
}
