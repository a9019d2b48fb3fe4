//! Unit tests for recipient parsing and the campaign loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use survey_bot::records::ledger::SentLedger;
use survey_bot::sender::{self, SendReport, SurveyDelivery};
use survey_bot::{AppError, Result};

/// Records every delivery; fails for IDs listed in `fail_for`.
#[derive(Default)]
struct RecordingDelivery {
    delivered: Mutex<Vec<String>>,
    fail_for: Vec<String>,
}

impl RecordingDelivery {
    fn failing_for(ids: &[&str]) -> Self {
        Self {
            delivered: Mutex::default(),
            fail_for: ids.iter().map(|id| (*id).to_owned()).collect(),
        }
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

impl SurveyDelivery for RecordingDelivery {
    fn deliver<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail_for.iter().any(|id| id == user_id) {
                return Err(AppError::Slack("channel_not_found".into()));
            }
            self.delivered.lock().unwrap().push(user_id.to_owned());
            Ok(())
        })
    }
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|id| (*id).to_owned()).collect()
}

#[test]
fn parse_recipients_skips_comments_blanks_and_duplicates() {
    let raw = "# team A\nU1\n\n  U2 \nU1\n# U3\nU4\n";
    assert_eq!(sender::parse_recipients(raw), ids(&["U1", "U2", "U4"]));
}

#[test]
fn load_recipients_missing_file_is_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = sender::load_recipients(temp.path().join("nobody.txt"));
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[tokio::test]
async fn sends_to_everyone_and_records_ledger() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut ledger = SentLedger::open(temp.path().join("sent.log")).expect("ledger");
    let delivery = RecordingDelivery::default();

    let report = sender::run_campaign(
        &delivery,
        &ids(&["U1", "U2"]),
        &mut ledger,
        Duration::ZERO,
        &CancellationToken::new(),
    )
    .await
    .expect("campaign runs");

    assert_eq!(report, SendReport { sent: 2, skipped: 0, failed: 0 });
    assert_eq!(delivery.delivered(), ids(&["U1", "U2"]));
    assert!(ledger.contains("U1") && ledger.contains("U2"));
}

#[tokio::test]
async fn second_run_skips_users_already_in_ledger() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("sent.log");
    let recipients = ids(&["U1", "U2", "U3"]);

    {
        let mut ledger = SentLedger::open(&path).expect("ledger");
        let first = RecordingDelivery::failing_for(&["U3"]);
        let report = sender::run_campaign(
            &first,
            &recipients,
            &mut ledger,
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .expect("first run");
        assert_eq!(report, SendReport { sent: 2, skipped: 0, failed: 1 });
    }

    let mut ledger = SentLedger::open(&path).expect("reopen ledger");
    let second = RecordingDelivery::default();
    let report = sender::run_campaign(
        &second,
        &recipients,
        &mut ledger,
        Duration::ZERO,
        &CancellationToken::new(),
    )
    .await
    .expect("second run");

    assert_eq!(report, SendReport { sent: 1, skipped: 2, failed: 0 });
    assert_eq!(second.delivered(), ids(&["U3"]));
}

#[tokio::test]
async fn failed_delivery_is_not_recorded() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut ledger = SentLedger::open(temp.path().join("sent.log")).expect("ledger");
    let delivery = RecordingDelivery::failing_for(&["U1"]);

    sender::run_campaign(
        &delivery,
        &ids(&["U1"]),
        &mut ledger,
        Duration::ZERO,
        &CancellationToken::new(),
    )
    .await
    .expect("campaign runs");

    assert!(!ledger.contains("U1"));
}

#[tokio::test(start_paused = true)]
async fn waits_between_sends_but_not_before_first() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut ledger = SentLedger::open(temp.path().join("sent.log")).expect("ledger");
    let delivery = RecordingDelivery::default();
    let start = tokio::time::Instant::now();

    sender::run_campaign(
        &delivery,
        &ids(&["U1", "U2", "U3"]),
        &mut ledger,
        Duration::from_secs(2),
        &CancellationToken::new(),
    )
    .await
    .expect("campaign runs");

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(4), "two pauses expected, got {elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "no pause before first send, got {elapsed:?}");
}

#[tokio::test]
async fn cancelled_campaign_sends_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut ledger = SentLedger::open(temp.path().join("sent.log")).expect("ledger");
    let delivery = RecordingDelivery::default();
    let ct = CancellationToken::new();
    ct.cancel();

    let report = sender::run_campaign(
        &delivery,
        &ids(&["U1", "U2"]),
        &mut ledger,
        Duration::ZERO,
        &ct,
    )
    .await
    .expect("campaign runs");

    assert_eq!(report, SendReport::default());
    assert!(delivery.delivered().is_empty());
}
