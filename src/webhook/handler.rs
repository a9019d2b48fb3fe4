//! Survey submission handler for `POST /slack/events`.
//!
//! Sequence for one callback: log the raw payload, decode it, log the
//! username, flatten the answers and, if the submit button was pressed,
//! append the TSV row, replace the form with a confirmation, post a
//! summary to the notification channel and upload the record.
//!
//! Only record-file failures, undecodable JSON and a failed channel
//! notification turn into a 500. The confirmation update and the storage
//! upload are best-effort.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use slack_morphism::prelude::{SlackChannelId, SlackTs};
use tracing::{error, info, warn};

use super::AppState;
use crate::models::survey::SurveyRecord;
use crate::slack::blocks;
use crate::slack::client::SlackMessage;
use crate::slack::payload::InteractionPayload;
use crate::Result;

/// Body returned after any successfully processed callback.
pub const ACK_TEXT: &str = "Thank you for completing the survey!";
/// Error returned when the `payload` field is absent.
pub const MISSING_PAYLOAD: &str = "No payload found";
/// Error returned for any processing failure.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Form-encoded callback body.
#[derive(Debug, Deserialize)]
pub struct InteractivityForm {
    /// JSON interaction payload.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Handle one interactivity callback.
///
/// A body that is not form-encoded carries no `payload` field either, so it
/// gets the same 400 as a form without one.
pub async fn handle_interactivity(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<InteractivityForm>, FormRejection>,
) -> (StatusCode, Json<Value>) {
    let payload = match form {
        Ok(Form(form)) => form.payload,
        Err(rejection) => {
            warn!(%rejection, "interactivity callback is not a readable form");
            None
        }
    };
    let Some(raw) = payload.filter(|payload| !payload.is_empty()) else {
        warn!("interactivity callback without payload");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": MISSING_PAYLOAD })),
        );
    };

    match process(&state, &raw).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "text": ACK_TEXT }))),
        Err(err) => {
            error!(%err, "error handling interactivity");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": GENERIC_FAILURE })),
            )
        }
    }
}

async fn process(state: &AppState, raw: &str) -> Result<()> {
    state.records.log_payload(raw)?;

    let payload = InteractionPayload::from_json(raw)?;

    // Recorded before anything else can fail.
    state.records.log_seen_user(&payload.user.username)?;

    let record = SurveyRecord::new(
        payload.user.id.clone(),
        payload.responses(),
        payload.actions.clone(),
    );

    if !payload.is_submission() {
        info!(user_id = %record.user_id, "non-submit interaction recorded");
        return Ok(());
    }

    info!(
        user_id = %record.user_id,
        answers = record.responses.len(),
        "survey submitted"
    );

    state.records.log_submission(&record)?;
    acknowledge(state, &payload).await;
    notify(state, &record).await?;
    upload(state, &record).await;

    Ok(())
}

/// Replace the form with a confirmation so it cannot be submitted twice.
async fn acknowledge(state: &AppState, payload: &InteractionPayload) {
    let Some(ref slack) = state.slack else {
        info!("slack not configured; skipping confirmation update");
        return;
    };
    let Some((channel, ts)) = payload.message_location() else {
        warn!("payload lacks channel or message ts; skipping confirmation update");
        return;
    };

    match slack
        .update_message(
            SlackChannelId::new(channel.to_owned()),
            SlackTs::new(ts.to_owned()),
            blocks::SUBMISSION_CONFIRMED_TEXT,
            blocks::submission_confirmed_blocks(),
        )
        .await
    {
        Ok(()) => info!(channel, "survey message updated"),
        Err(err) => warn!(%err, channel, "failed to update survey message"),
    }
}

async fn notify(state: &AppState, record: &SurveyRecord) -> Result<()> {
    let Some(ref slack) = state.slack else {
        info!("slack not configured; skipping channel notification");
        return Ok(());
    };

    let channel = SlackChannelId::new(state.config.slack.notify_channel_id.clone());
    let text = blocks::submission_summary(&record.user_id, &record.responses);
    slack.post_message(SlackMessage::plain(channel, text)).await?;
    Ok(())
}

async fn upload(state: &AppState, record: &SurveyRecord) {
    let Some(ref storage) = state.storage else {
        info!("storage not configured; skipping upload");
        return;
    };

    if let Err(err) = storage.upload(record).await {
        warn!(%err, user_id = %record.user_id, "failed to upload record");
    }
}
