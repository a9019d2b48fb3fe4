//! Interactivity callback payload decoding.
//!
//! Slack posts a form-encoded body whose `payload` field carries a JSON
//! document describing the interaction. Only the handful of keys the
//! survey needs are modelled, and all of them are optional: a payload
//! missing a user or channel still decodes, with placeholder values.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::survey::{Answer, SurveyResponses, SUBMIT_ACTION_ID};
use crate::Result;

/// Placeholder for a payload without a user ID or username.
pub const UNKNOWN_USER: &str = "unknown_user";
/// Placeholder for a payload without a channel ID.
pub const UNKNOWN_CHANNEL: &str = "unknown_channel";
/// Placeholder for a payload without a message timestamp.
pub const UNKNOWN_TS: &str = "unknown_ts";

/// Decoded interactivity payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InteractionPayload {
    /// Interacting user.
    pub user: PayloadUser,
    /// Conversation containing the message.
    pub channel: PayloadChannel,
    /// Message carrying the form.
    pub message: PayloadMessage,
    /// Current values of every input on the message.
    pub state: PayloadState,
    /// Actions that triggered this callback, kept verbatim.
    pub actions: Vec<serde_json::Value>,
}

/// `user` object of the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayloadUser {
    /// Slack user ID.
    pub id: String,
    /// Workspace handle.
    pub username: String,
}

impl Default for PayloadUser {
    fn default() -> Self {
        Self {
            id: UNKNOWN_USER.to_owned(),
            username: UNKNOWN_USER.to_owned(),
        }
    }
}

/// `channel` object of the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayloadChannel {
    /// Channel or DM ID.
    pub id: String,
}

impl Default for PayloadChannel {
    fn default() -> Self {
        Self {
            id: UNKNOWN_CHANNEL.to_owned(),
        }
    }
}

/// `message` object of the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayloadMessage {
    /// Message timestamp, used as its ID by `chat.update`.
    pub ts: String,
}

impl Default for PayloadMessage {
    fn default() -> Self {
        Self {
            ts: UNKNOWN_TS.to_owned(),
        }
    }
}

/// `state` object of the payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayloadState {
    /// `block_id` → `action_id` → element state.
    pub values: BTreeMap<String, BTreeMap<String, ElementState>>,
}

/// State of one input element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementState {
    /// Element type, e.g. `checkboxes` or `plain_text_input`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Ticked options (checkboxes).
    pub selected_options: Vec<SelectedOption>,
    /// Entered text (text inputs); `null` when left empty.
    pub value: Option<String>,
}

/// One ticked checkbox option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectedOption {
    /// Option label.
    pub text: OptionText,
    /// Option value, e.g. `value-0`.
    pub value: String,
}

/// Text object of an option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionText {
    /// Rendered label.
    pub text: String,
}

impl InteractionPayload {
    /// Decode the JSON carried in the `payload` form field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Payload` if the text is not a JSON object of the
    /// expected shape.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Flatten `state.values` into answers keyed by action ID.
    ///
    /// Checkboxes yield their selected labels; text inputs yield their
    /// value. Other element types are ignored.
    #[must_use]
    pub fn responses(&self) -> SurveyResponses {
        let mut responses = SurveyResponses::new();
        for block in self.state.values.values() {
            for (action_id, element) in block {
                match element.kind.as_str() {
                    "checkboxes" => {
                        let labels = element
                            .selected_options
                            .iter()
                            .map(|option| option.text.text.clone())
                            .collect();
                        responses.insert(action_id.clone(), Answer::Selected(labels));
                    }
                    "plain_text_input" => {
                        responses.insert(action_id.clone(), Answer::Text(element.value.clone()));
                    }
                    _ => {}
                }
            }
        }
        responses
    }

    /// IDs of the actions that triggered this callback.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter_map(|action| action.get("action_id").and_then(serde_json::Value::as_str))
    }

    /// Whether the submit button was pressed.
    #[must_use]
    pub fn is_submission(&self) -> bool {
        self.action_ids().any(|id| id == SUBMIT_ACTION_ID)
    }

    /// Channel and message timestamp of the form, when both are known.
    #[must_use]
    pub fn message_location(&self) -> Option<(&str, &str)> {
        let channel = self.channel.id.as_str();
        let ts = self.message.ts.as_str();
        if channel.is_empty() || ts.is_empty() || channel == UNKNOWN_CHANNEL || ts == UNKNOWN_TS {
            None
        } else {
            Some((channel, ts))
        }
    }
}
