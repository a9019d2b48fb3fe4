//! Survey answers and the record stored for each submission.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action ID of the "which of these could you be interested in" checkboxes.
pub const INTERESTS_ACTION_ID: &str = "checkboxes-action";
/// Action ID of the "topics you'd like to hear about" text input.
pub const TOPICS_ACTION_ID: &str = "topics";
/// Action ID of the "talks from 2024 that resonated" text input.
pub const PAST_FAVOURITES_ACTION_ID: &str = "2024";
/// Action ID of the "anything else" text input.
pub const OTHER_ACTION_ID: &str = "other";
/// Action ID of the submit button.
pub const SUBMIT_ACTION_ID: &str = "submit_survey";

/// Placeholder written wherever an answer was left blank.
pub const NO_ANSWER: &str = "None";

/// A single submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Answer {
    /// Labels of the ticked checkbox options.
    Selected(Vec<String>),
    /// Free-text value; `None` when the input was left empty.
    Text(Option<String>),
}

/// Flattened answers keyed by action ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SurveyResponses(BTreeMap<String, Answer>);

impl SurveyResponses {
    /// Create an empty answer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer, replacing any previous one for the same action.
    pub fn insert(&mut self, action_id: impl Into<String>, answer: Answer) {
        self.0.insert(action_id.into(), answer);
    }

    /// Look up the raw answer for an action.
    #[must_use]
    pub fn get(&self, action_id: &str) -> Option<&Answer> {
        self.0.get(action_id)
    }

    /// Number of answered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no action produced an answer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected option labels for a checkbox action; empty when absent.
    #[must_use]
    pub fn selected(&self, action_id: &str) -> &[String] {
        match self.0.get(action_id) {
            Some(Answer::Selected(labels)) => labels,
            _ => &[],
        }
    }

    /// Non-empty text value for a text action.
    #[must_use]
    pub fn text(&self, action_id: &str) -> Option<&str> {
        match self.0.get(action_id) {
            Some(Answer::Text(Some(value))) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Text value for display, or [`NO_ANSWER`].
    #[must_use]
    pub fn text_or_none(&self, action_id: &str) -> &str {
        self.text(action_id).unwrap_or(NO_ANSWER)
    }

    /// Selected labels joined by `separator`, or [`NO_ANSWER`] when none.
    #[must_use]
    pub fn joined_selection(&self, action_id: &str, separator: &str) -> String {
        let labels = self.selected(action_id);
        if labels.is_empty() {
            NO_ANSWER.to_owned()
        } else {
            labels.join(separator)
        }
    }
}

/// Everything stored about one submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyRecord {
    /// Slack user ID of the respondent.
    pub user_id: String,
    /// When the submission was received.
    pub timestamp: DateTime<Utc>,
    /// Flattened answers.
    pub responses: SurveyResponses,
    /// Raw actions from the payload, kept for context.
    pub actions: Vec<serde_json::Value>,
}

impl SurveyRecord {
    /// Build a record stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        responses: SurveyResponses,
        actions: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: Utc::now(),
            responses,
            actions,
        }
    }
}
