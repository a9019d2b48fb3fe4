//! Flat-file records of everything the webhook receives.
//!
//! Three append-only files live under the configured log directory:
//! `everything.log` (raw payloads), `seen_users.log` (anyone who touched
//! the form) and `submitted.tsv` (one row per submission).

pub mod ledger;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::survey::{
    SurveyRecord, INTERESTS_ACTION_ID, OTHER_ACTION_ID, PAST_FAVOURITES_ACTION_ID,
    TOPICS_ACTION_ID,
};
use crate::{AppError, Result};

/// Raw payload log file name.
pub const PAYLOAD_LOG: &str = "everything.log";
/// Seen-users log file name.
pub const SEEN_USERS_LOG: &str = "seen_users.log";
/// Submission table file name.
pub const SUBMISSIONS_TSV: &str = "submitted.tsv";

/// Append a single line to `path`, creating the file if needed.
pub(crate) fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::Io(format!("failed to open {}: {e}", path.display())))?;
    writeln!(file, "{line}")
        .map_err(|e| AppError::Io(format!("failed to write {}: {e}", path.display())))
}

/// Keep a cell on one line and out of neighbouring columns.
fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

/// Format a submission as a tab-separated row (without newline).
///
/// Columns: user ID, selected interests joined by `|`, topics, 2024
/// favourites, other. Blank answers are written as `None`.
#[must_use]
pub fn submission_row(record: &SurveyRecord) -> String {
    let responses = &record.responses;
    let interests = responses.joined_selection(INTERESTS_ACTION_ID, "|");
    [
        record.user_id.as_str(),
        interests.as_str(),
        responses.text_or_none(TOPICS_ACTION_ID),
        responses.text_or_none(PAST_FAVOURITES_ACTION_ID),
        responses.text_or_none(OTHER_ACTION_ID),
    ]
    .into_iter()
    .map(tsv_cell)
    .collect::<Vec<_>>()
    .join("\t")
}

/// Writer for the webhook's flat-file records.
pub struct ResponseLog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl ResponseLog {
    /// Open the record directory, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Io(format!(
                "failed to create log directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Directory holding the record files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append(&self, file_name: &str, line: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::Io("response log mutex poisoned".into()))?;
        append_line(&self.dir.join(file_name), line)
    }

    /// Record the raw payload text exactly as received.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written.
    pub fn log_payload(&self, raw: &str) -> Result<()> {
        self.append(PAYLOAD_LOG, raw)
    }

    /// Record that a user interacted with the form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written.
    pub fn log_seen_user(&self, username: &str) -> Result<()> {
        self.append(SEEN_USERS_LOG, username)
    }

    /// Append the submission row to the TSV table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written.
    pub fn log_submission(&self, record: &SurveyRecord) -> Result<()> {
        self.append(SUBMISSIONS_TSV, &submission_row(record))
    }
}
