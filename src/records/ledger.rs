//! Append-only ledger of users the survey was already sent to.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::append_line;
use crate::{AppError, Result};

/// Set of user IDs backed by a one-ID-per-line text file.
///
/// Not locked against other processes; a single sender is assumed.
#[derive(Debug)]
pub struct SentLedger {
    path: PathBuf,
    sent: HashSet<String>,
}

impl SentLedger {
    /// Load the ledger at `path`; a missing file is an empty ledger.
    ///
    /// Blank lines are ignored and repeated IDs collapse.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file exists but cannot be read, or its
    /// parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Io(format!(
                    "failed to create ledger directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let sent = match fs::read_to_string(&path) {
            Ok(raw) => raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(err) => {
                return Err(AppError::Io(format!(
                    "failed to read ledger {}: {err}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), entries = sent.len(), "ledger loaded");
        Ok(Self { path, sent })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the survey already went to `user_id`.
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.sent.contains(user_id)
    }

    /// Number of distinct recorded users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    /// Mark `user_id` as sent, appending it to the file once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written; the in-memory
    /// set is left unchanged in that case.
    pub fn record(&mut self, user_id: &str) -> Result<()> {
        if self.sent.contains(user_id) {
            return Ok(());
        }
        append_line(&self.path, user_id)?;
        self.sent.insert(user_id.to_owned());
        Ok(())
    }
}
