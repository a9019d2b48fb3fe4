//! Upload of survey records to `JSONBin`.
//!
//! One POST per submission, no retries. Each record becomes its own bin,
//! optionally filed under a collection.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StorageConfig;
use crate::models::survey::SurveyRecord;
use crate::{AppError, Result};

/// Header carrying the account master key.
pub const MASTER_KEY_HEADER: &str = "X-Master-Key";
/// Header naming the collection a new bin is filed under.
pub const COLLECTION_HEADER: &str = "X-Collection-Id";

#[derive(Serialize)]
struct BinBody<'a> {
    data: &'a SurveyRecord,
}

#[derive(Deserialize)]
struct CreateBinResponse {
    metadata: BinMetadata,
}

#[derive(Deserialize)]
struct BinMetadata {
    id: String,
}

/// Client for the bin-storage REST API.
pub struct BinStorage {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    collection_id: Option<String>,
}

impl BinStorage {
    /// Build a client from storage settings.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/b", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            collection_id: config
                .collection_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
        }
    }

    /// URL new bins are created at.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Store a record as a new bin and return the bin ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the request cannot be sent, the
    /// service answers with anything other than 200/201, or the response
    /// lacks `metadata.id`.
    pub async fn upload(&self, record: &SurveyRecord) -> Result<String> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(MASTER_KEY_HEADER, &self.api_key)
            .json(&BinBody { data: record });
        if let Some(ref collection) = self.collection_id {
            request = request.header(COLLECTION_HEADER, collection);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AppError::Storage(format!("upload request failed: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "upload rejected with {status}: {body}"
            )));
        }

        let created: CreateBinResponse = response
            .json()
            .await
            .map_err(|err| AppError::Storage(format!("unexpected upload response: {err}")))?;

        info!(bin_id = %created.metadata.id, user_id = %record.user_id, "record uploaded");
        Ok(created.metadata.id)
    }
}
