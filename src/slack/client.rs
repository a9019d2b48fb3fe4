//! Slack Web API client for posting, updating, and listing users.

use std::sync::Arc;

use hyper_rustls::HttpsConnectorBuilder;
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiChatUpdateRequest, SlackApiToken, SlackApiTokenType,
    SlackApiTokenValue, SlackApiUsersListRequest, SlackBlock, SlackChannelId, SlackClient,
    SlackClientHyperHttpsConnector, SlackClientSession, SlackCursorId, SlackMessageContent,
    SlackTs,
};
use tracing::{debug, info};

use crate::slack::blocks;
use crate::{config::SlackConfig, AppError, Result};

const USERS_PAGE_SIZE: u16 = 200;

/// Message to be delivered to Slack via `chat.postMessage`.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    pub channel: SlackChannelId,
    pub text: Option<String>,
    pub blocks: Option<Vec<SlackBlock>>,
}

impl SlackMessage {
    /// Create a plain-text message for a channel.
    #[must_use]
    pub fn plain(channel: SlackChannelId, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: Some(text.into()),
            blocks: None,
        }
    }

    /// Create the interactive survey form addressed to a user's DM.
    #[must_use]
    pub fn survey(user_id: &str) -> Self {
        Self {
            channel: SlackChannelId(user_id.to_owned()),
            text: Some(blocks::SURVEY_FALLBACK_TEXT.to_owned()),
            blocks: Some(blocks::survey_blocks()),
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let mut content = SlackMessageContent::new();
        content.text = self.text;
        content.blocks = self.blocks;
        SlackApiChatPostMessageRequest::new(self.channel, content)
    }
}

/// A workspace member eligible to receive the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceUser {
    /// Slack user ID.
    pub id: String,
    /// Handle, when Slack returned one.
    pub name: Option<String>,
}

/// Thin wrapper around the `slack-morphism` client bound to the bot token.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
}

impl SlackService {
    /// Build the client for the configured bot token and API root.
    ///
    /// Plain `http://` roots are accepted so a local endpoint can stand in
    /// for Slack.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let https = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let connector = SlackClientHyperHttpsConnector::from(https)
            .with_slack_api_url(config.api_url.trim_end_matches('/'));
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        info!(api_url = %config.api_url, "slack client initialized");
        Ok(Self { client, bot_token })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Post a message and return its timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn post_message(&self, message: SlackMessage) -> Result<SlackTs> {
        let channel = message.channel.clone();
        let response = self
            .http_session()
            .chat_post_message(&message.into_request())
            .await
            .map_err(|err| AppError::Slack(format!("failed to post to {channel}: {err}")))?;
        debug!(%channel, ts = %response.ts, "slack message posted");
        Ok(response.ts)
    }

    /// Send the interactive survey form to a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn send_survey(&self, user_id: &str) -> Result<SlackTs> {
        self.post_message(SlackMessage::survey(user_id)).await
    }

    /// Send a plain-text direct message to a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn send_text(&self, user_id: &str, text: &str) -> Result<SlackTs> {
        self.post_message(SlackMessage::plain(SlackChannelId(user_id.to_owned()), text))
            .await
    }

    /// Replace the content of an existing message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn update_message(
        &self,
        channel: SlackChannelId,
        ts: SlackTs,
        text: &str,
        blocks: Vec<SlackBlock>,
    ) -> Result<()> {
        let mut content = SlackMessageContent::new();
        content.text = Some(text.to_owned());
        content.blocks = Some(blocks);
        let request = SlackApiChatUpdateRequest::new(channel, content, ts);
        self.http_session()
            .chat_update(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to update message: {err}")))?;
        Ok(())
    }

    /// List every human, active member of the workspace.
    ///
    /// Bots and deactivated accounts are excluded. Follows pagination
    /// cursors until Slack reports no further pages.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if any page request fails.
    pub async fn list_active_users(&self) -> Result<Vec<WorkspaceUser>> {
        let session = self.http_session();
        let mut users = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        loop {
            let request = SlackApiUsersListRequest::new()
                .with_limit(USERS_PAGE_SIZE)
                .opt_cursor(cursor.take());
            let response = session
                .users_list(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to list users: {err}")))?;

            users.extend(
                response
                    .members
                    .into_iter()
                    .filter(|member| {
                        !member.flags.is_bot.unwrap_or(false) && !member.deleted.unwrap_or(false)
                    })
                    .map(|member| WorkspaceUser {
                        id: member.id.to_string(),
                        name: member.name,
                    }),
            );

            cursor = response
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|next| !next.0.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        info!(count = users.len(), "fetched active workspace users");
        Ok(users)
    }
}
