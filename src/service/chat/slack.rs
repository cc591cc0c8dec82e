//! Slack implementation of the chat service.
//!
//! This module provides the platform calls the monitor loop needs:
//! - Posting parent messages and thread replies
//! - Listing workspace emoji
//! - Retrieving the reactions on a message

use crate::base::{
    config::Config,
    types::{ReactionSnapshot, Res},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        Ok(SlackChatClient::new(config).await?.into())
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    ///
    /// The token is checked against `auth.test` so a bad credential fails at startup.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_access_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Validate the token.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.map_err(|e| anyhow::anyhow!("Failed to authenticate with Slack: {}", e))?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self { bot_token, client })
    }

    /// Posts `text` to a channel, optionally as a reply in `thread_ts`.
    async fn chat_post(&self, channel_id: &str, thread_ts: Option<&str>, text: &str) -> Res<String> {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .opt_thread_ts(thread_ts.map(|ts| SlackTs(ts.to_string())))
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(response.ts.0)
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self, text))]
    async fn post_message(&self, channel_id: &str, text: &str) -> Res<String> {
        self.chat_post(channel_id, None, text).await
    }

    #[instrument(skip(self, text))]
    async fn post_reply(&self, channel_id: &str, thread_ts: &str, text: &str) -> Res<String> {
        self.chat_post(channel_id, Some(thread_ts), text).await
    }

    #[instrument(skip(self))]
    async fn list_emoji(&self) -> Res<Vec<String>> {
        let session = self.client.open_session(&self.bot_token);

        let response = session.emoji_list().await.map_err(|e| anyhow::anyhow!("Failed to retrieve emoji list: {}", e))?;

        Ok(response.emoji.into_keys().map(|name| name.0).collect())
    }

    #[instrument(skip(self))]
    async fn get_reactions(&self, channel_id: &str, message_ts: &str) -> Res<ReactionSnapshot> {
        let request = SlackApiReactionsGetRequest::new()
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_timestamp(SlackTs(message_ts.to_string()))
            .with_full(true);

        let session = self.client.open_session(&self.bot_token);

        let response = session.reactions_get(&request).await.map_err(|e| anyhow::anyhow!("Failed to retrieve reactions: {}", e))?;

        let reactions = match response {
            SlackApiReactionsGetResponse::Message(found) => found.message.content.reactions,
            SlackApiReactionsGetResponse::File(_) => {
                debug!("Reactions target is a file, not a message");
                None
            }
        };

        let snapshot = snapshot_from_reactions(reactions.unwrap_or_default());
        debug!("Retrieved {} reactions", snapshot.len());

        Ok(snapshot)
    }
}

/// Converts Slack reactions into `name -> users` pairs.
fn snapshot_from_reactions(reactions: Vec<SlackReaction>) -> ReactionSnapshot {
    reactions.into_iter().map(|reaction| (reaction.name.0, reaction.users.into_iter().map(|user| user.0).collect::<Vec<_>>())).collect()
}

// Tests.
