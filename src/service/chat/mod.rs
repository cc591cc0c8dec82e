pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ReactionSnapshot, Res};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the platform calls the monitor loop relies on. The
/// client is shared by every live session, so implementations must tolerate
/// concurrent calls.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Post a top-level message to a channel.
    ///
    /// Returns the timestamp that identifies the posted message.
    async fn post_message(&self, channel_id: &str, text: &str) -> Res<String>;

    /// Post a reply in the thread of an existing message.
    async fn post_reply(&self, channel_id: &str, thread_ts: &str, text: &str) -> Res<String>;

    /// List the names of every emoji known to the workspace.
    async fn list_emoji(&self) -> Res<Vec<String>>;

    /// Get the reactions on a message, keyed by emoji name.
    async fn get_reactions(&self, channel_id: &str, message_ts: &str) -> Res<ReactionSnapshot>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }

    /// Fetch a fresh reaction snapshot for a message.
    ///
    /// Every workspace emoji is present in the snapshot, with the reactions on
    /// the message layered over the empty entries.
    pub async fn snapshot(&self, channel_id: &str, message_ts: &str) -> Res<ReactionSnapshot> {
        let emoji = self.list_emoji().await?;
        let reactions = self.get_reactions(channel_id, message_ts).await?;

        let mut snapshot = reactions;
        for name in emoji {
            snapshot.seed(name);
        }

        Ok(snapshot)
    }
}
