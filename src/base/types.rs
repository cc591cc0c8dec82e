use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Wire form of a monitoring request, as posted to `/message`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorRequestPayload {
    pub channel: String,
    #[serde(default)]
    pub mentions: Option<Vec<String>>,
    pub message: String,
    #[serde(default, rename = "reminderIntervals")]
    pub reminder_intervals: Option<u64>,
}

/// An accepted monitoring request with its effective reminder interval resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorRequest {
    pub channel: String,
    pub mentions: Vec<String>,
    pub message: String,
    pub reminder_interval_minutes: u64,
}

/// Point-in-time view of who reacted with what on a message.
///
/// Users are kept in the order the platform reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSnapshot {
    reactions: HashMap<String, Vec<String>>,
}

impl ReactionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an emoji with no reacting users, unless it is already present.
    pub fn seed(&mut self, emoji: impl Into<String>) {
        self.reactions.entry(emoji.into()).or_default();
    }

    /// Sets the users that reacted with `emoji`, replacing any previous entry.
    pub fn set(&mut self, emoji: impl Into<String>, users: Vec<String>) {
        self.reactions.insert(emoji.into(), users);
    }

    /// Users that reacted with `emoji`; empty when nobody did.
    pub fn users(&self, emoji: &str) -> &[String] {
        self.reactions.get(emoji).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ReactionSnapshot
where
    K: Into<String>,
    V: IntoIterator<Item = String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            reactions: iter.into_iter().map(|(k, v)| (k.into(), v.into_iter().collect())).collect(),
        }
    }
}

/// Outcome of a single poll of a monitored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Approved { approvers: Vec<String> },
    Reviewing { reviewers: Vec<String> },
    Unreviewed,
}
