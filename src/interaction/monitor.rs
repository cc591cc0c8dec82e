//! The per-message monitoring loop.
//!
//! Each accepted request gets one loop that posts the parent message and then,
//! once per interval, classifies the reactions on it:
//! - approval reaction present: announce the resolution and stop,
//! - reviewing reaction present: nudge the reviewers,
//! - otherwise: remind the original mentions that nobody has picked it up.

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::Span;
use uuid::Uuid;

use crate::{
    base::replies::{self, PhrasePicker},
    interaction::session::MonitoringSession,
    prelude::*,
};

/// What the loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Terminate,
}

/// Classifies a snapshot. Approval always wins over reviewing.
pub fn classify(snapshot: &ReactionSnapshot, approval_emoji: &str, reviewing_emoji: &str) -> Classification {
    let approvers = snapshot.users(approval_emoji);
    if !approvers.is_empty() {
        return Classification::Approved { approvers: approvers.to_vec() };
    }

    let reviewers = snapshot.users(reviewing_emoji);
    if !reviewers.is_empty() {
        return Classification::Reviewing { reviewers: reviewers.to_vec() };
    }

    Classification::Unreviewed
}

/// Everything a session loop needs, detached from the runtime.
#[derive(Clone)]
pub struct Monitor {
    chat: ChatClient,
    phrases: PhrasePicker,
    approval_emoji: String,
    reviewing_emoji: String,
}

impl Monitor {
    pub fn new(chat: ChatClient, phrases: PhrasePicker, approval_emoji: impl Into<String>, reviewing_emoji: impl Into<String>) -> Self {
        Self {
            chat,
            phrases,
            approval_emoji: approval_emoji.into(),
            reviewing_emoji: reviewing_emoji.into(),
        }
    }

    pub fn from_runtime(runtime: &Runtime) -> Self {
        Self::new(runtime.chat.clone(), runtime.phrases.clone(), runtime.config.approval_emoji.clone(), runtime.config.reviewing_emoji.clone())
    }

    /// Drives one message from posting through resolution.
    ///
    /// Returns an error only when the interval cannot be scheduled or the
    /// parent message cannot be posted. Failures
    /// on later ticks are logged and the next tick is a fresh attempt.
    #[instrument(name = "session", skip_all, fields(session = %session.id, channel = %session.channel, parent_ts = tracing::field::Empty))]
    pub async fn run(&self, session: MonitoringSession, message: String, cancel: CancellationToken) -> Void {
        // The first check happens one full period after posting.
        let first_tick = Instant::now().checked_add(session.interval).ok_or_else(|| anyhow!("Reminder interval of {}s is too large", session.interval.as_secs()))?;

        let text = replies::parent_message(&session.mentions, &message);
        let parent_ts = self.chat.post_message(&session.channel, &text).await?;

        Span::current().record("parent_ts", parent_ts.as_str());
        info!("Sent initial message to {}", session.channel);

        let mut ticker = interval_at(first_tick, session.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!("Monitoring cancelled before the message was resolved");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            match self.tick(&session, &parent_ts).await {
                Ok(TickOutcome::Terminate) => break,
                Ok(TickOutcome::Continue) => {}
                Err(err) => error!("Skipping tick: {}", err),
            }
        }

        Ok(())
    }

    /// Polls the reactions once and posts the matching reply.
    pub async fn tick(&self, session: &MonitoringSession, parent_ts: &str) -> Res<TickOutcome> {
        let snapshot = self.chat.snapshot(&session.channel, parent_ts).await?;

        debug!("Approvers: {:?}", snapshot.users(&self.approval_emoji));
        debug!("Reviewers: {:?}", snapshot.users(&self.reviewing_emoji));

        match classify(&snapshot, &self.approval_emoji, &self.reviewing_emoji) {
            Classification::Approved { approvers } => {
                info!("Message has been marked as resolved. Removing from loop");

                // Resolution stands even if the announcement fails.
                let reply = replies::resolved_reply(&approvers);
                if let Err(err) = self.chat.post_reply(&session.channel, parent_ts, &reply).await {
                    error!("Error sending resolution message: {}", err);
                }

                Ok(TickOutcome::Terminate)
            }
            Classification::Reviewing { reviewers } => {
                info!("Message is being reviewed by {} user(s)", reviewers.len());

                let reply = replies::check_in_reply(self.phrases.pick(), &reviewers);
                self.chat.post_reply(&session.channel, parent_ts, &reply).await?;

                Ok(TickOutcome::Continue)
            }
            Classification::Unreviewed => {
                info!("Message is not being reviewed");

                let reply = replies::unreviewed_reply(&session.mentions);
                self.chat.post_reply(&session.channel, parent_ts, &reply).await?;

                Ok(TickOutcome::Continue)
            }
        }
    }
}

/// Starts monitoring a request in its own task and returns the session id.
///
/// The session is registered before the task starts and removed when the task
/// finishes, however it finishes.
#[instrument(skip_all)]
pub fn spawn_session(runtime: &Runtime, request: MonitorRequest) -> Uuid {
    let session = MonitoringSession::new(&request);
    let id = session.id;

    let cancel = runtime.sessions.register(&session);
    let guard = runtime.sessions.guard(id);
    let monitor = Monitor::from_runtime(runtime);

    tokio::spawn(
        async move {
            let _guard = guard;

            // Process the session.
            let result = monitor.run(session, request.message, cancel).await;

            // Log any errors.
            if let Err(err) = &result {
                error!(session = %id, "Error while monitoring: {}", err);
            }
        }
        .in_current_span(),
    );

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_classify_approval_takes_priority() {
        let snapshot: ReactionSnapshot = [("white_check_mark", users(&["U3"])), ("eyes", users(&["U2"]))].into_iter().collect();

        assert_eq!(classify(&snapshot, "white_check_mark", "eyes"), Classification::Approved { approvers: users(&["U3"]) });
    }

    #[test]
    fn test_classify_reviewing() {
        let snapshot: ReactionSnapshot = [("white_check_mark", users(&[])), ("eyes", users(&["U2", "U5"]))].into_iter().collect();

        assert_eq!(classify(&snapshot, "white_check_mark", "eyes"), Classification::Reviewing { reviewers: users(&["U2", "U5"]) });
    }

    #[test]
    fn test_classify_unreviewed() {
        let snapshot: ReactionSnapshot = [("tada", users(&["U7"]))].into_iter().collect();

        assert_eq!(classify(&snapshot, "white_check_mark", "eyes"), Classification::Unreviewed);
        assert_eq!(classify(&ReactionSnapshot::new(), "white_check_mark", "eyes"), Classification::Unreviewed);
    }
}
