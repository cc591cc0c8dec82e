//! Registry of live monitoring sessions.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::base::types::MonitorRequest;

/// Runtime state for one monitored message.
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    pub id: Uuid,
    pub channel: String,
    pub mentions: Vec<String>,
    pub interval: Duration,
    pub started_at: DateTime<Utc>,
}

impl MonitoringSession {
    pub fn new(request: &MonitorRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: request.channel.clone(),
            mentions: request.mentions.clone(),
            interval: Duration::from_secs(request.reminder_interval_minutes.saturating_mul(60)),
            started_at: Utc::now(),
        }
    }
}

/// Entry kept for each registered session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub channel: String,
    pub started_at: DateTime<Utc>,
    pub cancel: CancellationToken,
}

/// Maps session ids to their cancellation handles.
///
/// Trivially cloneable; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session and returns the token its loop should watch.
    pub fn register(&self, session: &MonitoringSession) -> CancellationToken {
        let cancel = CancellationToken::new();

        self.sessions.insert(
            session.id,
            SessionHandle {
                channel: session.channel.clone(),
                started_at: session.started_at,
                cancel: cancel.clone(),
            },
        );

        debug!(session = %session.id, "Session registered");

        cancel
    }

    /// Returns a guard that drops the session from the registry when it goes out of scope.
    pub fn guard(&self, id: Uuid) -> SessionGuard {
        SessionGuard { sessions: self.clone(), id }
    }

    /// Drops a session from the registry without cancelling it.
    pub fn remove(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.remove(id).map(|(_, handle)| handle)
    }

    /// Cancels a session. Returns `false` if it is not registered.
    pub fn cancel(&self, id: &Uuid) -> bool {
        match self.sessions.get(id) {
            Some(handle) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every registered session and returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut count = 0;

        for entry in self.sessions.iter() {
            entry.cancel.cancel();
            count += 1;
        }

        count
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Removes its session from the registry on drop, including while unwinding.
pub struct SessionGuard {
    sessions: SessionRegistry,
    id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.sessions.remove(&self.id) {
            info!(session = %self.id, channel = %handle.channel, "Session ended after {}s", (Utc::now() - handle.started_at).num_seconds());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(minutes: u64) -> MonitorRequest {
        MonitorRequest {
            channel: "C1".to_string(),
            mentions: vec!["U1".to_string()],
            message: "Please review".to_string(),
            reminder_interval_minutes: minutes,
        }
    }

    #[test]
    fn test_session_interval_is_in_minutes() {
        let session = MonitoringSession::new(&request(3));

        assert_eq!(session.interval, Duration::from_secs(180));
        assert_eq!(session.channel, "C1");
        assert_eq!(session.mentions, vec!["U1".to_string()]);
    }

    #[test]
    fn test_register_cancel_remove() {
        let registry = SessionRegistry::new();
        let a = MonitoringSession::new(&request(1));
        let b = MonitoringSession::new(&request(1));

        let token_a = registry.register(&a);
        let token_b = registry.register(&b);
        assert_eq!(registry.len(), 2);

        assert!(registry.cancel(&a.id));
        assert!(token_a.is_cancelled());
        assert!(!token_b.is_cancelled());

        assert!(registry.remove(&a.id).is_some());
        assert!(!registry.contains(&a.id));
        assert!(!registry.cancel(&a.id));

        assert_eq!(registry.cancel_all(), 1);
        assert!(token_b.is_cancelled());
    }

    #[test]
    fn test_guard_removes_session_on_drop() {
        let registry = SessionRegistry::new();
        let session = MonitoringSession::new(&request(1));
        registry.register(&session);

        {
            let _guard = registry.guard(session.id);
            assert!(registry.contains(&session.id));
        }

        assert!(registry.is_empty());
    }

    #[test]
    fn test_guard_removes_session_on_panic() {
        let registry = SessionRegistry::new();
        let session = MonitoringSession::new(&request(1));
        registry.register(&session);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = registry.guard(session.id);
            panic!("session task blew up");
        }));

        assert!(result.is_err());
        assert!(!registry.contains(&session.id));
    }
}
