//! Reply templates posted into a monitored message's thread.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Default phrases used to nudge reviewers.
pub const CHECK_IN_PHRASES: [&str; 4] = ["How's this going", "What's the latest", "Any update", "Don't forget about me"];

/// Notice posted when nobody has picked the message up yet.
pub const UNREVIEWED_NOTICE: &str = "This is not currently being reviewed or has not been approved yet!";

/// Renders each user as a Slack user reference, in order, with no separator.
pub fn render_mentions<S: AsRef<str>>(users: &[S]) -> String {
    users.iter().map(|user| format!("<@{}>", user.as_ref())).collect()
}

/// The parent message body, prefixed with the mention list when there is one.
pub fn parent_message(mentions: &[String], message: &str) -> String {
    if mentions.is_empty() {
        message.to_string()
    } else {
        format!("{} {}", render_mentions(mentions), message)
    }
}

pub fn resolved_reply(approvers: &[String]) -> String {
    format!("This message has been resolved by {}", render_mentions(approvers))
}

pub fn check_in_reply(phrase: &str, reviewers: &[String]) -> String {
    format!("{} {}?", phrase, render_mentions(reviewers))
}

pub fn unreviewed_reply(mentions: &[String]) -> String {
    if mentions.is_empty() {
        UNREVIEWED_NOTICE.to_string()
    } else {
        format!("{} {}", render_mentions(mentions), UNREVIEWED_NOTICE)
    }
}

/// Picks check-in phrases from a single random source seeded once.
///
/// Cloning shares the underlying generator.
#[derive(Clone)]
pub struct PhrasePicker {
    phrases: Arc<[String]>,
    rng: Arc<Mutex<StdRng>>,
}

impl PhrasePicker {
    /// Seeds the generator from OS entropy.
    pub fn new(phrases: Vec<String>) -> Self {
        Self::with_rng(phrases, StdRng::from_entropy())
    }

    /// Deterministic picker, mostly useful for tests.
    pub fn seeded(phrases: Vec<String>, seed: u64) -> Self {
        Self::with_rng(phrases, StdRng::seed_from_u64(seed))
    }

    fn with_rng(phrases: Vec<String>, rng: StdRng) -> Self {
        let phrases = if phrases.is_empty() { CHECK_IN_PHRASES.iter().map(|p| p.to_string()).collect() } else { phrases };

        Self {
            phrases: phrases.into(),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn pick(&self) -> &str {
        let index = self.rng.lock().gen_range(0..self.phrases.len());
        &self.phrases[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        CHECK_IN_PHRASES.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_render_mentions_preserves_order() {
        assert_eq!(render_mentions(&["U1", "U2"]), "<@U1><@U2>");
        assert_eq!(render_mentions(&["U2", "U1", "U2"]), "<@U2><@U1><@U2>");
        assert_eq!(render_mentions::<&str>(&[]), "");
    }

    #[test]
    fn test_parent_message() {
        assert_eq!(parent_message(&["U1".to_string()], "Please review"), "<@U1> Please review");
        assert_eq!(parent_message(&[], "Please review"), "Please review");
    }

    #[test]
    fn test_replies() {
        assert_eq!(resolved_reply(&["U3".to_string()]), "This message has been resolved by <@U3>");
        assert_eq!(check_in_reply("Any update", &["U2".to_string(), "U4".to_string()]), "Any update <@U2><@U4>?");
        assert_eq!(unreviewed_reply(&["U1".to_string()]), "<@U1> This is not currently being reviewed or has not been approved yet!");
        assert_eq!(unreviewed_reply(&[]), UNREVIEWED_NOTICE);
    }

    #[test]
    fn test_picker_only_returns_known_phrases() {
        let picker = PhrasePicker::seeded(defaults(), 7);

        for _ in 0..100 {
            assert!(CHECK_IN_PHRASES.contains(&picker.pick()));
        }
    }

    #[test]
    fn test_picker_is_deterministic_per_seed() {
        let a = PhrasePicker::seeded(defaults(), 42);
        let b = PhrasePicker::seeded(defaults(), 42);

        let a: Vec<String> = (0..20).map(|_| a.pick().to_string()).collect();
        let b: Vec<String> = (0..20).map(|_| b.pick().to_string()).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_picker_falls_back_to_defaults() {
        let picker = PhrasePicker::seeded(Vec::new(), 1);

        for _ in 0..20 {
            assert!(CHECK_IN_PHRASES.contains(&picker.pick()));
        }
    }
}
