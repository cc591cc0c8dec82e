//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::Path, sync::Arc};

use serde::Deserialize;

use crate::base::replies;

use super::types::Res;

/// Default config file, looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Longest reminder interval the bot will schedule, in minutes (one year).
pub const MAX_REMINDER_INTERVAL_MINUTES: u64 = 60 * 24 * 365;

/// Default port for the intake listener.
fn default_port() -> u16 {
    8080
}

/// Default reminder interval, in minutes.
fn default_reviewing_interval() -> u64 {
    60
}

/// Default phrases used when nudging reviewers.
fn default_check_in_phrases() -> Vec<String> {
    replies::CHECK_IN_PHRASES.iter().map(|p| p.to_string()).collect()
}

/// Configuration for the nudge-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Port the intake listener binds to (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Slack bot token (`SLACK_ACCESS_TOKEN`).
    pub slack_access_token: String,
    /// Reaction that marks a message as resolved (`APPROVAL_EMOJI`).
    pub approval_emoji: String,
    /// Reaction that marks a message as under review (`REVIEWING_EMOJI`).
    pub reviewing_emoji: String,
    /// Reminder interval in minutes for requests that do not carry one (`REVIEWING_INTERVAL`).
    #[serde(default = "default_reviewing_interval")]
    pub reviewing_interval: u64,
    /// Phrases picked at random when nudging reviewers.
    #[serde(default = "default_check_in_phrases")]
    pub check_in_phrases: Vec<String>,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            cfg = cfg.add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)));
        }

        // Environment takes precedence over the file.
        cfg = cfg.add_source(config::Environment::with_prefix("NUDGE_BOT"));

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;

        Self::from_inner(inner)
    }

    /// Normalizes and validates an already deserialized configuration.
    pub fn from_inner(mut inner: ConfigInner) -> Res<Self> {
        inner.approval_emoji = normalize_emoji(&inner.approval_emoji);
        inner.reviewing_emoji = normalize_emoji(&inner.reviewing_emoji);

        if inner.slack_access_token.trim().is_empty() || inner.approval_emoji.is_empty() || inner.reviewing_emoji.is_empty() {
            return Err(anyhow::anyhow!("The required fields `slack_access_token`, `approval_emoji` and `reviewing_emoji` must be set."));
        }

        if inner.reviewing_interval == 0 {
            return Err(anyhow::anyhow!("Reviewing interval must be at least one minute."));
        }

        if inner.reviewing_interval > MAX_REMINDER_INTERVAL_MINUTES {
            return Err(anyhow::anyhow!("Reviewing interval must be at most {} minutes.", MAX_REMINDER_INTERVAL_MINUTES));
        }

        if inner.check_in_phrases.is_empty() {
            return Err(anyhow::anyhow!("At least one check-in phrase is required."));
        }

        Ok(Self { inner: Arc::new(inner) })
    }
}

/// Strips the surrounding colons Slack shows around emoji names (`:eyes:` -> `eyes`).
fn normalize_emoji(emoji: &str) -> String {
    emoji.trim().trim_matches(':').to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn valid_inner() -> ConfigInner {
        ConfigInner {
            port: 8080,
            slack_access_token: "xoxb-test".to_string(),
            approval_emoji: "white_check_mark".to_string(),
            reviewing_emoji: "eyes".to_string(),
            reviewing_interval: 30,
            check_in_phrases: default_check_in_phrases(),
        }
    }

    #[test]
    fn test_from_inner_normalizes_emoji() {
        let config = Config::from_inner(ConfigInner {
            approval_emoji: ":white_check_mark:".to_string(),
            reviewing_emoji: " :eyes: ".to_string(),
            ..valid_inner()
        })
        .unwrap();

        assert_eq!(config.approval_emoji, "white_check_mark");
        assert_eq!(config.reviewing_emoji, "eyes");
    }

    #[test]
    fn test_from_inner_rejects_missing_required_fields() {
        assert!(Config::from_inner(ConfigInner { slack_access_token: "".to_string(), ..valid_inner() }).is_err());
        assert!(Config::from_inner(ConfigInner { approval_emoji: "".to_string(), ..valid_inner() }).is_err());
        assert!(Config::from_inner(ConfigInner { reviewing_emoji: "::".to_string(), ..valid_inner() }).is_err());
    }

    #[test]
    fn test_from_inner_rejects_zero_interval_and_empty_phrases() {
        assert!(Config::from_inner(ConfigInner { reviewing_interval: 0, ..valid_inner() }).is_err());
        assert!(Config::from_inner(ConfigInner { check_in_phrases: vec![], ..valid_inner() }).is_err());
    }

    #[test]
    fn test_from_inner_bounds_interval() {
        assert!(Config::from_inner(ConfigInner { reviewing_interval: MAX_REMINDER_INTERVAL_MINUTES, ..valid_inner() }).is_ok());
        assert!(Config::from_inner(ConfigInner { reviewing_interval: MAX_REMINDER_INTERVAL_MINUTES + 1, ..valid_inner() }).is_err());
        assert!(Config::from_inner(ConfigInner { reviewing_interval: u64::MAX, ..valid_inner() }).is_err());
    }

    #[test]
    fn test_load_json_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"slack_access_token":"xoxb-file","approval_emoji":"white_check_mark","reviewing_emoji":"eyes"}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.slack_access_token, "xoxb-file");
        assert_eq!(config.port, default_port());
        assert_eq!(config.reviewing_interval, default_reviewing_interval());
        assert_eq!(config.check_in_phrases, default_check_in_phrases());
    }

    #[test]
    fn test_load_json_file_missing_emoji_fails() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"port":9000,"slack_access_token":"xoxb-file","reviewing_interval":5}}"#).unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }
}
