//! Library root for `nudge-bot`.
//!
//! Nudge-bot posts review requests into Slack and keeps them from being forgotten:
//! - Posts the request, tagging the people who should look at it
//! - Polls the reactions on the message at a fixed interval
//! - Nudges reviewers while a "reviewing" reaction is present
//! - Re-notifies the original mentions while nobody has picked it up
//! - Stops once an "approval" reaction appears
//!
//! Requests arrive over HTTP, and each one is monitored by its own task.
//! Slack access sits behind the `GenericChatClient` trait so the loop can run
//! against other implementations.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use prelude::*;
use rustls::crypto;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the nudge-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client
/// - Serves the intake endpoint
pub async fn start(config: Config) -> Void {
    info!("Starting nudge-bot ...");

    info!("Using Approval Emoji: {}", config.approval_emoji);
    info!("Using Reviewing Emoji: {}", config.reviewing_emoji);
    info!("Reviewing Interval: {}", config.reviewing_interval);

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
