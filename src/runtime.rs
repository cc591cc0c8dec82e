//! Runtime services and shared state for the nudge-bot.

use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::{
    base::{
        config::Config,
        replies::PhrasePicker,
        types::{Res, Void},
    },
    interaction::{intake, session::SessionRegistry},
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, chat client, session registry and
/// phrase picker. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// Live monitoring sessions.
    pub sessions: SessionRegistry,
    /// Process-wide check-in phrase picker.
    pub phrases: PhrasePicker,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        let phrases = PhrasePicker::new(config.check_in_phrases.clone());

        Ok(Self {
            config,
            chat,
            sessions: SessionRegistry::new(),
            phrases,
        })
    }

    /// Serve the intake endpoint until Ctrl-C, then cancel every live session.
    pub async fn start(&self) -> Void {
        let listener = TcpListener::bind(("0.0.0.0", self.config.port)).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, intake::router(self.clone())).with_graceful_shutdown(shutdown_signal()).await?;

        let cancelled = self.sessions.cancel_all();
        info!("Shutting down, abandoning {} live session(s)", cancelled);

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
