//! Runtime services and shared state for linkbot.

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{error, instrument, warn};

use crate::{
    base::{
        config::Config,
        logging::LogControl,
        types::{Res, Void},
    },
    bot::BotRegistry,
    interaction::slash_command::SlashCommand,
    service::chat::ChatClient,
};

/// A second chat failure inside this window ends the process; outside it,
/// the listener is assumed to have run healthily for a while and restarts.
const FAILURE_ESCALATION_WINDOW: Duration = Duration::from_secs(60);

/// Runtime service context that can be shared across the application.
///
/// This struct holds the bot registry, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The running bots.
    pub registry: BotRegistry,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config, log: LogControl) -> Res<Self> {
        // Build the bots.
        let registry = BotRegistry::from_config(&config)?;

        // Initialize the control plane.
        let control = SlashCommand::new(registry.clone(), log);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, registry.clone(), control).await?;

        Ok(Self { config, registry, chat })
    }

    /// Run the chat listener, restarting it when it fails.
    ///
    /// One failure gets a restart; two failures inside
    /// [`FAILURE_ESCALATION_WINDOW`] mean something is persistently wrong and
    /// the error is escalated to the caller.
    pub async fn start(&self) -> Void {
        let mut last_failure: Option<Instant> = None;

        loop {
            match self.chat.start().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    let now = Instant::now();

                    if let Some(previous) = last_failure
                        && now.duration_since(previous) < FAILURE_ESCALATION_WINDOW
                    {
                        error!("Chat listener failed twice in quick succession.");
                        return Err(err).context("chat listener failed repeatedly");
                    }

                    warn!("Chat listener failed, restarting: {err}");
                    last_failure = Some(now);
                }
            }
        }
    }
}
