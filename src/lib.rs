//! Library root for `linkbot`.
//!
//! Linkbot is a Slack bot that turns issue keys and ticket numbers mentioned
//! in channels into enriched links. It is designed to:
//! - Match configurable key patterns in every channel message
//! - Look up matched keys against an issue tracker or service-management backend
//! - Reply with a link, a rotating quip, and a short record summary
//! - Offer a `/linkbot` slash command for runtime control
//!
//! The bot integrates with Slack over socket mode and reaches its backends
//! through an HTTP session that signs in through the identity provider when
//! redirected. The architecture is built around extensible traits that allow
//! for different implementations of each service.

pub mod base;
pub mod bot;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, logging::LogControl, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the linkbot runtime:
/// - Initializes the crypto provider
/// - Starts the Prometheus exporter when a metrics port is configured
/// - Creates the runtime context with the bot registry and chat client
/// - Starts the main event loop for processing messages
pub async fn start(config: Config, log: LogControl) -> Void {
    info!("Starting linkbot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Start the metrics exporter, if configured.
    if let Some(port) = config.metrics_port {
        service::metrics::serve(port)?;
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config, log).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
