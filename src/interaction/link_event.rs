use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::Void,
    bot::BotRegistry,
    service::{chat::ChatClient, metrics},
};

#[instrument(skip_all)]
pub fn handle_message(text: String, channel_id: String, registry: BotRegistry, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = handle_message_internal(&text, &channel_id, &registry, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all)]
pub async fn handle_message_internal(text: &str, channel_id: &str, registry: &BotRegistry, chat: &ChatClient) -> Void {
    for bot in registry.bots() {
        for key in bot.matches(text) {
            // Failures are isolated per (bot, key) pair; one bad lookup never
            // suppresses the other replies.
            match bot.message(&key).await {
                Ok(reply) => {
                    if let Err(err) = chat.send_message(channel_id, &reply).await {
                        error!("Failed to send reply for {key}: {err}");
                        continue;
                    }

                    metrics::count_message_sent(channel_id);
                }
                Err(err) if err.is_not_found() => info!("No record for {key}: {err}"),
                Err(err) => error!("Lookup failed for {key}: {err}"),
            }
        }
    }

    Ok(())
}
