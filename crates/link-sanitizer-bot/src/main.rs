pub(crate) mod bot;
pub(crate) mod queue;
pub(crate) mod sender;
pub(crate) mod server;

use std::sync::Arc;

use app_config::{common::Command, Config};
use app_sanitizer::{MessageProcessor, ReplyTemplates};
use bot::{webhook::WebhookRegistrar, TelegramBot};
use queue::{LocalQueue, QueueProcessor};
use sender::OutboundSender;
use server::AppState;
use tracing::{debug, error, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded_dotenv = dotenvy::dotenv();

    app_logger::init();

    match loaded_dotenv {
        Ok(loaded_dotenv) => {
            debug!(path = ?loaded_dotenv, "Loaded dotenv file");
        }
        Err(e) if e.not_found() => {
            debug!("No dotenv file found");
        }
        Err(e) => {
            error!("Failed to load dotenv file: {e:?}");
            return Err(e.into());
        }
    }

    let config = Config::global();
    debug!(?config, "Running with config");

    match &config.command {
        Command::Serve => serve(config).await,
        Command::SetWebhook {
            url,
            drop_pending_updates,
        } => {
            let telegram = TelegramBot::from_config(config.telegram_bot())?;

            bot::webhook::register(
                &telegram,
                url.clone(),
                &config.server.webhook_path,
                *drop_pending_updates,
            )
            .await
        }
        Command::DeleteWebhook {
            drop_pending_updates,
        } => {
            TelegramBot::from_config(config.telegram_bot())?
                .delete_webhook(*drop_pending_updates)
                .await
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let bot = TelegramBot::from_config(config.telegram_bot())?;
    if let Err(e) = bot.log_identity().await {
        warn!(err = ?e, "Failed to fetch bot info, replies may not be delivered");
    }

    let queue = LocalQueue::new();
    let sender = OutboundSender::new(Arc::new(bot));
    tokio::task::spawn(
        QueueProcessor::new(queue.clone(), sender, config.queue.max_receive_count)
            .run(config.queue.sender_concurrency),
    );

    if config.sanitizer.url_blacklist.is_none() {
        warn!("No URL blacklist configured, every update will be rejected until one is set");
    }

    let templates = ReplyTemplates::new(
        config.sanitizer.reply_singular_prefix.as_str(),
        config.sanitizer.reply_plural_prefix.as_str(),
    );
    let state = AppState::new(
        MessageProcessor::new(Arc::new(queue), templates),
        config.sanitizer.url_blacklist.as_deref(),
    );

    server::run(state, &config.server).await
}
