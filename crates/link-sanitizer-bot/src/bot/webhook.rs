use teloxide::prelude::*;
use tracing::{info, warn};
use url::Url;

use super::TelegramBot;

/// Tells the messaging provider where to deliver updates.
///
/// Both calls are idempotent.
#[async_trait::async_trait]
pub trait WebhookRegistrar: Send + Sync {
    async fn set_webhook(&self, url: Url, drop_pending_updates: bool) -> anyhow::Result<()>;

    async fn delete_webhook(&self, drop_pending_updates: bool) -> anyhow::Result<()>;
}

/// Whether Telegram would deliver to the path the server listens on.
pub fn delivers_to_path(url: &Url, webhook_path: &str) -> bool {
    url.path().trim_end_matches('/') == webhook_path.trim_end_matches('/')
}

pub async fn register<R: WebhookRegistrar + ?Sized>(
    registrar: &R,
    url: Url,
    webhook_path: &str,
    drop_pending_updates: bool,
) -> anyhow::Result<()> {
    if !delivers_to_path(&url, webhook_path) {
        warn!(%url, webhook_path, "Webhook URL does not point at the configured webhook path");
    }

    registrar.set_webhook(url, drop_pending_updates).await
}

#[async_trait::async_trait]
impl WebhookRegistrar for TelegramBot {
    async fn set_webhook(&self, url: Url, drop_pending_updates: bool) -> anyhow::Result<()> {
        self.bot
            .set_webhook(url.clone())
            .drop_pending_updates(drop_pending_updates)
            .await?;

        info!(%url, drop_pending_updates, "Webhook set");

        Ok(())
    }

    async fn delete_webhook(&self, drop_pending_updates: bool) -> anyhow::Result<()> {
        self.bot
            .delete_webhook()
            .drop_pending_updates(drop_pending_updates)
            .await?;

        info!(drop_pending_updates, "Webhook deleted");

        Ok(())
    }
}
