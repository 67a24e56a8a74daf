use std::sync::Arc;

use app_sanitizer::{MessageProps, OutboundNotification, TransportError};
use tracing::{debug, info};

use crate::queue::record::QueueRecord;

/// The chat service replies are delivered through.
#[async_trait::async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Send `text` to the chat, returning the id of the sent message.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        props: &MessageProps,
    ) -> Result<i32, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to decode queue record: `{0}`")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
impl DeliveryError {
    /// Whether delivering the same record again could succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Delivers queued replies back to the chat they came from.
#[derive(Clone)]
pub struct OutboundSender {
    provider: Arc<dyn MessagingProvider>,
}
impl OutboundSender {
    pub fn new(provider: Arc<dyn MessagingProvider>) -> Self {
        Self { provider }
    }

    #[tracing::instrument(name = "deliver", skip_all, fields(record = %record.id(), receive_count = record.receive_count()))]
    pub async fn deliver(&self, record: &QueueRecord) -> Result<i32, DeliveryError> {
        debug!(body = record.body(), "Processing element");

        let notification: OutboundNotification = serde_json::from_str(record.body())?;

        let sent_id = self
            .provider
            .send_message(
                notification.chat_id,
                &notification.text,
                &notification.props,
            )
            .await?;

        info!(chat = notification.chat_id, sent_id, "Sent reply");

        Ok(sent_id)
    }
}
