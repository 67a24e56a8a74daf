pub mod webhook;

use app_config::telegram_bot::TelegramBotConfig;
use app_sanitizer::{ConfigError, MessageProps, TransportError};
use teloxide::{
    adaptors::trace,
    prelude::*,
    requests::RequesterExt,
    types::{MessageId, ReplyParameters},
};
use tracing::info;
use url::Url;

use crate::sender::MessagingProvider;

pub type TeloxideBot = trace::Trace<teloxide::Bot>;

/// The Bot API client replies and webhook calls go through.
#[derive(Clone)]
pub struct TelegramBot {
    bot: TeloxideBot,
}
impl TelegramBot {
    pub fn new(token: &str, api_url: Url) -> Self {
        let bot = teloxide::Bot::new(token)
            .set_api_url(api_url)
            .trace(trace::Settings::TRACE_EVERYTHING);

        Self { bot }
    }

    pub fn from_config(config: &TelegramBotConfig) -> Result<Self, ConfigError> {
        let token = config
            .bot_token()
            .ok_or(ConfigError::Missing("telegram_bot_token"))?;

        let api_url = Url::parse(&config.api_url).map_err(|e| ConfigError::Invalid {
            name: "telegram_api_url",
            reason: e.to_string(),
        })?;

        Ok(Self::new(token, api_url))
    }

    pub fn api_url(&self) -> Url {
        self.bot.inner().api_url()
    }

    /// Check the token by asking Telegram who we are.
    pub async fn log_identity(&self) -> anyhow::Result<()> {
        let me = self.bot.get_me().await?;

        info!(api_url = ?self.api_url().as_str(), id = ?me.id, user = ?me.username(), name = ?me.full_name(), "Bot identified");

        Ok(())
    }
}

#[async_trait::async_trait]
impl MessagingProvider for TelegramBot {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        props: &MessageProps,
    ) -> Result<i32, TransportError> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);

        if let Some(reply_to) = props.reply_to_message_id {
            req = req.reply_parameters(
                ReplyParameters::new(MessageId(reply_to)).allow_sending_without_reply(),
            );
        }

        let sent = req
            .await
            .map_err(|e| TransportError::Provider(e.to_string()))?;

        Ok(sent.id.0)
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("api_url", &self.api_url().as_str())
            .finish_non_exhaustive()
    }
}
