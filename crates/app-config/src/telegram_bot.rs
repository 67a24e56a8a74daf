use clap::{Args, ValueHint};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validators::url::validate_is_absolute_url;

pub const OFFICIAL_API_URL: &str = "https://api.telegram.org";

#[derive(Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = "Telegram bot options")]
pub struct TelegramBotConfig {
    /// The telegram bot token.
    ///
    /// Required for sending replies and managing the webhook.
    /// See API docs for more info: <https://core.telegram.org/bots/features#botfather>
    #[arg(long = "telegram-bot-token", value_name = "BOT_TOKEN", env = "LINK_SANITIZER_TELEGRAM_BOT_TOKEN", hide_env_values = true, value_hint = ValueHint::Other)]
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,

    /// The Telegram API URL for the bot to use.
    ///
    /// Can be used if a Local API server is in use <https://github.com/tdlib/telegram-bot-api>.
    #[arg(long = "telegram-api-url", default_value = OFFICIAL_API_URL, value_name = "API_URL", env = "LINK_SANITIZER_TELEGRAM_API_URL", value_hint = ValueHint::Url)]
    #[validate(custom(function = "validate_is_absolute_url"))]
    pub api_url: String,
}
impl TelegramBotConfig {
    #[must_use]
    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|x| !x.is_empty())
    }
}

impl std::fmt::Debug for TelegramBotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}
