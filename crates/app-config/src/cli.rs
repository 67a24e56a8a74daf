use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::{common, telegram_bot};

/// A Telegram bot that replies to messages with copies of their links
/// stripped of tracking parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(disable_help_flag = true)]
pub struct CliArgs {
    /// Print help
    #[clap(action = ArgAction::Help, long)]
    help: Option<bool>,

    #[command(subcommand)]
    pub command: Option<common::Command>,

    #[command(flatten)]
    pub run: common::RunConfig,

    #[command(flatten)]
    pub server: common::ServerConfig,

    #[command(flatten)]
    pub sanitizer: common::SanitizerConfig,

    #[command(flatten)]
    pub queue: common::QueueConfig,

    #[command(flatten)]
    pub telegram_bot: telegram_bot::TelegramBotConfig,
}
