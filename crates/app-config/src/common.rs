use std::borrow::Cow;

use clap::{Args, CommandFactory, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

use crate::{
    cli::CliArgs,
    validators::{
        path::{validate_is_url_path, value_parser_parse_url_path},
        url::value_parser_parse_absolute_url_as_url,
    },
    APPLICATION_NAME,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Subcommand)]
pub enum Command {
    /// Receive webhook deliveries and send the cleaned links back (default)
    #[default]
    Serve,

    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public URL Telegram should deliver updates to.
        ///
        /// Must end with the configured webhook path.
        #[arg(long, value_hint = ValueHint::Url, value_parser = value_parser_parse_absolute_url_as_url())]
        url: Url,

        /// Drop updates that were sent while no webhook was set
        #[arg(long)]
        drop_pending_updates: bool,
    },

    /// Remove the webhook from Telegram
    DeleteWebhook {
        /// Drop updates that are still waiting to be delivered
        #[arg(long)]
        drop_pending_updates: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Server options"))]
pub struct ServerConfig {
    /// The address the webhook server listens on
    #[arg(long, default_value = "0.0.0.0", env = "LINK_SANITIZER_HOST", value_hint = ValueHint::Hostname)]
    pub host: String,

    /// The port the webhook server listens on
    #[arg(long, default_value = "8000", env = "LINK_SANITIZER_PORT")]
    pub port: u16,

    /// The path Telegram delivers updates to
    #[arg(long, default_value = "/webhook", env = "LINK_SANITIZER_WEBHOOK_PATH", value_parser = value_parser_parse_url_path())]
    #[validate(custom(function = "validate_is_url_path"))]
    pub webhook_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Sanitizer options"))]
pub struct SanitizerConfig {
    /// JSON array of query parameter names to strip from links.
    ///
    /// Read on every incoming message; messages are rejected while it's missing.
    /// A sensible value: ["utm_source","utm_medium","utm_campaign","utm_name",
    /// "utm_term","utm_content","gclid","fbclid","igshid","mc_eid","mc_cid",
    /// "_hsenc","_hsmi","hsCtaTracking","t"]
    #[arg(long, value_name = "JSON_ARRAY", env = "LINK_SANITIZER_URL_BLACKLIST", value_hint = ValueHint::Other, value_parser = value_parser_parse_json_string_array())]
    pub url_blacklist: Option<String>,

    /// Text placed in front of a single cleaned link
    #[arg(long, default_value = "Ось лінк без трекінгу:", env = "LINK_SANITIZER_REPLY_SINGULAR_PREFIX", value_hint = ValueHint::Other)]
    pub reply_singular_prefix: String,

    /// Text placed in front of a comma separated list of cleaned links
    #[arg(long, default_value = "Ось лінки без трекінгу:", env = "LINK_SANITIZER_REPLY_PLURAL_PREFIX", value_hint = ValueHint::Other)]
    pub reply_plural_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Queue options"))]
pub struct QueueConfig {
    /// How many replies may be sent at the same time
    #[arg(long, default_value = "2", env = "LINK_SANITIZER_SENDER_CONCURRENCY", value_parser = clap::value_parser!(u32).range(1..=16))]
    #[validate(range(min = 1, max = 16))]
    pub sender_concurrency: u32,

    /// How many times a reply is attempted before it is dropped
    #[arg(long, default_value = "3", env = "LINK_SANITIZER_MAX_RECEIVE_COUNT", value_parser = clap::value_parser!(u32).range(1..=100))]
    #[validate(range(min = 1, max = 100))]
    pub max_receive_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpConfigType {
    Json,
    Toml,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[allow(clippy::option_option)]
#[clap(next_help_heading = Some("Run options"))]
pub struct RunConfig {
    /// Dump the config to stdout
    #[arg(long, value_enum, default_value = None)]
    pub dump_config: Option<Option<DumpConfigType>>,

    /// Dump shell completions to stdout
    #[arg(long, default_value = None, value_name = "SHELL", value_parser = hacky_dump_completions())]
    #[serde(skip)]
    pub dump_completions: Option<Shell>,
}

#[must_use]
pub fn hacky_dump_completions() -> impl clap::builder::TypedValueParser {
    move |s: &str| {
        let parsed = Shell::from_str(s, true);

        if let Ok(shell) = &parsed {
            clap_complete::generate(
                *shell,
                &mut CliArgs::command(),
                APPLICATION_NAME,
                &mut std::io::stdout(),
            );
            std::process::exit(0);
        }

        parsed.map_err(|_| ValidationError::new("Invalid shell"))
    }
}

pub fn validate_is_json_string_array<'a, T>(value: T) -> Result<(), ValidationError>
where
    T: Into<Cow<'a, str>>,
{
    serde_json::from_str::<Vec<String>>(value.into().as_ref())
        .map(drop)
        .map_err(|_| ValidationError::new("Must be a JSON array of strings"))
}

#[must_use]
pub fn value_parser_parse_json_string_array() -> impl clap::builder::TypedValueParser {
    move |s: &str| validate_is_json_string_array(s).map(|()| s.trim().to_string())
}
