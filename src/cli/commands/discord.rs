use crate::discord::client::DEFAULT_API_URL;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_DISCORD_TOKEN: &str = "discord-token";
pub const ARG_DISCORD_API_URL: &str = "discord-api-url";
pub const ARG_CHANNEL_ID: &str = "channel-id";
pub const ARG_GUILD_ID: &str = "guild-id";

#[derive(Debug)]
pub struct Options {
    pub token: SecretString,
    pub api_url: String,
    pub channel_id: String,
    pub guild_id: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let required = |name: &str| -> anyhow::Result<String> {
            matches
                .get_one::<String>(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{name}"))
        };

        Ok(Self {
            token: SecretString::from(required(ARG_DISCORD_TOKEN)?),
            api_url: required(ARG_DISCORD_API_URL)?,
            channel_id: required(ARG_CHANNEL_ID)?,
            guild_id: required(ARG_GUILD_ID)?,
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DISCORD_TOKEN)
                .long(ARG_DISCORD_TOKEN)
                .help("Bot token used for the chat REST API")
                .env("ROLEGATE_DISCORD_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_DISCORD_API_URL)
                .long(ARG_DISCORD_API_URL)
                .help("Base URL of the chat REST API")
                .env("ROLEGATE_DISCORD_API_URL")
                .default_value(DEFAULT_API_URL),
        )
        .arg(
            Arg::new(ARG_CHANNEL_ID)
                .long(ARG_CHANNEL_ID)
                .help("Channel where members request verification")
                .env("ROLEGATE_CHANNEL_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_GUILD_ID)
                .long(ARG_GUILD_ID)
                .help("Guild whose roles are granted")
                .env("ROLEGATE_GUILD_ID")
                .required(true),
        )
}
