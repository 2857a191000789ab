//! Map validated CLI arguments to an action.

use crate::cli::{
    actions::{Action, server::Args},
    commands::{self, discord, email},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::net::SocketAddr;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let listen = matches
        .get_one::<SocketAddr>(commands::ARG_LISTEN)
        .copied()
        .context("missing required argument: --listen")?;
    let verify_base_url = matches
        .get_one::<String>(commands::ARG_VERIFY_BASE_URL)
        .cloned()
        .context("missing required argument: --verify-base-url")?;
    let passphrase = matches
        .get_one::<String>(commands::ARG_PASSPHRASE)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --passphrase")?;

    let discord_opts = discord::Options::parse(matches)?;
    let email_opts = email::Options::parse(matches);

    Ok(Action::Server(Args {
        listen,
        verify_base_url,
        passphrase,
        role_min_score: matches
            .get_one::<f64>(commands::ARG_ROLE_MIN_SCORE)
            .copied()
            .unwrap_or(0.0),
        events_token: matches
            .get_one::<String>(commands::ARG_EVENTS_TOKEN)
            .cloned()
            .map(SecretString::from),
        event_queue_size: matches
            .get_one::<usize>(commands::ARG_EVENT_QUEUE_SIZE)
            .copied()
            .unwrap_or(256),
        discord_token: discord_opts.token,
        discord_api_url: discord_opts.api_url,
        channel_id: discord_opts.channel_id,
        guild_id: discord_opts.guild_id,
        email_service_url: email_opts.service_url,
        email_sender: email_opts.sender,
        email_subject: email_opts.subject,
        email_regex: email_opts.regex,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn maps_matches_to_server_args() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "rolegate",
            "--verify-base-url",
            "https://verify.example.com",
            "--passphrase",
            "P4S$W0Rd_Th41_5i2e_32_by7E_long!",
            "--discord-token",
            "bot-token",
            "--channel-id",
            "c1",
            "--guild-id",
            "g1",
            "--events-token",
            "relay",
        ])?;

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.verify_base_url, "https://verify.example.com");
        assert_eq!(args.passphrase.expose_secret(), "P4S$W0Rd_Th41_5i2e_32_by7E_long!");
        assert_eq!(args.channel_id, "c1");
        assert_eq!(args.guild_id, "g1");
        assert_eq!(
            args.events_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("relay".to_string())
        );
        assert_eq!(args.event_queue_size, 256);
        assert_eq!(args.email_sender, crate::email::DEFAULT_SENDER);
        Ok(())
    }
}
