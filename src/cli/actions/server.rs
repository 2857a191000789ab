use crate::{
    api,
    cli::globals::GlobalArgs,
    discord::{ChatRoom, DiscordClient, Dispatcher},
    email::{HttpMailer, LogMailer, Mailer},
    token::TokenKey,
};
use anyhow::{Context, Result, anyhow};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub listen: SocketAddr,
    pub verify_base_url: String,
    pub passphrase: SecretString,
    pub role_min_score: f64,
    pub events_token: Option<SecretString>,
    pub event_queue_size: usize,
    pub discord_token: SecretString,
    pub discord_api_url: String,
    pub channel_id: String,
    pub guild_id: String,
    pub email_service_url: Option<String>,
    pub email_sender: String,
    pub email_subject: String,
    pub email_regex: String,
}

impl Args {
    /// Validate the raw arguments and build the shared settings.
    ///
    /// # Errors
    /// Returns an error for an unparseable URL or regex, a short passphrase,
    /// or a minimum score outside `[0, 1]`.
    pub fn globals(&self) -> Result<GlobalArgs> {
        let verify_base_url = Url::parse(&self.verify_base_url)
            .with_context(|| format!("Invalid verify base URL: {}", self.verify_base_url))?;

        let key = TokenKey::from_passphrase(self.passphrase.expose_secret())
            .map_err(|e| anyhow!(e))
            .context("Invalid passphrase")?;

        let email_pattern = Regex::new(&self.email_regex)
            .with_context(|| format!("Invalid email regex: {}", self.email_regex))?;

        if !(0.0..=1.0).contains(&self.role_min_score) {
            return Err(anyhow!(
                "role-min-score must be between 0.0 and 1.0, got {}",
                self.role_min_score
            ));
        }

        Ok(GlobalArgs {
            verify_base_url,
            channel_id: self.channel_id.clone(),
            guild_id: self.guild_id.clone(),
            key,
            email_pattern,
            email_sender: self.email_sender.clone(),
            email_subject: self.email_subject.clone(),
            role_min_score: self.role_min_score,
            events_token: self.events_token.clone(),
        })
    }

    fn mailer(&self) -> Result<Arc<dyn Mailer>> {
        match &self.email_service_url {
            Some(url) => {
                let url = Url::parse(url)
                    .with_context(|| format!("Invalid email service URL: {url}"))?;
                Ok(Arc::new(HttpMailer::new(url)?))
            }
            None => {
                warn!("No email service URL configured, verification emails will only be logged");
                Ok(Arc::new(LogMailer))
            }
        }
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, the bot identity cannot be
/// fetched, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let globals = Arc::new(args.globals()?);
    let mailer = args.mailer()?;

    let room: Arc<dyn ChatRoom> = Arc::new(DiscordClient::new(
        &args.discord_api_url,
        args.discord_token.clone(),
    )?);

    let bot_user_id = room
        .current_user_id()
        .await
        .context("Failed to fetch bot identity")?;

    debug!("Global args: {:?}", globals);
    info!(%bot_user_id, guild_id = %globals.guild_id, channel_id = %globals.channel_id, "bot ready");

    let (tx, rx) = mpsc::channel(args.event_queue_size.max(1));
    let dispatcher = Dispatcher::new(globals.clone(), room.clone(), mailer, bot_user_id);
    tokio::spawn(dispatcher.run(rx));

    api::new(args.listen, api::router(globals, room, tx)).await
}
