//! Inbound event dispatcher.
//!
//! Events arrive on an `mpsc` queue and each one is handled in its own task.
//! Handlers share only read-only state: the settings and the two outbound
//! clients. Role lists are fetched per message and never cached.

use super::{ChatEvent, ChatRoom, Embed, EmbedField};
use crate::{
    Error,
    cli::globals::GlobalArgs,
    command::{self, VerifyRequest},
    email::{EmailBody, EmailPayload, Mailer},
    error::CONTENT_FORMAT,
    roles,
    token::{self, Claim},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};

const WELCOME_COLOR: u32 = 3_071_986;
const EXAMPLE: &str = "Tod, Research, tossaporn_tem@true-e-logistics.com";
const EVERYONE: &str = "@everyone";
const FAILURE_REPLY: &str = "Something went wrong, please try again";

/// What happened to a single inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not addressed to us (own message or another channel/guild).
    Ignored,
    /// The member was told why the request was refused.
    Rejected(&'static str),
    /// Verification link mailed.
    LinkSent { role_id: String },
    /// Welcome embed posted.
    Welcomed,
}

#[derive(Clone)]
pub struct Dispatcher {
    globals: Arc<GlobalArgs>,
    room: Arc<dyn ChatRoom>,
    mailer: Arc<dyn Mailer>,
    bot_user_id: String,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        globals: Arc<GlobalArgs>,
        room: Arc<dyn ChatRoom>,
        mailer: Arc<dyn Mailer>,
        bot_user_id: String,
    ) -> Self {
        Self {
            globals,
            room,
            mailer,
            bot_user_id,
        }
    }

    /// Drain the queue until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<ChatEvent>) {
        while let Some(event) = rx.recv().await {
            let dispatcher = self.clone();
            let span = info_span!("chat.event", event.kind = event_kind(&event));
            tokio::spawn(
                async move {
                    match dispatcher.handle(event).await {
                        Ok(outcome) => debug!(?outcome, "event handled"),
                        Err(e) => error!(error.kind = e.kind(), "event failed: {e}"),
                    }
                }
                .instrument(span),
            );
        }

        info!("event queue closed");
    }

    /// Handle one event to completion.
    ///
    /// # Errors
    /// Returns the error that terminated the unit of work. Member-facing
    /// rejections have already been replied to by then.
    pub async fn handle(&self, event: ChatEvent) -> Result<Outcome, Error> {
        match event {
            ChatEvent::MessageCreate {
                author_id,
                author_name,
                channel_id,
                guild_id,
                message_id,
                content,
            } => {
                if author_id == self.bot_user_id || channel_id != self.globals.channel_id {
                    return Ok(Outcome::Ignored);
                }

                if guild_id != self.globals.guild_id {
                    warn!(%author_id, %author_name, %guild_id, "message from unexpected guild");
                    return Ok(Outcome::Ignored);
                }

                let message = Message {
                    author_id: &author_id,
                    author_name: &author_name,
                    message_id: &message_id,
                    content: &content,
                };
                self.handle_message(&message).await
            }
            ChatEvent::MemberJoin { user_id, user_name } => {
                self.welcome(&user_id, &user_name).await?;
                Ok(Outcome::Welcomed)
            }
        }
    }

    async fn handle_message(&self, message: &Message<'_>) -> Result<Outcome, Error> {
        let request = match command::parse(message.content) {
            Ok(request) => request,
            Err(e) => return self.reject(message, e, "format").await,
        };

        if let Err(e) = command::check_email(&self.globals.email_pattern, &request.email) {
            return self.reject(message, e, "email").await;
        }

        let candidates = match self.room.guild_roles(&self.globals.guild_id).await {
            Ok(roles) => roles
                .into_iter()
                .filter(|role| role.name != EVERYONE)
                .collect::<Vec<_>>(),
            Err(e) => return self.reject(message, e, "role").await,
        };
        let found = match roles::resolve(&request.role_name, &candidates) {
            Ok(found) if found.score >= self.globals.role_min_score => found,
            Ok(found) => {
                debug!(score = found.score, candidate = %found.role.name, "best role below floor");
                let e = Error::RoleNotFound(request.role_name.clone());
                return self.reject(message, e, "role").await;
            }
            Err(e) => return self.reject(message, e, "role").await,
        };

        debug!(
            requested = %request.role_name,
            resolved = %found.role.name,
            score = found.score,
            "role resolved"
        );

        let claim = Claim {
            subject_id: message.author_id.to_string(),
            display_name: request.display_name.clone(),
            role_id: found.role.id.clone(),
            message_ref: message.message_id.to_string(),
            issued_at: Utc::now(),
        };
        let sent = match token::issue(&self.globals.key, &claim) {
            Ok(secret) => {
                self.send_link(message, &request, &found.role.name, &secret)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            return self.reject(message, e, "link").await;
        }

        let confirmation = format!(
            "Verify link sent to your email ({})\nLink will expire in {} minutes",
            request.email,
            token::TTL.num_minutes()
        );
        self.room
            .send_message(&self.globals.channel_id, &message.reply(&confirmation))
            .await?;

        info!(subject_id = %claim.subject_id, role_id = %claim.role_id, "verification link sent");

        Ok(Outcome::LinkSent {
            role_id: claim.role_id,
        })
    }

    async fn send_link(
        &self,
        message: &Message<'_>,
        request: &VerifyRequest,
        role_name: &str,
        secret: &str,
    ) -> Result<(), Error> {
        let payload = EmailPayload {
            sender: self.globals.email_sender.clone(),
            receiver: request.email.clone(),
            subject: self.globals.email_subject.clone(),
            data: EmailBody {
                verify_link: self.globals.verify_link(secret),
                discord_name: message.author_name.to_string(),
                profile_name: request.display_name.clone(),
                role: role_name.to_string(),
            },
        };

        self.mailer
            .send(&payload)
            .await
            .map_err(|e| Error::action("send email", format!("{e:#}")))
    }

    /// Tell the member what was wrong, then end the unit of work.
    ///
    /// Internal failures get a generic reply and are still returned as errors.
    async fn reject(
        &self,
        message: &Message<'_>,
        e: Error,
        reason: &'static str,
    ) -> Result<Outcome, Error> {
        let Some(text) = rejection_reply(&e) else {
            if let Err(send) = self
                .room
                .send_message(&self.globals.channel_id, &message.reply(FAILURE_REPLY))
                .await
            {
                warn!("Cannot report failure to member: {send}");
            }
            return Err(e);
        };

        debug!(error.kind = e.kind(), "request rejected");
        self.room
            .send_message(&self.globals.channel_id, &message.reply(&text))
            .await?;

        Ok(Outcome::Rejected(reason))
    }

    async fn welcome(&self, user_id: &str, user_name: &str) -> Result<(), Error> {
        let role_list = match self.room.guild_roles(&self.globals.guild_id).await {
            Ok(roles) => roles
                .iter()
                .filter(|role| role.name != EVERYONE)
                .enumerate()
                .map(|(i, role)| format!("{}. {}", i + 1, role.name))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                warn!("Cannot list roles for welcome message: {e}");
                String::new()
            }
        };

        let embed = welcome_embed(user_name, &role_list);
        self.room
            .send_embed(&self.globals.channel_id, &embed)
            .await?;

        debug!(%user_id, "welcome sent");

        Ok(())
    }
}

struct Message<'a> {
    author_id: &'a str,
    author_name: &'a str,
    message_id: &'a str,
    content: &'a str,
}

impl Message<'_> {
    /// Quote the request, then the text, then mention the author.
    fn reply(&self, text: &str) -> String {
        let quoted = self
            .content
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{quoted}\n{text}\n<@{}>", self.author_id)
    }
}

fn rejection_reply(e: &Error) -> Option<String> {
    match e {
        Error::Format { expected } => Some(format!("Message must be in the format \"{expected}\"")),
        Error::EmailRejected => Some("Please proceed with an internal email".to_string()),
        Error::RoleNotFound(name) => Some(format!("Role \"{name}\" not found")),
        Error::NoCandidates => Some("No roles are available right now".to_string()),
        _ => None,
    }
}

fn event_kind(event: &ChatEvent) -> &'static str {
    match event {
        ChatEvent::MessageCreate { .. } => "message_create",
        ChatEvent::MemberJoin { .. } => "member_join",
    }
}

fn welcome_embed(user_name: &str, role_list: &str) -> Embed {
    let mut fields = vec![EmbedField {
        name: "Format".to_string(),
        value: format!("```{CONTENT_FORMAT}```"),
    }];

    if !role_list.is_empty() {
        fields.push(EmbedField {
            name: "Roles".to_string(),
            value: format!("```md\n{role_list}```"),
        });
    }

    fields.push(EmbedField {
        name: "Example".to_string(),
        value: format!("```{EXAMPLE}```"),
    });

    Embed {
        title: format!("Hello `@{user_name}`, welcome to the community :heart:"),
        description: "Please introduce yourself by sending a message to this channel".to_string(),
        color: WELCOME_COLOR,
        fields,
    }
}
