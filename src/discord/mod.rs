//! Chat room boundary.
//!
//! [`ChatRoom`] is the set of calls the core makes back into the room;
//! [`ChatEvent`] is what the room feeds in through the dispatcher queue.

pub mod client;
pub mod dispatcher;

pub use client::DiscordClient;
pub use dispatcher::Dispatcher;

use crate::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

/// Inbound unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageCreate {
        author_id: String,
        author_name: String,
        channel_id: String,
        guild_id: String,
        message_id: String,
        content: String,
    },
    MemberJoin {
        user_id: String,
        user_name: String,
    },
}

/// Calls the core makes into the chat room. Every call is a single attempt.
#[async_trait]
pub trait ChatRoom: Send + Sync {
    async fn current_user_id(&self) -> Result<String, Error>;

    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error>;

    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<(), Error>;

    async fn set_nickname(&self, guild_id: &str, user_id: &str, nickname: &str)
        -> Result<(), Error>;

    async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<(), Error>;

    async fn add_reaction(&self, channel_id: &str, message_id: &str, emoji: &str)
        -> Result<(), Error>;

    /// Current roles of the guild, in the order the room reports them.
    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>, Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{ChatRoom, Embed, Role};
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    pub const BOT_ID: &str = "bot";

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        SendMessage {
            channel_id: String,
            content: String,
        },
        SendEmbed {
            channel_id: String,
            embed: Embed,
        },
        SetNickname {
            guild_id: String,
            user_id: String,
            nickname: String,
        },
        AddRole {
            guild_id: String,
            user_id: String,
            role_id: String,
        },
        AddReaction {
            channel_id: String,
            message_id: String,
            emoji: String,
        },
    }

    /// Records successful calls; calls named in `failing` return [`Error::Action`].
    #[derive(Clone, Default)]
    pub struct RecordingRoom {
        calls: Arc<Mutex<Vec<Call>>>,
        roles: Vec<Role>,
        failing: Vec<&'static str>,
    }

    impl RecordingRoom {
        pub fn with_roles(names: &[&str]) -> Self {
            let roles = names
                .iter()
                .enumerate()
                .map(|(i, name)| Role {
                    id: format!("r{}", i + 1),
                    name: (*name).to_string(),
                })
                .collect();
            Self {
                roles,
                ..Self::default()
            }
        }

        #[must_use]
        pub fn failing(mut self, action: &'static str) -> Self {
            self.failing.push(action);
            self
        }

        #[allow(clippy::unwrap_used)]
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        #[allow(clippy::unwrap_used)]
        fn record(&self, action: &'static str, call: Call) -> Result<(), Error> {
            if self.failing.contains(&action) {
                return Err(Error::action(action, "500 Internal Server Error"));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    #[async_trait]
    impl ChatRoom for RecordingRoom {
        async fn current_user_id(&self) -> Result<String, Error> {
            Ok(BOT_ID.to_string())
        }

        async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error> {
            self.record(
                "send message",
                Call::SendMessage {
                    channel_id: channel_id.into(),
                    content: content.into(),
                },
            )
        }

        async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<(), Error> {
            self.record(
                "send embed",
                Call::SendEmbed {
                    channel_id: channel_id.into(),
                    embed: embed.clone(),
                },
            )
        }

        async fn set_nickname(
            &self,
            guild_id: &str,
            user_id: &str,
            nickname: &str,
        ) -> Result<(), Error> {
            self.record(
                "set nickname",
                Call::SetNickname {
                    guild_id: guild_id.into(),
                    user_id: user_id.into(),
                    nickname: nickname.into(),
                },
            )
        }

        async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<(), Error> {
            self.record(
                "grant role",
                Call::AddRole {
                    guild_id: guild_id.into(),
                    user_id: user_id.into(),
                    role_id: role_id.into(),
                },
            )
        }

        async fn add_reaction(
            &self,
            channel_id: &str,
            message_id: &str,
            emoji: &str,
        ) -> Result<(), Error> {
            self.record(
                "add reaction",
                Call::AddReaction {
                    channel_id: channel_id.into(),
                    message_id: message_id.into(),
                    emoji: emoji.into(),
                },
            )
        }

        async fn guild_roles(&self, _guild_id: &str) -> Result<Vec<Role>, Error> {
            if self.failing.contains(&"list roles") {
                return Err(Error::action("list roles", "500 Internal Server Error"));
            }
            Ok(self.roles.clone())
        }
    }
}
