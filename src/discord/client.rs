use super::{ChatRoom, Embed, Role};
use crate::{APP_USER_AGENT, Error};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, instrument};
use url::form_urlencoded::byte_serialize;

pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";

/// Discord REST implementation of [`ChatRoom`].
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    api_url: String,
    token: SecretString,
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct CurrentUser {
    id: String,
}

impl DiscordClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, token: SecretString) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.token.expose_secret()),
            )
    }

    async fn send(&self, action: &'static str, request: RequestBuilder) -> Result<Response, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::action(action, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or_default();

            return Err(Error::action(
                action,
                format!(
                    "{}, {}",
                    status,
                    json_response["message"].as_str().unwrap_or_default()
                ),
            ));
        }

        Ok(response)
    }
}

/// Percent-encode an emoji for use as a path segment.
#[must_use]
pub fn encode_emoji(emoji: &str) -> String {
    byte_serialize(emoji.as_bytes()).collect()
}

#[async_trait]
impl ChatRoom for DiscordClient {
    #[instrument(skip(self))]
    async fn current_user_id(&self) -> Result<String, Error> {
        const ACTION: &str = "fetch current user";
        let response = self
            .send(ACTION, self.request(Method::GET, "/users/@me"))
            .await?;
        let user: CurrentUser = response
            .json()
            .await
            .map_err(|e| Error::action(ACTION, e))?;

        Ok(user.id)
    }

    #[instrument(skip(self, content))]
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error> {
        let request = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(&json!({ "content": content }));
        self.send("send message", request).await?;

        Ok(())
    }

    #[instrument(skip(self, embed))]
    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<(), Error> {
        let request = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(&json!({ "embeds": [embed] }));
        self.send("send embed", request).await?;

        Ok(())
    }

    #[instrument(skip(self, nickname))]
    async fn set_nickname(
        &self,
        guild_id: &str,
        user_id: &str,
        nickname: &str,
    ) -> Result<(), Error> {
        let request = self
            .request(Method::PATCH, &format!("/guilds/{guild_id}/members/{user_id}"))
            .json(&json!({ "nick": nickname }));
        self.send("set nickname", request).await?;

        debug!("nickname updated");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<(), Error> {
        let request = self
            .request(
                Method::PUT,
                &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            )
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send("grant role", request).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), Error> {
        let request = self
            .request(
                Method::PUT,
                &format!(
                    "/channels/{channel_id}/messages/{message_id}/reactions/{}/@me",
                    encode_emoji(emoji)
                ),
            )
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send("add reaction", request).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>, Error> {
        const ACTION: &str = "list roles";
        let response = self
            .send(
                ACTION,
                self.request(Method::GET, &format!("/guilds/{guild_id}/roles")),
            )
            .await?;

        response.json().await.map_err(|e| Error::action(ACTION, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() -> anyhow::Result<()> {
        let client = DiscordClient::new(
            "https://discord.com/api/v10/",
            SecretString::from("token".to_string()),
        )?;
        assert_eq!(
            client.endpoint("/guilds/1/roles"),
            "https://discord.com/api/v10/guilds/1/roles"
        );
        Ok(())
    }

    #[test]
    fn test_debug_hides_token() -> anyhow::Result<()> {
        let client = DiscordClient::new(DEFAULT_API_URL, SecretString::from("s3cr3t".to_string()))?;
        assert!(!format!("{client:?}").contains("s3cr3t"));
        Ok(())
    }

    #[test]
    fn test_encode_emoji() {
        assert_eq!(encode_emoji("🥳"), "%F0%9F%A5%B3");
    }

    #[test]
    fn test_roles_deserialize_ignoring_extra_fields() -> anyhow::Result<()> {
        let roles: Vec<Role> = serde_json::from_str(
            r#"[{"id":"1","name":"@everyone","color":0,"position":0},{"id":"2","name":"Research","hoist":false}]"#,
        )?;
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[1].name, "Research");
        Ok(())
    }
}
