//! Outbound verification email.
//!
//! [`HttpMailer`] posts the payload to an external email service; nothing is
//! read back beyond the status code. [`LogMailer`] stands in when no service
//! is configured and only logs the payload.

use crate::APP_USER_AGENT;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_SENDER: &str = "do-not-reply@mail.service.drivs.io";
pub const DEFAULT_SUBJECT: &str = "Verify email for discord channel";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPayload {
    pub sender: String,
    pub receiver: String,
    pub subject: String,
    pub data: EmailBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailBody {
    pub verify_link: String,
    pub discord_name: String,
    pub profile_name: String,
    pub role: String,
}

/// Email delivery abstraction. One attempt per call.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, payload: &EmailPayload) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: Client,
    url: Url,
}

impl HttpMailer {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, payload), fields(url = %self.url))]
    async fn send(&self, payload: &EmailPayload) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "{} - {}",
                self.url,
                response.status()
            ));
        }

        Ok(())
    }
}

/// Local dev mailer that logs the payload instead of sending it.
#[derive(Clone, Debug)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, payload: &EmailPayload) -> Result<()> {
        info!(
            receiver = %payload.receiver,
            subject = %payload.subject,
            verify_link = %payload.data.verify_link,
            "email send stub"
        );
        Ok(())
    }
}
