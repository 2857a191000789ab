use crate::token::TokenKey;
use regex::Regex;
use secrecy::SecretString;
use url::Url;

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub verify_base_url: Url,
    pub channel_id: String,
    pub guild_id: String,
    pub key: TokenKey,
    pub email_pattern: Regex,
    pub email_sender: String,
    pub email_subject: String,
    pub role_min_score: f64,
    pub events_token: Option<SecretString>,
}

impl GlobalArgs {
    /// Redemption link for a sealed claim.
    #[must_use]
    pub fn verify_link(&self, secret: &str) -> String {
        format!(
            "{}/verify/{secret}",
            self.verify_base_url.as_str().trim_end_matches('/')
        )
    }
}
