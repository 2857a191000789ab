//! # Rolegate
//!
//! `rolegate` grants a chat-room role and nickname to a member only after they
//! prove control of an internal email address.
//!
//! ## Flow
//!
//! 1. A member posts `Nickname, Role, email` in the verification channel.
//! 2. The [`command`] parser splits the message and screens the email against
//!    the configured allow-pattern.
//! 3. The requested role is matched against the room's live role list by the
//!    [`roles`] resolver (exact case-insensitive match first, then similarity).
//! 4. A [`token::Claim`] is sealed into an opaque, URL-safe redemption string
//!    and mailed as a link.
//! 5. `GET /verify/{secret}` opens the claim, checks it is no older than
//!    [`token::TTL`], and applies the nickname and role.
//!
//! ## Stateless tokens
//!
//! Nothing is persisted. A redemption string stays valid until it expires and
//! may be redeemed more than once inside its window; there is no revocation list
//! and no single-use marker.

pub mod api;
pub mod cli;
pub mod command;
pub mod discord;
pub mod email;
pub mod error;
pub mod roles;
pub mod token;

pub use error::Error;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
