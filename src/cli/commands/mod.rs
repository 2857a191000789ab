pub mod discord;
pub mod email;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::net::SocketAddr;

pub const ARG_LISTEN: &str = "listen";
pub const ARG_VERIFY_BASE_URL: &str = "verify-base-url";
pub const ARG_PASSPHRASE: &str = "passphrase";
pub const ARG_ROLE_MIN_SCORE: &str = "role-min-score";
pub const ARG_EVENTS_TOKEN: &str = "events-token";
pub const ARG_EVENT_QUEUE_SIZE: &str = "event-queue-size";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("rolegate")
        .about("Email-verified role assignment")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_LISTEN)
                .short('l')
                .long(ARG_LISTEN)
                .help("Address the HTTP server listens on")
                .default_value("[::]:8080")
                .env("ROLEGATE_LISTEN")
                .value_parser(clap::value_parser!(SocketAddr)),
        )
        .arg(
            Arg::new(ARG_VERIFY_BASE_URL)
                .long(ARG_VERIFY_BASE_URL)
                .help("Public base URL used to build verification links")
                .env("ROLEGATE_VERIFY_BASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSPHRASE)
                .long(ARG_PASSPHRASE)
                .help("Token key passphrase; the first 32 bytes are used")
                .env("ROLEGATE_PASSPHRASE")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ROLE_MIN_SCORE)
                .long(ARG_ROLE_MIN_SCORE)
                .help("Minimum similarity (0.0-1.0) for a typed role name to be accepted")
                .env("ROLEGATE_ROLE_MIN_SCORE")
                .default_value("0.0")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new(ARG_EVENTS_TOKEN)
                .long(ARG_EVENTS_TOKEN)
                .help("Bearer token required on POST /events")
                .env("ROLEGATE_EVENTS_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_EVENT_QUEUE_SIZE)
                .long(ARG_EVENT_QUEUE_SIZE)
                .help("Capacity of the inbound event queue")
                .env("ROLEGATE_EVENT_QUEUE_SIZE")
                .default_value("256")
                .value_parser(clap::value_parser!(usize)),
        );

    let command = discord::with_args(command);
    let command = email::with_args(command);
    logging::with_args(command)
}
