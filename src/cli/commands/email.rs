use crate::{command::DEFAULT_EMAIL_REGEX, email};
use clap::{Arg, ArgMatches, Command};

pub const ARG_EMAIL_SERVICE_URL: &str = "email-service-url";
pub const ARG_EMAIL_SENDER: &str = "email-sender";
pub const ARG_EMAIL_SUBJECT: &str = "email-subject";
pub const ARG_EMAIL_REGEX: &str = "email-regex";

#[derive(Debug)]
pub struct Options {
    pub service_url: Option<String>,
    pub sender: String,
    pub subject: String,
    pub regex: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let value = |name: &str, default: &str| {
            matches
                .get_one::<String>(name)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            service_url: matches.get_one::<String>(ARG_EMAIL_SERVICE_URL).cloned(),
            sender: value(ARG_EMAIL_SENDER, email::DEFAULT_SENDER),
            subject: value(ARG_EMAIL_SUBJECT, email::DEFAULT_SUBJECT),
            regex: value(ARG_EMAIL_REGEX, DEFAULT_EMAIL_REGEX),
        }
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL_SERVICE_URL)
                .long(ARG_EMAIL_SERVICE_URL)
                .help("Email service endpoint; verification emails are only logged when unset")
                .env("ROLEGATE_EMAIL_SERVICE_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_SENDER)
                .long(ARG_EMAIL_SENDER)
                .help("Sender address of verification emails")
                .env("ROLEGATE_EMAIL_SENDER")
                .default_value(email::DEFAULT_SENDER),
        )
        .arg(
            Arg::new(ARG_EMAIL_SUBJECT)
                .long(ARG_EMAIL_SUBJECT)
                .help("Subject of verification emails")
                .env("ROLEGATE_EMAIL_SUBJECT")
                .default_value(email::DEFAULT_SUBJECT),
        )
        .arg(
            Arg::new(ARG_EMAIL_REGEX)
                .long(ARG_EMAIL_REGEX)
                .help("Pattern an address must match to receive a verification link")
                .env("ROLEGATE_EMAIL_REGEX")
                .default_value(DEFAULT_EMAIL_REGEX),
        )
}
