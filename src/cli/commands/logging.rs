use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `ROLEGATE_LOG_LEVEL`, indexed by verbosity count.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts either a `-v` count (0..=5) or one of [`LEVELS`], case-insensitive.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(count) = level.parse::<u8>() {
            return if count <= 5 {
                Ok(count)
            } else {
                Err(format!("verbosity {count} is above 5"))
            };
        }

        LEVELS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(level))
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("unknown log level {level:?}, expected one of {LEVELS:?}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help(
                "Log verbosity: -v warnings such as unreachable mailers, -vv each link sent \
                 and redeemed, -vvv role match scores, -vvvv chat API traffic",
            )
            .env("ROLEGATE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(level: &str) -> Result<u8, String> {
        let command = Command::new("rolegate").arg(
            Arg::new(ARG_VERBOSITY)
                .long("level")
                .value_parser(validator_log_level()),
        );
        command
            .try_get_matches_from(["rolegate", "--level", level])
            .map(|matches| matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0))
            .map_err(|e| e.to_string())
    }

    #[test]
    fn level_names_ignore_case() {
        assert_eq!(parse("DEBUG"), Ok(3));
        assert_eq!(parse("Warn"), Ok(1));
        assert_eq!(parse("5"), Ok(5));
    }

    #[test]
    fn unknown_levels_are_rejected() {
        assert!(parse("loud").is_err());
        assert!(parse("6").is_err());
    }
}
