use crate::{Error, error::CONTENT_FORMAT};
use regex::Regex;

/// Default allow-pattern for internal email addresses.
pub const DEFAULT_EMAIL_REGEX: &str = r"(?i)^[0-9a-z_\-]{1,64}@[0-9a-z\-]+(\.[0-9a-z\-]+)+$";

const SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub display_name: String,
    pub role_name: String,
    pub email: String,
}

/// Split `Nickname, Role, email` into its fields. Fields past the third are ignored.
///
/// # Errors
/// Returns [`Error::Format`] if fewer than three fields are present.
pub fn parse(raw_text: &str) -> Result<VerifyRequest, Error> {
    let mut fields = raw_text.split(SEPARATOR).map(str::trim);

    match (fields.next(), fields.next(), fields.next()) {
        (Some(display_name), Some(role_name), Some(email)) => Ok(VerifyRequest {
            display_name: display_name.to_string(),
            role_name: role_name.to_string(),
            email: email.to_string(),
        }),
        _ => Err(Error::Format {
            expected: CONTENT_FORMAT,
        }),
    }
}

/// Screen an email field against the configured allow-pattern.
///
/// # Errors
/// Returns [`Error::EmailRejected`] if `email` does not match.
pub fn check_email(pattern: &Regex, email: &str) -> Result<(), Error> {
    if pattern.is_match(email) {
        Ok(())
    } else {
        Err(Error::EmailRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_pattern() -> Regex {
        Regex::new(DEFAULT_EMAIL_REGEX).unwrap_or_else(|e| panic!("default regex: {e}"))
    }

    #[test]
    fn parses_example_message() -> anyhow::Result<()> {
        let request = parse("Tod, Research, tossaporn_tem@true-e-logistics.com")?;
        assert_eq!(
            request,
            VerifyRequest {
                display_name: "Tod".to_string(),
                role_name: "Research".to_string(),
                email: "tossaporn_tem@true-e-logistics.com".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn two_fields_is_format_error() {
        let err = parse("only,two");
        assert!(matches!(err, Err(Error::Format { expected }) if expected == CONTENT_FORMAT));
    }

    #[test]
    fn empty_message_is_format_error() {
        assert!(matches!(parse(""), Err(Error::Format { .. })));
        assert!(matches!(parse("hello there"), Err(Error::Format { .. })));
    }

    #[test]
    fn extra_fields_are_ignored() -> anyhow::Result<()> {
        let request = parse("  Tod ,Research,  tod@example.com , extra, more")?;
        assert_eq!(request.display_name, "Tod");
        assert_eq!(request.role_name, "Research");
        assert_eq!(request.email, "tod@example.com");
        Ok(())
    }

    #[test]
    fn empty_fields_still_parse() -> anyhow::Result<()> {
        let request = parse(",,")?;
        assert_eq!(request.display_name, "");
        assert_eq!(request.email, "");
        Ok(())
    }

    #[test]
    fn default_pattern_accepts_internal_addresses() {
        let pattern = default_pattern();
        assert!(check_email(&pattern, "tossaporn_tem@true-e-logistics.com").is_ok());
        assert!(check_email(&pattern, "QA-Team@Drivs.io").is_ok());
    }

    #[test]
    fn default_pattern_rejects_other_addresses() {
        let pattern = default_pattern();
        for email in [
            "",
            "john.doe@example.com",
            "no-at-sign",
            "@example.com",
            "tod@localhost",
            "tod@example.com <script>",
        ] {
            assert!(
                matches!(check_email(&pattern, email), Err(Error::EmailRejected)),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn parser_accepts_what_the_gate_rejects() -> anyhow::Result<()> {
        let pattern = Regex::new(r"(?i)^[0-9a-z_\-]{1,64}@true-e-logistics\.com$")?;
        let request = parse("Tod, Research, tod@gmail.com")?;
        assert!(matches!(
            check_email(&pattern, &request.email),
            Err(Error::EmailRejected)
        ));
        Ok(())
    }
}
