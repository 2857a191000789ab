use thiserror::Error;

/// Expected layout of a verification request, shown back to members.
pub const CONTENT_FORMAT: &str = "Nickname, Role, Internal E-mail";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot decrypt")]
    Decode,
    #[error("malformed claim: {0}")]
    MalformedClaim(String),
    #[error("token expired")]
    Expired,
    #[error("message must be in the format \"{expected}\"")]
    Format { expected: &'static str },
    #[error("please proceed with an internal email")]
    EmailRejected,
    #[error("role not found: {0}")]
    RoleNotFound(String),
    #[error("no candidate roles")]
    NoCandidates,
    #[error("cannot {action}: {reason}")]
    Action { action: &'static str, reason: String },
    #[error("cannot encode claim: {0}")]
    Encode(String),
}

impl Error {
    pub(crate) fn action(action: &'static str, reason: impl ToString) -> Self {
        Self::Action {
            action,
            reason: reason.to_string(),
        }
    }

    /// Short, stable identifier for logs and clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::MalformedClaim(_) => "malformed_claim",
            Self::Expired => "expired",
            Self::Format { .. } => "format",
            Self::EmailRejected => "email_rejected",
            Self::RoleNotFound(_) => "role_not_found",
            Self::NoCandidates => "no_candidates",
            Self::Action { .. } => "action",
            Self::Encode(_) => "encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_carries_template() {
        let err = Error::Format {
            expected: CONTENT_FORMAT,
        };
        assert_eq!(
            err.to_string(),
            "message must be in the format \"Nickname, Role, Internal E-mail\""
        );
        assert_eq!(err.kind(), "format");
    }

    #[test]
    fn action_error_names_the_action() {
        let err = Error::action("grant role", "403 Forbidden");
        assert_eq!(err.to_string(), "cannot grant role: 403 Forbidden");
    }
}
