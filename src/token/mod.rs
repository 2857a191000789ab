//! Claim sealing and redemption.
//!
//! A [`Claim`] is serialized to JSON with an RFC 3339 `issued_at`, sealed with
//! [`codec::encrypt`], and carried as a URL path segment. [`verify`] reverses
//! each step and rejects the claim once it is older than [`TTL`].
//!
//! Redemption is not tracked: the same string verifies any number of times
//! until it expires.

pub mod codec;
pub mod redeem;

pub use codec::TokenKey;
pub use redeem::{ACK_EMOJI, Redeemed, redeem};

use crate::Error;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Validity window of a redemption string, counted from `issued_at`.
pub const TTL: Duration = Duration::minutes(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub subject_id: String,
    pub display_name: String,
    pub role_id: String,
    pub message_ref: String,
    pub issued_at: DateTime<Utc>,
}

/// Wire form of a [`Claim`]; `issued_at` stays a string until [`verify`] parses it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClaimPayload {
    subject_id: String,
    display_name: String,
    role_id: String,
    message_ref: String,
    issued_at: String,
}

impl From<&Claim> for ClaimPayload {
    fn from(claim: &Claim) -> Self {
        Self {
            subject_id: claim.subject_id.clone(),
            display_name: claim.display_name.clone(),
            role_id: claim.role_id.clone(),
            message_ref: claim.message_ref.clone(),
            issued_at: claim.issued_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Seal a claim into a redemption string.
///
/// # Errors
/// Returns [`Error::Encode`] if serialization or encryption fails.
#[instrument(skip_all, fields(subject_id = %claim.subject_id, role_id = %claim.role_id))]
pub fn issue(key: &TokenKey, claim: &Claim) -> Result<String, Error> {
    let payload = serde_json::to_vec(&ClaimPayload::from(claim))
        .map_err(|e| Error::Encode(e.to_string()))?;

    codec::encrypt(key, &payload)
}

/// Open a redemption string and check that it is still fresh at `now`.
///
/// Tokens issued in the future are accepted; only the upper bound is enforced.
///
/// # Errors
/// - [`Error::Decode`] if the string cannot be decrypted,
/// - [`Error::MalformedClaim`] if the payload is not a claim or `issued_at` is not RFC 3339,
/// - [`Error::Expired`] if `now` is past `issued_at + TTL`.
#[instrument(skip_all)]
pub fn verify(key: &TokenKey, redemption: &str, now: DateTime<Utc>) -> Result<Claim, Error> {
    let plaintext = codec::decrypt(key, redemption)?;

    let payload: ClaimPayload = serde_json::from_slice(&plaintext)
        .map_err(|e| Error::MalformedClaim(e.to_string()))?;

    let issued_at = DateTime::parse_from_rfc3339(&payload.issued_at)
        .map_err(|e| Error::MalformedClaim(format!("invalid issued_at: {e}")))?
        .with_timezone(&Utc);

    if now > issued_at + TTL {
        debug!(%issued_at, %now, "redemption string expired");
        return Err(Error::Expired);
    }

    Ok(Claim {
        subject_id: payload.subject_id,
        display_name: payload.display_name,
        role_id: payload.role_id,
        message_ref: payload.message_ref,
        issued_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};
    use chrono::TimeZone;

    fn key() -> TokenKey {
        TokenKey::new([9u8; codec::KEY_LEN])
    }

    fn claim() -> Claim {
        Claim {
            subject_id: "80351110224678912".to_string(),
            display_name: "Tod".to_string(),
            role_id: "41771983423143936".to_string(),
            message_ref: "1181919166437048380".to_string(),
            issued_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).single().unwrap_or_default(),
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_issue_verify_roundtrip() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();
        let verified = verify(&key(), &secret, claim.issued_at).unwrap();
        assert_eq!(verified, claim);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_roundtrip_keeps_subsecond_precision() {
        let mut claim = claim();
        claim.issued_at += Duration::milliseconds(123);
        let secret = issue(&key(), &claim).unwrap();
        assert_eq!(verify(&key(), &secret, claim.issued_at).unwrap(), claim);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_expiry_boundary() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();

        let just_inside = claim.issued_at + TTL - Duration::seconds(1);
        assert!(verify(&key(), &secret, just_inside).is_ok());

        let exactly = claim.issued_at + TTL;
        assert!(verify(&key(), &secret, exactly).is_ok());

        let just_outside = claim.issued_at + TTL + Duration::seconds(1);
        assert!(matches!(
            verify(&key(), &secret, just_outside),
            Err(Error::Expired)
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_future_issued_at_is_accepted() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();
        let an_hour_early = claim.issued_at - Duration::hours(1);
        assert!(verify(&key(), &secret, an_hour_early).is_ok());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_same_string_verifies_twice() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();
        let first = verify(&key(), &secret, claim.issued_at).unwrap();
        let second = verify(&key(), &secret, claim.issued_at + Duration::seconds(30)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_tampering_never_yields_a_different_claim() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();

        for i in 0..secret.len() {
            let mut chars: Vec<char> = secret.chars().collect();
            chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
            let tampered: String = chars.into_iter().collect();

            match verify(&key(), &tampered, claim.issued_at) {
                Err(Error::Decode | Error::MalformedClaim(_)) => {}
                // Only the unused low bits of the final character changed.
                Ok(same) => assert_eq!(same, claim, "flip at {i} produced a different claim"),
                Err(other) => panic!("unexpected error at {i}: {other}"),
            }
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_wrong_key_is_decode_error() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();
        let other = TokenKey::new([8u8; codec::KEY_LEN]);
        assert!(matches!(
            verify(&other, &secret, claim.issued_at),
            Err(Error::Decode)
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_missing_field_is_malformed() {
        let sealed = codec::encrypt(
            &key(),
            br#"{"subject_id":"1","display_name":"Tod","role_id":"2","issued_at":"2026-10-18T09:30:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(
            verify(&key(), &sealed, Utc::now()),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_mistyped_field_is_malformed() {
        let sealed = codec::encrypt(
            &key(),
            br#"{"subject_id":1,"display_name":"Tod","role_id":"2","message_ref":"3","issued_at":"2026-10-18T09:30:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(
            verify(&key(), &sealed, Utc::now()),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_relative_issued_at_is_malformed() {
        let sealed = codec::encrypt(
            &key(),
            br#"{"subject_id":"1","display_name":"Tod","role_id":"2","message_ref":"3","issued_at":"5 minutes ago"}"#,
        )
        .unwrap();
        assert!(matches!(
            verify(&key(), &sealed, Utc::now()),
            Err(Error::MalformedClaim(_))
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_payload_uses_absolute_timestamp() {
        let claim = claim();
        let secret = issue(&key(), &claim).unwrap();
        let raw = codec::decrypt(&key(), &secret).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["issued_at"], "2026-10-18T09:30:00Z");
        assert_eq!(json["display_name"], "Tod");

        // URL path segment safe
        assert!(Base64UrlUnpadded::decode_vec(&secret).is_ok());
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
