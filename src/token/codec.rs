use crate::Error;
use base64ct::{Base64UrlUnpadded, Encoding};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const AAD: &[u8] = b"rolegate-claim:v1";

/// Shared secret used to seal and open redemption strings.
pub struct TokenKey(SecretBox<[u8; KEY_LEN]>);

impl TokenKey {
    #[must_use]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    /// Build a key from the first 32 bytes of a passphrase.
    ///
    /// # Errors
    /// Returns an error if the passphrase is shorter than 32 bytes.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, String> {
        let bytes = passphrase.as_bytes();
        let head = bytes.get(..KEY_LEN).ok_or_else(|| {
            format!(
                "passphrase must be at least {KEY_LEN} bytes long, got {}",
                bytes.len()
            )
        })?;

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(head);
        Ok(Self::new(key))
    }

    fn expose(&self) -> &[u8; KEY_LEN] {
        self.0.expose_secret()
    }
}

impl Clone for TokenKey {
    fn clone(&self) -> Self {
        Self::new(*self.expose())
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenKey([REDACTED])")
    }
}

/// Seals `plaintext` and returns `base64url(nonce (12 bytes) || ciphertext)`.
///
/// # Errors
/// Returns an error if encryption fails.
#[allow(deprecated)]
pub fn encrypt(key: &TokenKey, plaintext: &[u8]) -> Result<String, Error> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.expose()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: AAD,
            },
        )
        .map_err(|e| Error::Encode(format!("encryption failure: {e}")))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    Ok(Base64UrlUnpadded::encode_string(&sealed))
}

/// Opens a string produced by [`encrypt`].
///
/// Anything not sealed under `key`, or altered after sealing, fails with
/// [`Error::Decode`].
///
/// # Errors
/// Returns [`Error::Decode`] on bad encoding, short input, or authentication failure.
#[allow(deprecated)]
pub fn decrypt(key: &TokenKey, sealed: &str) -> Result<Vec<u8>, Error> {
    let data = Base64UrlUnpadded::decode_vec(sealed).map_err(|_| Error::Decode)?;
    if data.len() < NONCE_LEN {
        return Err(Error::Decode);
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.expose()));

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: AAD,
            },
        )
        .map_err(|_| Error::Decode)
}
