/// Sealed temp tokens for the 2FA handshake
///
/// After the password leg succeeds on a 2FA-enabled account, the client gets a
/// short-lived sealed blob carrying only {account id, issued-at}. Validity is
/// enforced by AES-256-GCM integrity plus the embedded timestamp; there is no
/// server-side row, so a token cannot be revoked, only left to expire. The
/// sealing key is derived with HKDF under a purpose label, which isolates this
/// use from anything else sealed with the same key material.
use crate::error::{AuthError, AuthResult};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const NONCE_LEN: usize = 12;

/// Fixed payload shape; validated on open
#[derive(Debug, Serialize, Deserialize)]
struct TempTokenPayload {
    /// Account id
    sub: String,
    /// Issue time, unix seconds
    iat: i64,
}

/// Seals and opens temp tokens under a purpose-scoped key
pub struct TempTokenProtector {
    key: [u8; 32],
    ttl: Duration,
}

impl TempTokenProtector {
    /// Default purpose label for the login 2FA bridge
    pub const PURPOSE_TWO_FACTOR_LOGIN: &'static str = "two-factor-login";

    pub fn new(key_material: &str, purpose: &str, ttl_secs: i64) -> AuthResult<Self> {
        let hk = Hkdf::<Sha256>::new(None, key_material.as_bytes());
        let mut key = [0u8; 32];
        hk.expand(purpose.as_bytes(), &mut key)
            .map_err(|e| AuthError::Internal(format!("HKDF expand failed: {}", e)))?;

        Ok(Self {
            key,
            ttl: Duration::seconds(ttl_secs),
        })
    }

    /// Seal {account id, now} into an opaque token
    ///
    /// Token format: base64url(nonce || ciphertext), fresh nonce per seal.
    pub fn seal(&self, account_id: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let payload = TempTokenPayload {
            sub: account_id.to_string(),
            iat: now.timestamp(),
        };
        let plaintext = serde_json::to_vec(&payload)
            .map_err(|e| AuthError::Internal(format!("Payload serialization failed: {}", e)))?;

        let cipher = Aes256Gcm::new(&self.key.into());
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|e| AuthError::Internal(format!("Temp token sealing failed: {}", e)))?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    /// Open a token, returning the account id it was sealed for
    ///
    /// Rejects on integrity failure, on `now - issued_at > ttl`, and on
    /// `issued_at > now` (clock-skew guard against far-future timestamps).
    pub fn open(&self, token: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let blob = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AuthError::TempTokenInvalid)?;

        if blob.len() <= NONCE_LEN {
            return Err(AuthError::TempTokenInvalid);
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(&self.key.into());
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AuthError::TempTokenInvalid)?;

        let payload: TempTokenPayload =
            serde_json::from_slice(&plaintext).map_err(|_| AuthError::TempTokenInvalid)?;

        let issued_at = payload.iat;
        if issued_at > now.timestamp() {
            return Err(AuthError::TempTokenInvalid);
        }
        if now.timestamp() - issued_at > self.ttl.num_seconds() {
            return Err(AuthError::TempTokenInvalid);
        }

        Ok(payload.sub)
    }
}
