/// TOTP code generation and validation (RFC 6238)
///
/// SHA-1, 6 digits, 30-second step, with a skew of one step either side so a
/// code from the previous or next window still validates under clock drift.
use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Utc};
use rand::RngCore;
use totp_rs::{Algorithm, Secret, TOTP};

const DIGITS: usize = 6;
const STEP: u64 = 30;
const SKEW: u8 = 1;
/// 160 bits of secret material, per RFC 4226's recommendation
const SECRET_BYTES: usize = 20;

/// TOTP engine
#[derive(Debug, Clone)]
pub struct TotpEngine {
    issuer: String,
}

impl TotpEngine {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Generate a fresh base32-encoded secret from OS randomness
    pub fn generate_secret(&self) -> String {
        let mut bytes = vec![0u8; SECRET_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Secret::Raw(bytes).to_encoded().to_string()
    }

    /// Build the otpauth:// URI consumed by authenticator apps
    ///
    /// QR rendering is a presentation concern left to the caller.
    pub fn provisioning_uri(&self, email: &str, secret: &str) -> String {
        format!(
            "otpauth://totp/{}:{}?secret={}&issuer={}&algorithm=SHA1&digits={}&period={}",
            urlencoding::encode(&self.issuer),
            urlencoding::encode(email),
            secret,
            urlencoding::encode(&self.issuer),
            DIGITS,
            STEP,
        )
    }

    /// Secret grouped for manual entry into an authenticator app
    pub fn manual_entry_format(&self, secret: &str) -> String {
        secret
            .as_bytes()
            .chunks(4)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validate a code against the current, previous, and next time step
    pub fn validate(&self, secret: &str, code: &str, now: DateTime<Utc>) -> AuthResult<bool> {
        let totp = self.build(secret)?;
        Ok(totp.check(code, now.timestamp() as u64))
    }

    /// Current code for a secret; used when proving possession during enable
    pub fn current_code(&self, secret: &str, clock: &dyn Clock) -> AuthResult<String> {
        let totp = self.build(secret)?;
        Ok(totp.generate(clock.now().timestamp() as u64))
    }

    fn build(&self, secret: &str) -> AuthResult<TOTP> {
        let secret_bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| AuthError::Internal(format!("TOTP secret invalid: {:?}", e)))?;

        TOTP::new(Algorithm::SHA1, DIGITS, SKEW, STEP, secret_bytes)
            .map_err(|e| AuthError::Internal(format!("TOTP construction failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn engine() -> TotpEngine {
        TotpEngine::new("Stronghold")
    }

    #[test]
    fn secret_is_160_bits_of_base32() {
        let secret = engine().generate_secret();
        // 20 bytes encode to 32 base32 characters without padding
        assert_eq!(secret.len(), 32);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));

        assert_ne!(secret, engine().generate_secret());
    }

    #[test]
    fn provisioning_uri_is_wellformed() {
        let uri = engine().provisioning_uri("a@x.com", "JBSWY3DPEHPK3PXP");
        assert!(uri.starts_with("otpauth://totp/Stronghold:a%40x.com?"));
        assert!(uri.contains("secret=JBSWY3DPEHPK3PXP"));
        assert!(uri.contains("issuer=Stronghold"));
        assert!(uri.contains("digits=6"));
        assert!(uri.contains("period=30"));
    }

    #[test]
    fn manual_entry_groups_by_four() {
        let formatted = engine().manual_entry_format("JBSWY3DPEHPK3PXP");
        assert_eq!(formatted, "JBSW Y3DP EHPK 3PXP");
    }

    #[test]
    fn accepts_adjacent_steps_rejects_two_away() {
        let eng = engine();
        let secret = eng.generate_secret();
        let now = Utc::now();

        let secret_bytes = Secret::Encoded(secret.clone()).to_bytes().unwrap();
        let totp = TOTP::new(Algorithm::SHA1, 6, 1, 30, secret_bytes).unwrap();

        let at = |offset: i64| totp.generate((now + Duration::seconds(offset)).timestamp() as u64);

        assert!(eng.validate(&secret, &at(0), now).unwrap());
        assert!(eng.validate(&secret, &at(-30), now).unwrap());
        assert!(eng.validate(&secret, &at(30), now).unwrap());

        // Two steps away must fail, unless the code happens to collide
        let far_past = at(-60);
        let far_future = at(60);
        if far_past != at(0) && far_past != at(-30) && far_past != at(30) {
            assert!(!eng.validate(&secret, &far_past, now).unwrap());
        }
        if far_future != at(0) && far_future != at(-30) && far_future != at(30) {
            assert!(!eng.validate(&secret, &far_future, now).unwrap());
        }
    }

    #[test]
    fn rejects_wrong_code() {
        let eng = engine();
        let secret = eng.generate_secret();
        assert!(!eng.validate(&secret, "000000", Utc::now()).unwrap());
    }
}
