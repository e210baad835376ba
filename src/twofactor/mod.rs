/// Two-factor authentication
///
/// TOTP code generation/validation, single-use recovery codes, and the sealed
/// temp token that bridges the password and 2FA legs of login.

pub mod recovery;
pub mod temp_token;
pub mod totp;

pub use recovery::RecoveryCodeVault;
pub use temp_token::TempTokenProtector;
pub use totp::TotpEngine;

use serde::{Deserialize, Serialize};

/// Response to a 2FA setup request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetup {
    /// Base32 secret, shown exactly once
    pub secret: String,
    /// otpauth:// URI for QR rendering
    pub provisioning_uri: String,
    /// Secret grouped for manual entry
    pub manual_entry_format: String,
}

/// Response when 2FA is enabled or codes are regenerated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryCodeBatch {
    /// Plaintext codes, shown exactly once
    pub recovery_codes: Vec<String>,
    pub count: usize,
}
