/// Session and token issuance
///
/// Signed short-lived access tokens and opaque, rotatable refresh sessions.

mod tokens;

pub use tokens::{AccessClaims, TokenService};

use serde::{Deserialize, Serialize};

/// Access + refresh pair returned on successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}
