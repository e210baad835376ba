/// Auth database models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Account record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Normalized (lowercased) email, unique
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Opaque base32 TOTP secret; present once setup has started
    pub two_factor_secret: Option<String>,
    pub two_factor_enabled: bool,
    pub failed_attempts: i64,
    /// Lock expiry; the account is locked while this is in the future
    pub locked_until: Option<DateTime<Utc>>,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether the account is locked at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if until > now)
    }
}

/// Refresh session record
///
/// Exactly one session is live per rotation chain; rotation revokes the
/// predecessor atomically with creating the successor.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshSession {
    pub id: String,
    pub account_id: String,
    /// High-entropy opaque token value
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Recovery code record; only the hash is stored
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RecoveryCode {
    pub id: String,
    pub account_id: String,
    pub code_hash: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
