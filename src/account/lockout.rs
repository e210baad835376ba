/// Brute-force lockout policy
///
/// Per-account state machine: Active until the failed-attempt count reaches
/// the threshold, then Locked for a fixed window from the triggering failure.
/// The transition back to Active is implicit once the window passes, or
/// explicit on a fully successful authentication (which also zeroes the
/// counter).
use crate::config::LockoutConfig;
use crate::db::models::Account;
use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    max_attempts: i64,
    duration: Duration,
}

impl LockoutPolicy {
    pub fn new(config: &LockoutConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            duration: Duration::seconds(config.duration_secs),
        }
    }

    pub fn max_attempts(&self) -> i64 {
        self.max_attempts
    }

    /// Reject if the account is locked at `now`
    ///
    /// Checked before the password hash is touched, so locked accounts cost
    /// no hashing work and yield a distinct error.
    pub fn check(&self, account: &Account, now: DateTime<Utc>) -> AuthResult<()> {
        if let Some(until) = account.locked_until {
            if until > now {
                let retry_after = (until - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::ZERO);
                return Err(AuthError::AccountLocked { retry_after });
            }
        }
        Ok(())
    }

    /// Lock expiry to apply once `failed_attempts` failures have accumulated
    pub fn lock_until(&self, failed_attempts: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if failed_attempts >= self.max_attempts {
            Some(now + self.duration)
        } else {
            None
        }
    }
}
