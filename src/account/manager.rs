/// Account storage and credential primitives
///
/// Uses sqlx runtime query building; the failed-attempt counter and lockout
/// timestamp are updated with in-row arithmetic so concurrent failures cannot
/// skip the lockout transition.
use crate::{
    account::{lockout::LockoutPolicy, password},
    clock::Clock,
    config::CoreConfig,
    db::models::{Account, Role},
    error::{AuthError, AuthResult},
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Normalize an email for lookup and uniqueness (case-fold, trim)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<CoreConfig>,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl AccountManager {
    pub fn new(db: SqlitePool, config: Arc<CoreConfig>, clock: Arc<dyn Clock>) -> Self {
        let lockout = LockoutPolicy::new(&config.lockout);
        Self {
            db,
            config,
            lockout,
            clock,
        }
    }

    pub fn lockout(&self) -> &LockoutPolicy {
        &self.lockout
    }

    /// Create a new account
    pub async fn create_account(&self, email: &str, password: &str) -> AuthResult<Account> {
        let email = normalize_email(email);
        self.validate_email(&email)?;
        self.validate_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("Email already registered".to_string()));
        }

        let password_hash = password::hash_password(password, &self.config.password).await?;
        let id = Uuid::new_v4().to_string();
        let now = self.clock.now();

        sqlx::query(
            "INSERT INTO account (id, email, password_hash, role, two_factor_enabled, failed_attempts, email_confirmed, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5)",
        )
        .bind(&id)
        .bind(&email)
        .bind(&password_hash)
        .bind(Role::User)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        info!(account_id = %id, "account created");

        Ok(Account {
            id,
            email,
            password_hash,
            role: Role::User,
            two_factor_secret: None,
            two_factor_enabled: false,
            failed_attempts: 0,
            locked_until: None,
            email_confirmed: false,
            created_at: now,
        })
    }

    /// Get account by id
    pub async fn get_account(&self, id: &str) -> AuthResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM account WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)?
            .ok_or_else(|| AuthError::NotFound("Account not found".to_string()))
    }

    /// Find account by normalized email
    pub async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM account WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    /// Record one failed authentication attempt
    ///
    /// Increment and conditional lock happen in a single UPDATE; two racing
    /// failures both land and the lockout transition cannot be skipped.
    /// Returns the counter value and lock expiry after the update.
    pub async fn record_failed_attempt(
        &self,
        account_id: &str,
    ) -> AuthResult<(i64, Option<DateTime<Utc>>)> {
        let now = self.clock.now();
        let lock_candidate = now + chrono::Duration::seconds(self.config.lockout.duration_secs);

        sqlx::query(
            "UPDATE account
                SET failed_attempts = failed_attempts + 1,
                    locked_until = CASE
                        WHEN failed_attempts + 1 >= ?1 THEN ?2
                        ELSE locked_until
                    END
              WHERE id = ?3",
        )
        .bind(self.lockout.max_attempts())
        .bind(lock_candidate)
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        let row = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            "SELECT failed_attempts, locked_until FROM account WHERE id = ?1",
        )
        .bind(account_id)
        .fetch_one(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if row.1.is_some_and(|until| until > now) {
            warn!(account_id = %account_id, attempts = row.0, "account locked after repeated failures");
        }

        Ok(row)
    }

    /// Clear the failure counter and lock after a fully successful authentication
    pub async fn reset_failed_attempts(&self, account_id: &str) -> AuthResult<()> {
        sqlx::query("UPDATE account SET failed_attempts = 0, locked_until = NULL WHERE id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Store a freshly generated TOTP secret; does not enable 2FA
    pub async fn set_two_factor_secret(&self, account_id: &str, secret: &str) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE account SET two_factor_secret = ?1, two_factor_enabled = 0 WHERE id = ?2",
        )
        .bind(secret)
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound("Account not found".to_string()));
        }

        Ok(())
    }

    /// Flip the enabled flag; requires a provisioned secret
    pub async fn enable_two_factor(&self, account_id: &str) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE account SET two_factor_enabled = 1
              WHERE id = ?1 AND two_factor_secret IS NOT NULL",
        )
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::TwoFactorSetupRequired);
        }

        info!(account_id = %account_id, "two-factor authentication enabled");
        Ok(())
    }

    /// Clear the secret and the enabled flag
    pub async fn disable_two_factor(&self, account_id: &str) -> AuthResult<()> {
        sqlx::query(
            "UPDATE account SET two_factor_secret = NULL, two_factor_enabled = 0 WHERE id = ?1",
        )
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        info!(account_id = %account_id, "two-factor authentication disabled");
        Ok(())
    }

    /// Mark the account email as confirmed
    pub async fn confirm_email(&self, account_id: &str) -> AuthResult<()> {
        sqlx::query("UPDATE account SET email_confirmed = 1 WHERE id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    fn validate_email(&self, email: &str) -> AuthResult<()> {
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }
}
