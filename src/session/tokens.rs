/// Token service: signed access tokens and rotating refresh sessions
///
/// Access tokens are HS256 JWTs validated statelessly by any holder of the
/// key. Refresh tokens are opaque high-entropy values persisted per session;
/// rotation revokes the predecessor and creates the successor in one
/// transaction, so a partial failure leaves the old token valid (fail closed).
use crate::{
    clock::Clock,
    config::CoreConfig,
    db::models::{Account, Role},
    error::{AuthError, AuthResult},
    session::AuthTokens,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id
    pub sub: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token issuing and refresh-session service
pub struct TokenService {
    db: SqlitePool,
    config: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(db: SqlitePool, config: Arc<CoreConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { db, config, clock }
    }

    /// Mint a signed access token for the account
    pub fn issue_access_token(&self, account: &Account) -> AuthResult<String> {
        let now = self.clock.now();
        let claims = AccessClaims {
            sub: account.id.clone(),
            role: account.role,
            iss: self.config.tokens.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.tokens.access_ttl_secs)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.tokens.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Jwt(format!("Failed to sign access token: {}", e)))
    }

    /// Validate a bearer access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> AuthResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.tokens.issuer.clone()]);

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.tokens.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!("access token validation failed: {}", e);
            AuthError::AccessTokenInvalid
        })?;

        Ok(data.claims)
    }

    /// Create a new refresh session for the account
    pub async fn issue_refresh_session(
        &self,
        account_id: &str,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let now = self.clock.now();
        let mut conn = self.db.acquire().await.map_err(AuthError::Database)?;
        self.insert_session(&mut conn, account_id, now).await
    }

    /// Issue a full access + refresh pair
    pub async fn issue_pair(&self, account: &Account) -> AuthResult<AuthTokens> {
        let access_token = self.issue_access_token(account)?;
        let (refresh_token, _expires_at) = self.issue_refresh_session(&account.id).await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.config.tokens.access_ttl_secs,
        })
    }

    /// Rotate a refresh token: revoke the old session, create a successor
    ///
    /// Single-use: a token that is unknown, revoked, or expired yields
    /// `RefreshTokenInvalid`. Revocation and creation commit together.
    pub async fn rotate(&self, old_token: &str) -> AuthResult<AuthTokens> {
        let now = self.clock.now();
        let mut tx = self.db.begin().await.map_err(AuthError::Database)?;

        let row = sqlx::query_as::<_, (String, DateTime<Utc>, bool)>(
            "SELECT account_id, expires_at, revoked FROM refresh_session WHERE token = ?1",
        )
        .bind(old_token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AuthError::Database)?;

        let Some((account_id, expires_at, revoked)) = row else {
            return Err(AuthError::RefreshTokenInvalid);
        };
        if revoked || now > expires_at {
            return Err(AuthError::RefreshTokenInvalid);
        }

        // Guarded update; a concurrent rotation of the same token loses here
        let updated = sqlx::query(
            "UPDATE refresh_session SET revoked = 1, revoked_at = ?1 WHERE token = ?2 AND revoked = 0",
        )
        .bind(now)
        .bind(old_token)
        .execute(&mut *tx)
        .await
        .map_err(AuthError::Database)?;

        if updated.rows_affected() != 1 {
            return Err(AuthError::RefreshTokenInvalid);
        }

        let (refresh_token, _expires_at) = self.insert_session(&mut tx, &account_id, now).await?;

        // Mint the access token before committing; any failure here rolls the
        // rotation back and the old token stays live
        let account = sqlx::query_as::<_, Account>("SELECT * FROM account WHERE id = ?1")
            .bind(&account_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AuthError::Database)?;
        let access_token = self.issue_access_token(&account)?;

        tx.commit().await.map_err(AuthError::Database)?;

        info!(account_id = %account_id, "refresh session rotated");

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.config.tokens.access_ttl_secs,
        })
    }

    /// Revoke a refresh session; idempotent for revoked or unknown tokens
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE refresh_session SET revoked = 1, revoked_at = ?1 WHERE token = ?2 AND revoked = 0",
        )
        .bind(self.clock.now())
        .bind(token)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if result.rows_affected() > 0 {
            info!("refresh session revoked");
        }

        Ok(())
    }

    /// Revoke every live refresh session for an account
    pub async fn revoke_all_for_account(&self, account_id: &str) -> AuthResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_session SET revoked = 1, revoked_at = ?1
              WHERE account_id = ?2 AND revoked = 0",
        )
        .bind(self.clock.now())
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(result.rows_affected())
    }

    /// Delete sessions past expiry; intended for a periodic maintenance job
    pub async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_session WHERE expires_at < ?1")
            .bind(self.clock.now())
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!(deleted, "cleaned up expired refresh sessions");
        } else {
            debug!("session cleanup: no expired sessions found");
        }

        Ok(deleted)
    }

    async fn insert_session(
        &self,
        conn: &mut sqlx::SqliteConnection,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let token = generate_refresh_token();
        let expires_at = now + Duration::seconds(self.config.tokens.refresh_ttl_secs);

        sqlx::query(
            "INSERT INTO refresh_session (id, account_id, token, created_at, expires_at, revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(account_id)
        .bind(&token)
        .bind(now)
        .bind(expires_at)
        .execute(conn)
        .await
        .map_err(AuthError::Database)?;

        Ok((token, expires_at))
    }
}

/// 256 bits of OS randomness, base64url without padding
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
