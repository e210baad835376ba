/// Single-use recovery codes
///
/// Codes are human-typable fixed-width numeric groups generated from OS
/// randomness. Only SHA-256 hashes are stored; the plaintext batch is returned
/// exactly once at generation time. Consumption compares hashes in constant
/// time and flips the used flag with a guarded UPDATE so one code cannot be
/// spent twice under concurrent requests.
use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

/// Recovery code vault
pub struct RecoveryCodeVault {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl RecoveryCodeVault {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Issue a fresh batch of codes, returning the plaintexts exactly once
    pub async fn generate(&self, account_id: &str, count: u32) -> AuthResult<Vec<String>> {
        let now = self.clock.now();
        let mut codes = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let code = generate_code();
            sqlx::query(
                "INSERT INTO recovery_code (id, account_id, code_hash, used, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(account_id)
            .bind(hash_code(&code))
            .bind(now)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

            codes.push(code);
        }

        info!(account_id = %account_id, count, "recovery codes issued");
        Ok(codes)
    }

    /// Invalidate every existing code for the account and issue a new batch
    pub async fn regenerate_all(&self, account_id: &str, count: u32) -> AuthResult<Vec<String>> {
        self.invalidate_all(account_id).await?;
        self.generate(account_id, count).await
    }

    /// Delete every code for the account (used when 2FA is disabled)
    pub async fn invalidate_all(&self, account_id: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM recovery_code WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Consume a candidate code, at most once
    ///
    /// Scans the unused hashes with constant-time comparison. The used flag is
    /// set with `WHERE used = 0`, so a concurrent spend of the same code loses
    /// the race and falls through to `RecoveryCodeInvalid`.
    pub async fn consume(&self, account_id: &str, candidate: &str) -> AuthResult<()> {
        let candidate_hash = Sha256::digest(candidate.trim().as_bytes());

        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT id, code_hash FROM recovery_code WHERE account_id = ?1 AND used = 0",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await
        .map_err(AuthError::Database)?;

        for (id, stored_hex) in rows {
            let stored = match hex::decode(&stored_hex) {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };

            if candidate_hash.as_slice().ct_eq(&stored).into() {
                let result = sqlx::query(
                    "UPDATE recovery_code SET used = 1, used_at = ?1 WHERE id = ?2 AND used = 0",
                )
                .bind(self.clock.now())
                .bind(&id)
                .execute(&self.db)
                .await
                .map_err(AuthError::Database)?;

                if result.rows_affected() == 1 {
                    warn!(account_id = %account_id, "recovery code consumed");
                    return Ok(());
                }
                // Lost the race for this code; no other hash can match
                return Err(AuthError::RecoveryCodeInvalid);
            }
        }

        Err(AuthError::RecoveryCodeInvalid)
    }

    /// Unused codes remaining for the account
    pub async fn remaining(&self, account_id: &str) -> AuthResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recovery_code WHERE account_id = ?1 AND used = 0")
            .bind(account_id)
            .fetch_one(&self.db)
            .await
            .map_err(AuthError::Database)
    }
}

/// Three four-digit groups, e.g. `4821-0937-5512`
fn generate_code() -> String {
    let mut rng = rand::rngs::OsRng;
    format!(
        "{:04}-{:04}-{:04}",
        rng.gen_range(0..10000u32),
        rng.gen_range(0..10000u32),
        rng.gen_range(0..10000u32),
    )
}

fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}
