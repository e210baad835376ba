/// Configuration management for the auth core
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration for the auth core
///
/// Every tunable (token lifetimes, lockout threshold and duration, temp-token
/// TTL, hashing cost) lives here and is passed into each component at
/// construction; nothing is read from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub tokens: TokenConfig,
    pub temp_token: TempTokenConfig,
    pub lockout: LockoutConfig,
    pub password: PasswordConfig,
    pub two_factor: TwoFactorConfig,
    pub email: Option<EmailConfig>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub auth_db: PathBuf,
}

/// Access and refresh token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HS256 signing key for access tokens
    pub jwt_secret: String,
    /// `iss` claim stamped into access tokens
    pub issuer: String,
    /// Access token lifetime in seconds (default 1 hour)
    pub access_ttl_secs: i64,
    /// Refresh session lifetime in seconds (default 7 days)
    pub refresh_ttl_secs: i64,
}

/// Temp token (2FA handshake) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempTokenConfig {
    /// Key material the purpose-scoped sealing key is derived from
    pub key: String,
    /// Validity window in seconds (default 5 minutes)
    pub ttl_secs: i64,
}

/// Brute-force lockout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failed attempts before the account locks (default 5)
    pub max_attempts: i64,
    /// Lock duration in seconds from the triggering failure (default 15 minutes)
    pub duration_secs: i64,
}

/// Argon2id cost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Two-factor authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorConfig {
    /// Issuer label shown in authenticator apps
    pub issuer: String,
    /// Recovery codes issued per batch (default 8)
    pub recovery_code_count: u32,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

impl CoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AuthResult<Self> {
        dotenv::dotenv().ok();

        let auth_db = env::var("AUTH_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/auth.sqlite"));

        let jwt_secret = env::var("AUTH_JWT_SECRET")
            .map_err(|_| AuthError::Validation("JWT secret required".to_string()))?;
        let issuer = env::var("AUTH_TOKEN_ISSUER").unwrap_or_else(|_| "stronghold".to_string());
        let access_ttl_secs = env::var("AUTH_ACCESS_TOKEN_TTL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);
        let refresh_ttl_secs = env::var("AUTH_REFRESH_TOKEN_TTL")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        let temp_token_key = env::var("AUTH_TEMP_TOKEN_KEY")
            .map_err(|_| AuthError::Validation("Temp token key required".to_string()))?;
        let temp_token_ttl = env::var("AUTH_TEMP_TOKEN_TTL")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let max_attempts = env::var("AUTH_LOCKOUT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let lockout_duration = env::var("AUTH_LOCKOUT_DURATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let memory_kib = env::var("AUTH_ARGON2_MEMORY_KIB")
            .unwrap_or_else(|_| "19456".to_string())
            .parse()
            .unwrap_or(19456);
        let iterations = env::var("AUTH_ARGON2_ITERATIONS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .unwrap_or(2);
        let parallelism = env::var("AUTH_ARGON2_PARALLELISM")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let totp_issuer = env::var("AUTH_TOTP_ISSUER").unwrap_or_else(|_| "Stronghold".to_string());
        let recovery_code_count = env::var("AUTH_RECOVERY_CODE_COUNT")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .unwrap_or(8);

        let email = if let Ok(smtp_url) = env::var("AUTH_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("AUTH_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "noreply@localhost".to_string()),
            })
        } else {
            None
        };

        Ok(CoreConfig {
            storage: StorageConfig { auth_db },
            tokens: TokenConfig {
                jwt_secret,
                issuer,
                access_ttl_secs,
                refresh_ttl_secs,
            },
            temp_token: TempTokenConfig {
                key: temp_token_key,
                ttl_secs: temp_token_ttl,
            },
            lockout: LockoutConfig {
                max_attempts,
                duration_secs: lockout_duration,
            },
            password: PasswordConfig {
                memory_kib,
                iterations,
                parallelism,
            },
            two_factor: TwoFactorConfig {
                issuer: totp_issuer,
                recovery_code_count,
            },
            email,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AuthResult<()> {
        if self.tokens.jwt_secret.len() < 32 {
            return Err(AuthError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.temp_token.key.len() < 32 {
            return Err(AuthError::Validation(
                "Temp token key must be at least 32 characters".to_string(),
            ));
        }

        if self.lockout.max_attempts < 1 {
            return Err(AuthError::Validation(
                "Lockout threshold must be at least 1".to_string(),
            ));
        }

        if self.tokens.access_ttl_secs <= 0 || self.tokens.refresh_ttl_secs <= 0 {
            return Err(AuthError::Validation(
                "Token lifetimes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
