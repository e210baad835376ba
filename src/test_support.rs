//! Shared fixtures for unit tests
use crate::config::{
    CoreConfig, LockoutConfig, PasswordConfig, StorageConfig, TempTokenConfig, TokenConfig,
    TwoFactorConfig,
};
use std::path::PathBuf;

/// Config with fast hashing and in-memory storage
pub(crate) fn test_config() -> CoreConfig {
    CoreConfig {
        storage: StorageConfig {
            auth_db: PathBuf::from(":memory:"),
        },
        tokens: TokenConfig {
            jwt_secret: "test-secret-key-for-testing-only-0000000".to_string(),
            issuer: "stronghold-test".to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 604800,
        },
        temp_token: TempTokenConfig {
            key: "test-temp-token-key-for-testing-000000000".to_string(),
            ttl_secs: 300,
        },
        lockout: LockoutConfig {
            max_attempts: 5,
            duration_secs: 900,
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        two_factor: TwoFactorConfig {
            issuer: "Stronghold".to_string(),
            recovery_code_count: 8,
        },
        email: None,
    }
}
